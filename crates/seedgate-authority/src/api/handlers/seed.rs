//! Seed Issuance Handler
//!
//! Issues a signed seed to the principal authenticated by the fronting
//! proxy, bound to the content hash in the request body.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use seedgate_core::{SeedRequest, SeedResponse, REQUESTOR_HEADER};
use std::sync::Arc;
use tracing::{info, warn};

use super::{authenticated_identity, parse_body, AppState};
use crate::api::error::ApiError;

/// Issue a seed
///
/// POST /seed
pub async fn issue_seed(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SeedResponse>, ApiError> {
    let request: SeedRequest = parse_body(body).inspect_err(|e| {
        warn!(error = %e, "Rejected seed request body");
    })?;

    let identity =
        authenticated_identity(&headers, &state.config.identity_header).unwrap_or_default();

    if let Some(requestor) = headers.get(REQUESTOR_HEADER).and_then(|v| v.to_str().ok()) {
        info!(identity = %identity, requestor = %requestor, "Seed requested");
    }

    let signed = state
        .issuer
        .issue_seed(&identity, &request.hash)
        .await
        .map_err(|e| {
            warn!(identity = %identity, error = %e, kind = ?e.kind(), "Seed issuance failed");
            ApiError::from_issue(e)
        })?;

    Ok(Json(SeedResponse::success(signed)))
}

//! Signed URL Handler
//!
//! Validates a presented seed and, if it checks out, returns a signed URL
//! for the requested object.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::Json;
use seedgate_core::{SignRequest, SignResponse};
use std::sync::Arc;
use tracing::warn;

use super::{parse_body, AppState};
use crate::api::error::ApiError;

/// Validate a sign request and mint a URL
///
/// POST /sign
pub async fn sign_url(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SignResponse>, ApiError> {
    let request: SignRequest = parse_body(body).inspect_err(|e| {
        warn!(error = %e, "Rejected sign request body");
    })?;

    let bucket = state.config.bucket().inspect_err(|e| {
        warn!(error = %e, "Sign request cannot be served");
    })?;
    let duration = state.config.signed_url_duration().inspect_err(|e| {
        warn!(error = %e, "Sign request cannot be served");
    })?;

    state.validator.validate(&request).await.map_err(|e| {
        warn!(
            identity = %request.seed.identity(),
            path = %request.resource_path,
            error = %e,
            kind = ?e.kind(),
            "Sign request validation failed"
        );
        ApiError::from_sign(e)
    })?;

    let url = state
        .minter
        .mint(bucket, &request.resource_path, duration)
        .await?;

    Ok(Json(SignResponse::success(url)))
}

//! API request handlers

pub mod seed;
pub mod sign;

pub use seed::issue_seed;
pub use sign::sign_url;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::http::HeaderMap;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::config::AuthorityConfig;
use crate::core::{AllowlistSource, Clock, SeedIssuer, SignRequestValidator, SignedUrlMinter};
use crate::keys::IdentityService;
use crate::storage::UrlSigningPlatform;

/// Application state shared across handlers
pub struct AppState {
    pub config: Arc<AuthorityConfig>,
    pub issuer: SeedIssuer,
    pub validator: SignRequestValidator,
    pub minter: SignedUrlMinter,
}

impl AppState {
    /// Wire the authority components around shared collaborators
    pub fn new(
        config: AuthorityConfig,
        allowlist: Arc<dyn AllowlistSource>,
        identity: Arc<dyn IdentityService>,
        platform: Arc<dyn UrlSigningPlatform>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            issuer: SeedIssuer::new(
                config.clone(),
                allowlist.clone(),
                identity.clone(),
                clock.clone(),
            ),
            validator: SignRequestValidator::new(
                config.clone(),
                allowlist,
                identity.clone(),
                clock.clone(),
            ),
            minter: SignedUrlMinter::new(identity, platform, clock),
            config,
        }
    }
}

/// Decode a JSON body, telling unreadable, empty and malformed bodies apart
pub(crate) fn parse_body<T: DeserializeOwned>(
    body: Result<Bytes, BytesRejection>,
) -> Result<T, ApiError> {
    let bytes = body.map_err(|e| ApiError::Unreadable(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::EmptyBody);
    }
    serde_json::from_slice(&bytes).map_err(|e| ApiError::MalformedJson(e.to_string()))
}

/// Principal asserted by the fronting proxy, without any `issuer:` prefix
pub fn authenticated_identity(headers: &HeaderMap, header: &str) -> Option<String> {
    let raw = headers.get(header)?.to_str().ok()?.trim();
    let identity = raw.split_once(':').map_or(raw, |(_, id)| id);
    if identity.is_empty() {
        None
    } else {
        Some(identity.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use seedgate_core::SeedRequest;

    const HEADER: &str = "x-goog-authenticated-user-email";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_identity_prefix_stripped() {
        let headers = headers_with("accounts.google.com:alice@example.com");
        assert_eq!(
            authenticated_identity(&headers, HEADER).as_deref(),
            Some("alice@example.com")
        );
    }

    #[test]
    fn test_only_issuer_prefix_stripped() {
        let headers = headers_with("accounts.google.com:svc:deploy@example.com");
        assert_eq!(
            authenticated_identity(&headers, HEADER).as_deref(),
            Some("svc:deploy@example.com")
        );
    }

    #[test]
    fn test_identity_without_prefix() {
        let headers = headers_with("alice@example.com");
        assert_eq!(
            authenticated_identity(&headers, HEADER).as_deref(),
            Some("alice@example.com")
        );
    }

    #[test]
    fn test_missing_or_blank_identity() {
        assert_eq!(authenticated_identity(&HeaderMap::new(), HEADER), None);
        assert_eq!(authenticated_identity(&headers_with("issuer:"), HEADER), None);
        assert_eq!(authenticated_identity(&headers_with(""), HEADER), None);
    }

    #[test]
    fn test_body_classification() {
        let empty: Result<SeedRequest, _> = parse_body(Ok(Bytes::new()));
        assert!(matches!(empty, Err(ApiError::EmptyBody)));

        let malformed: Result<SeedRequest, _> = parse_body(Ok(Bytes::from_static(b"{\"Hash\":")));
        assert!(matches!(malformed, Err(ApiError::MalformedJson(_))));

        let ok: SeedRequest = parse_body(Ok(Bytes::from_static(b"{\"Hash\":\"3q2+7w==\"}"))).unwrap();
        assert_eq!(ok.hash, vec![0xde, 0xad, 0xbe, 0xef]);
    }
}

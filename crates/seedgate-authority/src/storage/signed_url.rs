//! Time-limited download URLs
//!
//! [`QuerySignedUrls`] produces V2-style query-signed URLs: the string to
//! sign is `METHOD\n\n\nEXPIRES\n/bucket/object`, signed by the authority's
//! identity and appended as `GoogleAccessId`, `Expires` and `Signature`.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use url::Url;

use crate::keys::{IdentityError, IdentityService};

/// Error type for URL signing
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlatformError {
    #[error("Invalid object location: {0}")]
    InvalidLocation(String),

    #[error("Signing failed: {0}")]
    Signing(#[from] IdentityError),
}

/// Parameters for one signed URL
pub struct SignedUrlOptions<'a> {
    /// Account the URL is attributed to
    pub access_id: &'a str,
    pub method: &'a str,
    pub expires: DateTime<Utc>,
    /// Identity whose key signs the URL payload
    pub signer: &'a dyn IdentityService,
}

/// Platform capable of producing signed object URLs
#[async_trait]
pub trait UrlSigningPlatform: Send + Sync {
    async fn signed_url(
        &self,
        bucket: &str,
        object: &str,
        options: SignedUrlOptions<'_>,
    ) -> Result<String, PlatformError>;
}

/// Query-string signed URLs rooted at a base endpoint
#[derive(Debug, Clone)]
pub struct QuerySignedUrls {
    base: Url,
}

impl QuerySignedUrls {
    pub fn new(base: &str) -> Result<Self, PlatformError> {
        let base = Url::parse(base).map_err(|e| PlatformError::InvalidLocation(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(PlatformError::InvalidLocation(base.to_string()));
        }
        Ok(Self { base })
    }
}

#[async_trait]
impl UrlSigningPlatform for QuerySignedUrls {
    async fn signed_url(
        &self,
        bucket: &str,
        object: &str,
        options: SignedUrlOptions<'_>,
    ) -> Result<String, PlatformError> {
        let object = object.trim_start_matches('/');
        if bucket.is_empty() || object.is_empty() {
            return Err(PlatformError::InvalidLocation(format!("{}/{}", bucket, object)));
        }

        let expires = options.expires.timestamp();
        let payload = format!("{}\n\n\n{}\n/{}/{}", options.method, expires, bucket, object);
        let (_, signature) = options.signer.sign_bytes(payload.as_bytes()).await?;

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| PlatformError::InvalidLocation(self.base.to_string()))?
            .pop_if_empty()
            .push(bucket)
            .extend(object.split('/'));
        url.query_pairs_mut()
            .append_pair("GoogleAccessId", options.access_id)
            .append_pair("Expires", &expires.to_string())
            .append_pair("Signature", &STANDARD.encode(signature));

        Ok(url.into())
    }
}

//! Signed URL minting
//!
//! Once a sign request validates, the authority asks the storage platform
//! for a GET-scoped URL to the requested object that expires after the
//! configured duration.

use chrono::Duration;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::Clock;
use crate::keys::{IdentityError, IdentityService};
use crate::storage::{PlatformError, SignedUrlOptions, UrlSigningPlatform};

#[derive(Error, Debug, Clone)]
pub enum MintError {
    #[error("signing identity unavailable: {0}")]
    IdentityUnavailable(IdentityError),

    #[error("storage platform failed to sign URL: {0}")]
    SigningFailure(PlatformError),

    #[error("URL lifetime {0} is out of range")]
    ExpiryOutOfRange(Duration),
}

/// Mints time-boxed download URLs
pub struct SignedUrlMinter {
    identity: Arc<dyn IdentityService>,
    platform: Arc<dyn UrlSigningPlatform>,
    clock: Arc<dyn Clock>,
}

impl SignedUrlMinter {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        platform: Arc<dyn UrlSigningPlatform>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identity,
            platform,
            clock,
        }
    }

    pub async fn mint(
        &self,
        bucket: &str,
        path: &str,
        duration: Duration,
    ) -> Result<String, MintError> {
        let access_id = self
            .identity
            .service_account()
            .await
            .map_err(|e| {
                warn!(error = %e, "Signing identity unavailable");
                MintError::IdentityUnavailable(e)
            })?;

        let expires = self.clock.now().checked_add_signed(duration).ok_or_else(|| {
            warn!(duration = %duration, "Signed URL expiry out of range");
            MintError::ExpiryOutOfRange(duration)
        })?;
        let url = self
            .platform
            .signed_url(
                bucket,
                path,
                SignedUrlOptions {
                    access_id: &access_id,
                    method: "GET",
                    expires,
                    signer: self.identity.as_ref(),
                },
            )
            .await
            .map_err(|e| {
                warn!(bucket = %bucket, path = %path, error = %e, "URL signing failed");
                MintError::SigningFailure(e)
            })?;

        info!(bucket = %bucket, path = %path, expires = %expires, "Minted signed URL");
        Ok(url)
    }
}

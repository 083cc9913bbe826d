//! Sign request validation
//!
//! A sign request presents a previously issued seed, its signature, the
//! content hash that was stripped from the seed, the caller's hardware
//! identifiers and the resource it wants a URL for. Checks run cheapest
//! first and the first failure short-circuits the rest:
//!
//! 1. Hardware identifiers are well-formed MAC addresses
//! 2. The content hash is allowlisted (if enforced)
//! 3. The seed names a plausible identity (if seed checks are enforced)
//! 4. The seed is inside its validity window
//! 5. The seed signature verifies (if signature checks are enforced)
//! 6. The resource path is non-empty

use chrono::{DateTime, Duration, Utc};
use seedgate_core::{
    validate_hardware_identifiers, verify_with_any, Certificate, Seed, SeedError, SignRequest,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::allowlist::{check_content_hash, AllowlistSource};
use super::{AuthorityError, Clock};
use crate::config::AuthorityConfig;
use crate::keys::IdentityService;

/// Shortest identity accepted in a seed
pub const MIN_IDENTITY_LEN: usize = 3;

/// Validate that a seed is live at `now`.
///
/// The seed expires `validity` after issuance; a seed issued after `now`
/// indicates clock skew or forgery and is rejected as well.
pub fn check_seed_window(
    seed: &Seed,
    validity: Duration,
    now: DateTime<Utc>,
) -> Result<(), SeedError> {
    let issued_at = seed.issued_at();

    // An expiry past the representable range never lapses
    if let Some(expired_at) = issued_at.checked_add_signed(validity) {
        if now > expired_at {
            return Err(SeedError::SeedExpired { expired_at, now });
        }
    }
    if issued_at > now {
        return Err(SeedError::SeedFromFuture { issued_at, now });
    }
    Ok(())
}

/// Validates sign requests before a URL is minted
pub struct SignRequestValidator {
    config: Arc<AuthorityConfig>,
    allowlist: Arc<dyn AllowlistSource>,
    identity: Arc<dyn IdentityService>,
    clock: Arc<dyn Clock>,
}

impl SignRequestValidator {
    pub fn new(
        config: Arc<AuthorityConfig>,
        allowlist: Arc<dyn AllowlistSource>,
        identity: Arc<dyn IdentityService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            allowlist,
            identity,
            clock,
        }
    }

    pub async fn validate(&self, request: &SignRequest) -> Result<(), AuthorityError> {
        validate_hardware_identifiers(&request.hardware_identifiers)?;

        check_content_hash(
            self.allowlist.as_ref(),
            &self.config,
            &request.content_hash,
            self.config.policy.sign_hash,
            "sign",
        )
        .await?;

        if self.config.policy.seed {
            self.check_seed(request).await?;
        } else {
            debug!("Seed checks not enforced");
        }

        if request.resource_path.is_empty() {
            return Err(SeedError::EmptyResourcePath.into());
        }

        info!(
            identity = %request.seed.identity(),
            path = %request.resource_path,
            "Sign request validated"
        );
        Ok(())
    }

    async fn check_seed(&self, request: &SignRequest) -> Result<(), AuthorityError> {
        let seed = &request.seed;

        if seed.identity().len() < MIN_IDENTITY_LEN {
            warn!(identity = %seed.identity(), "Seed identity rejected");
            return Err(SeedError::InvalidIdentity(seed.identity().to_string()).into());
        }

        let validity = self.config.seed_validity()?;
        if let Err(e) = check_seed_window(seed, validity, self.clock.now()) {
            warn!(identity = %seed.identity(), error = %e, "Seed outside validity window");
            return Err(e.into());
        }

        if !self.config.policy.seed_signature {
            debug!("Seed signature checks not enforced");
            return Ok(());
        }

        self.check_signature(request).await
    }

    async fn check_signature(&self, request: &SignRequest) -> Result<(), AuthorityError> {
        let current = self.identity.public_certificates().await?;

        // Current certificates are always tried before anything the seed carries
        let embedded: &[Certificate] = if self.config.policy.certificate_fallback {
            request.seed.certificates()
        } else {
            &[]
        };

        let message = request
            .seed
            .clone()
            .with_content_hash(request.content_hash.clone())
            .canonical_bytes()?;

        match verify_with_any(current.iter().chain(embedded), &message, &request.signature) {
            Some(cert) => {
                debug!(key_name = %cert.key_name, "Seed signature verified");
                Ok(())
            }
            None => {
                warn!(
                    identity = %request.seed.identity(),
                    issued_at = %request.seed.issued_at(),
                    current = current.len(),
                    embedded = embedded.len(),
                    "No trusted certificate verified seed signature"
                );
                Err(SeedError::SignatureUnverifiable {
                    issued_at: request.seed.issued_at(),
                    identity: request.seed.identity().to_string(),
                }
                .into())
            }
        }
    }
}

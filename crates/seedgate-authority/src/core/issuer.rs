//! Seed issuance
//!
//! A seed binds an authenticated principal to a content hash at a point in
//! time. The authority signs the canonical form with the hash included,
//! then strips the hash before returning the seed: the requester must
//! present the hash again, alongside the seed, to obtain a signed URL.

use seedgate_core::{Seed, SeedError, SignedSeed};
use std::sync::Arc;
use tracing::info;

use super::allowlist::{check_content_hash, AllowlistSource};
use super::{AuthorityError, Clock};
use crate::config::AuthorityConfig;
use crate::keys::IdentityService;

/// Issues signed seeds to authenticated principals
pub struct SeedIssuer {
    config: Arc<AuthorityConfig>,
    allowlist: Arc<dyn AllowlistSource>,
    identity: Arc<dyn IdentityService>,
    clock: Arc<dyn Clock>,
}

impl SeedIssuer {
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

    /// Issue a seed for `requestor` bound to `content_hash`.
    ///
    /// The returned seed carries the authority's current certificates and
    /// no content hash; the signature covers the seed with the hash present.
    pub async fn issue_seed(
        &self,
        requestor: &str,
        content_hash: &[u8],
    ) -> Result<SignedSeed, AuthorityError> {
        if requestor.is_empty() {
            return Err(SeedError::MissingIdentity.into());
        }

        check_content_hash(
            self.allowlist.as_ref(),
            &self.config,
            content_hash,
            self.config.policy.seed_hash,
            "seed",
        )
        .await?;

        let certificates = self.identity.public_certificates().await?;
        let seed = Seed::issue(requestor, content_hash.to_vec(), self.clock.now())
            .with_certificates(certificates);

        let (key_name, signature) = self.identity.sign_bytes(&seed.canonical_bytes()?).await?;

        info!(
            identity = %requestor,
            hash = %hex::encode(content_hash),
            issued_at = %seed.issued_at(),
            key_name = %key_name,
            "Issued seed"
        );

        Ok(SignedSeed {
            seed: seed.without_content_hash(),
            signature,
        })
    }
}

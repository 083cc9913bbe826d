//! Authority logic: allowlist access, seed issuance, sign-request
//! validation and signed-URL minting.

pub mod allowlist;
pub mod clock;
pub mod issuer;
pub mod minter;
pub mod validation;

pub use allowlist::{AllowlistError, AllowlistLoader, AllowlistSource, CachedAllowlist};
pub use clock::{Clock, FixedClock, SystemClock};
pub use issuer::SeedIssuer;
pub use minter::{MintError, SignedUrlMinter};
pub use validation::{check_seed_window, SignRequestValidator};

use seedgate_core::{ErrorKind, SeedError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::keys::IdentityError;

/// Failure of an authority operation
#[derive(Error, Debug, Clone)]
pub enum AuthorityError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rejected(#[from] SeedError),

    #[error("allowlist unavailable: {0}")]
    Allowlist(#[from] AllowlistError),

    #[error("identity service failed: {0}")]
    Identity(#[from] IdentityError),
}

impl AuthorityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthorityError::Config(_) => ErrorKind::Configuration,
            AuthorityError::Rejected(e) => e.kind(),
            AuthorityError::Allowlist(_) | AuthorityError::Identity(_) => ErrorKind::Upstream,
        }
    }
}

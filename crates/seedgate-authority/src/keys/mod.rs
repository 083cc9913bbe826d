//! Signing identity of the authority
//!
//! The authority signs seeds and signed-URL payloads with a private key it
//! never exposes. Verifiers only ever see the public certificates, which
//! include retired certificates so seeds signed before a rotation keep
//! verifying.

pub mod local;

pub use local::LocalIdentity;

use async_trait::async_trait;
use seedgate_core::Certificate;

/// Error type for identity operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    #[error("Key material unreadable: {0}")]
    KeyMaterial(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("No service account configured")]
    NoServiceAccount,
}

/// The authority's signing identity
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Sign `bytes` with the current private key.
    ///
    /// Returns the name of the key that signed and the raw signature.
    async fn sign_bytes(&self, bytes: &[u8]) -> Result<(String, Vec<u8>), IdentityError>;

    /// All public certificates currently trusted for this identity
    async fn public_certificates(&self) -> Result<Vec<Certificate>, IdentityError>;

    /// Account name to present as the signer of signed URLs
    async fn service_account(&self) -> Result<String, IdentityError>;
}

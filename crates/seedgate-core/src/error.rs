//! Error types for the seed protocol

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias using SeedError
pub type Result<T> = std::result::Result<T, SeedError>;

/// Broad classification of a failure.
///
/// Enforcement toggles may only downgrade `Authorization` failures to
/// logged warnings. The other kinds always fail the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed settings
    Configuration,
    /// Unreadable or malformed request payloads
    Request,
    /// The caller is not entitled to what it asked for
    Authorization,
    /// A signer, identity or storage collaborator failed
    Upstream,
}

/// Errors raised while issuing or validating seeds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    /// No authenticated principal accompanied the request
    #[error("no authenticated identity accompanied the request")]
    MissingIdentity,

    /// The content hash is not present in the allowlist
    #[error("hash {0} not in allowlist")]
    HashNotAllowed(String),

    /// The seed identity is too short to be a real principal
    #[error("identity '{0}' is invalid or empty")]
    InvalidIdentity(String),

    /// The seed validity window has elapsed
    #[error("seed expired at {expired_at}, current time is {now}")]
    SeedExpired {
        expired_at: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// The seed claims to have been issued after the validator's clock
    #[error("seed issued in the future at {issued_at}, current time is {now}")]
    SeedFromFuture {
        issued_at: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// No trusted certificate verified the seed signature
    #[error("unable to verify signature for seed issued at {issued_at} to {identity}")]
    SignatureUnverifiable {
        issued_at: DateTime<Utc>,
        identity: String,
    },

    /// A hardware identifier is not a 12-hex-character MAC address
    #[error("'{0}' is not a valid hardware identifier")]
    MalformedIdentifier(String),

    /// The sign request names no resource
    #[error("sign request path cannot be empty")]
    EmptyResourcePath,

    /// The allowlist payload is not syntactically valid
    #[error("failed parsing allowlist: {0}")]
    AllowlistParse(String),

    /// Canonical encoding failed
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl SeedError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SeedError::Serialization(_) | SeedError::AllowlistParse(_) => ErrorKind::Upstream,
            _ => ErrorKind::Authorization,
        }
    }
}

impl From<serde_json::Error> for SeedError {
    fn from(err: serde_json::Error) -> Self {
        SeedError::Serialization(err.to_string())
    }
}

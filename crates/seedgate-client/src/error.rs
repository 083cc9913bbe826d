//! Error types for the seed client

use seedgate_core::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for seed client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while obtaining a seed
#[derive(Error, Debug)]
pub enum ClientError {
    /// The file to hash could not be opened or read
    #[error("unable to hash {path}: {reason}")]
    FileUnreadable { path: PathBuf, reason: String },

    /// No username could be determined for the caller
    #[error("unable to determine the current user: {0}")]
    IdentityUnavailable(String),

    /// The seed server address is not a usable URL
    #[error("invalid seed server: {0}")]
    InvalidServer(String),

    /// The request never produced a response body
    #[error("seed request failed: {0}")]
    Transport(String),

    /// The authority does not recognise the file's hash
    #[error("hash {0} not in allowlist")]
    HashNotAllowed(String),

    /// The response body is not a seed response
    #[error("unable to decode seed response: {0}")]
    Decode(String),

    /// The authority answered with a failure status
    #[error("seed rejected with code {code}: {status}")]
    SeedRejected { status: String, code: StatusCode },

    /// The seed could not be written to the destination
    #[error("unable to persist seed to {path}: {reason}")]
    PersistFailure { path: PathBuf, reason: String },
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

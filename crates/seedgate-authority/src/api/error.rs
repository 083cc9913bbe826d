//! API error types and responses
//!
//! Every failure is answered with HTTP 500 and a `{Status, ErrorCode}` body.
//! The status string is deliberately generic; the full error has already
//! been logged by the handler.

use axum::{
    http,
    response::{IntoResponse, Response},
    Json,
};
use seedgate_core::{ErrorKind, SeedError, StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::core::{AuthorityError, MintError};

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("unable to read request body: {0}")]
    Unreadable(String),

    #[error("empty request")]
    EmptyBody,

    #[error("malformed JSON request: {0}")]
    MalformedJson(String),

    #[error("no authenticated user")]
    NoUser,

    #[error("{0}")]
    HashNotAllowed(SeedError),

    #[error("seed request failed: {0}")]
    SeedUnavailable(String),

    #[error("sign request rejected: {0}")]
    SignRejected(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// API error response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    pub status: String,
    pub error_code: StatusCode,
}

impl ApiError {
    /// Map a seed issuance failure
    pub fn from_issue(err: AuthorityError) -> Self {
        match err {
            AuthorityError::Config(e) => ApiError::Config(e),
            AuthorityError::Rejected(SeedError::MissingIdentity) => ApiError::NoUser,
            AuthorityError::Rejected(e @ SeedError::HashNotAllowed(_)) => {
                ApiError::HashNotAllowed(e)
            }
            AuthorityError::Allowlist(e) => ApiError::SeedUnavailable(e.to_string()),
            AuthorityError::Rejected(e) if e.kind() == ErrorKind::Authorization => {
                ApiError::SeedUnavailable(e.to_string())
            }
            e => ApiError::Signing(e.to_string()),
        }
    }

    /// Map a sign request validation failure
    pub fn from_sign(err: AuthorityError) -> Self {
        match err {
            AuthorityError::Config(e) => ApiError::Config(e),
            e if e.kind() == ErrorKind::Authorization => ApiError::SignRejected(e.to_string()),
            e => ApiError::Signing(e.to_string()),
        }
    }

    /// Wire status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Config(_) => StatusCode::ConfigError,
            ApiError::Unreadable(_) => StatusCode::ReqUnreadable,
            ApiError::EmptyBody | ApiError::MalformedJson(_) => StatusCode::JsonError,
            ApiError::NoUser => StatusCode::InvalidUser,
            ApiError::HashNotAllowed(_) => StatusCode::SeedInvalidHash,
            ApiError::SeedUnavailable(_) => StatusCode::SeedError,
            ApiError::SignRejected(_) | ApiError::Signing(_) => StatusCode::SignError,
        }
    }

    /// Status string returned to the caller
    fn public_status(&self) -> String {
        match self {
            ApiError::Config(_) => "server configuration error".into(),
            ApiError::Unreadable(_) => "unable to read request".into(),
            ApiError::EmptyBody => "empty request".into(),
            ApiError::MalformedJson(_) => "unable to parse JSON request".into(),
            ApiError::NoUser => "no authenticated user".into(),
            // The hash is the caller's own input
            ApiError::HashNotAllowed(e) => e.to_string(),
            ApiError::SeedUnavailable(_) => "unable to issue seed".into(),
            ApiError::SignRejected(_) => "sign request rejected".into(),
            ApiError::Signing(_) => "unable to sign".into(),
        }
    }
}

impl From<MintError> for ApiError {
    fn from(err: MintError) -> Self {
        ApiError::Signing(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: self.public_status(),
            error_code: self.status_code(),
        };

        (http::StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

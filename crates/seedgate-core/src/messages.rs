//! Request and response bodies for the `/seed` and `/sign` endpoints

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::encoding::base64_bytes;
use crate::seed::{Seed, SignedSeed};

/// Status codes returned to clients in the `ErrorCode` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum StatusCode {
    Success,
    ConfigError,
    ReqUnreadable,
    JsonError,
    SignError,
    SeedError,
    SeedInvalidHash,
    InvalidUser,
}

impl StatusCode {
    pub fn code(self) -> u16 {
        match self {
            StatusCode::Success => 0,
            StatusCode::ConfigError => 101,
            StatusCode::ReqUnreadable => 102,
            StatusCode::JsonError => 103,
            StatusCode::SignError => 104,
            StatusCode::SeedError => 105,
            StatusCode::SeedInvalidHash => 106,
            StatusCode::InvalidUser => 107,
        }
    }

    pub fn is_success(self) -> bool {
        self == StatusCode::Success
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StatusCode::Success),
            101 => Ok(StatusCode::ConfigError),
            102 => Ok(StatusCode::ReqUnreadable),
            103 => Ok(StatusCode::JsonError),
            104 => Ok(StatusCode::SignError),
            105 => Ok(StatusCode::SeedError),
            106 => Ok(StatusCode::SeedInvalidHash),
            107 => Ok(StatusCode::InvalidUser),
            other => Err(format!("unknown status code {}", other)),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Body of `POST /seed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SeedRequest {
    /// Raw digest bytes of the hashed installer file
    #[serde(with = "base64_bytes", default)]
    pub hash: Vec<u8>,
}

/// Response to `POST /seed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SeedResponse {
    pub status: String,

    pub error_code: StatusCode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<Seed>,

    #[serde(with = "base64_bytes", default, skip_serializing_if = "Vec::is_empty")]
    pub signature: Vec<u8>,
}

impl SeedResponse {
    /// Successful response carrying a signed seed
    pub fn success(signed: SignedSeed) -> Self {
        Self {
            status: "success".into(),
            error_code: StatusCode::Success,
            seed: Some(signed.seed),
            signature: signed.signature,
        }
    }

    /// Failure response with a generic status message
    pub fn failure(status: impl Into<String>, error_code: StatusCode) -> Self {
        Self {
            status: status.into(),
            error_code,
            seed: None,
            signature: Vec::new(),
        }
    }

    /// Drop the status fields, keeping only what is persisted on the medium
    pub fn into_signed_seed(self) -> Option<SignedSeed> {
        let seed = self.seed?;
        Some(SignedSeed {
            seed,
            signature: self.signature,
        })
    }
}

/// Body of `POST /sign`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignRequest {
    pub seed: Seed,

    #[serde(with = "base64_bytes", default)]
    pub signature: Vec<u8>,

    /// Hardware identifiers of the requesting machine
    #[serde(rename = "Mac", default)]
    pub hardware_identifiers: Vec<String>,

    /// Object path the caller wants a signed URL for
    #[serde(rename = "Path", default)]
    pub resource_path: String,

    /// Raw digest bytes of the installer file, re-computed by the caller
    #[serde(rename = "Hash", with = "base64_bytes", default)]
    pub content_hash: Vec<u8>,
}

/// Response to `POST /sign`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignResponse {
    pub status: String,

    pub error_code: StatusCode,

    #[serde(rename = "SignedURL", default, skip_serializing_if = "String::is_empty")]
    pub signed_url: String,
}

impl SignResponse {
    pub fn success(signed_url: impl Into<String>) -> Self {
        Self {
            status: "Success".into(),
            error_code: StatusCode::Success,
            signed_url: signed_url.into(),
        }
    }

    pub fn failure(status: impl Into<String>, error_code: StatusCode) -> Self {
        Self {
            status: status.into(),
            error_code,
            signed_url: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_serialize_as_integers() {
        let resp = SignResponse::failure("Environment variable not set", StatusCode::ConfigError);
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(
            json,
            r#"{"Status":"Environment variable not set","ErrorCode":101}"#
        );
    }

    #[test]
    fn test_status_code_values() {
        assert_eq!(StatusCode::Success.code(), 0);
        assert_eq!(StatusCode::InvalidUser.code(), 107);
        assert_eq!(StatusCode::try_from(106).unwrap(), StatusCode::SeedInvalidHash);
        assert!(StatusCode::try_from(42).is_err());
    }

    #[test]
    fn test_error_seed_response_decodes_without_seed() {
        let resp: SeedResponse =
            serde_json::from_str(r#"{"Status":"no user","ErrorCode":107}"#).unwrap();
        assert_eq!(resp.error_code, StatusCode::InvalidUser);
        assert!(resp.seed.is_none());
        assert!(resp.into_signed_seed().is_none());
    }

    #[test]
    fn test_sign_request_wire_names() {
        let json = r#"{
            "Seed": {"Issued": "2024-03-01T12:00:00Z", "Username": "alice", "Certs": [], "Hash": null},
            "Signature": "AQID",
            "Mac": ["00:11:22:33:44:55"],
            "Path": "images/boot.wim",
            "Hash": "q80="
        }"#;
        let req: SignRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.signature, vec![1, 2, 3]);
        assert_eq!(req.hardware_identifiers, vec!["00:11:22:33:44:55"]);
        assert_eq!(req.resource_path, "images/boot.wim");
        assert_eq!(req.content_hash, vec![0xab, 0xcd]);
    }
}

//! Seed records and their canonical form
//!
//! A [`Seed`] is created exactly once by the authority and never mutated.
//! Operations that look like edits (attaching certificates, stripping or
//! re-inserting the content hash) consume the seed and return a new value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::encoding::{base64_bytes, base64_opt};
use crate::error::Result;

/// A public certificate published by the authority's identity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Certificate {
    /// Name of the signing key this certificate belongs to
    pub key_name: String,

    /// PEM-encoded X.509 certificate
    #[serde(with = "base64_bytes", default)]
    pub data: Vec<u8>,
}

impl Certificate {
    /// Create a certificate from a key name and PEM bytes
    pub fn new(key_name: impl Into<String>, pem: impl Into<Vec<u8>>) -> Self {
        Self {
            key_name: key_name.into(),
            data: pem.into(),
        }
    }
}

/// A time-stamped, identity-bound assertion issued by the authority
///
/// Field order is significant: it fixes the canonical serialization that
/// signatures are computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    #[serde(rename = "Issued")]
    issued_at: DateTime<Utc>,

    #[serde(rename = "Username")]
    identity: String,

    #[serde(rename = "Certs", default)]
    certificates: Vec<Certificate>,

    #[serde(rename = "Hash", with = "base64_opt", default)]
    content_hash: Option<Vec<u8>>,
}

impl Seed {
    /// Issue a new seed for `identity` at `issued_at`
    pub fn issue(
        identity: impl Into<String>,
        content_hash: Vec<u8>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            issued_at,
            identity: identity.into(),
            certificates: Vec::new(),
            content_hash: non_empty(content_hash),
        }
    }

    /// When the authority issued this seed
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// The principal the seed was issued to
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Certificates that were current when the seed was issued
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// The content hash, if it has not been stripped
    pub fn content_hash(&self) -> Option<&[u8]> {
        self.content_hash.as_deref()
    }

    /// Attach the certificates that were current at issuance
    pub fn with_certificates(self, certificates: Vec<Certificate>) -> Self {
        Self {
            certificates,
            ..self
        }
    }

    /// Remove the content hash before handing the seed back to a requester
    pub fn without_content_hash(self) -> Self {
        Self {
            content_hash: None,
            ..self
        }
    }

    /// Re-insert a content hash presented alongside the seed.
    ///
    /// The signature covers the hash, so verifiers must restore it first.
    pub fn with_content_hash(self, content_hash: Vec<u8>) -> Self {
        Self {
            content_hash: non_empty(content_hash),
            ..self
        }
    }

    /// Canonical serialization that signatures are computed over
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

fn non_empty(bytes: Vec<u8>) -> Option<Vec<u8>> {
    if bytes.is_empty() {
        None
    } else {
        Some(bytes)
    }
}

/// A seed plus the detached signature over its canonical form
///
/// This is also the exact shape of the `seed.json` artifact written to the
/// provisioned medium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignedSeed {
    pub seed: Seed,

    #[serde(with = "base64_bytes", default)]
    pub signature: Vec<u8>,
}

impl SignedSeed {
    /// Human-readable form persisted on the medium
    pub fn to_file_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parse a persisted `seed.json`
    pub fn from_file_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

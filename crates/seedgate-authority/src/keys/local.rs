//! File-backed signing identity
//!
//! Holds an RSA private key (PKCS#8 PEM) and the matching X.509 certificate,
//! plus any retired certificates still accepted for verification.

use async_trait::async_trait;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use seedgate_core::Certificate;
use sha2::Sha256;
use std::path::Path;
use tracing::info;

use super::{IdentityError, IdentityService};

/// Signing identity loaded from local key material
pub struct LocalIdentity {
    key_name: String,
    signing_key: SigningKey<Sha256>,
    /// Current certificate first, then retired ones
    certificates: Vec<Certificate>,
    service_account: Option<String>,
}

impl LocalIdentity {
    /// Build an identity from PEM text
    pub fn from_pem(
        key_name: impl Into<String>,
        private_key_pem: &str,
        certificate_pem: &str,
    ) -> Result<Self, IdentityError> {
        let key_name = key_name.into();
        let private_key = RsaPrivateKey::from_pkcs8_pem(private_key_pem)
            .map_err(|e| IdentityError::KeyMaterial(e.to_string()))?;

        info!(key_name = %key_name, "Signing identity initialized");

        Ok(Self {
            certificates: vec![Certificate::new(key_name.clone(), certificate_pem)],
            key_name,
            signing_key: SigningKey::new(private_key),
            service_account: None,
        })
    }

    /// Load an identity from a private key file and a certificate file
    pub fn load(
        key_name: impl Into<String>,
        private_key_path: &Path,
        certificate_path: &Path,
    ) -> Result<Self, IdentityError> {
        let read = |path: &Path| {
            std::fs::read_to_string(path)
                .map_err(|e| IdentityError::KeyMaterial(format!("{}: {}", path.display(), e)))
        };
        Self::from_pem(key_name, &read(private_key_path)?, &read(certificate_path)?)
    }

    /// Keep trusting a certificate from a previous key
    pub fn with_retired_certificate(mut self, certificate: Certificate) -> Self {
        info!(key_name = %certificate.key_name, "Trusting retired certificate");
        self.certificates.push(certificate);
        self
    }

    pub fn with_service_account(mut self, account: impl Into<String>) -> Self {
        self.service_account = Some(account.into());
        self
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }
}

#[async_trait]
impl IdentityService for LocalIdentity {
    async fn sign_bytes(&self, bytes: &[u8]) -> Result<(String, Vec<u8>), IdentityError> {
        let signature = self
            .signing_key
            .try_sign(bytes)
            .map_err(|e| IdentityError::Signing(e.to_string()))?;
        Ok((self.key_name.clone(), signature.to_vec()))
    }

    async fn public_certificates(&self) -> Result<Vec<Certificate>, IdentityError> {
        Ok(self.certificates.clone())
    }

    async fn service_account(&self) -> Result<String, IdentityError> {
        self.service_account
            .clone()
            .ok_or(IdentityError::NoServiceAccount)
    }
}

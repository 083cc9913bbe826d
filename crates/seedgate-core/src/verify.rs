//! Seed signature verification
//!
//! Signatures are RSASSA-PKCS1-v1_5 over SHA-256 of the canonical seed
//! serialization. Each trusted certificate is turned into a verifier
//! candidate; verification succeeds on the first candidate that accepts the
//! signature. Certificates that fail to decode, or that do not carry an RSA
//! key, are skipped rather than treated as failures.

use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate as X509Certificate;

use crate::seed::Certificate;

/// Why a certificate could not become a verifier candidate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CandidateError {
    #[error("certificate is not valid PEM-encoded X.509: {0}")]
    Decode(String),

    #[error("certificate does not contain an RSA public key")]
    NotRsa,
}

/// An RSA verifier extracted from a trusted certificate
#[derive(Debug, Clone)]
pub struct CertificateVerifier {
    key_name: String,
    key: VerifyingKey<Sha256>,
}

impl CertificateVerifier {
    /// Decode a PEM certificate and extract its RSA public key
    pub fn from_certificate(cert: &Certificate) -> Result<Self, CandidateError> {
        let x509 = X509Certificate::from_pem(&cert.data)
            .map_err(|e| CandidateError::Decode(e.to_string()))?;

        let spki_der = x509
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| CandidateError::Decode(e.to_string()))?;

        let public_key =
            RsaPublicKey::from_public_key_der(&spki_der).map_err(|_| CandidateError::NotRsa)?;

        Ok(Self {
            key_name: cert.key_name.clone(),
            key: VerifyingKey::new(public_key),
        })
    }

    /// Name of the key this verifier was built from
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Check `signature` over `message`
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match Signature::try_from(signature) {
            Ok(sig) => self.key.verify(message, &sig).is_ok(),
            Err(_) => false,
        }
    }
}

/// Verify `signature` over `message` against candidate certificates in order.
///
/// Returns the certificate that verified, or `None` if none did.
pub fn verify_with_any<'a, I>(certificates: I, message: &[u8], signature: &[u8]) -> Option<&'a Certificate>
where
    I: IntoIterator<Item = &'a Certificate>,
{
    certificates.into_iter().find(|cert| {
        match CertificateVerifier::from_certificate(cert) {
            Ok(verifier) => {
                let verified = verifier.verify(message, signature);
                if !verified {
                    debug!(key_name = %cert.key_name, "Certificate did not verify signature");
                }
                verified
            }
            Err(e) => {
                debug!(key_name = %cert.key_name, reason = %e, "Skipping certificate");
                false
            }
        }
    })
}

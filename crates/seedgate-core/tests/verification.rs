//! Signature Verification Tests
//!
//! Exercises certificate-based verification of seed signatures against
//! real RSA and EC certificates:
//! - Signatures from the authority key verify against its certificate
//! - Rotated or foreign certificates are tried in order
//! - Undecodable and non-RSA certificates are skipped, not fatal

use chrono::{TimeZone, Utc};
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::Sha256;

use seedgate_core::verify::{verify_with_any, CandidateError, CertificateVerifier};
use seedgate_core::{Certificate, Seed};

const AUTHORITY_KEY: &str = include_str!("fixtures/authority_key.pem");
const AUTHORITY_CERT: &str = include_str!("fixtures/authority_cert.pem");
const ROTATED_CERT: &str = include_str!("fixtures/rotated_cert.pem");
const EC_CERT: &str = include_str!("fixtures/ec_cert.pem");

// =============================================================================
// Test Helpers
// =============================================================================

fn sign(message: &[u8]) -> Vec<u8> {
    let key = RsaPrivateKey::from_pkcs8_pem(AUTHORITY_KEY).expect("fixture key should parse");
    SigningKey::<Sha256>::new(key).sign(message).to_vec()
}

fn test_seed() -> Seed {
    Seed::issue(
        "alice@example.com",
        vec![0x31; 32],
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    )
    .with_certificates(vec![Certificate::new("authority", AUTHORITY_CERT)])
}

// =============================================================================
// Candidate Construction
// =============================================================================

#[test]
fn test_rsa_certificate_becomes_verifier() {
    let cert = Certificate::new("authority", AUTHORITY_CERT);
    let verifier = CertificateVerifier::from_certificate(&cert).unwrap();
    assert_eq!(verifier.key_name(), "authority");
}

#[test]
fn test_ec_certificate_is_not_rsa() {
    let cert = Certificate::new("ec", EC_CERT);
    let err = CertificateVerifier::from_certificate(&cert).unwrap_err();
    assert_eq!(err, CandidateError::NotRsa);
}

#[test]
fn test_garbage_certificate_fails_decode() {
    let cert = Certificate::new("junk", b"not a certificate".to_vec());
    let err = CertificateVerifier::from_certificate(&cert).unwrap_err();
    assert!(matches!(err, CandidateError::Decode(_)));
}

// =============================================================================
// Verification
// =============================================================================

#[test]
fn test_signature_verifies_against_authority_certificate() {
    let seed = test_seed();
    let message = seed.canonical_bytes().unwrap();
    let signature = sign(&message);

    let verifier =
        CertificateVerifier::from_certificate(&Certificate::new("authority", AUTHORITY_CERT))
            .unwrap();
    assert!(verifier.verify(&message, &signature));
}

#[test]
fn test_tampered_seed_does_not_verify() {
    let seed = test_seed();
    let signature = sign(&seed.canonical_bytes().unwrap());

    let tampered = seed.without_content_hash().with_content_hash(vec![0x32; 32]);
    let certs = vec![Certificate::new("authority", AUTHORITY_CERT)];

    assert!(verify_with_any(&certs, &tampered.canonical_bytes().unwrap(), &signature).is_none());
}

#[test]
fn test_truncated_signature_does_not_verify() {
    let message = test_seed().canonical_bytes().unwrap();
    let signature = sign(&message);
    let certs = vec![Certificate::new("authority", AUTHORITY_CERT)];

    assert!(verify_with_any(&certs, &message, &signature[..signature.len() - 1]).is_none());
    assert!(verify_with_any(&certs, &message, &[]).is_none());
}

#[test]
fn test_first_matching_certificate_wins_after_skips() {
    let message = test_seed().canonical_bytes().unwrap();
    let signature = sign(&message);

    let certs = vec![
        Certificate::new("junk", b"-----BEGIN CERTIFICATE-----\n".to_vec()),
        Certificate::new("ec", EC_CERT),
        Certificate::new("rotated", ROTATED_CERT),
        Certificate::new("authority", AUTHORITY_CERT),
    ];

    let matched = verify_with_any(&certs, &message, &signature).expect("authority cert should verify");
    assert_eq!(matched.key_name, "authority");
}

#[test]
fn test_no_candidates_never_verifies() {
    let message = test_seed().canonical_bytes().unwrap();
    let signature = sign(&message);
    let certs: Vec<Certificate> = vec![Certificate::new("rotated", ROTATED_CERT)];

    assert!(verify_with_any(&certs, &message, &signature).is_none());
    assert!(verify_with_any(&[], &message, &signature).is_none());
}

//! # Seedgate Core
//!
//! Shared types for the seed issuance and verification protocol that lets a
//! freshly imaged machine prove it was built by a sanctioned process.
//!
//! ## Key Concepts
//!
//! - **Seed**: a time-stamped, identity-bound assertion issued by the authority
//! - **SignedSeed**: a Seed plus a detached RSA signature over its canonical form
//! - **Allowlist**: the set of content hashes permitted to take part in the protocol
//! - **Hardware identifier**: a 12-hex-character MAC submitted for auditing
//!
//! This crate performs no I/O. The authority and client crates supply the
//! transports, storage and signing collaborators.

pub mod allowlist;
pub mod encoding;
pub mod error;
pub mod hardware;
pub mod messages;
pub mod seed;
pub mod verify;

pub use allowlist::Allowlist;
pub use error::{ErrorKind, Result, SeedError};
pub use hardware::validate_hardware_identifiers;
pub use messages::{SeedRequest, SeedResponse, SignRequest, SignResponse, StatusCode};
pub use seed::{Certificate, Seed, SignedSeed};
pub use verify::{verify_with_any, CertificateVerifier};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the artifact the client persists on the provisioned medium
pub const SEED_FILE_NAME: &str = "seed.json";

/// Substring the authority places in the status of a hash rejection.
///
/// Clients match on it to tell "not authorized" apart from a broken pipeline.
pub const HASH_NOT_ALLOWED_MARKER: &str = "not in allowlist";

/// Header the client uses to report the local username it ran as.
///
/// Informational only; the authority trusts its own authenticated header.
pub const REQUESTOR_HEADER: &str = "x-seedgate-requestor";

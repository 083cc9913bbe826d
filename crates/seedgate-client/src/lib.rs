//! Seed Client
//!
//! Runs on the machine that prepares provisioning media. It hashes the
//! installer image, asks the seed authority for a signed seed bound to the
//! caller, and writes that seed to the medium as `seed.json`. The seed is
//! later presented back to the authority in a sign request.
//!
//! A rejected hash surfaces as [`ClientError::HashNotAllowed`], separate from
//! transport and decode failures.

pub mod client;
pub mod error;
pub mod server;
pub mod user;

pub use client::{
    hash_file, persist_seed, seed_directory, Credential, SeedClient, SeedClientConfig,
};
pub use error::{ClientError, Result};
pub use server::SeedServer;
pub use user::{StaticUser, SystemUser, UserSource};

//! Object storage abstraction for the authority
//!
//! The allowlist and the provisioning payloads live in a bucket. Reading
//! goes through [`ObjectStore`]; issuing time-limited download URLs goes
//! through [`UrlSigningPlatform`]. Both are traits so the authority can run
//! against a local directory in development and an in-memory store in tests.

pub mod fs;
pub mod memory;
pub mod signed_url;

pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;
pub use signed_url::{PlatformError, QuerySignedUrls, SignedUrlOptions, UrlSigningPlatform};

use async_trait::async_trait;
use std::fmt::Debug;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Streaming handle to an object's contents
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// Error type for storage operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Read access to bucketed objects
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Open an object for reading
    async fn open(&self, bucket: &str, object: &str) -> Result<ObjectReader, StorageError>;
}

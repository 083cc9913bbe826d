//! In-memory object store
//!
//! Suitable for tests and single-process development. Data is lost on
//! restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::RwLock;
use tracing::info;

use super::{ObjectReader, ObjectStore, StorageError};

/// In-memory object store implementation
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace an object
    pub fn put(&self, bucket: &str, object: &str, contents: impl Into<Vec<u8>>) {
        let mut objects = self.objects.write().unwrap();
        info!(bucket = %bucket, object = %object, "Storing object");
        objects.insert((bucket.to_string(), object.to_string()), contents.into());
    }

    /// Remove an object, returning whether it existed
    pub fn remove(&self, bucket: &str, object: &str) -> bool {
        let mut objects = self.objects.write().unwrap();
        objects
            .remove(&(bucket.to_string(), object.to_string()))
            .is_some()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn open(&self, bucket: &str, object: &str) -> Result<ObjectReader, StorageError> {
        let objects = self.objects.read().unwrap();
        let contents = objects
            .get(&(bucket.to_string(), object.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("{}/{}", bucket, object)))?;
        Ok(Box::pin(Cursor::new(contents)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_put_and_open() {
        let store = MemoryObjectStore::new();
        store.put("bucket", "config/allowlist.yaml", "- abcd\n");

        let mut reader = store.open("bucket", "config/allowlist.yaml").await.unwrap();
        let mut contents = String::new();
        reader.read_to_string(&mut contents).await.unwrap();
        assert_eq!(contents, "- abcd\n");
    }

    #[tokio::test]
    async fn test_missing_object() {
        let store = MemoryObjectStore::new();
        store.put("bucket", "a", "x");

        assert!(matches!(
            store.open("other", "a").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(store.remove("bucket", "a"));
        assert!(matches!(
            store.open("bucket", "a").await,
            Err(StorageError::NotFound(_))
        ));
    }
}

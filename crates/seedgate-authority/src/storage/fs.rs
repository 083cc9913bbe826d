//! Directory-backed object store
//!
//! Objects live at `<root>/<bucket>/<object>`. Object names may contain `/`
//! but never escape the bucket directory.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use super::{ObjectReader, ObjectStore, StorageError};

#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, bucket: &str, object: &str) -> Result<PathBuf, StorageError> {
        let mut path = self.root.clone();
        for part in [bucket, object] {
            let relative = Path::new(part);
            let confined = !part.is_empty()
                && relative
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)));
            if !confined {
                return Err(StorageError::InvalidPath(format!("{}/{}", bucket, object)));
            }
            path.push(relative);
        }
        Ok(path)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn open(&self, bucket: &str, object: &str) -> Result<ObjectReader, StorageError> {
        let path = self.object_path(bucket, object)?;
        match tokio::fs::File::open(&path).await {
            Ok(file) => Ok(Box::pin(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(format!("{}/{}", bucket, object)))
            }
            Err(e) => Err(StorageError::Io(format!("{}: {}", path.display(), e))),
        }
    }
}

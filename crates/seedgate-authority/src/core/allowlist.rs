//! Allowlist loading, caching and the content-hash gate
//!
//! [`AllowlistLoader`] fetches and parses the allowlist from object storage
//! on every call. [`CachedAllowlist`] wraps any source with a time-to-live
//! cache; failed loads are never cached, so an outage recovers on the next
//! request.

use async_trait::async_trait;
use moka::future::Cache;
use seedgate_core::{Allowlist, SeedError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use super::AuthorityError;
use crate::config::AuthorityConfig;
use crate::storage::ObjectStore;

/// Why an allowlist could not be produced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllowlistError {
    #[error("allowlist source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("failed reading allowlist: {0}")]
    ReadFailure(String),

    #[error("{0}")]
    ParseFailure(String),
}

/// Anything that can produce an allowlist snapshot
#[async_trait]
pub trait AllowlistSource: Send + Sync {
    async fn load(&self, bucket: &str, path: &str) -> Result<Allowlist, AllowlistError>;
}

/// Reads the allowlist straight from object storage
#[derive(Debug, Clone)]
pub struct AllowlistLoader {
    store: Arc<dyn ObjectStore>,
}

impl AllowlistLoader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AllowlistSource for AllowlistLoader {
    async fn load(&self, bucket: &str, path: &str) -> Result<Allowlist, AllowlistError> {
        let mut reader = self
            .store
            .open(bucket, path)
            .await
            .map_err(|e| AllowlistError::SourceUnavailable(e.to_string()))?;

        let mut payload = Vec::new();
        reader
            .read_to_end(&mut payload)
            .await
            .map_err(|e| AllowlistError::ReadFailure(e.to_string()))?;

        let allowlist =
            Allowlist::parse(&payload).map_err(|e| AllowlistError::ParseFailure(e.to_string()))?;

        debug!(bucket = %bucket, path = %path, entries = allowlist.len(), "Loaded allowlist");
        Ok(allowlist)
    }
}

/// Time-to-live cache in front of another allowlist source
pub struct CachedAllowlist {
    inner: Arc<dyn AllowlistSource>,
    cache: Cache<(String, String), Allowlist>,
}

impl CachedAllowlist {
    pub fn new(inner: Arc<dyn AllowlistSource>, ttl: Duration) -> Self {
        info!(ttl = ?ttl, "Allowlist cache enabled");
        Self {
            inner,
            cache: Cache::builder().max_capacity(64).time_to_live(ttl).build(),
        }
    }

    /// Drop all cached snapshots
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

#[async_trait]
impl AllowlistSource for CachedAllowlist {
    async fn load(&self, bucket: &str, path: &str) -> Result<Allowlist, AllowlistError> {
        self.cache
            .try_get_with(
                (bucket.to_string(), path.to_string()),
                self.inner.load(bucket, path),
            )
            .await
            .map_err(|e| (*e).clone())
    }
}

/// Check a content hash against the configured allowlist.
///
/// When `enforce` is false every failure, including a missing bucket or an
/// unreachable allowlist, is logged and the request proceeds.
pub(crate) async fn check_content_hash(
    source: &dyn AllowlistSource,
    config: &AuthorityConfig,
    digest: &[u8],
    enforce: bool,
    operation: &'static str,
) -> Result<(), AuthorityError> {
    let hex_digest = hex::encode(digest);

    let outcome: Result<(), AuthorityError> = async {
        let bucket = config.bucket()?;
        let allowlist = source.load(bucket, &config.allowlist_path).await?;
        if allowlist.contains_digest(digest) {
            Ok(())
        } else {
            Err(SeedError::HashNotAllowed(hex_digest.clone()).into())
        }
    }
    .await;

    match outcome {
        Ok(()) => {
            debug!(operation, hash = %hex_digest, "Hash present in allowlist");
            Ok(())
        }
        Err(e) if enforce => {
            warn!(operation, hash = %hex_digest, error = %e, "Hash check failed");
            Err(e)
        }
        Err(e) => {
            warn!(operation, hash = %hex_digest, error = %e, "Hash check failed but not enforced");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStore;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const HASH_HEX: &str = "314aaa98adcbd86339fb4eece6050b8ae2d38ff8ebb416e231bb7724c99b830d";
    const PATH: &str = "seedgate_config/allowlist.yaml";

    fn store_with(payload: &str) -> Arc<MemoryObjectStore> {
        let store = Arc::new(MemoryObjectStore::new());
        store.put("bucket", PATH, payload);
        store
    }

    /// Counts loads and fails until told otherwise
    struct CountingSource {
        loads: AtomicUsize,
        fail: AtomicBool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self {
                loads: AtomicUsize::new(0),
                fail: AtomicBool::new(fail),
            }
        }
    }

    #[async_trait]
    impl AllowlistSource for CountingSource {
        async fn load(&self, _bucket: &str, _path: &str) -> Result<Allowlist, AllowlistError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(AllowlistError::SourceUnavailable("offline".into()))
            } else {
                Ok(Allowlist::from_hex([HASH_HEX]))
            }
        }
    }

    fn config_with_bucket() -> AuthorityConfig {
        AuthorityConfig {
            bucket: Some("bucket".into()),
            ..AuthorityConfig::default()
        }
    }

    #[tokio::test]
    async fn test_loader_reads_allowlist() {
        let loader = AllowlistLoader::new(store_with(&format!("- {}\n", HASH_HEX)));
        let list = loader.load("bucket", PATH).await.unwrap();
        assert!(list.contains_hex(HASH_HEX));
        assert_eq!(list.len(), 1);
    }

    #[tokio::test]
    async fn test_loader_is_idempotent() {
        let loader = AllowlistLoader::new(store_with(&format!("- {}\n- deadbeef\n", HASH_HEX)));
        let first = loader.load("bucket", PATH).await.unwrap();
        let second = loader.load("bucket", PATH).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_loader_missing_object() {
        let loader = AllowlistLoader::new(store_with(""));
        let err = loader.load("bucket", "elsewhere.yaml").await.unwrap_err();
        assert!(matches!(err, AllowlistError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_loader_garbage_is_parse_failure() {
        let loader = AllowlistLoader::new(store_with("key: {value\n"));
        let err = loader.load("bucket", PATH).await.unwrap_err();
        assert!(matches!(err, AllowlistError::ParseFailure(_)));
    }

    /// Serves a partial allowlist, then the connection drops
    #[derive(Debug)]
    struct TruncatingStore;

    struct DroppedConnection;

    impl tokio::io::AsyncRead for DroppedConnection {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )))
        }
    }

    #[async_trait]
    impl ObjectStore for TruncatingStore {
        async fn open(
            &self,
            _bucket: &str,
            _object: &str,
        ) -> Result<crate::storage::ObjectReader, crate::storage::StorageError> {
            let head = std::io::Cursor::new(format!("- {}\n- 5f2b", HASH_HEX).into_bytes());
            Ok(Box::pin(head.chain(DroppedConnection)))
        }
    }

    #[tokio::test]
    async fn test_loader_interrupted_read_is_read_failure() {
        let loader = AllowlistLoader::new(Arc::new(TruncatingStore));
        let err = loader.load("bucket", PATH).await.unwrap_err();
        assert!(matches!(err, AllowlistError::ReadFailure(_)));
    }

    #[tokio::test]
    async fn test_empty_allowlist_is_valid() {
        let loader = AllowlistLoader::new(store_with(""));
        let list = loader.load("bucket", PATH).await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_loads() {
        let inner = Arc::new(CountingSource::new(false));
        let cached = CachedAllowlist::new(inner.clone(), Duration::from_secs(60));

        for _ in 0..3 {
            assert!(cached.load("bucket", PATH).await.unwrap().contains_hex(HASH_HEX));
        }
        assert_eq!(inner.loads.load(Ordering::SeqCst), 1);

        cached.invalidate_all();
        cached.load("bucket", PATH).await.unwrap();
        assert_eq!(inner.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_never_stores_failures() {
        let inner = Arc::new(CountingSource::new(true));
        let cached = CachedAllowlist::new(inner.clone(), Duration::from_secs(60));

        assert!(cached.load("bucket", PATH).await.is_err());
        assert!(cached.load("bucket", PATH).await.is_err());
        assert_eq!(inner.loads.load(Ordering::SeqCst), 2);

        inner.fail.store(false, Ordering::SeqCst);
        assert!(cached.load("bucket", PATH).await.is_ok());
    }

    #[tokio::test]
    async fn test_cache_entries_expire() {
        let inner = Arc::new(CountingSource::new(false));
        let cached = CachedAllowlist::new(inner.clone(), Duration::from_millis(50));

        cached.load("bucket", PATH).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        cached.load("bucket", PATH).await.unwrap();

        assert_eq!(inner.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gate_enforced_rejects_unlisted_hash() {
        let source = CountingSource::new(false);
        let err = check_content_hash(&source, &config_with_bucket(), &[0xde, 0xad, 0xbe, 0xef], true, "seed")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthorityError::Rejected(SeedError::HashNotAllowed(ref h)) if h == "deadbeef"
        ));
    }

    #[tokio::test]
    async fn test_gate_unenforced_tolerates_everything() {
        let offline = CountingSource::new(true);
        assert!(check_content_hash(&offline, &config_with_bucket(), &[1, 2], false, "seed")
            .await
            .is_ok());
        assert!(check_content_hash(&offline, &AuthorityConfig::default(), &[1, 2], false, "seed")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_gate_enforced_surfaces_config_and_source_errors() {
        let offline = CountingSource::new(true);
        assert!(matches!(
            check_content_hash(&offline, &AuthorityConfig::default(), &[1], true, "sign").await,
            Err(AuthorityError::Config(_))
        ));
        assert!(matches!(
            check_content_hash(&offline, &config_with_bucket(), &[1], true, "sign").await,
            Err(AuthorityError::Allowlist(AllowlistError::SourceUnavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_gate_accepts_listed_hash() {
        let source = CountingSource::new(false);
        let digest = hex::decode(HASH_HEX).unwrap();
        assert!(check_content_hash(&source, &config_with_bucket(), &digest, true, "seed")
            .await
            .is_ok());
    }
}

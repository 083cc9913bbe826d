//! Seed Client - obtains a seed for a file and writes it to the medium

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use seedgate_core::{
    SeedRequest, SeedResponse, SignedSeed, HASH_NOT_ALLOWED_MARKER, REQUESTOR_HEADER,
    SEED_FILE_NAME,
};

use crate::error::{ClientError, Result};
use crate::server::SeedServer;
use crate::user::{SystemUser, UserSource};

const READ_CHUNK: usize = 64 * 1024;

/// Credential presented to the proxy that authenticates seed requests
#[derive(Clone)]
pub enum Credential {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// An arbitrary header, for proxies that take credentials elsewhere
    Header { name: String, value: String },
}

impl Credential {
    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Credential::Bearer(token) => request.bearer_auth(token),
            Credential::Header { name, value } => request.header(name.as_str(), value.as_str()),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Credential::Header { name, .. } => write!(f, "Header({}: <redacted>)", name),
        }
    }
}

/// Seed client configuration
#[derive(Debug, Clone)]
pub struct SeedClientConfig {
    /// Overall deadline for the seed request
    pub request_timeout: Duration,
    /// Credential for the authenticating proxy; the authority takes the
    /// requestor identity only from what that proxy asserts
    pub credential: Option<Credential>,
}

impl Default for SeedClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            credential: None,
        }
    }
}

/// Requests seeds from a seed server and persists them.
///
/// One round trip per call and no retries; callers decide whether to retry
/// the whole operation.
pub struct SeedClient {
    http: reqwest::Client,
    credential: Option<Credential>,
    users: Arc<dyn UserSource>,
}

impl SeedClient {
    /// Create a client that resolves the username from the environment
    pub fn new(config: SeedClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            credential: config.credential,
            users: Arc::new(SystemUser),
        })
    }

    /// Replace the username source
    pub fn with_user_source(mut self, users: Arc<dyn UserSource>) -> Self {
        self.users = users;
        self
    }

    /// Hash `file`, obtain a seed for it and write `seed.json` into `dest_dir`.
    ///
    /// Returns the path of the written file.
    pub async fn obtain_and_persist_seed(
        &self,
        file: &Path,
        server: &SeedServer,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let digest = hash_file(file).await?;
        let username = self.users.username()?;

        debug!(
            file = %file.display(),
            hash = %hex::encode(&digest),
            "Hashed file for seed request"
        );

        let signed = self.request_seed(server, &username, digest).await?;
        let path = persist_seed(&signed, dest_dir)?;

        info!(
            path = %path.display(),
            identity = %signed.seed.identity(),
            "Seed persisted"
        );
        Ok(path)
    }

    /// Submit one seed request and decode the answer
    pub async fn request_seed(
        &self,
        server: &SeedServer,
        username: &str,
        digest: Vec<u8>,
    ) -> Result<SignedSeed> {
        let hash_hex = hex::encode(&digest);
        let response = self
            .build_request(server, username, digest)
            .send()
            .await
            .inspect_err(|e| warn!(server = %server, error = %e, "Seed request failed"))?;

        let status = response.status();
        let body = response.bytes().await?;

        if String::from_utf8_lossy(&body).contains(HASH_NOT_ALLOWED_MARKER) {
            warn!(server = %server, hash = %hash_hex, "Seed server rejected hash");
            return Err(ClientError::HashNotAllowed(hash_hex));
        }

        let decoded: SeedResponse = serde_json::from_slice(&body).map_err(|e| {
            warn!(server = %server, http_status = %status, error = %e, "Undecodable seed response");
            ClientError::Decode(e.to_string())
        })?;

        if !decoded.error_code.is_success() {
            warn!(
                server = %server,
                code = %decoded.error_code,
                status = %decoded.status,
                "Seed server returned an error"
            );
            return Err(ClientError::SeedRejected {
                status: decoded.status,
                code: decoded.error_code,
            });
        }

        decoded
            .into_signed_seed()
            .ok_or_else(|| ClientError::Decode("response carries no seed".into()))
    }

    fn build_request(
        &self,
        server: &SeedServer,
        username: &str,
        digest: Vec<u8>,
    ) -> reqwest::RequestBuilder {
        // The requestor header is informational; identity comes from the credential
        let request = self
            .http
            .post(server.url().clone())
            .header(REQUESTOR_HEADER, username)
            .json(&SeedRequest { hash: digest });

        match &self.credential {
            Some(credential) => credential.apply(request),
            None => request,
        }
    }
}

/// SHA-256 over the full contents of `path`
pub async fn hash_file(path: &Path) -> Result<Vec<u8>> {
    let unreadable = |e: std::io::Error| ClientError::FileUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut file = tokio::fs::File::open(path).await.map_err(unreadable)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_CHUNK];
    loop {
        let read = file.read(&mut buffer).await.map_err(unreadable)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hasher.finalize().to_vec())
}

/// Write `signed` as `seed.json` inside `dest_dir`.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// partially written seed is never observed.
pub fn persist_seed(signed: &SignedSeed, dest_dir: &Path) -> Result<PathBuf> {
    let target = dest_dir.join(SEED_FILE_NAME);
    let failed = |path: &Path, reason: String| ClientError::PersistFailure {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = signed
        .to_file_bytes()
        .map_err(|e| failed(&target, e.to_string()))?;

    create_dirs(dest_dir).map_err(|e| failed(dest_dir, e.to_string()))?;

    let mut tmp = NamedTempFile::new_in(dest_dir).map_err(|e| failed(dest_dir, e.to_string()))?;
    tmp.write_all(&bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| failed(tmp.path(), e.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o644))
            .map_err(|e| failed(tmp.path(), e.to_string()))?;
    }

    tmp.persist(&target)
        .map_err(|e| failed(&target, e.error.to_string()))?;
    Ok(target)
}

fn create_dirs(dir: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir)
}

/// Directory on a mounted medium where the seed is written
pub fn seed_directory(mount_root: &str, relative: impl AsRef<Path>) -> PathBuf {
    PathBuf::from(qualify_mount_root(mount_root, cfg!(windows))).join(relative)
}

/// Windows drive letters come without a colon from some volume listings
pub fn qualify_mount_root(root: &str, windows: bool) -> String {
    if windows && !root.contains(':') {
        format!("{}:", root)
    } else {
        root.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn signed_seed() -> SignedSeed {
        serde_json::from_value(serde_json::json!({
            "Seed": {
                "Username": "alice",
                "Issued": "2024-03-01T12:00:00Z",
                "Hash": null,
                "Certs": []
            },
            "Signature": "c2lnbmF0dXJl"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_hash_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("installer.img");
        fs::write(&path, b"abc").unwrap();

        let digest = hash_file(&path).await.unwrap();
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_hash_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = hash_file(&dir.path().join("absent.img")).await;
        assert!(matches!(result, Err(ClientError::FileUnreadable { .. })));
    }

    #[test]
    fn test_persist_creates_directories() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("seeds").join("nested");

        let path = persist_seed(&signed_seed(), &dest).unwrap();
        assert_eq!(path, dest.join("seed.json"));

        let written = fs::read(&path).unwrap();
        assert_eq!(SignedSeed::from_file_bytes(&written).unwrap(), signed_seed());

        let text = String::from_utf8(written).unwrap();
        assert!(!text.contains("ErrorCode"));
        assert!(text.contains('\n'));

        let leftovers = fs::read_dir(&dest).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_persisted_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = persist_seed(&signed_seed(), dir.path()).unwrap();
        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_persist_overwrites_existing_seed() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("seed.json"), b"stale").unwrap();

        let path = persist_seed(&signed_seed(), dir.path()).unwrap();
        let written = fs::read(path).unwrap();
        assert_eq!(SignedSeed::from_file_bytes(&written).unwrap(), signed_seed());
    }

    #[test]
    fn test_persist_into_a_file_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();

        let result = persist_seed(&signed_seed(), &blocker.join("seeds"));
        assert!(matches!(result, Err(ClientError::PersistFailure { .. })));
    }

    fn built_headers(credential: Option<Credential>) -> reqwest::header::HeaderMap {
        let client = SeedClient::new(SeedClientConfig {
            credential,
            ..SeedClientConfig::default()
        })
        .unwrap();
        let server = SeedServer::parse("https://seeds.example.com/seed").unwrap();

        client
            .build_request(&server, "alice", vec![0xab])
            .build()
            .unwrap()
            .headers()
            .clone()
    }

    #[test]
    fn test_bearer_credential_sent() {
        let headers = built_headers(Some(Credential::Bearer("tok123".into())));
        assert_eq!(headers["authorization"], "Bearer tok123");
        assert_eq!(headers[REQUESTOR_HEADER], "alice");
    }

    #[test]
    fn test_header_credential_sent() {
        let headers = built_headers(Some(Credential::Header {
            name: "x-proxy-assertion".into(),
            value: "signed-assertion".into(),
        }));
        assert_eq!(headers["x-proxy-assertion"], "signed-assertion");
    }

    #[test]
    fn test_no_credential_sends_no_authorization() {
        let headers = built_headers(None);
        assert!(headers.get("authorization").is_none());
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let shown = format!("{:?}", Credential::Bearer("tok123".into()));
        assert!(!shown.contains("tok123"));
    }

    #[test]
    fn test_mount_root_qualification() {
        assert_eq!(qualify_mount_root("E", true), "E:");
        assert_eq!(qualify_mount_root("E:", true), "E:");
        assert_eq!(qualify_mount_root("/media/usb", false), "/media/usb");
    }
}

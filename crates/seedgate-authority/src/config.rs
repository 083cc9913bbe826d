//! Environment-driven configuration for the authority
//!
//! Settings that the original hosting platform read per request (bucket,
//! durations) stay optional here and are validated when a request needs
//! them, so a missing value fails that request with a configuration error
//! instead of preventing the service from starting.

use seedgate_core::REQUESTOR_HEADER;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default object path of the allowlist inside the bucket
pub const DEFAULT_ALLOWLIST_PATH: &str = "seedgate_config/allowlist.yaml";

/// Header carrying the principal authenticated by the fronting proxy
pub const DEFAULT_IDENTITY_HEADER: &str = "x-goog-authenticated-user-email";

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("{name} was '{value}', which is not valid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Independent enforcement toggles.
///
/// Each toggle is on only when its variable is exactly `"true"`. Failures
/// of a disabled check are still logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnforcementPolicy {
    /// `VERIFY_SEED_HASH`: reject seed requests for unlisted hashes
    pub seed_hash: bool,
    /// `VERIFY_SIGN_HASH`: reject sign requests for unlisted hashes
    pub sign_hash: bool,
    /// `VERIFY_SEED`: check seed identity and validity window
    pub seed: bool,
    /// `VERIFY_SEED_SIGNATURE`: verify the seed signature
    pub seed_signature: bool,
    /// `VERIFY_SEED_SIGNATURE_FALLBACK`: also try certificates embedded in the seed
    pub certificate_fallback: bool,
}

impl EnforcementPolicy {
    /// Every check enforced
    pub fn strict() -> Self {
        Self {
            seed_hash: true,
            sign_hash: true,
            seed: true,
            seed_signature: true,
            certificate_fallback: true,
        }
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str| lookup(name).as_deref() == Some("true");
        Self {
            seed_hash: flag("VERIFY_SEED_HASH"),
            sign_hash: flag("VERIFY_SIGN_HASH"),
            seed: flag("VERIFY_SEED"),
            seed_signature: flag("VERIFY_SEED_SIGNATURE"),
            certificate_fallback: flag("VERIFY_SEED_SIGNATURE_FALLBACK"),
        }
    }
}

/// Request-path configuration shared by all handlers
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    /// Bucket holding the allowlist and the signed resources
    pub bucket: Option<String>,
    /// Object path of the allowlist within the bucket
    pub allowlist_path: String,
    /// Raw `SIGNED_URL_DURATION`
    pub signed_url_duration: Option<String>,
    /// Raw `SEED_VALIDITY_DURATION`
    pub seed_validity_duration: Option<String>,
    /// Header carrying the authenticated requestor
    pub identity_header: String,
    /// Enforcement toggles
    pub policy: EnforcementPolicy,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            allowlist_path: DEFAULT_ALLOWLIST_PATH.into(),
            signed_url_duration: None,
            seed_validity_duration: None,
            identity_header: DEFAULT_IDENTITY_HEADER.into(),
            policy: EnforcementPolicy::default(),
        }
    }
}

impl AuthorityConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read configuration through an arbitrary lookup function.
    ///
    /// The identity header must be one the fronting proxy sets after
    /// authenticating the caller. The client's self-reported requestor
    /// header is refused.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let identity_header = non_empty("SEEDGATE_IDENTITY_HEADER")
            .map(|h| h.trim().to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_IDENTITY_HEADER.into());
        if identity_header == REQUESTOR_HEADER {
            return Err(ConfigError::Invalid {
                name: "SEEDGATE_IDENTITY_HEADER",
                value: identity_header,
                reason: "the requestor header is asserted by the caller, not authenticated".into(),
            });
        }

        Ok(Self {
            bucket: non_empty("BUCKET"),
            allowlist_path: non_empty("ALLOWLIST_PATH")
                .unwrap_or_else(|| DEFAULT_ALLOWLIST_PATH.into()),
            signed_url_duration: non_empty("SIGNED_URL_DURATION"),
            seed_validity_duration: non_empty("SEED_VALIDITY_DURATION"),
            identity_header,
            policy: EnforcementPolicy::from_lookup(&lookup),
        })
    }

    pub fn bucket(&self) -> Result<&str, ConfigError> {
        self.bucket.as_deref().ok_or(ConfigError::Missing("BUCKET"))
    }

    pub fn signed_url_duration(&self) -> Result<chrono::Duration, ConfigError> {
        parse_setting("SIGNED_URL_DURATION", self.signed_url_duration.as_deref())
    }

    pub fn seed_validity(&self) -> Result<chrono::Duration, ConfigError> {
        parse_setting("SEED_VALIDITY_DURATION", self.seed_validity_duration.as_deref())
    }
}

fn parse_setting(
    name: &'static str,
    value: Option<&str>,
) -> Result<chrono::Duration, ConfigError> {
    let value = value.ok_or(ConfigError::Missing(name))?;
    parse_duration(name, value)
}

/// Parse a humantime duration (`15m`, `720h`, `1h 30m`) into a chrono duration
pub fn parse_duration(name: &'static str, value: &str) -> Result<chrono::Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason,
    };
    let std = humantime::parse_duration(value).map_err(|e| invalid(e.to_string()))?;
    chrono::Duration::from_std(std).map_err(|e| invalid(e.to_string()))
}

/// Process-level settings used to wire the binary together
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub port: u16,
    pub log_level: String,
    pub signing_key_path: PathBuf,
    pub certificate_path: PathBuf,
    pub key_name: String,
    pub service_account: Option<String>,
    pub object_root: PathBuf,
    pub signed_url_base: String,
    pub allowlist_cache_ttl: Option<Duration>,
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let port = match non_empty("SEEDGATE_PORT") {
            Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: "SEEDGATE_PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        let allowlist_cache_ttl = non_empty("ALLOWLIST_CACHE_TTL")
            .map(|raw| {
                humantime::parse_duration(&raw).map_err(|e| ConfigError::Invalid {
                    name: "ALLOWLIST_CACHE_TTL",
                    value: raw.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            port,
            log_level: non_empty("SEEDGATE_LOG_LEVEL").unwrap_or_else(|| "info".into()),
            signing_key_path: non_empty("SEEDGATE_SIGNING_KEY_PATH")
                .map(PathBuf::from)
                .ok_or(ConfigError::Missing("SEEDGATE_SIGNING_KEY_PATH"))?,
            certificate_path: non_empty("SEEDGATE_CERTIFICATE_PATH")
                .map(PathBuf::from)
                .ok_or(ConfigError::Missing("SEEDGATE_CERTIFICATE_PATH"))?,
            key_name: non_empty("SEEDGATE_KEY_NAME").unwrap_or_else(|| "seedgate-signing-key".into()),
            service_account: non_empty("SEEDGATE_SERVICE_ACCOUNT"),
            object_root: non_empty("SEEDGATE_OBJECT_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("objects")),
            signed_url_base: non_empty("SEEDGATE_SIGNED_URL_BASE")
                .unwrap_or_else(|| "https://storage.googleapis.com/".into()),
            allowlist_cache_ttl,
        })
    }
}

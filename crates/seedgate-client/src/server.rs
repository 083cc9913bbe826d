//! Seed server address normalisation

use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{ClientError, Result};

/// Absolute HTTP(S) URL of the seed endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedServer(Url);

impl SeedServer {
    /// Parse a seed server address.
    ///
    /// Addresses without a scheme are assumed to be HTTPS.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClientError::InvalidServer("address is empty".into()));
        }

        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let url = Url::parse(&candidate)
            .map_err(|e| ClientError::InvalidServer(format!("{}: {}", raw, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidServer(format!(
                "{}: unsupported scheme {}",
                raw,
                url.scheme()
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(ClientError::InvalidServer(format!("{}: missing host", raw)));
        }

        Ok(Self(url))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl FromStr for SeedServer {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SeedServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

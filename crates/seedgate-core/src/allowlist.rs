//! Allowlist of permitted content hashes
//!
//! The authoritative list lives in external storage as a YAML-style list of
//! hex digests, one per line:
//!
//! ```text
//! # release images
//! - 314aaa98adcbd86339fb4eece6050b8ae2d38ff8ebb416e231bb7724c99b830d
//! - "5f2b..."
//! ```
//!
//! The list marker and quotes are optional. Membership is the only
//! predicate; entries carry no metadata.

use std::collections::HashSet;

use crate::error::{Result, SeedError};

/// An immutable snapshot of accepted content hashes (lowercase hex)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    hashes: HashSet<String>,
}

impl Allowlist {
    /// Parse an allowlist payload
    ///
    /// Returns an empty allowlist for an empty payload.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|e| SeedError::AllowlistParse(format!("payload is not UTF-8: {}", e)))?;

        let mut hashes = HashSet::new();
        for (index, line) in text.lines().enumerate() {
            if let Some(entry) = parse_line(line).map_err(|reason| {
                SeedError::AllowlistParse(format!("line {}: {}", index + 1, reason))
            })? {
                hashes.insert(entry);
            }
        }

        Ok(Self { hashes })
    }

    /// Build an allowlist from already-known hex digests
    pub fn from_hex<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hashes: entries
                .into_iter()
                .map(|e| e.as_ref().trim().to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Check whether raw digest bytes are allowed
    pub fn contains_digest(&self, digest: &[u8]) -> bool {
        self.hashes.contains(&hex::encode(digest))
    }

    /// Check whether a hex digest is allowed (case-insensitive)
    pub fn contains_hex(&self, hex_digest: &str) -> bool {
        self.hashes.contains(&hex_digest.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hashes.iter().map(String::as_str)
    }
}

/// Parse one line into a lowercase digest. Blank and comment lines yield `None`.
fn parse_line(line: &str) -> std::result::Result<Option<String>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line == "---" {
        return Ok(None);
    }

    let entry = line.strip_prefix('-').unwrap_or(line).trim();
    let entry = strip_quotes(entry);

    if entry.is_empty() {
        return Err("empty list entry".into());
    }
    if !entry.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("entry '{}' is not a hex digest", entry));
    }

    Ok(Some(entry.to_ascii_lowercase()))
}

fn strip_quotes(entry: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = entry
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    entry
}

//! Username resolution
//!
//! Provisioning usually runs elevated, where the login name is a generic
//! superuser. The invoking user is recovered from `SUDO_USER` in that case.

use std::env;

use crate::error::{ClientError, Result};

const SUPERUSER: &str = "root";

/// Source of the effective username of the caller
pub trait UserSource: Send + Sync {
    fn username(&self) -> Result<String>;
}

/// Resolves the username from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemUser;

impl SystemUser {
    /// Resolve through an arbitrary variable lookup
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
        let login = lookup("USER")
            .filter(|u| !u.is_empty())
            .or_else(|| lookup("USERNAME"))
            .unwrap_or_default();

        let username = if login == SUPERUSER {
            lookup("SUDO_USER").unwrap_or_default()
        } else {
            login
        };

        if username.is_empty() {
            return Err(ClientError::IdentityUnavailable(
                "no username in USER, USERNAME or SUDO_USER".into(),
            ));
        }
        Ok(username)
    }
}

impl UserSource for SystemUser {
    fn username(&self) -> Result<String> {
        Self::resolve(|name| env::var(name).ok())
    }
}

/// A fixed username
#[derive(Debug, Clone)]
pub struct StaticUser(pub String);

impl UserSource for StaticUser {
    fn username(&self) -> Result<String> {
        if self.0.is_empty() {
            return Err(ClientError::IdentityUnavailable("username is empty".into()));
        }
        Ok(self.0.clone())
    }
}

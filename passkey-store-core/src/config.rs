//! Store configuration
//!
//! Loaded from environment variables with sensible defaults:
//!
//! - `REDIS_URL`: remote backend endpoint; unset or empty selects the in-memory fallback
//! - `CHALLENGE_TTL_SECONDS`: challenge lifetime (default: 300)
//! - `BACKEND_TIMEOUT_SECS`: bound on a single backend command (default: 5)

use std::time::Duration;

use crate::backend::{redact_url, BackendConfig, DEFAULT_BACKEND_TIMEOUT};
use crate::challenge::DEFAULT_CHALLENGE_TTL;
use crate::error::{Result, StoreError};

#[derive(Clone)]
pub struct StoreConfig {
    /// Redis connection URL; `None` selects the in-memory backend
    pub redis_url: Option<String>,
    /// Challenge lifetime
    pub challenge_ttl: Duration,
    /// Timeout applied to each remote command
    pub backend_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            challenge_ttl: DEFAULT_CHALLENGE_TTL,
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let redis_url = std::env::var("REDIS_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        Self {
            redis_url,
            challenge_ttl: secs_from_env("CHALLENGE_TTL_SECONDS", DEFAULT_CHALLENGE_TTL),
            backend_timeout: secs_from_env("BACKEND_TIMEOUT_SECS", DEFAULT_BACKEND_TIMEOUT),
        }
    }

    /// Reject values the stores cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.challenge_ttl.as_secs() == 0 {
            return Err(StoreError::Config(
                "CHALLENGE_TTL_SECONDS must be at least 1".into(),
            ));
        }
        check_backend_timeout(self.backend_timeout)
    }

    /// Backend selection implied by this configuration
    pub fn backend(&self) -> BackendConfig {
        match &self.redis_url {
            Some(url) => BackendConfig::Redis {
                url: url.clone(),
                timeout: self.backend_timeout,
            },
            None => BackendConfig::Memory,
        }
    }
}

/// Whole seconds from `name`, or `default` when unset or unparseable
fn secs_from_env(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

fn check_backend_timeout(timeout: Duration) -> Result<()> {
    if timeout.is_zero() {
        return Err(StoreError::Config(
            "BACKEND_TIMEOUT_SECS must be at least 1".into(),
        ));
    }
    Ok(())
}

/// `BACKEND_TIMEOUT_SECS`, used when the backend is auto-selected.
pub(crate) fn backend_timeout_from_env() -> Result<Duration> {
    let timeout = secs_from_env("BACKEND_TIMEOUT_SECS", DEFAULT_BACKEND_TIMEOUT);
    check_backend_timeout(timeout)?;
    Ok(timeout)
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("redis_url", &self.redis_url.as_deref().map(redact_url))
            .field("challenge_ttl", &self.challenge_ttl)
            .field("backend_timeout", &self.backend_timeout)
            .finish()
    }
}

//! Command implementations.

pub mod challenge;
pub mod credentials;
pub mod health;

use anyhow::{Context, Result};
use passkey_store_core::{PasskeyStore, StoreConfig};
use tracing::debug;

/// Open storage from the environment (`REDIS_URL`, `CHALLENGE_TTL_SECONDS`, `BACKEND_TIMEOUT_SECS`).
pub async fn open_store() -> Result<PasskeyStore> {
    let config = StoreConfig::from_env();
    debug!(?config, "Loaded store configuration");

    PasskeyStore::from_config(&config)
        .await
        .context("Failed to open passkey storage")
}

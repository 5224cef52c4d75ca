//! Unified passkey storage combining challenge and credential stores
//!
//! Both stores share one backend handle, built once at startup and passed to
//! every request handler.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{BackendFactory, BackendKind, KeyValueBackend};
use crate::challenge::ChallengeStore;
use crate::config::StoreConfig;
use crate::credential::CredentialStore;
use crate::error::Result;

#[derive(Clone)]
pub struct PasskeyStore {
    backend: Arc<dyn KeyValueBackend>,
    challenges: ChallengeStore,
    credentials: CredentialStore,
}

impl PasskeyStore {
    /// Build storage on an existing backend
    pub fn with_backend(backend: Arc<dyn KeyValueBackend>, challenge_ttl: Duration) -> Result<Self> {
        Ok(Self {
            challenges: ChallengeStore::new(backend.clone(), challenge_ttl)?,
            credentials: CredentialStore::new(backend.clone()),
            backend,
        })
    }

    /// Build storage from configuration
    ///
    /// Uses Redis if a URL is configured, otherwise falls back to in-memory.
    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let backend = BackendFactory::create(config.backend()).await?;
        tracing::info!(backend = %backend.kind(), "Passkey storage ready");
        Self::with_backend(backend, config.challenge_ttl)
    }

    /// Create storage with in-memory backend (development only)
    pub fn in_memory(challenge_ttl: Duration) -> Result<Self> {
        Self::with_backend(BackendFactory::create_memory(), challenge_ttl)
    }

    pub fn challenges(&self) -> &ChallengeStore {
        &self.challenges
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Check if using persistent storage
    pub fn is_persistent(&self) -> bool {
        self.backend_kind().is_persistent()
    }

    /// Check backend health (always Ok for memory backend)
    pub async fn check_health(&self) -> Result<()> {
        self.backend.check_health().await
    }
}

impl std::fmt::Debug for PasskeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasskeyStore")
            .field("backend", &self.backend.kind())
            .field("challenge_ttl", &self.challenges.ttl())
            .finish()
    }
}

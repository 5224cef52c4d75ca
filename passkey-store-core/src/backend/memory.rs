//! In-process key-value backend.
//!
//! Used when no remote store is configured. Expiry is tracked per entry and
//! enforced on every read; [`MemoryBackend::cleanup_expired`] reclaims memory
//! for entries nobody reads again.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{validate_ttl, BackendKind, KeyValueBackend};
use crate::error::Result;

/// Stored value with optional deadline
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| deadline > now)
    }
}

/// Thread-safe in-memory backend
#[derive(Default)]
pub struct MemoryBackend {
    entries: DashMap<String, Entry>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove expired entries, returning how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Run [`cleanup_expired`](Self::cleanup_expired) every `period` on the current runtime.
    ///
    /// The task holds a weak handle and exits once the backend is dropped.
    pub fn spawn_cleanup(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let backend = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let Some(backend) = backend.upgrade() else {
                    break;
                };
                let removed = backend.cleanup_expired();
                if removed > 0 {
                    tracing::debug!(removed, "Purged expired in-memory entries");
                }
            }
        })
    }

    /// Number of entries currently held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Ok(Some(entry.value.clone()));
            }
        } else {
            return Ok(None);
        }

        // Lazy eviction; re-check so a concurrent fresh write is not dropped
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let secs = validate_ttl(key, ttl)?;
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + Duration::from_secs(secs)),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| entry.is_live(now)))
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(_, entry)| entry.value))
    }

    async fn check_health(&self) -> Result<()> {
        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "challenge:example.com:alice";

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let backend = MemoryBackend::new();
        backend
            .set_with_expiry(KEY, "abc", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(backend.get(KEY).await.unwrap().as_deref(), Some("abc"));

        tokio::time::advance(Duration::from_millis(1001)).await;
        assert_eq!(backend.get(KEY).await.unwrap(), None);
        // Expired entry was evicted on read
        assert!(backend.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_plain_set_never_expires() {
        let backend = MemoryBackend::new();
        backend.set(KEY, "durable").await.unwrap();
        tokio::time::advance(Duration::from_secs(86_400 * 365)).await;
        assert_eq!(backend.get(KEY).await.unwrap().as_deref(), Some("durable"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_resets_expiry() {
        let backend = MemoryBackend::new();
        backend
            .set_with_expiry(KEY, "a", Duration::from_secs(2))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        backend
            .set_with_expiry(KEY, "b", Duration::from_secs(2))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(backend.get(KEY).await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_delete_reports_removal() {
        let backend = MemoryBackend::new();
        backend.set(KEY, "x").await.unwrap();
        assert!(backend.delete(KEY).await.unwrap());
        assert!(!backend.delete(KEY).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_skips_expired_entries() {
        let backend = MemoryBackend::new();
        backend
            .set_with_expiry(KEY, "abc", Duration::from_secs(1))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(backend.take(KEY).await.unwrap(), None);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_zero_ttl() {
        let backend = MemoryBackend::new();
        assert!(backend
            .set_with_expiry(KEY, "abc", Duration::ZERO)
            .await
            .is_err());
        assert_eq!(backend.get(KEY).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_expired() {
        let backend = MemoryBackend::new();
        backend
            .set_with_expiry("challenge:a:1", "x", Duration::from_secs(1))
            .await
            .unwrap();
        backend
            .set_with_expiry("challenge:a:2", "y", Duration::from_secs(10))
            .await
            .unwrap();
        backend.set("user:a:1", "{}").await.unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(backend.cleanup_expired(), 1);
        assert_eq!(backend.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_cleanup_purges_in_background() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .set_with_expiry(KEY, "abc", Duration::from_secs(1))
            .await
            .unwrap();

        let handle = backend.spawn_cleanup(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(backend.is_empty());
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_stops_when_backend_dropped() {
        let backend = Arc::new(MemoryBackend::new());
        let handle = backend.spawn_cleanup(Duration::from_secs(60));
        drop(backend);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(handle.is_finished());
    }
}

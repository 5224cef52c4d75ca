//! Redis key-value backend.
//!
//! Commands go through a multiplexed [`ConnectionManager`], which reconnects
//! on its own after a dropped connection. Each command is bounded by the
//! configured timeout and is never retried here.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};

use super::{redact_url, validate_ttl, BackendKind, KeyValueBackend};
use crate::error::{Result, StoreError};

/// Redis-backed key-value store
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisBackend {
    /// Open a connection to `url` (`redis://` or `rediss://`).
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            StoreError::Config(format!("invalid REDIS_URL {}: {e}", redact_url(url)))
        })?;

        let conn = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::backend("connect", "-", "timed out"))?
            .map_err(|e| StoreError::backend("connect", "-", e))?;

        tracing::info!(url = %redact_url(url), "Connected to Redis");
        Ok(Self { conn, timeout })
    }

    /// Run one command with the configured timeout, tagging failures with op and key.
    async fn run<T, F>(&self, op: &'static str, key: &str, fut: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::error!(op, key = %key, error = %e, "Redis command failed");
                Err(StoreError::backend(op, key, e))
            }
            Err(_) => {
                tracing::error!(op, key = %key, timeout = ?self.timeout, "Redis command timed out");
                Err(StoreError::backend(
                    op,
                    key,
                    format!("timed out after {:?}", self.timeout),
                ))
            }
        }
    }
}

#[async_trait]
impl KeyValueBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let raw = self
            .run("get", key, conn.get::<_, Option<Vec<u8>>>(key))
            .await?;
        into_text(key, raw)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        self.run("set", key, conn.set::<_, _, ()>(key, value)).await
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let secs = validate_ttl(key, ttl)?;
        let mut conn = self.conn.clone();
        self.run("set_ex", key, conn.set_ex::<_, _, ()>(key, value, secs))
            .await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = self.run("del", key, conn.del(key)).await?;
        Ok(removed > 0)
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let raw = self
            .run("getdel", key, conn.get_del::<_, Option<Vec<u8>>>(key))
            .await?;
        into_text(key, raw)
    }

    async fn check_health(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = self
            .run("ping", "-", redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Redis
    }
}

/// Values are written as UTF-8 text; bytes that are not are unreadable data,
/// not a backend fault.
fn into_text(key: &str, raw: Option<Vec<u8>>) -> Result<Option<String>> {
    raw.map(|bytes| String::from_utf8(bytes).map_err(|e| StoreError::decode(key, e)))
        .transpose()
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("conn", &"<ConnectionManager>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let err = RedisBackend::connect("definitely not a url", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[tokio::test]
    async fn test_connect_failure_is_backend_error() {
        // Port 1 is never a Redis server
        let err = RedisBackend::connect("redis://127.0.0.1:1", Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(err.is_backend());
    }

    #[test]
    fn test_non_utf8_value_is_decode_error() {
        let err = into_text("user:example.com:alice", Some(vec![0xff, 0xfe, 0x00]))
            .unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }), "got {err:?}");
        assert!(!err.is_backend());
    }

    #[test]
    fn test_text_values_pass_through() {
        assert_eq!(
            into_text("k", Some(b"abc".to_vec())).unwrap().as_deref(),
            Some("abc")
        );
        assert_eq!(into_text("k", None).unwrap(), None);
    }
}

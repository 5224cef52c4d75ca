//! Anti-replay challenge storage.
//!
//! One live challenge exists per (identifier, relying party). Issuing again
//! replaces it. The challenge value itself is generated by the ceremony
//! layer; this store only holds it for the configured TTL.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::backend::{validate_ttl, KeyValueBackend};
use crate::error::Result;
use crate::keys::challenge_key;

/// Default challenge lifetime (5 minutes)
pub const DEFAULT_CHALLENGE_TTL: Duration = Duration::from_secs(300);

/// TTL-bounded mapping from (identifier, relying party) to challenge value
#[derive(Clone)]
pub struct ChallengeStore {
    backend: Arc<dyn KeyValueBackend>,
    ttl: Duration,
}

impl ChallengeStore {
    /// Create a challenge store. `ttl` must be a whole number of seconds, at least one.
    pub fn new(backend: Arc<dyn KeyValueBackend>, ttl: Duration) -> Result<Self> {
        validate_ttl("challenge ttl", ttl)?;
        Ok(Self { backend, ttl })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store `challenge` for the user, replacing any live one.
    pub async fn issue(&self, identifier: &str, rp_id: &str, challenge: &str) -> Result<()> {
        let key = challenge_key(rp_id, identifier)?;
        self.backend
            .set_with_expiry(&key, challenge, self.ttl)
            .await?;
        debug!(key = %key, ttl_secs = self.ttl.as_secs(), "Challenge issued");
        Ok(())
    }

    /// Current challenge, `None` when never issued or expired.
    pub async fn get(&self, identifier: &str, rp_id: &str) -> Result<Option<String>> {
        let key = challenge_key(rp_id, identifier)?;
        let challenge = self.backend.get(&key).await?;
        if challenge.is_none() {
            warn!(key = %key, "Challenge not found; the ceremony will fail");
        }
        Ok(challenge)
    }

    /// Remove the challenge. Removing a missing challenge succeeds.
    pub async fn delete(&self, identifier: &str, rp_id: &str) -> Result<()> {
        let key = challenge_key(rp_id, identifier)?;
        let removed = self.backend.delete(&key).await?;
        debug!(key = %key, removed, "Challenge deleted");
        Ok(())
    }

    /// Read and remove the challenge in one backend operation.
    ///
    /// Unlike `get` followed by `delete`, a second caller racing on the same
    /// key can never observe the value.
    pub async fn consume(&self, identifier: &str, rp_id: &str) -> Result<Option<String>> {
        let key = challenge_key(rp_id, identifier)?;
        let challenge = self.backend.take(&key).await?;
        match &challenge {
            Some(_) => debug!(key = %key, "Challenge consumed"),
            None => warn!(key = %key, "Challenge not found; the ceremony will fail"),
        }
        Ok(challenge)
    }
}

impl std::fmt::Debug for ChallengeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeStore")
            .field("backend", &self.backend.kind())
            .field("ttl", &self.ttl)
            .finish()
    }
}

//! Passkey Store Core - persistence for WebAuthn/passkey ceremonies
//!
//! This crate stores the state a passkey ceremony needs between requests.
//! It does not verify signatures or decide trust; the ceremony layer does.
//!
//! # Features
//!
//! - Single-use anti-replay challenges with TTL, one per (user, relying party)
//! - Durable per-user credential records (public key, signature counter, transports)
//! - Redis backend, or an in-process fallback when no `REDIS_URL` is configured
//! - Lossless base64 round trip of binary public keys
//!
//! # Example
//!
//! ```no_run
//! use passkey_store_core::{CredentialRecord, PasskeyStore, StoreConfig};
//!
//! # async fn example() -> passkey_store_core::Result<()> {
//! let store = PasskeyStore::from_config(&StoreConfig::from_env()).await?;
//!
//! // Registration start: remember the challenge handed to the browser
//! store.challenges().issue("alice", "example.com", "Zm9vYmFy").await?;
//!
//! // Registration finish: spend the challenge, then persist the new passkey
//! let challenge = store.challenges().consume("alice", "example.com").await?;
//! assert!(challenge.is_some());
//!
//! let mut user = store.credentials().load("example.com", "alice").await?;
//! user.upsert(CredentialRecord {
//!     id: "credential-id".into(),
//!     public_key: vec![0xa5, 0x01, 0x02],
//!     counter: 0,
//!     transports: Some(vec!["internal".into()]),
//! });
//! store.credentials().save("example.com", "alice", &user).await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod challenge;
pub mod codec;
pub mod config;
pub mod credential;
pub mod error;
pub mod keys;
pub mod store;

// Re-export main types for convenience
pub use backend::{BackendConfig, BackendFactory, BackendKind, KeyValueBackend, MemoryBackend};
#[cfg(feature = "redis")]
pub use backend::RedisBackend;
pub use challenge::{ChallengeStore, DEFAULT_CHALLENGE_TTL};
pub use codec::{decode_public_key, encode_public_key};
pub use config::StoreConfig;
pub use credential::{CredentialRecord, CredentialStore, UserCredentials};
pub use error::{CodecError, Result, StoreError};
pub use store::PasskeyStore;

#[cfg(test)]
mod tests {
    use super::*;

    /// Integration test: registration then authentication against one store.
    #[tokio::test]
    async fn test_full_ceremony_workflow() {
        let store = PasskeyStore::in_memory(DEFAULT_CHALLENGE_TTL).unwrap();
        let (rp, user) = ("example.com", "alice");

        // Step 1: registration
        store.challenges().issue(user, rp, "reg-challenge").await.unwrap();
        let challenge = store.challenges().consume(user, rp).await.unwrap();
        assert_eq!(challenge.as_deref(), Some("reg-challenge"));

        let mut creds = store.credentials().load(rp, user).await.unwrap();
        assert!(creds.is_empty(), "First registration starts with no credentials");
        creds.upsert(CredentialRecord {
            id: "cred-1".into(),
            public_key: (0..=255u8).collect(),
            counter: 0,
            transports: Some(vec!["usb".into(), "nfc".into()]),
        });
        store.credentials().save(rp, user, &creds).await.unwrap();

        // Step 2: authentication bumps the counter
        store.challenges().issue(user, rp, "auth-challenge").await.unwrap();
        assert_eq!(
            store.challenges().get(user, rp).await.unwrap().as_deref(),
            Some("auth-challenge")
        );
        store.challenges().delete(user, rp).await.unwrap();

        let mut creds = store.credentials().load(rp, user).await.unwrap();
        assert!(creds.update_counter("cred-1", 1));
        store.credentials().save(rp, user, &creds).await.unwrap();

        // Step 3: state is as expected
        let reloaded = store.credentials().load(rp, user).await.unwrap();
        let cred = reloaded.find("cred-1").expect("credential persisted");
        assert_eq!(cred.counter, 1);
        assert_eq!(cred.public_key.len(), 256);
        assert_eq!(store.challenges().get(user, rp).await.unwrap(), None);
    }
}

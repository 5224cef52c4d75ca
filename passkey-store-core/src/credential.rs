//! Durable passkey credential storage.
//!
//! All credentials of one user at one relying party live in a single JSON
//! record at `user:{rp_id}:{identifier}`:
//!
//! ```json
//! {"credentials":[{"id":"...","publicKey":"<base64>","counter":0,"transports":["internal"]}]}
//! ```
//!
//! Records are replaced wholesale on every save. Callers load, mutate and
//! save the full set; there is no version check, so two concurrent saves
//! for the same user keep only the last one.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::backend::KeyValueBackend;
use crate::codec::{decode_public_key, encode_public_key};
use crate::error::{Result, StoreError};
use crate::keys::user_key;

/// One registered passkey
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Credential id as issued by the authenticator (base64url text)
    pub id: String,
    /// COSE public key bytes
    pub public_key: Vec<u8>,
    /// Signature counter, persisted as given
    pub counter: u32,
    /// Transport hints ("usb", "nfc", "ble", "internal", "hybrid", ...), `None` when unknown
    pub transports: Option<Vec<String>>,
}

/// Every credential a user has registered at one relying party
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub identifier: String,
    pub credentials: Vec<CredentialRecord>,
}

impl UserCredentials {
    /// A user with no credentials yet.
    pub fn empty(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            credentials: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn find(&self, credential_id: &str) -> Option<&CredentialRecord> {
        self.credentials.iter().find(|c| c.id == credential_id)
    }

    /// Replace the credential with the same id, or append it.
    pub fn upsert(&mut self, record: CredentialRecord) {
        match self.credentials.iter_mut().find(|c| c.id == record.id) {
            Some(existing) => *existing = record,
            None => self.credentials.push(record),
        }
    }

    /// Set the signature counter of one credential. Returns `false` if it is unknown.
    pub fn update_counter(&mut self, credential_id: &str, counter: u32) -> bool {
        match self.credentials.iter_mut().find(|c| c.id == credential_id) {
            Some(existing) => {
                existing.counter = counter;
                true
            }
            None => false,
        }
    }
}

/// Wire shape of a stored user record
#[derive(Debug, Serialize, Deserialize)]
struct StoredUser {
    credentials: Vec<StoredCredential>,
}

/// Wire shape of one stored credential
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredential {
    id: String,
    public_key: String,
    counter: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transports: Option<Vec<String>>,
}

impl StoredCredential {
    fn from_record(record: &CredentialRecord) -> Self {
        Self {
            id: record.id.clone(),
            public_key: encode_public_key(&record.public_key),
            counter: record.counter,
            transports: record.transports.clone(),
        }
    }

    fn into_record(self, key: &str) -> Result<CredentialRecord> {
        let public_key = decode_public_key(&self.public_key).map_err(|e| {
            StoreError::decode(key, format!("credential {}: {e}", self.id))
        })?;

        Ok(CredentialRecord {
            id: self.id,
            public_key,
            counter: self.counter,
            // An empty list means "unknown", same as a missing field
            transports: self.transports.filter(|t| !t.is_empty()),
        })
    }
}

/// Loads and saves [`UserCredentials`] through a key-value backend
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn KeyValueBackend>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Load a user's credentials.
    ///
    /// A missing record yields an empty set. A record that exists but cannot
    /// be decoded is an error: callers must not treat it as an unregistered
    /// user.
    pub async fn load(&self, rp_id: &str, identifier: &str) -> Result<UserCredentials> {
        let key = user_key(rp_id, identifier)?;

        let Some(data) = self.backend.get(&key).await? else {
            debug!(key = %key, "No stored credentials");
            return Ok(UserCredentials::empty(identifier));
        };

        let credentials = decode_user(&key, &data).inspect_err(|e| {
            error!(key = %key, error = %e, "Stored credential record is unusable");
        })?;

        debug!(key = %key, count = credentials.len(), "Loaded credentials");
        Ok(UserCredentials {
            identifier: identifier.to_string(),
            credentials,
        })
    }

    /// Replace the user's stored credentials with `user`. The record never expires.
    pub async fn save(&self, rp_id: &str, identifier: &str, user: &UserCredentials) -> Result<()> {
        let key = user_key(rp_id, identifier)?;

        let stored = StoredUser {
            credentials: user
                .credentials
                .iter()
                .map(StoredCredential::from_record)
                .collect(),
        };
        let data = serde_json::to_string(&stored)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.backend.set(&key, &data).await?;
        debug!(key = %key, count = user.credentials.len(), "Saved credentials");
        Ok(())
    }
}

fn decode_user(key: &str, data: &str) -> Result<Vec<CredentialRecord>> {
    let stored: StoredUser =
        serde_json::from_str(data).map_err(|e| StoreError::decode(key, e))?;

    stored
        .credentials
        .into_iter()
        .map(|c| c.into_record(key))
        .collect()
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("backend", &self.backend.kind())
            .finish()
    }
}

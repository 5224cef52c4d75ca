//! Credential command implementations.

use anyhow::{Context, Result};
use colored::Colorize;
use passkey_store_core::{CredentialRecord, PasskeyStore, UserCredentials};
use serde::Serialize;
use tracing::info;

use crate::exit_codes::NotFound;

/// JSON view of a stored credential; key material is summarized, not printed.
#[derive(Debug, Serialize)]
struct CredentialView<'a> {
    id: &'a str,
    counter: u32,
    public_key_bytes: usize,
    transports: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
struct UserView<'a> {
    identifier: &'a str,
    credentials: Vec<CredentialView<'a>>,
}

impl<'a> From<&'a CredentialRecord> for CredentialView<'a> {
    fn from(record: &'a CredentialRecord) -> Self {
        Self {
            id: &record.id,
            counter: record.counter,
            public_key_bytes: record.public_key.len(),
            transports: record.transports.as_deref(),
        }
    }
}

impl<'a> From<&'a UserCredentials> for UserView<'a> {
    fn from(user: &'a UserCredentials) -> Self {
        Self {
            identifier: &user.identifier,
            credentials: user.credentials.iter().map(CredentialView::from).collect(),
        }
    }
}

pub async fn list(store: &PasskeyStore, rp_id: &str, identifier: &str, json: bool) -> Result<()> {
    let user = store
        .credentials()
        .load(rp_id, identifier)
        .await
        .context("Failed to load credentials")?;

    if json {
        let output = serde_json::to_string_pretty(&UserView::from(&user))
            .context("Failed to serialize credentials")?;
        println!("{output}");
        return Ok(());
    }

    if user.is_empty() {
        println!("No credentials for {} at {}", identifier, rp_id);
        return Ok(());
    }

    println!(
        "{} credential(s) for {} at {}",
        user.len().to_string().bold(),
        identifier,
        rp_id
    );
    for record in &user.credentials {
        let transports = record
            .transports
            .as_ref()
            .map(|t| t.join(", "))
            .unwrap_or_else(|| "unknown".to_string());
        println!();
        println!("   {} {}", "ID:".dimmed(), record.id);
        println!("   {} {}", "Counter:".dimmed(), record.counter);
        println!(
            "   {} {} bytes",
            "Public key:".dimmed(),
            record.public_key.len()
        );
        println!("   {} {}", "Transports:".dimmed(), transports);
    }
    Ok(())
}

/// Load, update one counter, save the full set.
pub async fn set_counter(
    store: &PasskeyStore,
    rp_id: &str,
    identifier: &str,
    credential_id: &str,
    counter: u32,
    quiet: bool,
) -> Result<()> {
    let mut user = store
        .credentials()
        .load(rp_id, identifier)
        .await
        .context("Failed to load credentials")?;

    let previous = user
        .find(credential_id)
        .map(|c| c.counter)
        .ok_or_else(|| {
            NotFound(format!(
                "credential {credential_id} not registered for {identifier} at {rp_id}"
            ))
        })?;

    user.update_counter(credential_id, counter);
    store
        .credentials()
        .save(rp_id, identifier, &user)
        .await
        .context("Failed to save credentials")?;

    info!(rp_id, identifier, credential_id, previous, counter, "Counter updated");
    if !quiet {
        println!(
            "{} counter for {}: {} -> {}",
            "Updated".green().bold(),
            credential_id,
            previous,
            counter
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_view_summarizes_key_material() {
        let mut user = UserCredentials::empty("alice");
        user.upsert(CredentialRecord {
            id: "cred-1".into(),
            public_key: vec![7; 77],
            counter: 5,
            transports: None,
        });

        let json = serde_json::to_value(UserView::from(&user)).unwrap();
        assert_eq!(json["identifier"], "alice");
        assert_eq!(json["credentials"][0]["public_key_bytes"], 77);
        assert!(json["credentials"][0]["transports"].is_null());
        assert!(json["credentials"][0].get("public_key").is_none());
    }
}

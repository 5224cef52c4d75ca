//! Challenge command implementations.

use anyhow::{Context, Result};
use colored::Colorize;
use passkey_store_core::PasskeyStore;
use tracing::info;

use crate::exit_codes::NotFound;

pub async fn issue(
    store: &PasskeyStore,
    rp_id: &str,
    identifier: &str,
    value: &str,
    quiet: bool,
) -> Result<()> {
    store
        .challenges()
        .issue(identifier, rp_id, value)
        .await
        .context("Failed to issue challenge")?;

    info!(rp_id, identifier, "Challenge issued");
    if !quiet {
        println!(
            "{} challenge for {} at {} (expires in {}s)",
            "Issued".green().bold(),
            identifier,
            rp_id,
            store.challenges().ttl().as_secs()
        );
    }
    Ok(())
}

/// Print the raw challenge value so it can be piped.
pub async fn get(store: &PasskeyStore, rp_id: &str, identifier: &str) -> Result<()> {
    let challenge = store
        .challenges()
        .get(identifier, rp_id)
        .await
        .context("Failed to read challenge")?;

    match challenge {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => Err(NotFound(format!("no live challenge for {identifier} at {rp_id}")).into()),
    }
}

pub async fn delete(store: &PasskeyStore, rp_id: &str, identifier: &str, quiet: bool) -> Result<()> {
    store
        .challenges()
        .delete(identifier, rp_id)
        .await
        .context("Failed to delete challenge")?;

    if !quiet {
        println!(
            "{} challenge for {} at {}",
            "Deleted".green().bold(),
            identifier,
            rp_id
        );
    }
    Ok(())
}

pub async fn consume(store: &PasskeyStore, rp_id: &str, identifier: &str) -> Result<()> {
    let challenge = store
        .challenges()
        .consume(identifier, rp_id)
        .await
        .context("Failed to consume challenge")?;

    match challenge {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => Err(NotFound(format!("no live challenge for {identifier} at {rp_id}")).into()),
    }
}

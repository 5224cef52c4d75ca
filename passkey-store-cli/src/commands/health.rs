//! Health command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use passkey_store_core::PasskeyStore;

/// Probe the backend and report which one is active.
pub async fn execute(store: &PasskeyStore, quiet: bool) -> Result<()> {
    store
        .check_health()
        .await
        .context("Backend health check failed")?;

    if quiet {
        println!("{}", store.backend_kind());
    } else {
        println!("   {} {}", "Backend:".dimmed(), store.backend_kind());
        println!("   {} {}", "Status:".dimmed(), "OK".green().bold());
        if !store.is_persistent() {
            println!(
                "   {}",
                "In-memory store: nothing is kept after this process exits".yellow()
            );
        }
    }
    Ok(())
}

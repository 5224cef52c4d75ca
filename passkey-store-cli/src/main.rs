//! Passkey Store CLI - inspect and repair passkey challenge and credential storage.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod exit_codes;

use exit_codes::ExitCode;

#[derive(Parser)]
#[command(name = "passkey-store")]
#[command(author, version, about = "Inspect passkey challenge and credential storage", long_about = None)]
#[command(after_help = "Backend: Redis when REDIS_URL is set, otherwise an in-memory store \
(which starts empty on every run).\n\n\
Exit codes:\n  0  success\n  64 invalid relying party id or identifier\n  \
65 stored record is malformed\n  66 entry not found\n  69 backend unavailable\n  78 invalid configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress decorated output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log storage operations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the configured backend is reachable
    Health,

    /// Manage anti-replay challenges
    Challenge {
        #[command(subcommand)]
        action: ChallengeAction,
    },

    /// Inspect stored passkey credentials
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },
}

#[derive(Subcommand)]
enum ChallengeAction {
    /// Store a challenge with the configured TTL, replacing any live one
    Issue {
        #[arg(value_name = "RP_ID")]
        rp_id: String,
        #[arg(value_name = "IDENTIFIER")]
        identifier: String,
        #[arg(value_name = "VALUE")]
        value: String,
    },

    /// Print the live challenge
    Get {
        #[arg(value_name = "RP_ID")]
        rp_id: String,
        #[arg(value_name = "IDENTIFIER")]
        identifier: String,
    },

    /// Remove the challenge (succeeds if none exists)
    Delete {
        #[arg(value_name = "RP_ID")]
        rp_id: String,
        #[arg(value_name = "IDENTIFIER")]
        identifier: String,
    },

    /// Print and remove the live challenge atomically
    Consume {
        #[arg(value_name = "RP_ID")]
        rp_id: String,
        #[arg(value_name = "IDENTIFIER")]
        identifier: String,
    },
}

#[derive(Subcommand)]
enum CredentialsAction {
    /// List a user's stored credentials
    List {
        #[arg(value_name = "RP_ID")]
        rp_id: String,
        #[arg(value_name = "IDENTIFIER")]
        identifier: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Overwrite the signature counter of one credential
    SetCounter {
        #[arg(value_name = "RP_ID")]
        rp_id: String,
        #[arg(value_name = "IDENTIFIER")]
        identifier: String,
        #[arg(value_name = "CREDENTIAL_ID")]
        credential_id: String,
        #[arg(value_name = "COUNTER")]
        counter: u32,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "info,passkey_store_core=debug"
    } else {
        "error"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;
    let store = commands::open_store().await?;

    match cli.command {
        Commands::Health => commands::health::execute(&store, quiet).await,
        Commands::Challenge { action } => match action {
            ChallengeAction::Issue {
                rp_id,
                identifier,
                value,
            } => commands::challenge::issue(&store, &rp_id, &identifier, &value, quiet).await,
            ChallengeAction::Get { rp_id, identifier } => {
                commands::challenge::get(&store, &rp_id, &identifier).await
            }
            ChallengeAction::Delete { rp_id, identifier } => {
                commands::challenge::delete(&store, &rp_id, &identifier, quiet).await
            }
            ChallengeAction::Consume { rp_id, identifier } => {
                commands::challenge::consume(&store, &rp_id, &identifier).await
            }
        },
        Commands::Credentials { action } => match action {
            CredentialsAction::List {
                rp_id,
                identifier,
                json,
            } => commands::credentials::list(&store, &rp_id, &identifier, json).await,
            CredentialsAction::SetCounter {
                rp_id,
                identifier,
                credential_id,
                counter,
            } => {
                commands::credentials::set_counter(
                    &store,
                    &rp_id,
                    &identifier,
                    &credential_id,
                    counter,
                    quiet,
                )
                .await
            }
        },
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit = match run(cli).await {
        Ok(()) => ExitCode::success(),
        Err(err) => ExitCode::from_anyhow(&err),
    };

    if let Some(message) = &exit.message {
        eprintln!("{} {}", "error:".red().bold(), message);
    }
    std::process::exit(exit.code);
}

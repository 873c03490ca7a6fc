//! E-commerce harness CLI - Operational tools for the test environment.
//!
//! # Usage
//!
//! ```bash
//! # Check that every service answers
//! harness-cli check
//!
//! # Check two services, 5 probes each, 1 second apart
//! harness-cli check -s user-service -s product-service --attempts 5 --delay 1
//!
//! # Verify the test credentials can obtain a token
//! harness-cli token
//!
//! # Delete leftovers from an aborted run
//! harness-cli cleanup products 41 42
//! harness-cli cleanup favourites 1/2/10-06-2025__14:30:00:000000
//! ```
//!
//! # Commands
//!
//! - `check` - Probe service connectivity
//! - `token` - Authenticate with the configured credentials
//! - `cleanup` - Delete resources by kind and key
//!
//! Set `LOG_FORMAT=json` for JSON log lines.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use ecommerce_harness_core::{ResourceKind, ServiceName};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "harness-cli")]
#[command(author, version, about = "E-commerce harness CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe service connectivity
    Check {
        /// Service to check (repeatable); all services when omitted
        #[arg(short, long = "service")]
        services: Vec<ServiceName>,

        /// Probes per service before giving up
        #[arg(long, default_value_t = 30)]
        attempts: u32,

        /// Seconds between probes
        #[arg(long, default_value_t = 2)]
        delay: u64,
    },
    /// Authenticate with the configured test credentials
    Token,
    /// Delete resources by kind and key
    Cleanup {
        /// Resource kind (`users`, `products`, `favourites`, ...)
        kind: ResourceKind,

        /// Keys to delete; composite keys are `/`-separated
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    // Defaults to info level for the harness crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "harness_cli=info,ecommerce_harness=info".into());

    let is_json = std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json");
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check {
            services,
            attempts,
            delay,
        } => commands::check::run(&services, attempts, delay).await?,
        Commands::Token => commands::token::run().await?,
        Commands::Cleanup { kind, keys } => commands::cleanup::run(kind, &keys).await?,
    }
    Ok(())
}

//! Cafe Bazaar billing command-line client
//!
//! Loads credentials from a JSON file, runs one billing operation and prints
//! the result as JSON on stdout. Logs go to stderr as JSON lines. Tokens
//! refreshed along the way are written back to the credential file.

mod cli;

use anyhow::{Context, Result};
use cafebazaar::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Command, USAGE};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match cli::parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{USAGE}");
            anyhow::bail!(e);
        }
    };

    let config_path = cli::resolve_config_path(invocation.config_path.as_deref());
    info!(path = %config_path.display(), "loading credentials");

    let mut builder = Client::builder();
    if let Ok(base_url) = std::env::var("BAZAAR_BASE_URL") {
        builder = builder.base_url(base_url);
    }
    let client = builder
        .from_file(&config_path)
        .await
        .with_context(|| format!("failed to load client from {}", config_path.display()))?;

    let output = run(&client, invocation.command).await;

    // Persist even when the call failed: the token may have been refreshed first
    if let Err(e) = client.save_credentials(&config_path).await {
        warn!(path = %config_path.display(), error = %e, "failed to persist credentials");
    }

    let output = output?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(client: &Client, command: Command) -> Result<serde_json::Value> {
    let value = match command {
        Command::Validate {
            package_name,
            product_id,
            purchase_token,
        } => {
            let purchase = client
                .purchase_validate(&package_name, &product_id, &purchase_token)
                .await
                .context("purchase validation failed")?;
            serde_json::to_value(purchase)?
        }
        Command::Subscription {
            package_name,
            subscription_id,
            purchase_token,
        } => {
            let subscription = client
                .subscription_get(&package_name, &subscription_id, &purchase_token)
                .await
                .context("subscription lookup failed")?;
            serde_json::to_value(subscription)?
        }
        Command::Cancel {
            package_name,
            subscription_id,
            purchase_token,
        } => {
            client
                .subscription_cancel(&package_name, &subscription_id, &purchase_token)
                .await
                .context("subscription cancellation failed")?;
            serde_json::json!({ "cancelled": true, "subscription_id": subscription_id })
        }
    };
    Ok(value)
}

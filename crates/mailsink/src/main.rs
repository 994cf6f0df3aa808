//! Mailsink - inbound mail sink.
//!
//! Decodes raw RFC 5322 messages and delivers them to per-user mailboxes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mailsink_core::{
    Config, FixedWindowLimiter, LoggingNotifier, MemoryStore, Service, extract_username,
};
use mailsink_mime::{DecodeOptions, extract_body, extract_with};
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a raw message and print its subject, headers and bodies as JSON
    Decode {
        /// Raw message file; reads stdin when omitted
        file: Option<PathBuf>,

        /// Maximum multipart nesting to walk
        #[arg(long)]
        max_depth: Option<usize>,

        /// Print only the preferred body (text, else HTML, else raw)
        #[arg(long)]
        body_only: bool,
    },

    /// Deliver a raw message once with in-memory storage
    Deliver {
        /// Recipient address
        #[arg(short, long)]
        recipient: String,

        /// JSON service configuration; defaults to the recipient's domain
        #[arg(short, long, env = "MAILSINK_CONFIG")]
        config: Option<PathBuf>,

        /// Raw message file; reads stdin when omitted
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mailsink=info,mailsink_core=info,mailsink_mime=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Args::parse().command {
        Command::Decode {
            file,
            max_depth,
            body_only,
        } => decode(file.as_deref(), max_depth, body_only).await,
        Command::Deliver {
            recipient,
            config,
            file,
        } => deliver(&recipient, config.as_deref(), file.as_deref()).await,
    }
}

async fn read_message(file: Option<&Path>) -> Result<Vec<u8>> {
    if let Some(path) = file {
        return tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let mut raw = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut raw)
        .await
        .context("Failed to read message from stdin")?;
    Ok(raw)
}

async fn decode(file: Option<&Path>, max_depth: Option<usize>, body_only: bool) -> Result<()> {
    let raw = read_message(file).await?;
    debug!(bytes = raw.len(), "decoding message");

    if body_only {
        println!("{}", extract_body(&raw));
        return Ok(());
    }

    let mut options = DecodeOptions::builder();
    if let Some(depth) = max_depth {
        options = options.max_depth(depth);
    }
    let decoded = extract_with(&raw, &options.build());
    for fallback in &decoded.fallbacks {
        warn!(%fallback, "decoded with fallback");
    }

    println!("{}", serde_json::to_string_pretty(&decoded.value)?);
    Ok(())
}

async fn deliver(recipient: &str, config: Option<&Path>, file: Option<&Path>) -> Result<()> {
    let recipient = recipient.trim();
    let config = match config {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Config::from_json(&json)
                .with_context(|| format!("Invalid configuration in {}", path.display()))?
        }
        None => {
            let domain = recipient
                .rsplit_once('@')
                .map(|(_, domain)| domain)
                .context("Recipient has no domain")?;
            Config::new(domain)
        }
    };
    info!(domain = %config.domain, "Starting mailsink delivery");

    let raw = read_message(file).await?;
    let service = delivery_service(recipient, config).await;
    let receipt = service
        .deliver(recipient, &raw)
        .await
        .with_context(|| format!("Delivery to {recipient} failed"))?;

    println!("{}", serde_json::to_string_pretty(&receipt)?);
    Ok(())
}

/// Builds a one-shot service whose only mailbox is the recipient's.
async fn delivery_service(
    recipient: &str,
    config: Config,
) -> Service<MemoryStore, LoggingNotifier, FixedWindowLimiter> {
    let store = MemoryStore::new();
    if let Some(username) = extract_username(recipient.trim(), &config.domain) {
        store.provision(&username).await;
    }
    Service::new(config, store, LoggingNotifier, FixedWindowLimiter::new())
}

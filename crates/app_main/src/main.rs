//! S3Browser - browse an S3 bucket from the terminal
//!
//! Main entry point.

mod command;
mod shell;
mod terminal;

use anyhow::{Context, Result};
use app_core::{ActionDispatcher, AppConfig, PathResolver, Session};
use app_store::{S3Connector, S3Transfer};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "s3browser", version, about = "Browse an S3 bucket from the terminal")]
struct Args {
    /// Bucket to browse
    #[arg(long)]
    bucket: String,

    /// Configuration file (TOML); defaults to the per-user config.toml
    #[arg(long, alias = "config_path")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging and panic hook first
    let _log_guard = app_log::init()?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "S3Browser starting");

    let config = AppConfig::load(args.config.as_deref())?;

    if let Err(e) = app_log::cleanup_old_logs(&app_log::log_dir(), config.logging.retention_days) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    let resolver = PathResolver::new(&args.bucket)?;
    let store = S3Connector::new(&config.connection).context("Cannot connect to the object store")?;
    let transfer = S3Transfer::new(config.connection.clone())
        .with_concurrency(config.transfer.concurrency);
    let dispatcher = ActionDispatcher::new(Arc::new(store), Arc::new(transfer), config.preview.clone());

    tracing::info!(bucket = resolver.bucket(), "Session started");
    shell::run(&dispatcher, Session::new(resolver))
}

//! Moodlog API Server
//!
//! Run with: cargo run --bin moodlog
//!
//! # Configuration
//!
//! Read from `--config <path>` or the default locations
//! (`~/.config/moodlog/config.toml`, `/etc/moodlog/config.toml`,
//! `./config.toml`). `MOODLOG_*` environment variables override the file,
//! `RUST_LOG` overrides the log filter.

use anyhow::Context;
use clap::Parser;
use moodlog::api::{serve, AppState};
use moodlog::config::{Config, LoggingConfig};
use moodlog::migrations::MigrationManager;
use moodlog::storage::Database;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "moodlog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Mood log API server")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting Moodlog API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Database: {}", config.storage.db_path);

    let db = Database::open(&config.storage.database_config())
        .with_context(|| format!("opening database {}", config.storage.db_path))?;

    let migrations = MigrationManager::new(db.clone());
    if config.storage.auto_migrate {
        let outcome = migrations.migrate().context("auto-migrate failed")?;
        tracing::info!("{}", outcome.summary());
    }

    let status = migrations.status();
    if !status.ok {
        tracing::warn!(
            code = ?status.code,
            "Database not ready: {}",
            status.message.as_deref().unwrap_or("unknown problem")
        );
    }

    let api_config: moodlog::api::ApiConfig = (&config.api).into();
    serve(AppState::new(db, api_config.clone()), &api_config).await?;

    tracing::info!("Moodlog API server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter_directive().into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

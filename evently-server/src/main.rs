//! Evently Server
//!
//! Stores event records with attached media and serves them with pagination.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use anyhow::Context;
use clap::Parser;
use config::{ConfigLoader, get_database_url};
use evently_core::repository::PgEventRepository;
use evently_core::storage::CloudinaryStore;
use shutdown::spawn_config_reload_handler;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";

const MAX_DB_CONNECTIONS: u32 = 10;

/// Evently - event catalogue with media uploads
#[derive(Parser, Debug)]
#[command(name = "evently-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./evently-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:5000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    tracing::info!("Starting evently-server v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded = config_loader
        .load()
        .inspect_err(|e| tracing::error!(error = %e, "Failed to load configuration"))?;
    tracing::info!(path = ?args.config, "Configuration loaded");

    let pool = connect_database(args.migrate).await?;

    let state = AppState::new(
        Arc::new(PgEventRepository::new(pool.clone())),
        Arc::new(CloudinaryStore::new(loaded.object_store.clone())),
        loaded.shared(),
    );
    let reload_stop = spawn_config_reload_handler(state.clone(), config_loader);

    let router = server::build_router(state, loaded.server.max_upload_bytes);
    let result = server::run_server(router, loaded.server.listen).await;

    reload_stop.notify_one();
    pool.close().await;
    tracing::info!("Server shutdown complete");

    result.context("HTTP server failed")
}

/// Open the pool from `DATABASE_URL`, optionally applying migrations.
async fn connect_database(migrate: bool) -> anyhow::Result<PgPool> {
    let database_url =
        get_database_url().inspect_err(|e| tracing::error!(error = %e, "No database configured"))?;

    let pool = PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .connect(&database_url)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to connect to database"))
        .context("connecting to database")?;
    tracing::info!("Database connection established");

    if migrate {
        sqlx::migrate!("../migrations")
            .run(&pool)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to run migrations"))
            .context("running migrations")?;
        tracing::info!("Migrations applied");
    }
    Ok(pool)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["evently-server"]);
        assert_eq!(args.config, PathBuf::from("./evently-config.toml"));
        assert!(args.listen.is_none());
        assert!(!args.migrate);
    }
}

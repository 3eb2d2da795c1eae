//! salesdash-web - multi-channel sales analytics dashboard service
//!
//! Loads the CSV exports (or the remote order system when configured),
//! rebuilds the canonical SQLite store, runs the aggregation pipeline and
//! serves the cached snapshot over HTTP.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use salesdash_common::config::AppConfig;
use salesdash_common::db::init_database;
use salesdash_web::ingest::HttpOrderSystemClient;
use salesdash_web::pipeline;
use salesdash_web::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "salesdash-web", version, about = "Sales analytics dashboard service")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, env = "SALESDASH_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Folder holding the CSV exports and the database file
    #[arg(long)]
    data_folder: Option<String>,

    /// Listen port (overrides configuration)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting salesdash-web v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.resolve_data_folder(cli.data_folder.as_deref());
    if let Some(port) = cli.port {
        config.port = port;
    }
    info!("Data folder: {}", config.data_folder.display());

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());
    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Canonical store ready");
            pool
        }
        Err(e) => {
            error!("Failed to open canonical store: {}", e);
            return Err(e.into());
        }
    };

    let remote = match &config.remote {
        Some(remote_config) => Some(HttpOrderSystemClient::new(remote_config)?),
        None => None,
    };

    let state = AppState::new(pool, config, remote);

    // Build the first snapshot before accepting traffic; a failure here is
    // not fatal, the API serves 503 until a refresh succeeds.
    match pipeline::refresh(&state.db, &state.config, state.remote_client()).await {
        Ok(snapshot) => {
            info!(
                channels = snapshot.channels.len(),
                "✓ Initial snapshot built"
            );
            state.cache.store(snapshot).await;
        }
        Err(e) => {
            warn!("Initial refresh failed ({}); serving 503 until POST /api/refresh succeeds", e);
        }
    }

    let port = state.config.port;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("salesdash-web listening on http://127.0.0.1:{port}");
    info!("Health check: http://127.0.0.1:{port}/health");

    axum::serve(listener, app).await?;

    Ok(())
}

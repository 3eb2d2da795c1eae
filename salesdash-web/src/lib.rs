//! salesdash-web library - pipeline and HTTP dashboard API
//!
//! Loads the multi-channel sales exports, rebuilds the canonical SQLite
//! store, runs the aggregation pipeline and serves the cached snapshot
//! over a small JSON API.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use salesdash_common::config::AppConfig;

pub mod api;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod types;

#[cfg(test)]
pub mod fixtures;

use ingest::{HttpOrderSystemClient, OrderSystemClient};
use pipeline::SnapshotCache;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Canonical store connection pool
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    /// Most recent dashboard snapshot; empty until the first refresh
    pub cache: SnapshotCache,
    /// Remote order-system client, when one is configured
    pub remote: Option<Arc<HttpOrderSystemClient>>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        config: AppConfig,
        remote: Option<HttpOrderSystemClient>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            cache: SnapshotCache::new(),
            remote: remote.map(Arc::new),
        }
    }

    /// The remote client as a trait object, for the pipeline
    pub fn remote_client(&self) -> Option<&dyn OrderSystemClient> {
        self.remote.as_deref().map(|c| c as &dyn OrderSystemClient)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/channels", get(api::list_channels))
        .route("/api/overview", get(api::get_overview))
        .route("/api/channel/:name", get(api::get_channel))
        .route("/api/refresh", post(api::trigger_refresh))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

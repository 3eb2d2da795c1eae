//! Dashboard read endpoints: channel list, overview, per-channel view

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::pipeline::channels::ChannelId;
use crate::pipeline::{ChannelView, DashboardSnapshot, OverviewView};
use crate::AppState;

/// One entry in the channel directory
#[derive(Debug, Serialize)]
pub struct ChannelEntry {
    pub name: String,
    /// Fact rows in the current snapshot; absent before the first refresh
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
}

/// Overview payload with its snapshot timestamp
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub overview: OverviewView,
}

/// Per-channel payload with its snapshot timestamp
#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub view: ChannelView,
}

async fn current_snapshot(state: &AppState) -> Result<Arc<DashboardSnapshot>, ApiError> {
    state.cache.get().await.ok_or_else(|| {
        ApiError::Unavailable("no dashboard snapshot available yet".to_string())
    })
}

/// GET /api/channels
///
/// The closed channel directory, in presentation order. Available before
/// the first refresh; row counts appear once a snapshot exists.
pub async fn list_channels(State(state): State<AppState>) -> Json<Vec<ChannelEntry>> {
    let snapshot = state.cache.get().await;
    let entries = ChannelId::ALL
        .iter()
        .map(|channel| ChannelEntry {
            name: channel.as_str().to_string(),
            row_count: snapshot
                .as_ref()
                .and_then(|s| s.channel(*channel))
                .map(|view| view.row_count),
        })
        .collect();
    Json(entries)
}

/// GET /api/overview
pub async fn get_overview(
    State(state): State<AppState>,
) -> Result<Json<OverviewResponse>, ApiError> {
    let snapshot = current_snapshot(&state).await?;
    Ok(Json(OverviewResponse {
        generated_at: snapshot.generated_at,
        overview: snapshot.overview.clone(),
    }))
}

/// GET /api/channel/:name
///
/// Unknown channel names are 404; a known channel with no matching rows
/// still answers with its (empty) aggregate battery.
pub async fn get_channel(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ChannelResponse>, ApiError> {
    let channel = ChannelId::parse(&name)
        .ok_or_else(|| ApiError::NotFound(format!("unknown channel '{name}'")))?;
    let snapshot = current_snapshot(&state).await?;
    let view = snapshot
        .channel(channel)
        .ok_or_else(|| ApiError::NotFound(format!("channel '{name}' missing from snapshot")))?;
    Ok(Json(ChannelResponse {
        generated_at: snapshot.generated_at,
        view: view.clone(),
    }))
}

/// POST /api/refresh
///
/// Rebuild the snapshot from the raw sources. Serves the previous snapshot
/// untouched if the rebuild fails.
pub async fn trigger_refresh(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let snapshot = crate::pipeline::refresh(&state.db, &state.config, state.remote_client())
        .await
        .map_err(|e| ApiError::Internal(format!("refresh failed: {e}")))?;
    let generated_at = snapshot.generated_at;
    state.cache.store(snapshot).await;
    Ok(Json(json!({
        "status": "refreshed",
        "generated_at": generated_at,
    })))
}

//! Remote order-management source
//!
//! The remote system is an external collaborator: one query returns the same
//! shape as the CSV exports (both tables in a single response), or the call
//! fails and the caller falls back to file-based loading. All-or-nothing; no
//! retry, no partial dataset.

use std::time::Duration;

use async_trait::async_trait;
use salesdash_common::config::RemoteConfig;
use salesdash_common::{Error, RawTable, Result, Value};
use serde::Deserialize;

use super::Dataset;

/// Query interface for the remote order system
#[async_trait]
pub trait OrderSystemClient: Send + Sync {
    /// Fetch the complete dataset, or fail fast
    async fn fetch_dataset(&self) -> Result<Dataset>;
}

/// Wire shape of one table in the remote response
#[derive(Debug, Deserialize)]
struct RemoteTable {
    columns: Vec<String>,
    rows: Vec<Vec<serde_json::Value>>,
}

/// Wire shape of the full remote response
#[derive(Debug, Deserialize)]
struct RemoteDataset {
    order_lines: RemoteTable,
    master_sku: RemoteTable,
}

/// HTTP client for the remote order system
pub struct HttpOrderSystemClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOrderSystemClient {
    /// Build a client with the configured fail-fast timeout
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("remote client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl OrderSystemClient for HttpOrderSystemClient {
    async fn fetch_dataset(&self) -> Result<Dataset> {
        let url = format!("{}/dataset", self.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| remote_unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| remote_unavailable(e.to_string()))?;

        let payload: RemoteDataset = response
            .json()
            .await
            .map_err(|e| remote_unavailable(format!("invalid payload: {}", e)))?;

        Ok(Dataset {
            order_lines: into_raw_table("sale_order_line", payload.order_lines)?,
            master_sku: into_raw_table("master_sku", payload.master_sku)?,
        })
    }
}

fn remote_unavailable(reason: String) -> Error {
    Error::SourceUnavailable {
        source_name: "remote_order_system".to_string(),
        reason,
    }
}

/// Convert a wire table into a normalized `RawTable`
fn into_raw_table(name: &str, remote: RemoteTable) -> Result<RawTable> {
    let mut table = RawTable::new(name, remote.columns);
    let width = table.columns.len();

    for wire_row in remote.rows {
        let mut row: Vec<Value> = wire_row
            .into_iter()
            .take(width)
            .map(|cell| match cell {
                serde_json::Value::Null => Value::Null,
                serde_json::Value::Number(n) => {
                    n.as_f64().map(Value::Number).unwrap_or(Value::Null)
                }
                serde_json::Value::String(s) => Value::Text(s),
                serde_json::Value::Bool(b) => Value::Text(b.to_string()),
                other => Value::Text(other.to_string()),
            })
            .collect();
        row.resize(width, Value::Null);
        table.push_row(row)?;
    }

    table.normalize();
    Ok(table)
}

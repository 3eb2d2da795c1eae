//! Raw source loading
//!
//! Reads the named tabular sources (CSV exports, or the remote order system
//! when configured) into normalized `RawTable`s. This layer has no side
//! effects beyond reading and never writes to the canonical store.
//!
//! Failure policy: a required named source that cannot be read raises
//! immediately; there is no partial-source recovery here. The refresh
//! orchestrator handles fallback between whole sources.

pub mod remote;

use std::collections::HashSet;
use std::path::Path;

use salesdash_common::config::AppConfig;
use salesdash_common::{Error, RawTable, Result, Value};
use tracing::{info, warn};

pub use remote::{HttpOrderSystemClient, OrderSystemClient};

/// The full raw dataset: one normalized table per named source
#[derive(Debug, Clone)]
pub struct Dataset {
    pub order_lines: RawTable,
    pub master_sku: RawTable,
}

/// Read one CSV file into a normalized `RawTable`.
///
/// Column order is preserved; ragged rows are padded (short) or truncated
/// (long) to the header arity before normalization.
pub fn read_csv_table(source_name: &str, path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::SourceUnavailable {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::SourceUnavailable {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut table = RawTable::new(source_name, headers);
    let width = table.columns.len();

    for record in reader.records() {
        let record = record.map_err(|e| Error::SourceUnavailable {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })?;
        let mut row: Vec<Value> = record
            .iter()
            .take(width)
            .map(|cell| Value::Text(cell.to_string()))
            .collect();
        row.resize(width, Value::Null);
        table.push_row(row)?;
    }

    table.normalize();
    info!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Verify the join and grouping key columns both sources must carry.
///
/// Applied to every dataset regardless of where it came from; a remote
/// payload without its keys is as unusable as a truncated export.
fn validate_key_columns(dataset: &Dataset) -> Result<()> {
    dataset.order_lines.require_column("Order Reference")?;
    dataset.order_lines.require_column("SKU")?;
    dataset.master_sku.require_column("SKU")?;
    Ok(())
}

/// Load both required CSV sources and validate their key columns
pub fn load_csv_sources(config: &AppConfig) -> Result<Dataset> {
    let dataset = Dataset {
        order_lines: read_csv_table(
            "sale_order_line",
            &config.data_file(&config.sources.order_lines),
        )?,
        master_sku: read_csv_table("master_sku", &config.data_file(&config.sources.master_sku))?,
    };
    validate_key_columns(&dataset)?;
    Ok(dataset)
}

/// Load an order-reference allowlist side file.
///
/// The file only needs an `Order Reference` column; anything else is ignored.
pub fn load_allowlist(name: &str, path: &Path) -> Result<HashSet<String>> {
    let table = read_csv_table(name, path)?;
    let idx = table.require_column("Order Reference")?;

    let refs: HashSet<String> = (0..table.len())
        .filter_map(|row| table.cell(row, idx).as_str().map(|s| s.to_string()))
        .collect();
    info!("Allowlist '{}': {} order references", name, refs.len());
    Ok(refs)
}

/// Load the full dataset: remote order system first when configured, with
/// fall back to the CSV exports on any remote failure.
pub async fn load_dataset(
    config: &AppConfig,
    client: Option<&dyn OrderSystemClient>,
) -> Result<Dataset> {
    if let Some(client) = client {
        info!("Querying remote order system for dataset");
        // A fetched payload missing its key columns counts as a remote
        // failure, so it falls back rather than failing mid-load
        match client.fetch_dataset().await.and_then(|dataset| {
            validate_key_columns(&dataset)?;
            Ok(dataset)
        }) {
            Ok(dataset) => {
                info!("Dataset loaded from remote order system");
                return Ok(dataset);
            }
            Err(e) => {
                warn!("Remote order system failed ({}); falling back to CSV", e);
            }
        }
    }

    let dataset = load_csv_sources(config)?;
    info!("Dataset loaded from CSV exports");
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    #[test]
    fn reads_and_normalizes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "orders.csv",
            "Order Reference , SKU,Quantity\nS001, SKU-1 ,3\nS002,SKU-2,\n",
        );

        let table = read_csv_table("sale_order_line", &path).unwrap();
        assert_eq!(table.columns, vec!["Order Reference", "SKU", "Quantity"]);
        assert_eq!(table.cell(0, 1).as_str(), Some("SKU-1"));
        assert_eq!(table.cell(0, 2).as_f64(), Some(3.0));
        assert!(table.cell(1, 2).is_null());
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_csv_table("sale_order_line", &dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
        assert!(err.to_string().contains("sale_order_line"));
    }

    #[test]
    fn missing_key_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "sale-order-line.csv", "SKU\nSKU-1\n");
        write_csv(dir.path(), "master-sku.csv", "SKU\nSKU-1\n");

        let mut config = AppConfig::default();
        config.data_folder = dir.path().to_path_buf();

        let err = load_csv_sources(&config).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingColumn { ref column, .. } if column == "Order Reference"
        ));
    }

    struct KeylessClient;

    #[async_trait::async_trait]
    impl OrderSystemClient for KeylessClient {
        async fn fetch_dataset(&self) -> Result<Dataset> {
            // well-formed wire tables, but neither carries the key columns
            Ok(Dataset {
                order_lines: RawTable::new("sale_order_line", vec!["Booth".to_string()]),
                master_sku: RawTable::new("master_sku", vec!["Name".to_string()]),
            })
        }
    }

    #[tokio::test]
    async fn keyless_remote_payload_falls_back_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "sale-order-line.csv",
            "Order Reference,SKU\nS001,SKU-1\n",
        );
        write_csv(dir.path(), "master-sku.csv", "SKU\nSKU-1\n");

        let mut config = AppConfig::default();
        config.data_folder = dir.path().to_path_buf();

        let dataset = load_dataset(&config, Some(&KeylessClient)).await.unwrap();
        // the CSV export won, not the keyless remote payload
        assert_eq!(dataset.order_lines.len(), 1);
        assert!(dataset.order_lines.column_index("Order Reference").is_some());
    }

    #[test]
    fn allowlist_collects_references() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "trade-show-orders.csv",
            "Order Reference,Booth\nS001,12\nS003,14\n",
        );

        let refs = load_allowlist("trade_show", &path).unwrap();
        assert_eq!(refs.len(), 2);
        assert!(refs.contains("S001"));
        assert!(!refs.contains("S002"));
    }
}

//! Bulk load path: normalized raw tables into the canonical store
//!
//! Mapping from the wide, human-readable source headers to storage column
//! names is owned here (via the schema registry), not by the readers. Source
//! schemas drift across snapshots; a declared column whose header is absent
//! from the snapshot simply loads as NULL for every row.

use sqlx::sqlite::SqliteArguments;
use sqlx::{Arguments, SqlitePool};
use tracing::{info, warn};

use crate::db::table_schemas::TableSchema;
use crate::table::{RawTable, Value};
use crate::Result;

/// Insert every row of `raw` into the table described by `S`.
///
/// All rows for the table commit in a single transaction; any failure rolls
/// the whole table back and is reported to the caller, not retried.
pub async fn bulk_load<S: TableSchema>(pool: &SqlitePool, raw: &RawTable) -> Result<u64> {
    let columns = S::expected_columns();

    // Resolve each declared column against the snapshot's headers once
    let mapping: Vec<(&'static str, Option<usize>)> = columns
        .iter()
        .filter_map(|col| col.source_header.map(|header| (col.name, header)))
        .map(|(name, header)| (name, raw.column_index(header)))
        .collect();

    for (name, idx) in &mapping {
        if idx.is_none() {
            warn!(
                "Source '{}' has no column for '{}.{}'; loading as NULL",
                raw.name,
                S::table_name(),
                name
            );
        }
    }

    let placeholders = vec!["?"; mapping.len()].join(", ");
    let column_list = mapping
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ");
    // The dimension table keys on sku; reloading a snapshot replaces rows
    let sql = format!(
        "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
        S::table_name(),
        column_list,
        placeholders
    );

    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;

    for row_idx in 0..raw.len() {
        let mut args = SqliteArguments::default();
        for (_, col_idx) in &mapping {
            let cell = match col_idx {
                Some(c) => raw.cell(row_idx, *c),
                None => &Value::Null,
            };
            let bound = match cell {
                Value::Null => args.add(None::<String>),
                Value::Text(s) => args.add(s.clone()),
                Value::Number(n) => args.add(*n),
            };
            bound.map_err(|e| sqlx::Error::Encode(e))?;
        }
        sqlx::query_with(&sql, args).execute(&mut *tx).await?;
        inserted += 1;
    }

    tx.commit().await?;
    info!("Loaded {} rows into {}", inserted, S::table_name());
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::create_all_tables;
    use crate::db::table_schemas::{MasterSkuTableSchema, OrderLinesTableSchema};
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    async fn memory_pool() -> SqlitePool {
        // one connection: each in-memory connection is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(SqliteConnectOptions::new().in_memory(true).foreign_keys(false))
            .await
            .unwrap();
        create_all_tables(&pool).await.unwrap();
        pool
    }

    fn order_lines(rows: &[(&str, &str, &str, f64)]) -> RawTable {
        let mut t = RawTable::new(
            "sale_order_line",
            vec![
                "Order Reference".to_string(),
                "SKU".to_string(),
                "Sales Team".to_string(),
                "Subtotal".to_string(),
            ],
        );
        for (reference, sku, team, subtotal) in rows {
            t.push_row(vec![
                Value::Text(reference.to_string()),
                Value::Text(sku.to_string()),
                Value::Text(team.to_string()),
                Value::Number(*subtotal),
            ])
            .unwrap();
        }
        t
    }

    #[tokio::test]
    async fn loads_rows_and_maps_headers() {
        let pool = memory_pool().await;
        let raw = order_lines(&[("S001", "SKU-1", "Wholesale", 100.0)]);

        let count = bulk_load::<OrderLinesTableSchema>(&pool, &raw).await.unwrap();
        assert_eq!(count, 1);

        let (reference, subtotal): (String, f64) =
            sqlx::query_as("SELECT order_reference, subtotal FROM sale_order_line")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(reference, "S001");
        assert_eq!(subtotal, 100.0);
    }

    #[tokio::test]
    async fn missing_declared_column_loads_null() {
        let pool = memory_pool().await;
        // Snapshot without "Sales Team" etc.; only the key columns present
        let mut raw = RawTable::new(
            "sale_order_line",
            vec!["Order Reference".to_string(), "SKU".to_string()],
        );
        raw.push_row(vec![
            Value::Text("S002".to_string()),
            Value::Text("SKU-2".to_string()),
        ])
        .unwrap();

        bulk_load::<OrderLinesTableSchema>(&pool, &raw).await.unwrap();

        let team: Option<String> =
            sqlx::query_scalar("SELECT sales_team FROM sale_order_line WHERE order_reference = 'S002'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(team.is_none());
    }

    #[tokio::test]
    async fn null_key_aborts_whole_table() {
        let pool = memory_pool().await;
        let mut raw = order_lines(&[("S001", "SKU-1", "Wholesale", 100.0)]);
        // Second row violates the NOT NULL order_reference constraint
        raw.push_row(vec![
            Value::Null,
            Value::Text("SKU-2".to_string()),
            Value::Null,
            Value::Number(50.0),
        ])
        .unwrap();

        assert!(bulk_load::<OrderLinesTableSchema>(&pool, &raw).await.is_err());

        // Transaction rolled back: nothing from this table committed
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_order_line")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn unmatched_sku_loads_on_a_pooled_database() {
        // Orphan order lines must commit even when the pool hands the load a
        // fresh connection, so foreign keys must be off pool-wide
        let dir = tempfile::tempdir().unwrap();
        let pool = crate::db::init::init_database(&dir.path().join("salesdash.db"))
            .await
            .unwrap();

        let raw = order_lines(&[("S001", "SKU-ORPHAN", "Wholesale", 100.0)]);
        let count = bulk_load::<OrderLinesTableSchema>(&pool, &raw).await.unwrap();
        assert_eq!(count, 1);

        let sku: String = sqlx::query_scalar("SELECT sku FROM sale_order_line")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(sku, "SKU-ORPHAN");
    }

    #[tokio::test]
    async fn dimension_reload_replaces_by_sku() {
        let pool = memory_pool().await;
        let mut raw = RawTable::new(
            "master_sku",
            vec!["SKU".to_string(), "Category Group".to_string()],
        );
        raw.push_row(vec![
            Value::Text("SKU-1".to_string()),
            Value::Text("CLOTHING".to_string()),
        ])
        .unwrap();
        raw.push_row(vec![
            Value::Text("SKU-1".to_string()),
            Value::Text("JEWELRY".to_string()),
        ])
        .unwrap();

        bulk_load::<MasterSkuTableSchema>(&pool, &raw).await.unwrap();

        let group: String =
            sqlx::query_scalar("SELECT category_group FROM master_sku WHERE sku = 'SKU-1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(group, "JEWELRY");
    }
}

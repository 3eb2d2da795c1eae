//! Database initialization and destructive reset
//!
//! The store is reporting-only: process start performs a destructive
//! reset-and-reload so the tables always reflect exactly the current source
//! snapshot. A reset failure is fatal; the process must not serve from a
//! half-initialized store.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::table_schemas::{MasterSkuTableSchema, OrderLinesTableSchema, TableSchema};
use crate::Result;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Connection options apply to every connection the pool opens. Foreign
    // keys stay advisory for the fact->dimension link; the join is
    // best-effort and unmatched SKUs must be loadable.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(false)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_all_tables(&pool).await?;

    Ok(pool)
}

/// Idempotently ensure both canonical tables exist with the registry's shape
pub async fn create_all_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(&MasterSkuTableSchema::create_table_sql())
        .execute(pool)
        .await?;
    sqlx::query(&OrderLinesTableSchema::create_table_sql())
        .execute(pool)
        .await?;
    Ok(())
}

/// Destructively drop and recreate both canonical tables.
///
/// Used at process start to guarantee a clean load. The caller treats a
/// failure here as fatal.
pub async fn reset_and_initialize(pool: &SqlitePool) -> Result<()> {
    sqlx::query(&format!(
        "DROP TABLE IF EXISTS {}",
        OrderLinesTableSchema::table_name()
    ))
    .execute(pool)
    .await?;
    sqlx::query(&format!(
        "DROP TABLE IF EXISTS {}",
        MasterSkuTableSchema::table_name()
    ))
    .execute(pool)
    .await?;

    create_all_tables(pool).await?;
    info!("Canonical store reset: tables dropped and recreated");
    Ok(())
}

//! Canonical store: SQLite persistence for the normalized fact and dimension tables

pub mod init;
pub mod load;
pub mod query;
pub mod table_schemas;

pub use init::{init_database, reset_and_initialize};
pub use load::bulk_load;
pub use query::{fetch_joined_facts, JoinedFactRecord};
pub use table_schemas::{ColumnDefinition, MasterSkuTableSchema, OrderLinesTableSchema, TableSchema};

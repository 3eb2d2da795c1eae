//! # Salesdash Common Library
//!
//! Shared code for the salesdash services including:
//! - Error types
//! - Configuration loading and data-folder resolution
//! - Declarative table schemas (schema registry)
//! - Canonical SQLite store (init, destructive reset, bulk load, joined fetch)
//! - Raw tabular value model used by the source loaders

pub mod config;
pub mod db;
pub mod error;
pub mod table;

pub use error::{Error, Result};
pub use table::{RawTable, Value};

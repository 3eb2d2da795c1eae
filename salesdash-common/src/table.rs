//! Raw tabular value model
//!
//! Every raw source (CSV export or remote order-system response) is read into
//! a `RawTable` before anything downstream touches it. The table is untyped at
//! read time; `normalize()` applies the load-boundary cleanup contract:
//!
//! - column names are trimmed of surrounding whitespace
//! - blank / whitespace-only cells become `Value::Null`
//! - a column where at least one cell parses as a number is coerced to
//!   numeric column-wide, with per-cell fallback to `Value::Null`
//! - all other columns are text, with each value whitespace-trimmed

use serde::Serialize;

use crate::{Error, Result};

/// A single cell of a raw table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Number(f64),
}

impl Value {
    /// Text content, if this is a text cell
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric content; text cells are not re-parsed here
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric content truncated to an integer
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().map(|n| n as i64)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// One named, untyped table read from a raw source
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Source name, used in error messages ("sale_order_line", "master_sku", ...)
    pub name: String,
    /// Column headers in source order, trimmed
    pub columns: Vec<String>,
    /// Row-major cells; every row has `columns.len()` cells
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
    /// Create an empty table; headers are trimmed immediately
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(|c| c.trim().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; the row must match the header arity
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::Internal(format!(
                "row with {} cells pushed into '{}' ({} columns)",
                row.len(),
                self.name,
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by (trimmed) header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of a column that must exist
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| Error::MissingColumn {
            source_name: self.name.clone(),
            column: name.to_string(),
        })
    }

    /// Cell accessor; `Value::Null` for out-of-range coordinates
    pub fn cell(&self, row: usize, col: usize) -> &Value {
        static NULL: Value = Value::Null;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&NULL)
    }

    /// Apply the load-boundary normalization contract (see module docs)
    pub fn normalize(&mut self) {
        // Pass 1: blank -> Null, trim text
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                if let Value::Text(s) = cell {
                    let trimmed = s.trim();
                    if trimmed.is_empty() {
                        *cell = Value::Null;
                    } else if trimmed.len() != s.len() {
                        *cell = Value::Text(trimmed.to_string());
                    }
                }
            }
        }

        // Pass 2: column-wide numeric coercion when any cell is numeric
        for col in 0..self.columns.len() {
            let any_numeric = self.rows.iter().any(|row| match &row[col] {
                Value::Number(_) => true,
                Value::Text(s) => s.parse::<f64>().is_ok(),
                Value::Null => false,
            });
            if !any_numeric {
                continue;
            }
            for row in &mut self.rows {
                row[col] = match &row[col] {
                    Value::Number(n) => Value::Number(*n),
                    Value::Text(s) => match s.parse::<f64>() {
                        Ok(n) => Value::Number(n),
                        Err(_) => Value::Null,
                    },
                    Value::Null => Value::Null,
                };
            }
        }
    }
}

//! Reconciliation engine
//!
//! Turns the canonical store's joined rows into the typed fact table the rest
//! of the pipeline consumes: storage fields renamed into the display
//! vocabulary, free-form date strings parsed (invalid values degrade to
//! null), order status normalized, and the trade-show membership flag derived
//! from the allowlist side file.
//!
//! Output is deterministic for a given store snapshot and allowlist file, and
//! immutable from the caller's perspective.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use salesdash_common::db::table_schemas::{
    display_name, MasterSkuTableSchema, OrderLinesTableSchema, TableSchema,
};
use salesdash_common::db::{fetch_joined_facts, JoinedFactRecord};
use salesdash_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::warn;

use crate::ingest::load_allowlist;
use crate::types::{FactRow, FactTable, OrderStatus};

/// Date formats accepted from the raw exports, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%Y/%m/%d"];

/// Parse a free-form date string; anything unparseable becomes None.
///
/// Datetime values ("2025-01-21 14:30:00") are accepted by parsing their
/// date portion.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let date_part = raw.split_whitespace().next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Every storage field of the canonical store must map to exactly one display
/// name; an unmapped field is a configuration error, not a silent skip.
pub fn verify_display_vocabulary() -> Result<()> {
    for col in OrderLinesTableSchema::expected_columns()
        .into_iter()
        .chain(MasterSkuTableSchema::expected_columns())
    {
        if display_name(col.name).is_none() {
            return Err(Error::Config(format!(
                "storage field '{}' has no display name",
                col.name
            )));
        }
    }
    Ok(())
}

/// Produce the canonical joined fact table.
///
/// The trade-show allowlist file is optional: absence yields
/// `trade_show = false` for every row with a logged warning.
pub async fn reconcile(pool: &SqlitePool, trade_show_allowlist: &Path) -> Result<FactTable> {
    verify_display_vocabulary()?;

    let records = fetch_joined_facts(pool).await?;

    let allowlist: HashSet<String> = match load_allowlist("trade_show", trade_show_allowlist) {
        Ok(refs) => refs,
        Err(e) => {
            warn!(
                "Trade-show allowlist unavailable ({}); trade_show = false for all rows",
                e
            );
            HashSet::new()
        }
    };

    Ok(records
        .into_iter()
        .map(|record| into_fact_row(record, &allowlist))
        .collect())
}

fn into_fact_row(record: JoinedFactRecord, trade_show_refs: &HashSet<String>) -> FactRow {
    let trade_show = trade_show_refs.contains(&record.order_reference);
    FactRow {
        created_on: parse_date(record.created_on.as_deref()),
        sales_date: parse_date(record.sales_date.as_deref()),
        delivery_date: parse_date(record.delivery_date.as_deref()),
        order_reference: record.order_reference,
        sales_team: record.sales_team,
        salesperson: record.salesperson,
        customer: record.customer,
        state: record.state,
        sku: record.sku,
        product: record.product,
        collection: record.collection,
        product_template: record.product_template,
        product_category: record.product_category,
        fabric_sku: record.fabric_sku,
        fabric_type: record.fabric_type,
        quantity: record.quantity.unwrap_or(0.0) as i64,
        subtotal: record.subtotal.unwrap_or(0.0),
        total_cost: record.total_cost.unwrap_or(0.0),
        unit_cost: record.unit_cost.unwrap_or(0.0),
        unit_price: record.unit_price.unwrap_or(0.0),
        order_status: OrderStatus::from_raw(record.order_status.as_deref()),
        invoice_status: record.invoice_status,
        delivery_status: record.delivery_status,
        total_tax: record.total_tax.unwrap_or(0.0),
        sku_parent: record.sku_parent,
        category_group: record.category_group,
        master_category: record.master_category,
        sub_category: record.sub_category,
        lifecycle_status: record.lifecycle_status,
        trade_show,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_date_shapes() {
        assert_eq!(
            parse_date(Some("2025-01-21")),
            NaiveDate::from_ymd_opt(2025, 1, 21)
        );
        assert_eq!(
            parse_date(Some("01/21/2025")),
            NaiveDate::from_ymd_opt(2025, 1, 21)
        );
        assert_eq!(
            parse_date(Some("2025-01-21 14:30:00")),
            NaiveDate::from_ymd_opt(2025, 1, 21)
        );
    }

    #[test]
    fn invalid_dates_become_null() {
        assert_eq!(parse_date(Some("not a date")), None);
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(None), None);
        assert_eq!(parse_date(Some("2025-13-45")), None);
    }

    #[test]
    fn display_vocabulary_is_total() {
        verify_display_vocabulary().unwrap();
    }
}

//! Core fact-table types shared across the pipeline

use chrono::NaiveDate;
use serde::Serialize;

/// Order lifecycle state: the sole flag separating committed revenue from
/// quotations in every aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Committed / fulfilled order
    Sale,
    /// Quotation, not yet committed revenue
    Draft,
    /// Anything else the source emits; never counted as revenue
    Other,
}

impl OrderStatus {
    /// Normalize a raw status string (case- and whitespace-insensitive)
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("sale") => OrderStatus::Sale,
            Some("draft") => OrderStatus::Draft,
            _ => OrderStatus::Other,
        }
    }
}

/// One canonical, reconciled order line: fact columns joined against the SKU
/// dimension, with derived membership flags attached.
///
/// Rows keep the canonical store's stable insertion order; every downstream
/// tie-break depends on it.
#[derive(Debug, Clone, Serialize)]
pub struct FactRow {
    pub order_reference: String,
    pub created_on: Option<NaiveDate>,
    pub sales_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub sales_team: Option<String>,
    pub salesperson: Option<String>,
    pub customer: Option<String>,
    pub state: Option<String>,
    pub sku: String,
    pub product: Option<String>,
    pub collection: Option<String>,
    pub product_template: Option<String>,
    pub product_category: Option<String>,
    pub fabric_sku: Option<String>,
    pub fabric_type: Option<String>,
    pub quantity: i64,
    pub subtotal: f64,
    pub total_cost: f64,
    pub unit_cost: f64,
    pub unit_price: f64,
    pub order_status: OrderStatus,
    pub invoice_status: Option<String>,
    pub delivery_status: Option<String>,
    pub total_tax: f64,
    // Enrichment from the SKU dimension (None when the SKU is unmatched)
    pub sku_parent: Option<String>,
    pub category_group: Option<String>,
    pub master_category: Option<String>,
    pub sub_category: Option<String>,
    pub lifecycle_status: Option<String>,
    /// Derived: order reference appears in the trade-show allowlist
    pub trade_show: bool,
}

impl FactRow {
    pub fn is_sale(&self) -> bool {
        self.order_status == OrderStatus::Sale
    }

    pub fn is_draft(&self) -> bool {
        self.order_status == OrderStatus::Draft
    }
}

/// The canonical joined fact table produced by reconciliation
pub type FactTable = Vec<FactRow>;

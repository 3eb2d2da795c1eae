//! Shared test fixtures for pipeline and aggregate tests

use chrono::NaiveDate;

use crate::types::{FactRow, OrderStatus};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A fully-populated fact row with sensible defaults; tests mutate the
/// fields they care about.
pub fn fact(
    reference: &str,
    sku: &str,
    status: OrderStatus,
    quantity: i64,
    subtotal: f64,
    total_cost: f64,
) -> FactRow {
    FactRow {
        order_reference: reference.to_string(),
        created_on: None,
        sales_date: None,
        delivery_date: None,
        sales_team: Some("Wholesale".to_string()),
        salesperson: None,
        customer: None,
        state: None,
        sku: sku.to_string(),
        product: Some(format!("Product {sku}")),
        collection: None,
        product_template: None,
        product_category: None,
        fabric_sku: None,
        fabric_type: None,
        quantity,
        subtotal,
        total_cost,
        unit_cost: if quantity > 0 {
            total_cost / quantity as f64
        } else {
            0.0
        },
        unit_price: if quantity > 0 {
            subtotal / quantity as f64
        } else {
            0.0
        },
        order_status: status,
        invoice_status: None,
        delivery_status: None,
        total_tax: 0.0,
        sku_parent: None,
        category_group: None,
        master_category: None,
        sub_category: None,
        lifecycle_status: None,
        trade_show: false,
    }
}

/// Shorthand for a committed sale row
pub fn sale(reference: &str, sku: &str, quantity: i64, subtotal: f64, total_cost: f64) -> FactRow {
    fact(reference, sku, OrderStatus::Sale, quantity, subtotal, total_cost)
}

/// Shorthand for a quotation row
pub fn draft(reference: &str, sku: &str, quantity: i64, subtotal: f64, total_cost: f64) -> FactRow {
    fact(reference, sku, OrderStatus::Draft, quantity, subtotal, total_cost)
}

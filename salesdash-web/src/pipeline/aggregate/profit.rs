//! Per-product profitability

use serde::Serialize;

use super::{margin_percent, round2};
use crate::types::FactRow;

/// One SKU's profitability line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductProfit {
    pub sku: String,
    pub units_sold: i64,
    pub total_revenue: f64,
    pub total_cost: f64,
    /// `(revenue - cost) / revenue * 100`, 0 when revenue is 0
    pub profit_margin_percent: f64,
    pub lifecycle_status: Option<String>,
    pub collection: Option<String>,
}

#[derive(Default)]
struct ProfitAccumulator {
    units: i64,
    revenue: f64,
    cost: f64,
    lifecycle_status: Option<String>,
    collection: Option<String>,
}

/// Profit margin per SKU over sale rows, sorted by revenue descending.
///
/// Dimension attributes come from the first row seen for each SKU. Zero
/// revenue (including free or comped units) yields a 0 margin rather than
/// a non-finite value.
pub fn product_profit(rows: &[FactRow]) -> Vec<ProductProfit> {
    let mut groups: super::OrderedGroups<ProfitAccumulator> = super::OrderedGroups::new();
    for row in rows {
        if !row.is_sale() {
            continue;
        }
        let acc = groups.entry(&row.sku);
        acc.units += row.quantity;
        acc.revenue += row.subtotal;
        acc.cost += row.total_cost;
        if acc.lifecycle_status.is_none() {
            acc.lifecycle_status = row.lifecycle_status.clone();
        }
        if acc.collection.is_none() {
            acc.collection = row.collection.clone();
        }
    }

    let mut lines: Vec<ProductProfit> = groups
        .entries
        .into_iter()
        .map(|(sku, acc)| ProductProfit {
            sku,
            units_sold: acc.units,
            total_revenue: round2(acc.revenue),
            total_cost: round2(acc.cost),
            profit_margin_percent: margin_percent(acc.revenue, acc.cost),
            lifecycle_status: acc.lifecycle_status,
            collection: acc.collection,
        })
        .collect();
    lines.sort_by(|a, b| {
        b.total_revenue
            .partial_cmp(&a.total_revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    lines
}

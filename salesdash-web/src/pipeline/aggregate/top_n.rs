//! Ranked dimension totals

use serde::Serialize;

use super::{round2, OrderedGroups};
use crate::types::FactRow;

/// One ranked row: a dimension value with its summed quantity and revenue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionTotals {
    pub key: String,
    pub quantity: i64,
    pub revenue: f64,
}

#[derive(Default)]
struct Totals {
    quantity: i64,
    revenue: f64,
}

/// Rank sale rows by summed subtotal along an arbitrary dimension.
///
/// Rows where the key extractor yields `None` are skipped. The sort is
/// stable, so revenue ties keep first-encounter row order. Fewer than `n`
/// distinct keys returns them all.
pub fn top_n_by<F>(rows: &[FactRow], key: F, n: usize) -> Vec<DimensionTotals>
where
    F: Fn(&FactRow) -> Option<&str>,
{
    let mut groups: OrderedGroups<Totals> = OrderedGroups::new();
    for row in rows {
        if !row.is_sale() {
            continue;
        }
        if let Some(k) = key(row) {
            let totals = groups.entry(k);
            totals.quantity += row.quantity;
            totals.revenue += row.subtotal;
        }
    }

    let mut ranked: Vec<DimensionTotals> = groups
        .entries
        .into_iter()
        .map(|(key, t)| DimensionTotals {
            key,
            quantity: t.quantity,
            revenue: round2(t.revenue),
        })
        .collect();
    ranked.sort_by(|a, b| b.revenue.partial_cmp(&a.revenue).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(n);
    ranked
}

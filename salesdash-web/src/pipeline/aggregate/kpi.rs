//! Headline KPI bundle and the recap statistics block

use serde::Serialize;

use super::{round2, safe_div, OrderedGroups};
use crate::types::FactRow;

/// The sentinel when no row exists to rank a top seller from
pub const NO_TOP_SKU: &str = "N/A";

/// Headline figures shown at the top of every channel view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiBundle {
    /// Distinct order references across all rows, any status
    pub total_orders: u64,
    /// Sum of subtotals over sale rows
    pub total_revenue_sold: f64,
    /// Sum of subtotals over draft rows
    pub total_revenue_quotation: f64,
    /// Mean of per-order sale-row subtotal sums
    pub avg_order_value: f64,
    /// SKU with the highest summed quantity across all rows, any status
    pub top_selling_sku: String,
}

/// Compute the KPI bundle for one channel subset.
///
/// An empty subset yields all-zero figures and the `N/A` top seller rather
/// than an error. The top seller ranks every row regardless of status; ties
/// on quantity break toward the first-encountered SKU in row order.
pub fn kpi_bundle(rows: &[FactRow]) -> KpiBundle {
    let mut references = std::collections::HashSet::new();
    let mut revenue_sold = 0.0;
    let mut revenue_quotation = 0.0;
    let mut order_values: OrderedGroups<f64> = OrderedGroups::new();
    let mut sku_quantities: OrderedGroups<i64> = OrderedGroups::new();

    for row in rows {
        references.insert(row.order_reference.as_str());
        *sku_quantities.entry(&row.sku) += row.quantity;
        if row.is_sale() {
            revenue_sold += row.subtotal;
            *order_values.entry(&row.order_reference) += row.subtotal;
        } else if row.is_draft() {
            revenue_quotation += row.subtotal;
        }
    }

    let order_count = order_values.entries.len();
    let avg_order_value = safe_div(
        order_values.entries.iter().map(|(_, v)| v).sum(),
        order_count as f64,
    );

    // strict > keeps the first-encountered SKU on quantity ties
    let mut top: Option<(&String, i64)> = None;
    for (sku, qty) in &sku_quantities.entries {
        if top.map_or(true, |(_, best)| *qty > best) {
            top = Some((sku, *qty));
        }
    }
    let top_selling_sku = top
        .map(|(sku, _)| sku.clone())
        .unwrap_or_else(|| NO_TOP_SKU.to_string());

    KpiBundle {
        total_orders: references.len() as u64,
        total_revenue_sold: round2(revenue_sold),
        total_revenue_quotation: round2(revenue_quotation),
        avg_order_value: round2(avg_order_value),
        top_selling_sku,
    }
}

/// Recap block: the event-style statistics table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecapStats {
    pub total_orders: u64,
    pub total_units: i64,
    pub total_cost: f64,
    pub total_revenue: f64,
    /// Average unit revenue across sale rows (revenue / units)
    pub avg_unit_revenue: f64,
    pub total_quotations: u64,
    pub revenue_in_quotations: f64,
}

/// Recap statistics over one channel subset.
///
/// Orders, units, cost, revenue and AUR come from sale rows only;
/// quotation counts and revenue come from draft rows.
pub fn recap_stats(rows: &[FactRow]) -> RecapStats {
    let mut sale_refs = std::collections::HashSet::new();
    let mut draft_refs = std::collections::HashSet::new();
    let mut units = 0i64;
    let mut cost = 0.0;
    let mut revenue = 0.0;
    let mut quotation_revenue = 0.0;

    for row in rows {
        if row.is_sale() {
            sale_refs.insert(row.order_reference.as_str());
            units += row.quantity;
            cost += row.total_cost;
            revenue += row.subtotal;
        } else if row.is_draft() {
            draft_refs.insert(row.order_reference.as_str());
            quotation_revenue += row.subtotal;
        }
    }

    RecapStats {
        total_orders: sale_refs.len() as u64,
        total_units: units,
        total_cost: round2(cost),
        total_revenue: round2(revenue),
        avg_unit_revenue: round2(safe_div(revenue, units as f64)),
        total_quotations: draft_refs.len() as u64,
        revenue_in_quotations: round2(quotation_revenue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{draft, sale};

    #[test]
    fn kpis_separate_sold_from_quotation_revenue() {
        let rows = vec![
            sale("S001", "A-1", 2, 200.0, 80.0),
            sale("S001", "A-2", 1, 100.0, 40.0),
            sale("S002", "A-1", 3, 300.0, 120.0),
            draft("Q001", "A-3", 5, 999.0, 500.0),
        ];
        let kpis = kpi_bundle(&rows);
        assert_eq!(kpis.total_orders, 3); // S001, S002, Q001
        assert_eq!(kpis.total_revenue_sold, 600.0);
        assert_eq!(kpis.total_revenue_quotation, 999.0);
        // per-order sale sums: S001=300, S002=300
        assert_eq!(kpis.avg_order_value, 300.0);
        assert_eq!(kpis.top_selling_sku, "A-1");
    }

    #[test]
    fn top_sku_ranks_all_statuses() {
        // the draft quantity outranks the sale quantity
        let rows = vec![
            sale("S001", "A-1", 2, 200.0, 80.0),
            draft("Q001", "A-3", 5, 999.0, 500.0),
        ];
        assert_eq!(kpi_bundle(&rows).top_selling_sku, "A-3");
    }

    #[test]
    fn empty_subset_yields_zeros_and_sentinel() {
        let kpis = kpi_bundle(&[]);
        assert_eq!(kpis.total_orders, 0);
        assert_eq!(kpis.total_revenue_sold, 0.0);
        assert_eq!(kpis.avg_order_value, 0.0);
        assert_eq!(kpis.top_selling_sku, NO_TOP_SKU);
    }

    #[test]
    fn top_sku_ties_break_to_first_seen() {
        let rows = vec![
            sale("S001", "B-1", 4, 10.0, 5.0),
            sale("S002", "B-2", 4, 10.0, 5.0),
        ];
        assert_eq!(kpi_bundle(&rows).top_selling_sku, "B-1");
    }

    #[test]
    fn quotation_only_subset_has_zero_aov() {
        let rows = vec![draft("Q001", "A-1", 1, 50.0, 20.0)];
        let kpis = kpi_bundle(&rows);
        assert_eq!(kpis.total_orders, 1);
        assert_eq!(kpis.avg_order_value, 0.0);
    }

    #[test]
    fn recap_splits_sale_and_draft_sides() {
        let rows = vec![
            sale("S001", "A-1", 2, 200.0, 80.0),
            sale("S002", "A-2", 2, 100.0, 40.0),
            draft("Q001", "A-1", 1, 75.0, 30.0),
        ];
        let recap = recap_stats(&rows);
        assert_eq!(recap.total_orders, 2);
        assert_eq!(recap.total_units, 4);
        assert_eq!(recap.total_cost, 120.0);
        assert_eq!(recap.total_revenue, 300.0);
        assert_eq!(recap.avg_unit_revenue, 75.0);
        assert_eq!(recap.total_quotations, 1);
        assert_eq!(recap.revenue_in_quotations, 75.0);
    }

    #[test]
    fn recap_guards_zero_units() {
        let rows = vec![sale("S001", "A-1", 0, 0.0, 0.0)];
        let recap = recap_stats(&rows);
        assert_eq!(recap.avg_unit_revenue, 0.0);
    }
}

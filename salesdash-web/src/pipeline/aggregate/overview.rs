//! Catalog-wide overview aggregates

use std::collections::HashSet;

use serde::Serialize;

use super::top_n::{top_n_by, DimensionTotals};
use super::{round2, safe_div, OrderedGroups};
use crate::types::FactRow;

/// Fabric SKUs marked `A` are accessories placeholders, not real fabrics
const FABRIC_PLACEHOLDER: &str = "A";

/// One category group's productivity line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroupStats {
    pub group: String,
    /// Distinct SKUs that sold
    pub total_skus: u64,
    pub total_revenue: f64,
    /// Revenue per distinct SKU
    pub productivity_per_sku: f64,
}

#[derive(Default)]
struct GroupAccumulator {
    skus: HashSet<String>,
    revenue: f64,
}

/// Revenue and SKU productivity per category group over sale rows.
/// Ungrouped rows are excluded.
pub fn category_group_split(rows: &[FactRow]) -> Vec<CategoryGroupStats> {
    let mut groups: OrderedGroups<GroupAccumulator> = OrderedGroups::new();
    for row in rows {
        if !row.is_sale() {
            continue;
        }
        let Some(group) = row.category_group.as_deref() else { continue };
        let acc = groups.entry(group);
        acc.skus.insert(row.sku.clone());
        acc.revenue += row.subtotal;
    }
    groups
        .entries
        .into_iter()
        .map(|(group, acc)| {
            let total_skus = acc.skus.len() as u64;
            CategoryGroupStats {
                group,
                total_skus,
                total_revenue: round2(acc.revenue),
                productivity_per_sku: round2(safe_div(acc.revenue, total_skus as f64)),
            }
        })
        .collect()
}

/// Top parent SKUs within one category group, ranked by sale revenue
pub fn top_parents_for_group(rows: &[FactRow], group: &str, n: usize) -> Vec<DimensionTotals> {
    top_n_by(
        rows,
        |row| {
            if row.category_group.as_deref() == Some(group) {
                row.sku_parent.as_deref()
            } else {
                None
            }
        },
        n,
    )
}

/// One lifecycle status' share of sale revenue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleShare {
    pub status: String,
    pub revenue: f64,
    pub share_percent: f64,
}

/// How sale revenue distributes across lifecycle statuses. Rows without a
/// status are excluded from both the lines and the denominator.
pub fn lifecycle_distribution(rows: &[FactRow]) -> Vec<LifecycleShare> {
    let mut groups: OrderedGroups<f64> = OrderedGroups::new();
    for row in rows {
        if !row.is_sale() {
            continue;
        }
        let Some(status) = row.lifecycle_status.as_deref() else { continue };
        *groups.entry(status) += row.subtotal;
    }
    let total: f64 = groups.entries.iter().map(|(_, v)| v).sum();
    groups
        .entries
        .into_iter()
        .map(|(status, revenue)| LifecycleShare {
            status,
            revenue: round2(revenue),
            share_percent: round2(safe_div(revenue, total) * 100.0),
        })
        .collect()
}

/// Sale quantity and revenue per fabric SKU, ranked by revenue. The `A`
/// placeholder and rows without a fabric are excluded.
pub fn fabric_summary(rows: &[FactRow], n: usize) -> Vec<DimensionTotals> {
    top_n_by(
        rows,
        |row| match row.fabric_sku.as_deref() {
            Some(FABRIC_PLACEHOLDER) | None => None,
            Some(fabric) => Some(fabric),
        },
        n,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sale;
    use crate::types::FactRow;

    fn grouped(mut row: FactRow, group: &str) -> FactRow {
        row.category_group = Some(group.to_string());
        row
    }

    #[test]
    fn split_counts_distinct_skus_per_group() {
        let rows = vec![
            grouped(sale("S001", "A-1", 1, 100.0, 40.0), "Clothing"),
            grouped(sale("S002", "A-1", 1, 100.0, 40.0), "Clothing"),
            grouped(sale("S003", "A-2", 1, 200.0, 80.0), "Clothing"),
            grouped(sale("S004", "B-1", 1, 50.0, 20.0), "Jewelry"),
        ];
        let split = category_group_split(&rows);
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].group, "Clothing");
        assert_eq!(split[0].total_skus, 2);
        assert_eq!(split[0].total_revenue, 400.0);
        assert_eq!(split[0].productivity_per_sku, 200.0);
    }

    #[test]
    fn top_parents_only_consider_the_requested_group() {
        let mut a = grouped(sale("S001", "A-1", 1, 100.0, 40.0), "Clothing");
        a.sku_parent = Some("P-CLOTH".to_string());
        let mut b = grouped(sale("S002", "B-1", 1, 500.0, 200.0), "Jewelry");
        b.sku_parent = Some("P-JEWEL".to_string());

        let top = top_parents_for_group(&[a, b], "Clothing", 10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].key, "P-CLOTH");
    }

    #[test]
    fn lifecycle_shares_sum_to_one_hundred() {
        let mut a = sale("S001", "A-1", 1, 300.0, 100.0);
        a.lifecycle_status = Some("Core".to_string());
        let mut b = sale("S002", "A-2", 1, 100.0, 40.0);
        b.lifecycle_status = Some("Discontinued".to_string());

        let shares = lifecycle_distribution(&[a, b]);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].share_percent, 75.0);
        assert_eq!(shares[1].share_percent, 25.0);
    }

    #[test]
    fn fabric_summary_excludes_the_placeholder() {
        let mut real = sale("S001", "A-1", 2, 100.0, 40.0);
        real.fabric_sku = Some("LINEN-01".to_string());
        let mut placeholder = sale("S002", "A-2", 1, 900.0, 400.0);
        placeholder.fabric_sku = Some("A".to_string());
        let missing = sale("S003", "A-3", 1, 50.0, 20.0);

        let summary = fabric_summary(&[real, placeholder, missing], 10);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].key, "LINEN-01");
        assert_eq!(summary[0].quantity, 2);
    }
}

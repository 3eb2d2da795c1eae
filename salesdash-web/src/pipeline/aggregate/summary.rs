//! Category summary, category-group pivot and sales-rep breakout

use std::collections::HashSet;

use serde::Serialize;

use super::{round2, safe_div, OrderedGroups};
use crate::types::FactRow;

/// One category line in the summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: String,
    pub quantity: i64,
    pub revenue: f64,
    /// Average unit revenue (revenue / quantity), 0 when quantity is 0
    pub avg_unit_revenue: f64,
    pub percent_of_revenue: f64,
}

/// Category summary with its synthesized Total row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub rows: Vec<CategoryRow>,
    pub total: CategoryRow,
}

#[derive(Default)]
struct QtyRevenue {
    quantity: i64,
    revenue: f64,
}

/// Per-category quantity, revenue, AUR and revenue share over sale rows.
///
/// Rows without a category are left out of both the lines and the total.
/// The Total row reports 100% share except when overall revenue is zero.
pub fn category_summary(rows: &[FactRow]) -> CategorySummary {
    let mut groups: OrderedGroups<QtyRevenue> = OrderedGroups::new();
    for row in rows {
        if !row.is_sale() {
            continue;
        }
        let Some(category) = row.product_category.as_deref() else { continue };
        let acc = groups.entry(category);
        acc.quantity += row.quantity;
        acc.revenue += row.subtotal;
    }

    let total_quantity: i64 = groups.entries.iter().map(|(_, g)| g.quantity).sum();
    let total_revenue: f64 = groups.entries.iter().map(|(_, g)| g.revenue).sum();

    let lines = groups
        .entries
        .iter()
        .map(|(category, g)| CategoryRow {
            category: category.clone(),
            quantity: g.quantity,
            revenue: round2(g.revenue),
            avg_unit_revenue: round2(safe_div(g.revenue, g.quantity as f64)),
            percent_of_revenue: round2(safe_div(g.revenue, total_revenue) * 100.0),
        })
        .collect();

    CategorySummary {
        rows: lines,
        total: CategoryRow {
            category: "Total".to_string(),
            quantity: total_quantity,
            revenue: round2(total_revenue),
            avg_unit_revenue: round2(safe_div(total_revenue, total_quantity as f64)),
            percent_of_revenue: if total_revenue == 0.0 { 0.0 } else { 100.0 },
        },
    }
}

/// Revenue pivot with row and column totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    /// Row dimension values (category groups), first-encounter order
    pub row_keys: Vec<String>,
    /// Column dimension values (lifecycle statuses), first-encounter order
    pub col_keys: Vec<String>,
    /// `cells[r][c]` is revenue for `(row_keys[r], col_keys[c])`
    pub cells: Vec<Vec<f64>>,
    pub row_totals: Vec<f64>,
    pub col_totals: Vec<f64>,
    pub grand_total: f64,
}

/// Sale revenue pivoted by category group (rows) against lifecycle status
/// (columns). Rows missing either dimension are excluded.
pub fn category_group_pivot(rows: &[FactRow]) -> PivotTable {
    let mut row_keys: Vec<String> = Vec::new();
    let mut col_keys: Vec<String> = Vec::new();
    let mut sums: std::collections::HashMap<(usize, usize), f64> =
        std::collections::HashMap::new();

    let index_of = |keys: &mut Vec<String>, value: &str| -> usize {
        match keys.iter().position(|k| k == value) {
            Some(idx) => idx,
            None => {
                keys.push(value.to_string());
                keys.len() - 1
            }
        }
    };

    for row in rows {
        if !row.is_sale() {
            continue;
        }
        let (Some(group), Some(status)) =
            (row.category_group.as_deref(), row.lifecycle_status.as_deref())
        else {
            continue;
        };
        let r = index_of(&mut row_keys, group);
        let c = index_of(&mut col_keys, status);
        *sums.entry((r, c)).or_default() += row.subtotal;
    }

    let mut cells = vec![vec![0.0; col_keys.len()]; row_keys.len()];
    for ((r, c), revenue) in sums {
        cells[r][c] = round2(revenue);
    }

    let row_totals: Vec<f64> = cells
        .iter()
        .map(|row| round2(row.iter().sum()))
        .collect();
    let col_totals: Vec<f64> = (0..col_keys.len())
        .map(|c| round2(cells.iter().map(|row| row[c]).sum()))
        .collect();
    let grand_total = round2(row_totals.iter().sum());

    PivotTable {
        row_keys,
        col_keys,
        cells,
        row_totals,
        col_totals,
        grand_total,
    }
}

/// One salesperson's line in the breakout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepRow {
    pub salesperson: String,
    /// Distinct order references, any status
    pub orders: u64,
    /// Revenue on rows not yet committed (anything except sale)
    pub quotation_revenue: f64,
    pub sale_revenue: f64,
    pub total_revenue: f64,
}

/// Sales-rep breakout with its synthesized Total row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepSummary {
    pub rows: Vec<RepRow>,
    pub total: RepRow,
}

#[derive(Default)]
struct RepAccumulator {
    references: HashSet<String>,
    quotation_revenue: f64,
    sale_revenue: f64,
}

/// Per-salesperson order counts and revenue split. Rows without a
/// salesperson are excluded.
pub fn sales_rep_breakout(rows: &[FactRow]) -> RepSummary {
    let mut groups: OrderedGroups<RepAccumulator> = OrderedGroups::new();
    for row in rows {
        let Some(rep) = row.salesperson.as_deref() else { continue };
        let acc = groups.entry(rep);
        acc.references.insert(row.order_reference.clone());
        if row.is_sale() {
            acc.sale_revenue += row.subtotal;
        } else {
            acc.quotation_revenue += row.subtotal;
        }
    }

    let mut all_references = HashSet::new();
    let mut total_quotation = 0.0;
    let mut total_sale = 0.0;
    let lines: Vec<RepRow> = groups
        .entries
        .iter()
        .map(|(rep, acc)| {
            all_references.extend(acc.references.iter().cloned());
            total_quotation += acc.quotation_revenue;
            total_sale += acc.sale_revenue;
            RepRow {
                salesperson: rep.clone(),
                orders: acc.references.len() as u64,
                quotation_revenue: round2(acc.quotation_revenue),
                sale_revenue: round2(acc.sale_revenue),
                total_revenue: round2(acc.quotation_revenue + acc.sale_revenue),
            }
        })
        .collect();

    RepSummary {
        rows: lines,
        total: RepRow {
            salesperson: "Total".to_string(),
            orders: all_references.len() as u64,
            quotation_revenue: round2(total_quotation),
            sale_revenue: round2(total_sale),
            total_revenue: round2(total_quotation + total_sale),
        },
    }
}

//! Aggregation library
//!
//! Pure functions from a fact subset to a summary structure. Shared numeric
//! policies live here: every ratio guards division by zero, non-finite
//! results collapse to 0.0, and percentages are rounded to two decimals.
//! Every function has a documented empty result; none of them raise on an
//! empty subset.

pub mod customers;
pub mod geo;
pub mod kpi;
pub mod overview;
pub mod profit;
pub mod summary;
pub mod timeseries;
pub mod top_n;

pub use customers::{customer_features, CustomerFeatures};
pub use geo::{state_rollup, StateRollup};
pub use kpi::{kpi_bundle, recap_stats, KpiBundle, RecapStats};
pub use overview::{
    category_group_split, fabric_summary, lifecycle_distribution, top_parents_for_group,
    CategoryGroupStats, LifecycleShare,
};
pub use profit::{product_profit, ProductProfit};
pub use summary::{
    category_group_pivot, category_summary, sales_rep_breakout, CategorySummary, PivotTable,
    RepSummary,
};
pub use timeseries::{delivery_distribution, weekly_revenue, DeliveryBucket, WeeklyRevenuePoint};
pub use top_n::{top_n_by, DimensionTotals};

/// Round to two decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Divide with the shared guard: zero denominator or non-finite result -> 0.0
pub(crate) fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let result = numerator / denominator;
    if result.is_finite() {
        result
    } else {
        0.0
    }
}

/// Profit margin percent: `(revenue - cost) / revenue * 100`, clamped to 0
/// when revenue is zero or the result is non-finite, rounded to two decimals.
pub(crate) fn margin_percent(revenue: f64, cost: f64) -> f64 {
    round2(safe_div(revenue - cost, revenue) * 100.0)
}

/// Accumulates per-key totals while remembering first-encounter order.
/// The underlying stable ordering is what breaks every tie downstream.
pub(crate) struct OrderedGroups<V> {
    index: std::collections::HashMap<String, usize>,
    pub entries: Vec<(String, V)>,
}

impl<V: Default> OrderedGroups<V> {
    pub fn new() -> Self {
        Self {
            index: std::collections::HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Mutable accessor for a key's accumulator, inserting on first sight
    pub fn entry(&mut self, key: &str) -> &mut V {
        let idx = match self.index.get(key) {
            Some(idx) => *idx,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), V::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_div_guards_zero_and_nonfinite() {
        assert_eq!(safe_div(10.0, 2.0), 5.0);
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(f64::NAN, 2.0), 0.0);
    }

    #[test]
    fn margin_is_zero_for_zero_revenue() {
        assert_eq!(margin_percent(0.0, 50.0), 0.0);
        assert_eq!(margin_percent(100.0, 40.0), 60.0);
        assert_eq!(margin_percent(3.0, 1.0), 66.67);
    }

    #[test]
    fn ordered_groups_preserve_first_encounter_order() {
        let mut groups: OrderedGroups<f64> = OrderedGroups::new();
        *groups.entry("b") += 1.0;
        *groups.entry("a") += 1.0;
        *groups.entry("b") += 1.0;
        let keys: Vec<&str> = groups.entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(groups.entries[0].1, 2.0);
    }
}

//! Per-customer feature extraction for segmentation

use std::collections::HashSet;

use serde::Serialize;

use super::{round2, safe_div, OrderedGroups};
use crate::types::FactRow;

/// Standardized (z-score) copies of the four behavioral features
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardizedFeatures {
    pub total_revenue: f64,
    pub order_frequency: f64,
    pub avg_order_value: f64,
    pub avg_markup_percent: f64,
}

/// One customer's behavioral feature vector, raw and standardized
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerFeatures {
    pub customer: String,
    pub total_revenue: f64,
    /// Distinct order references
    pub order_frequency: u64,
    pub avg_order_value: f64,
    /// Mean per-line initial markup: `(subtotal - cost) / subtotal * 100`
    pub avg_markup_percent: f64,
    pub standardized: StandardizedFeatures,
}

#[derive(Default)]
struct CustomerAccumulator {
    revenue: f64,
    references: HashSet<String>,
    markup_sum: f64,
    markup_count: u64,
}

fn z_scores(values: &[f64]) -> Vec<f64> {
    let n = values.len() as f64;
    if n == 0.0 {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / n;
    // population standard deviation; a zero spread standardizes to 0
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    values
        .iter()
        .map(|v| if std_dev == 0.0 { 0.0 } else { (v - mean) / std_dev })
        .collect()
}

/// Extract the per-customer feature matrix from sale rows.
///
/// Only rows with a customer name and a strictly positive subtotal
/// contribute; returns, comps and unnamed walk-ins would otherwise poison
/// the markup average. Standardization uses the population z-score, so a
/// feature with zero spread standardizes to all zeros.
pub fn customer_features(rows: &[FactRow]) -> Vec<CustomerFeatures> {
    let mut groups: OrderedGroups<CustomerAccumulator> = OrderedGroups::new();
    for row in rows {
        if !row.is_sale() || row.subtotal <= 0.0 {
            continue;
        }
        let Some(customer) = row.customer.as_deref() else { continue };
        let acc = groups.entry(customer);
        acc.revenue += row.subtotal;
        acc.references.insert(row.order_reference.clone());
        acc.markup_sum += safe_div(row.subtotal - row.total_cost, row.subtotal) * 100.0;
        acc.markup_count += 1;
    }

    let raw: Vec<(String, f64, u64, f64, f64)> = groups
        .entries
        .into_iter()
        .map(|(customer, acc)| {
            let frequency = acc.references.len() as u64;
            (
                customer,
                acc.revenue,
                frequency,
                safe_div(acc.revenue, frequency as f64),
                safe_div(acc.markup_sum, acc.markup_count as f64),
            )
        })
        .collect();

    let z_revenue = z_scores(&raw.iter().map(|r| r.1).collect::<Vec<_>>());
    let z_frequency = z_scores(&raw.iter().map(|r| r.2 as f64).collect::<Vec<_>>());
    let z_aov = z_scores(&raw.iter().map(|r| r.3).collect::<Vec<_>>());
    let z_markup = z_scores(&raw.iter().map(|r| r.4).collect::<Vec<_>>());

    raw.into_iter()
        .enumerate()
        .map(|(i, (customer, revenue, frequency, aov, markup))| CustomerFeatures {
            customer,
            total_revenue: round2(revenue),
            order_frequency: frequency,
            avg_order_value: round2(aov),
            avg_markup_percent: round2(markup),
            standardized: StandardizedFeatures {
                total_revenue: z_revenue[i],
                order_frequency: z_frequency[i],
                avg_order_value: z_aov[i],
                avg_markup_percent: z_markup[i],
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{draft, sale};
    use crate::types::FactRow;

    fn customer_row(mut row: FactRow, customer: &str) -> FactRow {
        row.customer = Some(customer.to_string());
        row
    }

    #[test]
    fn features_aggregate_per_customer() {
        let rows = vec![
            customer_row(sale("S001", "A-1", 1, 100.0, 50.0), "Beach Co"),
            customer_row(sale("S001", "A-2", 1, 100.0, 50.0), "Beach Co"),
            customer_row(sale("S002", "A-1", 1, 200.0, 50.0), "Beach Co"),
            customer_row(sale("S003", "A-1", 1, 80.0, 40.0), "Sand Ltd"),
        ];
        let features = customer_features(&rows);
        assert_eq!(features.len(), 2);
        let beach = &features[0];
        assert_eq!(beach.customer, "Beach Co");
        assert_eq!(beach.total_revenue, 400.0);
        assert_eq!(beach.order_frequency, 2);
        assert_eq!(beach.avg_order_value, 200.0);
        // markups: 50%, 50%, 75% -> mean 58.33
        assert_eq!(beach.avg_markup_percent, 58.33);
    }

    #[test]
    fn ineligible_rows_are_filtered() {
        let rows = vec![
            customer_row(sale("S001", "A-1", 1, 100.0, 50.0), "Beach Co"),
            customer_row(sale("S002", "A-1", 1, 0.0, 50.0), "Beach Co"), // comp
            customer_row(draft("Q001", "A-1", 1, 900.0, 400.0), "Beach Co"),
            sale("S003", "A-1", 1, 100.0, 50.0), // no customer
        ];
        let features = customer_features(&rows);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].total_revenue, 100.0);
        assert_eq!(features[0].order_frequency, 1);
    }

    #[test]
    fn z_scores_center_and_scale() {
        let scores = z_scores(&[10.0, 20.0, 30.0]);
        assert!((scores[1]).abs() < 1e-12);
        assert!((scores[0] + scores[2]).abs() < 1e-12);
        assert!(scores[2] > 0.0);
    }

    #[test]
    fn zero_spread_standardizes_to_zero() {
        let rows = vec![
            customer_row(sale("S001", "A-1", 1, 100.0, 50.0), "C1"),
            customer_row(sale("S002", "A-1", 1, 100.0, 50.0), "C2"),
        ];
        let features = customer_features(&rows);
        for f in &features {
            assert_eq!(f.standardized.total_revenue, 0.0);
            assert_eq!(f.standardized.avg_markup_percent, 0.0);
        }
    }
}

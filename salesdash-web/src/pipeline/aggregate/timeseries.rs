//! Weekly revenue trend and the delivery-date distribution

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::round2;
use crate::pipeline::channels::{ChannelId, ChannelSubset};
use crate::types::{FactRow, OrderStatus};

/// One point on the weekly revenue trend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRevenuePoint {
    /// Monday of the ISO week the revenue falls into
    pub week_start: NaiveDate,
    pub channel: ChannelId,
    pub revenue: f64,
}

/// Snap a date back to the Monday that starts its week
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Weekly sale revenue per channel, sorted by week then channel order.
///
/// Only sale rows with a sales date on or before `today` contribute; rows
/// dated in the future are excluded from the trend entirely. Weeks with no
/// revenue are absent rather than zero-filled.
pub fn weekly_revenue(subsets: &[&ChannelSubset], today: NaiveDate) -> Vec<WeeklyRevenuePoint> {
    let mut buckets: BTreeMap<(NaiveDate, ChannelId), f64> = BTreeMap::new();
    for subset in subsets {
        for row in &subset.rows {
            if !row.is_sale() {
                continue;
            }
            let Some(date) = row.sales_date else { continue };
            if date > today {
                continue;
            }
            *buckets
                .entry((week_start(date), subset.channel))
                .or_default() += row.subtotal;
        }
    }
    buckets
        .into_iter()
        .map(|((week, channel), revenue)| WeeklyRevenuePoint {
            week_start: week,
            channel,
            revenue: round2(revenue),
        })
        .collect()
}

/// Order flavor shown in the delivery distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Sale,
    Quotation,
}

/// One delivery-date bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryBucket {
    pub delivery_date: NaiveDate,
    pub category_group: String,
    pub order_type: OrderType,
    pub quantity: i64,
    pub revenue: f64,
}

/// Upcoming-workload distribution: quantity and revenue grouped by delivery
/// date, category group and order type, sorted by date.
///
/// Rows without a delivery date or category group are excluded, as are rows
/// whose status is neither sale nor draft.
pub fn delivery_distribution(rows: &[FactRow]) -> Vec<DeliveryBucket> {
    let mut buckets: BTreeMap<(NaiveDate, String, OrderType), (i64, f64)> = BTreeMap::new();
    for row in rows {
        let Some(date) = row.delivery_date else { continue };
        let Some(group) = row.category_group.as_deref() else { continue };
        let order_type = match row.order_status {
            OrderStatus::Sale => OrderType::Sale,
            OrderStatus::Draft => OrderType::Quotation,
            OrderStatus::Other => continue,
        };
        let bucket = buckets
            .entry((date, group.to_string(), order_type))
            .or_default();
        bucket.0 += row.quantity;
        bucket.1 += row.subtotal;
    }
    buckets
        .into_iter()
        .map(|((date, group, order_type), (quantity, revenue))| DeliveryBucket {
            delivery_date: date,
            category_group: group,
            order_type,
            quantity,
            revenue: round2(revenue),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, draft, sale};

    fn subset(channel: ChannelId, rows: Vec<FactRow>) -> ChannelSubset {
        ChannelSubset { channel, rows }
    }

    #[test]
    fn week_start_snaps_to_monday() {
        // 2026-08-27 is a Thursday
        assert_eq!(week_start(date(2026, 8, 27)), date(2026, 8, 24));
        assert_eq!(week_start(date(2026, 8, 24)), date(2026, 8, 24));
        assert_eq!(week_start(date(2026, 8, 30)), date(2026, 8, 24));
    }

    #[test]
    fn future_dated_rows_are_excluded_from_trend() {
        let mut current = sale("S001", "A-1", 1, 100.0, 40.0);
        current.sales_date = Some(date(2026, 8, 27));
        let mut future = sale("S002", "A-1", 1, 999.0, 400.0);
        future.sales_date = Some(date(2026, 9, 10));
        let mut undated = sale("S003", "A-1", 1, 50.0, 20.0);
        undated.sales_date = None;

        let ws = subset(ChannelId::Wholesale, vec![current, future, undated]);
        let trend = weekly_revenue(&[&ws], date(2026, 8, 30));
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].week_start, date(2026, 8, 24));
        assert_eq!(trend[0].revenue, 100.0);
    }

    #[test]
    fn trend_sums_per_week_per_channel() {
        let mut a = sale("S001", "A-1", 1, 100.0, 40.0);
        a.sales_date = Some(date(2026, 8, 25));
        let mut b = sale("S002", "A-1", 1, 50.0, 20.0);
        b.sales_date = Some(date(2026, 8, 27));
        let mut c = sale("S003", "A-1", 1, 75.0, 30.0);
        c.sales_date = Some(date(2026, 8, 26));
        let mut quotation = draft("Q001", "A-1", 1, 500.0, 200.0);
        quotation.sales_date = Some(date(2026, 8, 26));

        let ws = subset(ChannelId::Wholesale, vec![a, b, quotation]);
        let ec = subset(ChannelId::Ecommerce, vec![c]);
        let trend = weekly_revenue(&[&ws, &ec], date(2026, 8, 30));
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].channel, ChannelId::Wholesale);
        assert_eq!(trend[0].revenue, 150.0);
        assert_eq!(trend[1].channel, ChannelId::Ecommerce);
        assert_eq!(trend[1].revenue, 75.0);
    }

    #[test]
    fn delivery_buckets_split_sale_from_quotation() {
        let mut a = sale("S001", "A-1", 2, 100.0, 40.0);
        a.delivery_date = Some(date(2026, 9, 1));
        a.category_group = Some("Clothing".to_string());
        let mut b = draft("Q001", "A-1", 3, 150.0, 60.0);
        b.delivery_date = Some(date(2026, 9, 1));
        b.category_group = Some("Clothing".to_string());
        let mut no_group = sale("S002", "A-2", 1, 30.0, 10.0);
        no_group.delivery_date = Some(date(2026, 9, 1));

        let buckets = delivery_distribution(&[a, b, no_group]);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].order_type, OrderType::Sale);
        assert_eq!(buckets[0].quantity, 2);
        assert_eq!(buckets[1].order_type, OrderType::Quotation);
        assert_eq!(buckets[1].revenue, 150.0);
    }
}

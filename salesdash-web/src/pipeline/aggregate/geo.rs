//! Geographic revenue rollup

use std::collections::HashSet;

use serde::Serialize;

use super::{round2, safe_div, OrderedGroups};
use crate::types::FactRow;

/// One US state's revenue rollup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRollup {
    pub state: String,
    pub total_revenue: f64,
    pub customer_count: u64,
    pub revenue_per_customer: f64,
}

/// Pull the state name out of a raw location string of the form
/// `"California (US)"`. The name is the run of letters and spaces
/// immediately before the `(US)` marker; anything else yields `None`,
/// which drops non-US locations like `"Ontario (CA)"`.
pub fn extract_us_state(raw: &str) -> Option<String> {
    let idx = raw.find("(US)")?;
    let prefix = &raw[..idx];
    if !prefix.ends_with(char::is_whitespace) {
        return None;
    }
    // Byte offsets come from char_indices so a multibyte character just
    // before the name cannot split a char boundary.
    let name_start = prefix
        .char_indices()
        .rev()
        .find(|(_, c)| !(c.is_ascii_alphabetic() || c.is_whitespace()))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let state = prefix[name_start..].trim();
    if state.is_empty() {
        return None;
    }
    Some(state.to_string())
}

#[derive(Default)]
struct StateAccumulator {
    revenue: f64,
    customers: HashSet<String>,
}

/// Per-state revenue, distinct customer count and revenue per customer over
/// sale rows, sorted by revenue descending. Rows whose location does not
/// carry the `(US)` marker are dropped.
pub fn state_rollup(rows: &[FactRow]) -> Vec<StateRollup> {
    let mut groups: OrderedGroups<StateAccumulator> = OrderedGroups::new();
    for row in rows {
        if !row.is_sale() {
            continue;
        }
        let Some(raw) = row.state.as_deref() else { continue };
        let Some(state) = extract_us_state(raw) else { continue };
        let acc = groups.entry(&state);
        acc.revenue += row.subtotal;
        if let Some(customer) = row.customer.as_deref() {
            acc.customers.insert(customer.to_string());
        }
    }

    let mut rollup: Vec<StateRollup> = groups
        .entries
        .into_iter()
        .map(|(state, acc)| {
            let customer_count = acc.customers.len() as u64;
            StateRollup {
                state,
                total_revenue: round2(acc.revenue),
                customer_count,
                revenue_per_customer: round2(safe_div(acc.revenue, customer_count as f64)),
            }
        })
        .collect();
    rollup.sort_by(|a, b| {
        b.total_revenue
            .partial_cmp(&a.total_revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rollup
}

//! Channel partitioner
//!
//! A closed enumeration of channel identifiers with one table-driven
//! membership rule each. Membership precedence avoids double-counting:
//!
//! 1. Label channels match on sales_team equality.
//! 2. Allowlist channels match on order-reference membership, independent of
//!    sales_team (they may overlap label channels).
//! 3. The residual channel takes every sales_team not claimed by a tracked
//!    label, minus any order reference claimed by ANY allowlist channel.
//!
//! An order reference appearing in two allowlists belongs to both allowlist
//! channels; only the residual channel performs set subtraction.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::FactRow;

/// Sales-team label claimed by the wholesale channel
pub const WHOLESALE_LABEL: &str = "Wholesale";
/// Sales-team label claimed by the e-commerce channel
pub const ECOMMERCE_LABEL: &str = "Shopify";

/// Closed set of sales channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelId {
    Wholesale,
    Ecommerce,
    TradeShow,
    Marketplace,
    Other,
}

impl ChannelId {
    /// Every channel, in presentation order
    pub const ALL: [ChannelId; 5] = [
        ChannelId::Wholesale,
        ChannelId::Ecommerce,
        ChannelId::TradeShow,
        ChannelId::Marketplace,
        ChannelId::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelId::Wholesale => "wholesale",
            ChannelId::Ecommerce => "ecommerce",
            ChannelId::TradeShow => "trade_show",
            ChannelId::Marketplace => "marketplace",
            ChannelId::Other => "other",
        }
    }

    /// Parse an API path segment into a channel identifier
    pub fn parse(name: &str) -> Option<ChannelId> {
        ChannelId::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

/// The externally-loaded order-reference allowlists
#[derive(Debug, Clone, Default)]
pub struct Allowlists {
    pub trade_show: HashSet<String>,
    pub marketplace: HashSet<String>,
}

impl Allowlists {
    /// True when any allowlist channel claims this order reference
    fn claimed(&self, order_reference: &str) -> bool {
        self.trade_show.contains(order_reference) || self.marketplace.contains(order_reference)
    }
}

/// Membership rule for one channel
enum Membership {
    Label(&'static str),
    TradeShowAllowlist,
    MarketplaceAllowlist,
    Residual,
}

fn membership(channel: ChannelId) -> Membership {
    match channel {
        ChannelId::Wholesale => Membership::Label(WHOLESALE_LABEL),
        ChannelId::Ecommerce => Membership::Label(ECOMMERCE_LABEL),
        ChannelId::TradeShow => Membership::TradeShowAllowlist,
        ChannelId::Marketplace => Membership::MarketplaceAllowlist,
        ChannelId::Other => Membership::Residual,
    }
}

/// A named subset of the fact table; explicitly empty when nothing matches
#[derive(Debug, Clone)]
pub struct ChannelSubset {
    pub channel: ChannelId,
    pub rows: Vec<FactRow>,
}

impl ChannelSubset {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn matches(row: &FactRow, rule: &Membership, allowlists: &Allowlists) -> bool {
    match rule {
        Membership::Label(label) => row.sales_team.as_deref() == Some(*label),
        Membership::TradeShowAllowlist => allowlists.trade_show.contains(&row.order_reference),
        Membership::MarketplaceAllowlist => allowlists.marketplace.contains(&row.order_reference),
        Membership::Residual => {
            let label = row.sales_team.as_deref();
            label != Some(WHOLESALE_LABEL)
                && label != Some(ECOMMERCE_LABEL)
                && !allowlists.claimed(&row.order_reference)
        }
    }
}

/// Produce one channel's fact subset, preserving row order
pub fn partition(facts: &[FactRow], channel: ChannelId, allowlists: &Allowlists) -> ChannelSubset {
    let rule = membership(channel);
    let rows = facts
        .iter()
        .filter(|row| matches(row, &rule, allowlists))
        .cloned()
        .collect();
    ChannelSubset { channel, rows }
}

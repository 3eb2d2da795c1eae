//! Refresh pipeline and the cached dashboard snapshot
//!
//! A refresh rebuilds everything from the raw sources: load, store, join,
//! partition, aggregate, segment. The result is one immutable
//! [`DashboardSnapshot`] swapped atomically into the cache; readers never
//! see a half-built view.

pub mod aggregate;
pub mod channels;
pub mod reconcile;
pub mod segmentation;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::{info, warn};

use salesdash_common::config::AppConfig;
use salesdash_common::db::table_schemas::{MasterSkuTableSchema, OrderLinesTableSchema};
use salesdash_common::db::{bulk_load, reset_and_initialize};
use salesdash_common::Result;

use crate::ingest::{load_allowlist, load_dataset, OrderSystemClient};
use aggregate::{
    category_group_pivot, category_group_split, category_summary, customer_features,
    delivery_distribution, fabric_summary, kpi_bundle, lifecycle_distribution, product_profit,
    recap_stats, sales_rep_breakout, state_rollup, top_n_by, top_parents_for_group,
    weekly_revenue, CategoryGroupStats, CategorySummary, DeliveryBucket, DimensionTotals,
    KpiBundle, LifecycleShare, PivotTable, ProductProfit, RecapStats, RepSummary, StateRollup,
    WeeklyRevenuePoint,
};
use channels::{partition, Allowlists, ChannelId, ChannelSubset};
use segmentation::{segment_customers, Segmentation};

/// Rows shown in every ranked table
const TOP_N: usize = 10;

/// Category groups broken out on the overview page
// Category-group values as the master-SKU export spells them
const CLOTHING_GROUP: &str = "CLOTHING";
const JEWELRY_GROUP: &str = "JEWELRY";

/// The cross-channel overview page
#[derive(Debug, Clone, Serialize)]
pub struct OverviewView {
    pub kpis: KpiBundle,
    pub weekly_revenue: Vec<WeeklyRevenuePoint>,
    pub category_groups: Vec<CategoryGroupStats>,
    pub top_clothing_parents: Vec<DimensionTotals>,
    pub top_jewelry_parents: Vec<DimensionTotals>,
    pub lifecycle: Vec<LifecycleShare>,
    pub fabrics: Vec<DimensionTotals>,
    pub deliveries: Vec<DeliveryBucket>,
}

/// One channel's full aggregate battery
#[derive(Debug, Clone, Serialize)]
pub struct ChannelView {
    pub channel: ChannelId,
    pub row_count: usize,
    pub kpis: KpiBundle,
    pub recap: RecapStats,
    pub top_sku_parents: Vec<DimensionTotals>,
    pub top_collections: Vec<DimensionTotals>,
    pub category_summary: CategorySummary,
    pub category_pivot: PivotTable,
    pub sales_reps: RepSummary,
    pub product_profit: Vec<ProductProfit>,
    pub states: Vec<StateRollup>,
    /// None when the channel has too few customers to segment
    pub segmentation: Option<Segmentation>,
    /// Recap restricted to the configured event window (marketplace only)
    pub event_recap: Option<RecapStats>,
}

/// One immutable result of a full pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub overview: OverviewView,
    /// Channel views in presentation order
    pub channels: Vec<ChannelView>,
}

impl DashboardSnapshot {
    pub fn channel(&self, id: ChannelId) -> Option<&ChannelView> {
        self.channels.iter().find(|c| c.channel == id)
    }
}

/// Shared handle to the most recent snapshot.
///
/// Readers clone an `Arc` out under a short read lock; a refresh swaps the
/// whole snapshot in one write. Empty until the first refresh completes.
#[derive(Clone, Default)]
pub struct SnapshotCache {
    inner: Arc<RwLock<Option<Arc<DashboardSnapshot>>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<Arc<DashboardSnapshot>> {
        self.inner.read().await.clone()
    }

    pub async fn store(&self, snapshot: DashboardSnapshot) {
        *self.inner.write().await = Some(Arc::new(snapshot));
    }
}

/// Run the full pipeline and return a fresh snapshot.
///
/// Source or store failures abort the refresh (the previous snapshot stays
/// served); individual aggregate failures only degrade their own section.
pub async fn refresh(
    pool: &SqlitePool,
    config: &AppConfig,
    client: Option<&dyn OrderSystemClient>,
) -> Result<DashboardSnapshot> {
    let dataset = load_dataset(config, client).await?;

    reset_and_initialize(pool).await?;
    let sku_rows = bulk_load::<MasterSkuTableSchema>(pool, &dataset.master_sku).await?;
    let fact_rows = bulk_load::<OrderLinesTableSchema>(pool, &dataset.order_lines).await?;
    info!(sku_rows, fact_rows, "Canonical store rebuilt");

    let trade_show_path = config.data_file(&config.allowlists.trade_show);
    let facts = reconcile::reconcile(pool, &trade_show_path).await?;

    let marketplace_path = config.data_file(&config.allowlists.marketplace);
    let marketplace = match load_allowlist("marketplace", &marketplace_path) {
        Ok(refs) => refs,
        Err(e) => {
            warn!("Marketplace allowlist unavailable ({}); channel will be empty", e);
            HashSet::new()
        }
    };
    // the trade-show memberships were already resolved during reconciliation
    let allowlists = Allowlists {
        trade_show: facts
            .iter()
            .filter(|row| row.trade_show)
            .map(|row| row.order_reference.clone())
            .collect(),
        marketplace,
    };

    let today = Local::now().date_naive();
    Ok(build_snapshot(&facts, &allowlists, config, today))
}

/// Assemble the snapshot from an already-reconciled fact table.
pub fn build_snapshot(
    facts: &[crate::types::FactRow],
    allowlists: &Allowlists,
    config: &AppConfig,
    today: NaiveDate,
) -> DashboardSnapshot {
    let subsets: Vec<ChannelSubset> = ChannelId::ALL
        .iter()
        .map(|channel| partition(facts, *channel, allowlists))
        .collect();

    let overview = OverviewView {
        kpis: kpi_bundle(facts),
        weekly_revenue: weekly_revenue(&subsets.iter().collect::<Vec<_>>(), today),
        category_groups: category_group_split(facts),
        top_clothing_parents: top_parents_for_group(facts, CLOTHING_GROUP, TOP_N),
        top_jewelry_parents: top_parents_for_group(facts, JEWELRY_GROUP, TOP_N),
        lifecycle: lifecycle_distribution(facts),
        fabrics: fabric_summary(facts, TOP_N),
        deliveries: delivery_distribution(facts),
    };

    let channels = subsets
        .iter()
        .map(|subset| build_channel_view(subset, config))
        .collect();

    DashboardSnapshot {
        generated_at: Utc::now(),
        overview,
        channels,
    }
}

fn build_channel_view(subset: &ChannelSubset, config: &AppConfig) -> ChannelView {
    let rows = &subset.rows;

    let segmentation = {
        let features = customer_features(rows);
        match segment_customers(&features, &config.segmentation) {
            Ok(result) => Some(result),
            Err(e) => {
                // a channel too small to segment is normal, not a failure
                info!(
                    channel = subset.channel.as_str(),
                    "Segmentation skipped: {}", e
                );
                None
            }
        }
    };

    let event_recap = match (subset.channel, &config.marketplace_event) {
        (ChannelId::Marketplace, Some(window)) => {
            let in_window: Vec<_> = rows
                .iter()
                .filter(|row| {
                    row.sales_date
                        .map(|d| d >= window.start && d < window.end)
                        .unwrap_or(false)
                })
                .cloned()
                .collect();
            Some(recap_stats(&in_window))
        }
        _ => None,
    };

    ChannelView {
        channel: subset.channel,
        row_count: rows.len(),
        kpis: kpi_bundle(rows),
        recap: recap_stats(rows),
        top_sku_parents: top_n_by(rows, |r| r.sku_parent.as_deref(), TOP_N),
        top_collections: top_n_by(rows, |r| r.collection.as_deref(), TOP_N),
        category_summary: category_summary(rows),
        category_pivot: category_group_pivot(rows),
        sales_reps: sales_rep_breakout(rows),
        product_profit: product_profit(rows),
        states: state_rollup(rows),
        segmentation,
        event_recap,
    }
}

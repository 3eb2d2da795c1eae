//! Read path: the full fact-to-dimension join
//!
//! Callers receive storage-normalized field names; renaming into the display
//! vocabulary is the reconciliation engine's job, not this layer's.

use sqlx::SqlitePool;

use crate::Result;

/// One row of the OrderLine-to-SkuMaster left join.
///
/// Everything except the two key columns is nullable: raw snapshots carry
/// blanks, and an order line with no master-SKU match keeps null enrichment
/// fields rather than being dropped.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JoinedFactRecord {
    pub created_on: Option<String>,
    pub sales_date: Option<String>,
    pub delivery_date: Option<String>,
    pub order_reference: String,
    pub sales_team: Option<String>,
    pub salesperson: Option<String>,
    pub customer: Option<String>,
    pub state: Option<String>,
    pub sku: String,
    pub product: Option<String>,
    pub collection: Option<String>,
    pub product_template: Option<String>,
    pub product_category: Option<String>,
    pub fabric_sku: Option<String>,
    pub fabric_type: Option<String>,
    pub quantity: Option<f64>,
    pub subtotal: Option<f64>,
    pub total_cost: Option<f64>,
    pub unit_cost: Option<f64>,
    pub unit_price: Option<f64>,
    pub order_status: Option<String>,
    pub invoice_status: Option<String>,
    pub delivery_status: Option<String>,
    pub total_tax: Option<f64>,
    // Enrichment joined from master_sku (null when the SKU is unmatched)
    pub sku_parent: Option<String>,
    pub category_group: Option<String>,
    pub master_category: Option<String>,
    pub sub_category: Option<String>,
    pub lifecycle_status: Option<String>,
}

/// Fetch the complete left join, ordered by fact insertion order.
///
/// The insertion order is the stable total ordering every downstream
/// tie-break (top-N, top-selling SKU) relies on.
pub async fn fetch_joined_facts(pool: &SqlitePool) -> Result<Vec<JoinedFactRecord>> {
    let rows = sqlx::query_as::<_, JoinedFactRecord>(
        r#"
        SELECT
            f.created_on, f.sales_date, f.delivery_date, f.order_reference,
            f.sales_team, f.salesperson, f.customer, f.state, f.sku,
            f.product, f.collection, f.product_template, f.product_category,
            f.fabric_sku, f.fabric_type,
            CAST(f.quantity AS REAL) AS quantity,
            f.subtotal, f.total_cost, f.unit_cost, f.unit_price,
            f.order_status, f.invoice_status, f.delivery_status, f.total_tax,
            m.sku_parent, m.category_group,
            m.category AS master_category,
            m.sub_category, m.lifecycle_status
        FROM sale_order_line f
        LEFT JOIN master_sku m ON f.sku = m.sku
        ORDER BY f.id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

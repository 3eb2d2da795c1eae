//! Table Schema Definitions
//!
//! Single source of truth for the canonical store shapes. Each struct defines
//! the expected schema for one table: storage column names and SQL types,
//! the exact CSV header each column is loaded from (headers are matched by
//! name, not position, so they are part of the external contract), and the
//! display name the rest of the system uses for the field.

/// Column definition with SQL constraints and source/display vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Storage column name (snake_case)
    pub name: &'static str,
    /// SQL type ("TEXT", "INTEGER", "REAL")
    pub sql_type: &'static str,
    /// NOT NULL constraint
    pub not_null: bool,
    /// UNIQUE constraint
    pub unique: bool,
    /// Exact header in the source CSV this column is loaded from
    pub source_header: Option<&'static str>,
    /// Display name used by reconciliation and everything downstream
    pub display_name: Option<&'static str>,
}

impl ColumnDefinition {
    pub const fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            not_null: false,
            unique: false,
            source_header: None,
            display_name: None,
        }
    }

    pub const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Loaded from this source CSV header; display name defaults to the same
    pub const fn source(mut self, header: &'static str) -> Self {
        self.source_header = Some(header);
        self.display_name = Some(header);
        self
    }

    /// Override the display name when it differs from the source header
    pub const fn display(mut self, name: &'static str) -> Self {
        self.display_name = Some(name);
        self
    }
}

/// Declarative schema for one canonical-store table
pub trait TableSchema {
    fn table_name() -> &'static str;

    fn expected_columns() -> Vec<ColumnDefinition>;

    /// Extra table-level constraint clauses (foreign keys)
    fn extra_constraints() -> Vec<&'static str> {
        Vec::new()
    }

    /// CREATE TABLE statement assembled from the declared columns.
    /// Every table carries an autoincrementing surrogate key.
    fn create_table_sql() -> String {
        let mut parts = vec!["id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
        for col in Self::expected_columns() {
            let mut def = format!("{} {}", col.name, col.sql_type);
            if col.unique {
                def.push_str(" UNIQUE");
            }
            if col.not_null {
                def.push_str(" NOT NULL");
            }
            parts.push(def);
        }
        for constraint in Self::extra_constraints() {
            parts.push(constraint.to_string());
        }
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            Self::table_name(),
            parts.join(",\n    ")
        )
    }
}

/// Order-line fact table schema (one row per line item on an order)
pub struct OrderLinesTableSchema;

impl TableSchema for OrderLinesTableSchema {
    fn table_name() -> &'static str {
        "sale_order_line"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            // Dates kept as TEXT; parsing to typed dates happens at
            // reconciliation, where invalid values degrade to null
            ColumnDefinition::new("created_on", "TEXT").source("Created on"),
            ColumnDefinition::new("sales_date", "TEXT").source("Sales Date"),
            ColumnDefinition::new("delivery_date", "TEXT").source("Delivery Date"),
            ColumnDefinition::new("order_reference", "TEXT")
                .not_null()
                .source("Order Reference"),
            ColumnDefinition::new("sales_team", "TEXT").source("Sales Team"),
            ColumnDefinition::new("salesperson", "TEXT").source("Salesperson"),
            ColumnDefinition::new("customer", "TEXT").source("Customer"),
            ColumnDefinition::new("state", "TEXT").source("State"),
            ColumnDefinition::new("sku", "TEXT").not_null().source("SKU"),
            ColumnDefinition::new("product", "TEXT").source("Product"),
            ColumnDefinition::new("collection", "TEXT").source("Collection"),
            ColumnDefinition::new("product_template", "TEXT").source("Product Template"),
            ColumnDefinition::new("product_category", "TEXT").source("Product Category"),
            ColumnDefinition::new("fabric_sku", "TEXT").source("Fabric SKU"),
            ColumnDefinition::new("fabric_type", "TEXT").source("Fabric Type"),
            ColumnDefinition::new("quantity", "INTEGER").source("Quantity"),
            ColumnDefinition::new("subtotal", "REAL").source("Subtotal"),
            ColumnDefinition::new("total_cost", "REAL").source("Total Cost"),
            ColumnDefinition::new("unit_cost", "REAL").source("Unit Cost"),
            ColumnDefinition::new("unit_price", "REAL").source("Unit Price"),
            ColumnDefinition::new("order_status", "TEXT").source("Order Status"),
            ColumnDefinition::new("invoice_status", "TEXT").source("Invoice Status"),
            ColumnDefinition::new("delivery_status", "TEXT").source("Delivery Status"),
            ColumnDefinition::new("total_tax", "REAL").source("Total Tax"),
        ]
    }

    fn extra_constraints() -> Vec<&'static str> {
        // Best-effort linkage: order lines with no master-SKU match are kept
        vec!["FOREIGN KEY (sku) REFERENCES master_sku (sku)"]
    }
}

/// SKU master dimension table schema (one row per SKU)
pub struct MasterSkuTableSchema;

impl TableSchema for MasterSkuTableSchema {
    fn table_name() -> &'static str {
        "master_sku"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("sku", "TEXT").unique().not_null().source("SKU"),
            ColumnDefinition::new("sku_parent", "TEXT").source("SKU (Parent)"),
            ColumnDefinition::new("name", "TEXT").source("Name"),
            ColumnDefinition::new("category_group", "TEXT").source("Category Group"),
            ColumnDefinition::new("category", "TEXT").source("Category"),
            ColumnDefinition::new("sub_category", "TEXT").source("Sub-Category"),
            ColumnDefinition::new("collection", "TEXT").source("Collection"),
            ColumnDefinition::new("lifecycle_status", "TEXT").source("Lifecycle Status"),
            ColumnDefinition::new("unit_cost", "REAL").source("Unit Cost"),
            ColumnDefinition::new("ws_price", "REAL").source("WS ($)"),
            ColumnDefinition::new("ec_price", "REAL").source("EC ($)"),
        ]
    }
}

/// Display name for a storage field, looked up across both schemas.
///
/// The mapping is total over the registry by construction (every column
/// declares its display vocabulary); `None` therefore means the caller asked
/// about a field that does not exist in the canonical store.
pub fn display_name(storage_field: &str) -> Option<&'static str> {
    OrderLinesTableSchema::expected_columns()
        .into_iter()
        .chain(MasterSkuTableSchema::expected_columns())
        .find(|c| c.name == storage_field)
        .and_then(|c| c.display_name)
}

use serde::{Deserialize, Serialize};

use shelflife_core::ProductId;

/// Read-only product master data, pulled from the catalog collaborator once
/// per recompute.
///
/// Catalog fields are copied onto a `Batch` the first time its key is seen
/// during reconstruction and are never updated from the log itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub product_id: ProductId,
    pub name: String,
    pub unit: String,
    pub shelf_life_days: u32,
    /// Base price in minor currency units.
    pub price: i64,
    pub safety_stock: i64,
    pub max_stock: i64,
    pub is_available: bool,
    /// Pass-through promotion tag; this core filters on it but never derives it.
    pub promotion: Option<String>,
    /// The backend's stored total for the product, when it has one.
    ///
    /// Treated as a reconcilable cache: projections always publish the
    /// ledger-derived total and report a mismatch warning when this disagrees.
    pub stock_total: Option<i64>,
}

impl CatalogEntry {
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        unit: impl Into<String>,
        shelf_life_days: u32,
        price: i64,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            unit: unit.into(),
            shelf_life_days,
            price,
            safety_stock: 0,
            max_stock: 0,
            is_available: true,
            promotion: None,
            stock_total: None,
        }
    }

    pub fn with_stock_levels(mut self, safety_stock: i64, max_stock: i64) -> Self {
        self.safety_stock = safety_stock;
        self.max_stock = max_stock;
        self
    }

    pub fn with_promotion(mut self, tag: impl Into<String>) -> Self {
        self.promotion = Some(tag.into());
        self
    }

    pub fn with_stock_total(mut self, total: i64) -> Self {
        self.stock_total = Some(total);
        self
    }
}

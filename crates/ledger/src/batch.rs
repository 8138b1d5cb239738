use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntry;
use crate::transaction::BatchKey;

/// Derived per-batch state: one product at one expiry date.
///
/// Batches are never stored. Each recompute materializes them fresh from the
/// full transaction history; `current_quantity` is written only by the
/// reconstruction fold. Catalog-derived fields are read once when the key is
/// first seen and never updated from the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub key: BatchKey,
    pub product_name: String,
    pub unit: String,
    /// Fold result. May be negative when the log is inconsistent (more sales
    /// than receipts); negative values are surfaced, never clamped.
    pub current_quantity: i64,
    pub safety_stock: i64,
    pub max_stock: i64,
    /// Base price in minor currency units.
    pub price: i64,
    pub is_available: bool,
    pub promotion: Option<String>,
}

impl Batch {
    /// A fresh batch for `key`, carrying catalog master data and zero stock.
    pub fn from_catalog(key: BatchKey, entry: &CatalogEntry) -> Self {
        Self {
            key,
            product_name: entry.name.clone(),
            unit: entry.unit.clone(),
            current_quantity: 0,
            safety_stock: entry.safety_stock,
            max_stock: entry.max_stock,
            price: entry.price,
            is_available: entry.is_available,
            promotion: entry.promotion.clone(),
        }
    }

    /// Whether the batch belongs in the current view.
    pub fn has_stock(&self) -> bool {
        self.current_quantity > 0
    }

    /// Under-stocked relative to the catalog's safety threshold.
    pub fn is_low(&self) -> bool {
        self.current_quantity <= self.safety_stock
    }
}

//! Product catalog boundary.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use shelflife_core::{ProductId, StoreId};
use shelflife_ledger::CatalogEntry;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog could not be reached or read. A recompute hitting this
    /// fails wholesale and the previous projection stays published.
    #[error("product catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only product master data, pulled once per recompute.
pub trait ProductCatalog: Send + Sync {
    /// The full catalog snapshot for a store.
    fn entries(&self, store_id: StoreId) -> Result<HashMap<ProductId, CatalogEntry>, CatalogError>;
}

impl<C> ProductCatalog for Arc<C>
where
    C: ProductCatalog + ?Sized,
{
    fn entries(&self, store_id: StoreId) -> Result<HashMap<ProductId, CatalogEntry>, CatalogError> {
        (**self).entries(store_id)
    }
}

/// In-memory product catalog for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductCatalog {
    stores: RwLock<HashMap<StoreId, HashMap<ProductId, CatalogEntry>>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, store_id: StoreId, entry: CatalogEntry) {
        if let Ok(mut stores) = self.stores.write() {
            stores
                .entry(store_id)
                .or_default()
                .insert(entry.product_id, entry);
        }
    }
}

impl ProductCatalog for InMemoryProductCatalog {
    fn entries(&self, store_id: StoreId) -> Result<HashMap<ProductId, CatalogEntry>, CatalogError> {
        let stores = self
            .stores
            .read()
            .map_err(|_| CatalogError::Unavailable("lock poisoned".to_string()))?;

        Ok(stores.get(&store_id).cloned().unwrap_or_default())
    }
}

//! Recompute engine: snapshot pull → pure projection → atomic publish.
//!
//! `RecomputeService` is the trigger-agnostic outer shell around
//! `Projection::compute`. Whether a recompute comes from a change signal, a
//! manual call after a disposal, or a test, the pipeline is the same: pull
//! the full record list and catalog snapshot, fold, swap the published
//! projection. Any pull failure aborts the recompute and leaves the previous
//! projection untouched — a partial or corrupt projection is never published.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::{debug, warn};

use shelflife_core::{Clock, StoreId};
use shelflife_views::Projection;

use crate::catalog::{CatalogError, ProductCatalog};
use crate::transaction_store::{TransactionStore, TransactionStoreError};

#[derive(Debug, Error)]
pub enum RecomputeError {
    #[error(transparent)]
    Store(#[from] TransactionStoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("projection registry lock poisoned")]
    LockPoisoned,
}

/// Holds the latest successfully published projection per store and drives
/// recomputes against the injected collaborators.
///
/// Recomputes for different stores are independent; each reads an immutable
/// snapshot and writes only its own map slot, so running them in parallel is
/// safe.
#[derive(Debug)]
pub struct RecomputeService<S, C, K> {
    store: S,
    catalog: C,
    clock: K,
    latest: RwLock<HashMap<StoreId, Arc<Projection>>>,
}

impl<S, C, K> RecomputeService<S, C, K>
where
    S: TransactionStore,
    C: ProductCatalog,
    K: Clock,
{
    pub fn new(store: S, catalog: C, clock: K) -> Self {
        Self {
            store,
            catalog,
            clock,
            latest: RwLock::new(HashMap::new()),
        }
    }

    /// Full re-pull and re-fold for one store.
    ///
    /// Idempotent: recomputing twice against the same snapshot publishes the
    /// same projection, so duplicate change signals are harmless.
    pub fn recompute(&self, store_id: StoreId) -> Result<Arc<Projection>, RecomputeError> {
        let records = self.store.load_store(store_id)?;
        let catalog = self.catalog.entries(store_id)?;

        let projection = Projection::compute(store_id, &records, &catalog, self.clock.now());

        for warning in &projection.warnings {
            warn!(store_id = %store_id, ?warning, "projection warning");
        }
        for audit in &projection.adjustments {
            debug!(
                store_id = %store_id,
                transaction_id = %audit.transaction_id,
                batch = %audit.key,
                delta = audit.delta,
                "stock adjustment applied during fold"
            );
        }

        let projection = Arc::new(projection);

        // Publish only after a fully successful compute.
        let mut latest = self.latest.write().map_err(|_| RecomputeError::LockPoisoned)?;
        latest.insert(store_id, Arc::clone(&projection));

        Ok(projection)
    }

    /// The most recently published projection for a store, if any.
    ///
    /// A best-effort snapshot: appends since the last recompute are not
    /// reflected until the next one.
    pub fn latest(&self, store_id: StoreId) -> Option<Arc<Projection>> {
        self.latest
            .read()
            .ok()
            .and_then(|latest| latest.get(&store_id).cloned())
    }
}

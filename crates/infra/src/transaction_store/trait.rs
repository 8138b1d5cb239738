use std::sync::Arc;

use thiserror::Error;

use shelflife_core::StoreId;
use shelflife_ledger::TransactionRecord;

/// Transaction store operation error (infrastructure, not domain).
#[derive(Debug, Error)]
pub enum TransactionStoreError {
    /// The store could not be reached or read. A recompute hitting this
    /// fails wholesale and the previous projection stays published.
    #[error("transaction store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid append: {0}")]
    InvalidAppend(String),
}

/// Append-only, store-scoped transaction log.
///
/// Two operations only: read the full record list for one store, append one
/// record. There is no partial or paged read — each recompute pulls the whole
/// snapshot. Records are immutable once appended.
///
/// Implementations must make `append` atomic and `load_store` return a
/// consistent snapshot; the core gives no ordering guarantee across
/// concurrent appends and does not need one (the fold sorts).
pub trait TransactionStore: Send + Sync {
    /// Append one record to its store's ledger (append-only).
    fn append(&self, record: TransactionRecord) -> Result<(), TransactionStoreError>;

    /// Load the full, unordered record list for a store.
    ///
    /// Returns an empty vector for a store with no history yet.
    fn load_store(&self, store_id: StoreId) -> Result<Vec<TransactionRecord>, TransactionStoreError>;
}

impl<S> TransactionStore for Arc<S>
where
    S: TransactionStore + ?Sized,
{
    fn append(&self, record: TransactionRecord) -> Result<(), TransactionStoreError> {
        (**self).append(record)
    }

    fn load_store(&self, store_id: StoreId) -> Result<Vec<TransactionRecord>, TransactionStoreError> {
        (**self).load_store(store_id)
    }
}

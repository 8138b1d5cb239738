use std::collections::HashMap;
use std::sync::RwLock;

use shelflife_core::StoreId;
use shelflife_ledger::TransactionRecord;

use super::r#trait::{TransactionStore, TransactionStoreError};

/// In-memory append-only transaction store.
///
/// Intended for tests/dev. Per-store vectors behind one lock; appends are
/// atomic and loads return a full copy of the snapshot.
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    ledgers: RwLock<HashMap<StoreId, Vec<TransactionRecord>>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held for a store (test convenience).
    pub fn record_count(&self, store_id: StoreId) -> usize {
        self.ledgers
            .read()
            .map(|ledgers| ledgers.get(&store_id).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn append(&self, record: TransactionRecord) -> Result<(), TransactionStoreError> {
        let mut ledgers = self
            .ledgers
            .write()
            .map_err(|_| TransactionStoreError::Unavailable("lock poisoned".to_string()))?;

        ledgers.entry(record.store_id).or_default().push(record);
        Ok(())
    }

    fn load_store(&self, store_id: StoreId) -> Result<Vec<TransactionRecord>, TransactionStoreError> {
        let ledgers = self
            .ledgers
            .read()
            .map_err(|_| TransactionStoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(ledgers.get(&store_id).cloned().unwrap_or_default())
    }
}

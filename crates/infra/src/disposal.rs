//! Disposal command: the only write path from this core back to the ledger.
//!
//! `dispose` validates, appends exactly one write-off record, and returns it.
//! It never mutates a published projection — the caller (or the
//! notifier-driven worker) triggers a recompute to observe the effect.

use thiserror::Error;
use tracing::warn;

use shelflife_core::{Clock, DomainError, StoreId, TransactionId};
use shelflife_ledger::{Batch, StockMovement, TransactionRecord};

use crate::notifier::{ChangeNotifier, ChangeSignal, InMemoryChangeNotifier};
use crate::transaction_store::{TransactionStore, TransactionStoreError};

#[derive(Debug, Error)]
pub enum DisposalError {
    /// Validation failed; nothing was appended.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] TransactionStoreError),
}

/// Appends write-off records for expiring or damaged batches.
///
/// When constructed with a notifier, a change signal is emitted after each
/// successful append — publish only after append, and best effort: a publish
/// failure never undoes the append (at-least-once consumers re-pull anyway).
#[derive(Debug)]
pub struct DisposalService<S, K, N = InMemoryChangeNotifier> {
    store: S,
    clock: K,
    notifier: Option<N>,
}

impl<S, K> DisposalService<S, K> {
    pub fn new(store: S, clock: K) -> Self {
        Self {
            store,
            clock,
            notifier: None,
        }
    }
}

impl<S, K, N> DisposalService<S, K, N> {
    pub fn with_notifier(store: S, clock: K, notifier: N) -> Self {
        Self {
            store,
            clock,
            notifier: Some(notifier),
        }
    }
}

impl<S, K, N> DisposalService<S, K, N>
where
    S: TransactionStore,
    K: Clock,
    N: ChangeNotifier,
{
    /// Write off `quantity` units of `batch`, with a required reason.
    ///
    /// Rejected with a validation error (and nothing appended) when the
    /// quantity is non-positive, exceeds the batch's current quantity, or the
    /// reason is blank.
    pub fn dispose(
        &self,
        store_id: StoreId,
        batch: &Batch,
        quantity: i64,
        reason: &str,
    ) -> Result<TransactionRecord, DisposalError> {
        if quantity <= 0 {
            return Err(DomainError::validation("disposal quantity must be positive").into());
        }
        if quantity > batch.current_quantity {
            return Err(DomainError::validation(format!(
                "disposal quantity {quantity} exceeds current quantity {} of batch {}",
                batch.current_quantity, batch.key
            ))
            .into());
        }
        if reason.trim().is_empty() {
            return Err(DomainError::validation("disposal reason must not be blank").into());
        }

        let record = TransactionRecord {
            id: TransactionId::new(),
            store_id,
            batch_key: batch.key,
            movement: StockMovement::WriteOff { quantity },
            occurred_at: self.clock.now(),
            notes: Some(reason.trim().to_string()),
        };

        self.store.append(record.clone())?;

        if let Some(notifier) = &self.notifier
            && let Err(err) = notifier.notify(ChangeSignal { store_id })
        {
            warn!(store_id = %store_id, error = ?err, "change signal publication failed after disposal append");
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{DateTime, Utc};

    use shelflife_core::{FixedClock, ProductId};
    use shelflife_ledger::{BatchKey, CatalogEntry};

    use crate::transaction_store::InMemoryTransactionStore;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn milk_batch(quantity: i64) -> Batch {
        let product_id = ProductId::new();
        let entry = CatalogEntry::new(product_id, "Milk-1L", "bottle", 10, 2500);
        let mut batch = Batch::from_catalog(
            BatchKey::new(product_id, Some(ts("2024-01-10T09:00:00Z"))),
            &entry,
        );
        batch.current_quantity = quantity;
        batch
    }

    #[test]
    fn dispose_appends_one_write_off_record() {
        let store = Arc::new(InMemoryTransactionStore::new());
        let clock = FixedClock::at(ts("2024-01-09T12:00:00Z"));
        let service = DisposalService::new(Arc::clone(&store), clock);

        let store_id = StoreId::new();
        let batch = milk_batch(35);

        let record = service
            .dispose(store_id, &batch, 35, "expired write-off")
            .unwrap();

        assert_eq!(record.movement, StockMovement::WriteOff { quantity: 35 });
        assert_eq!(record.batch_key, batch.key);
        assert_eq!(record.occurred_at, ts("2024-01-09T12:00:00Z"));
        assert_eq!(record.notes.as_deref(), Some("expired write-off"));
        assert_eq!(store.load_store(store_id).unwrap(), vec![record]);
    }

    #[test]
    fn dispose_rejects_overdraw_without_appending() {
        let store = Arc::new(InMemoryTransactionStore::new());
        let service =
            DisposalService::new(Arc::clone(&store), FixedClock::at(ts("2024-01-09T12:00:00Z")));

        let store_id = StoreId::new();
        let batch = milk_batch(10);

        let err = service.dispose(store_id, &batch, 11, "too much").unwrap_err();
        assert!(matches!(err, DisposalError::Domain(DomainError::Validation(_))));
        assert_eq!(store.record_count(store_id), 0);
    }

    #[test]
    fn dispose_rejects_non_positive_quantity_and_blank_reason() {
        let store = Arc::new(InMemoryTransactionStore::new());
        let service =
            DisposalService::new(Arc::clone(&store), FixedClock::at(ts("2024-01-09T12:00:00Z")));

        let store_id = StoreId::new();
        let batch = milk_batch(10);

        assert!(service.dispose(store_id, &batch, 0, "reason").is_err());
        assert!(service.dispose(store_id, &batch, -3, "reason").is_err());
        assert!(service.dispose(store_id, &batch, 5, "   ").is_err());
        assert_eq!(store.record_count(store_id), 0);
    }

    #[test]
    fn dispose_emits_change_signal_after_append() {
        let store = Arc::new(InMemoryTransactionStore::new());
        let notifier = Arc::new(InMemoryChangeNotifier::new());
        let subscription = notifier.subscribe();

        let service = DisposalService::with_notifier(
            store,
            FixedClock::at(ts("2024-01-09T12:00:00Z")),
            notifier,
        );

        let store_id = StoreId::new();
        let batch = milk_batch(35);
        service.dispose(store_id, &batch, 5, "damaged").unwrap();

        let signal = subscription.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(signal.store_id, store_id);
    }

    #[test]
    fn rejected_disposal_emits_no_signal() {
        let notifier = Arc::new(InMemoryChangeNotifier::new());
        let subscription = notifier.subscribe();

        let service = DisposalService::with_notifier(
            Arc::new(InMemoryTransactionStore::new()),
            FixedClock::at(ts("2024-01-09T12:00:00Z")),
            notifier,
        );

        let batch = milk_batch(2);
        assert!(service.dispose(StoreId::new(), &batch, 5, "overdraw").is_err());
        assert!(subscription.try_recv().is_err());
    }
}

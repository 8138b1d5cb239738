use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelflife_core::{ProductId, StoreId, TransactionId};

/// Identity of a batch: one product with one expiry date.
///
/// `expires_at = None` is the "no expiry" sentinel (dry goods etc.). Two
/// receipts of the same product with different expiry dates are different
/// batches and are folded independently.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BatchKey {
    pub product_id: ProductId,
    pub expires_at: Option<DateTime<Utc>>,
}

impl BatchKey {
    pub fn new(product_id: ProductId, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            product_id,
            expires_at,
        }
    }

    pub fn no_expiry(product_id: ProductId) -> Self {
        Self {
            product_id,
            expires_at: None,
        }
    }
}

impl core::fmt::Display for BatchKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.expires_at {
            Some(ts) => write!(f, "{}@{}", self.product_id, ts.to_rfc3339()),
            None => write!(f, "{}@no-expiry", self.product_id),
        }
    }
}

/// One stock movement, tagged by kind.
///
/// Each kind carries only the fields that are meaningful for it: relative
/// movements carry a magnitude, an adjustment carries the absolute target
/// quantity it sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockMovement {
    /// Goods received into the batch (`+quantity`).
    Receipt { quantity: i64 },
    /// Goods sold out of the batch (`-quantity`).
    Sale { quantity: i64 },
    /// Customer return back into the batch (`+quantity`).
    Return { quantity: i64 },
    /// Manual stock count: sets the running quantity to `new_quantity`.
    Adjustment { new_quantity: i64 },
    /// Disposal/expiry write-off out of the batch (`-quantity`).
    WriteOff { quantity: i64 },
}

/// Immutable, append-only ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique, stable id; ascending tie-breaker for equal timestamps.
    pub id: TransactionId,
    /// The store whose ledger this record belongs to.
    pub store_id: StoreId,
    pub batch_key: BatchKey,
    pub movement: StockMovement,
    /// Event time; the fold orders records by this, then by `id`.
    pub occurred_at: DateTime<Utc>,
    /// Free text, non-authoritative.
    pub notes: Option<String>,
}

impl TransactionRecord {
    pub fn new(
        store_id: StoreId,
        batch_key: BatchKey,
        movement: StockMovement,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            store_id,
            batch_key,
            movement,
            occurred_at,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

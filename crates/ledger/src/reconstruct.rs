//! Batch ledger reconstruction.
//!
//! One call per recompute: the full, unordered record list for a store is
//! grouped per batch, sorted by `(occurred_at, id)`, and folded into running
//! quantities. Arrival order must never influence the result — only the
//! sorted order does, and the id tie-break keeps equal timestamps stable.

use std::collections::HashMap;

use thiserror::Error;

use shelflife_core::{ProductId, TransactionId};

use crate::batch::Batch;
use crate::catalog::CatalogEntry;
use crate::transaction::{BatchKey, StockMovement, TransactionRecord};

/// Non-fatal observations raised while reconstructing.
///
/// Warnings are data, not errors: reconstruction always completes, and the
/// caller decides how loudly to surface these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructionWarning {
    /// Records referenced a product the catalog does not know; they were
    /// dropped and no batch was materialized for them.
    #[error("no catalog entry for product {product_id}; dropped {dropped_records} record(s)")]
    MissingCatalogEntry {
        product_id: ProductId,
        dropped_records: usize,
    },

    /// A batch folded to a negative quantity. Deliberately not clamped: the
    /// inconsistency stays visible to operators.
    #[error("batch {key} folded to negative quantity {quantity}")]
    NegativeQuantity { key: BatchKey, quantity: i64 },
}

/// Informational trail of an adjustment: the absolute target always wins, but
/// the implied delta is worth showing in audit displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentAudit {
    pub transaction_id: TransactionId,
    pub key: BatchKey,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    /// `new_quantity - previous_quantity` at the point of the fold.
    pub delta: i64,
}

/// Output of one reconstruction pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconstruction {
    /// Every known batch, including exhausted ones (`current_quantity <= 0`);
    /// the current view exclusion happens downstream.
    pub batches: HashMap<BatchKey, Batch>,
    pub warnings: Vec<ReconstructionWarning>,
    pub adjustments: Vec<AdjustmentAudit>,
}

/// Fold a store's full transaction history into per-batch quantities.
///
/// Deterministic for a fixed snapshot: grouping keys are visited in key
/// order and each group is sorted by `(occurred_at, id)` before folding, so
/// shuffling the input never changes the output.
pub fn reconstruct(
    records: &[TransactionRecord],
    catalog: &HashMap<ProductId, CatalogEntry>,
) -> Reconstruction {
    let mut groups: HashMap<BatchKey, Vec<&TransactionRecord>> = HashMap::new();
    for record in records {
        groups.entry(record.batch_key).or_default().push(record);
    }

    let mut keys: Vec<BatchKey> = groups.keys().copied().collect();
    keys.sort();

    let mut result = Reconstruction::default();

    for key in keys {
        let mut group = groups.remove(&key).unwrap_or_default();

        let Some(entry) = catalog.get(&key.product_id) else {
            result.warnings.push(ReconstructionWarning::MissingCatalogEntry {
                product_id: key.product_id,
                dropped_records: group.len(),
            });
            continue;
        };

        group.sort_by_key(|r| (r.occurred_at, r.id));

        let mut batch = Batch::from_catalog(key, entry);
        let mut running = 0i64;

        for record in group {
            match record.movement {
                StockMovement::Receipt { quantity } | StockMovement::Return { quantity } => {
                    running += quantity;
                }
                StockMovement::Sale { quantity } | StockMovement::WriteOff { quantity } => {
                    running -= quantity;
                }
                StockMovement::Adjustment { new_quantity } => {
                    result.adjustments.push(AdjustmentAudit {
                        transaction_id: record.id,
                        key,
                        previous_quantity: running,
                        new_quantity,
                        delta: new_quantity - running,
                    });
                    running = new_quantity;
                }
            }
        }

        if running < 0 {
            result.warnings.push(ReconstructionWarning::NegativeQuantity {
                key,
                quantity: running,
            });
        }

        batch.current_quantity = running;
        result.batches.insert(key, batch);
    }

    result
}

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelflife_core::{ProductId, StoreId};
use shelflife_ledger::{
    AdjustmentAudit, Batch, BatchKey, CatalogEntry, ExpiryStatus, ReconstructionWarning,
    TransactionRecord, classify, reconstruct,
};

/// One row of the current view: a positive-stock batch plus its expiry
/// classification, computed fresh at projection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchView {
    pub batch: Batch,
    pub expiry: ExpiryStatus,
}

/// One row of the all view: per-product totals regardless of stock level.
///
/// `total_quantity` is always derived from the ledger. The catalog's stored
/// total is only ever compared against it (see `ProjectionWarning`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateProduct {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit: String,
    pub total_quantity: i64,
    pub safety_stock: i64,
    pub max_stock: i64,
    pub shelf_life_days: u32,
    pub promotion: Option<String>,
}

/// Non-fatal observations raised while projecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionWarning {
    Reconstruction(ReconstructionWarning),

    /// The catalog's stored total disagrees with the ledger-derived total.
    /// The derived value is published; the stored one is a stale cache that
    /// needs reconciliation.
    StoredTotalMismatch {
        product_id: ProductId,
        stored: i64,
        derived: i64,
    },
}

/// A complete recompute result for one store: the full batch map plus both
/// views. Immutable once built; the next change signal replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub store_id: StoreId,
    /// Instant the projection was computed at; consumers use this to reason
    /// about staleness between an append and the next recompute.
    pub computed_at: DateTime<Utc>,
    /// Every known batch, exhausted ones included.
    pub batches: HashMap<BatchKey, Batch>,
    /// Positive-stock batches, expiry-sorted.
    pub current: Vec<BatchView>,
    /// One row per catalog product, name-sorted.
    pub all: Vec<AggregateProduct>,
    pub warnings: Vec<ProjectionWarning>,
    pub adjustments: Vec<AdjustmentAudit>,
}

impl Projection {
    /// Pure recompute: fold the record snapshot, classify expiries at `now`,
    /// and build both views. Deterministic for a fixed `(records, catalog,
    /// now)` input.
    pub fn compute(
        store_id: StoreId,
        records: &[TransactionRecord],
        catalog: &HashMap<ProductId, CatalogEntry>,
        now: DateTime<Utc>,
    ) -> Self {
        let recon = reconstruct(records, catalog);

        let mut warnings: Vec<ProjectionWarning> = recon
            .warnings
            .into_iter()
            .map(ProjectionWarning::Reconstruction)
            .collect();

        // Current view: positive stock only, classified at `now`.
        let mut current: Vec<BatchView> = recon
            .batches
            .values()
            .filter(|batch| batch.has_stock())
            .map(|batch| BatchView {
                batch: batch.clone(),
                expiry: classify(batch.key.expires_at, now),
            })
            .collect();

        // Dated batches first (soonest expiry leading), undated last, then
        // name and product id as stable tie-breaks.
        current.sort_by(|a, b| {
            let a_key = &a.batch.key;
            let b_key = &b.batch.key;
            a_key
                .expires_at
                .is_none()
                .cmp(&b_key.expires_at.is_none())
                .then_with(|| a_key.expires_at.cmp(&b_key.expires_at))
                .then_with(|| a.batch.product_name.cmp(&b.batch.product_name))
                .then_with(|| a_key.product_id.cmp(&b_key.product_id))
        });

        // All view: one row per catalog product, totals derived from the
        // ledger; the stored total only feeds the mismatch check.
        let mut entries: Vec<&CatalogEntry> = catalog.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.product_id.cmp(&b.product_id)));

        let mut all = Vec::with_capacity(entries.len());
        for entry in entries {
            let derived: i64 = recon
                .batches
                .values()
                .filter(|batch| batch.key.product_id == entry.product_id)
                .map(|batch| batch.current_quantity)
                .sum();

            if let Some(stored) = entry.stock_total
                && stored != derived
            {
                warnings.push(ProjectionWarning::StoredTotalMismatch {
                    product_id: entry.product_id,
                    stored,
                    derived,
                });
            }

            all.push(AggregateProduct {
                product_id: entry.product_id,
                product_name: entry.name.clone(),
                unit: entry.unit.clone(),
                total_quantity: derived,
                safety_stock: entry.safety_stock,
                max_stock: entry.max_stock,
                shelf_life_days: entry.shelf_life_days,
                promotion: entry.promotion.clone(),
            });
        }

        Self {
            store_id,
            computed_at: now,
            batches: recon.batches,
            current,
            all,
            warnings,
            adjustments: recon.adjustments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelflife_ledger::{ExpiryTier, StockMovement};
    use uuid::Uuid;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn product(n: u128) -> ProductId {
        ProductId::from_uuid(Uuid::from_u128(n))
    }

    fn store() -> StoreId {
        StoreId::from_uuid(Uuid::from_u128(1))
    }

    fn record(
        id: u128,
        key: BatchKey,
        movement: StockMovement,
        occurred_at: &str,
    ) -> TransactionRecord {
        TransactionRecord {
            id: shelflife_core::TransactionId::from_uuid(Uuid::from_u128(id)),
            store_id: store(),
            batch_key: key,
            movement,
            occurred_at: ts(occurred_at),
            notes: None,
        }
    }

    fn catalog_of(entries: Vec<CatalogEntry>) -> HashMap<ProductId, CatalogEntry> {
        entries.into_iter().map(|e| (e.product_id, e)).collect()
    }

    #[test]
    fn current_view_excludes_non_positive_batches() {
        let milk = product(10);
        let catalog = catalog_of(vec![CatalogEntry::new(milk, "Milk-1L", "bottle", 10, 2500)]);

        let stocked = BatchKey::new(milk, Some(ts("2024-01-10T09:00:00Z")));
        let exhausted = BatchKey::new(milk, Some(ts("2024-01-05T09:00:00Z")));

        let records = vec![
            record(1, stocked, StockMovement::Receipt { quantity: 35 }, "2024-01-01T09:00:00Z"),
            record(2, exhausted, StockMovement::Receipt { quantity: 5 }, "2024-01-01T09:00:00Z"),
            record(3, exhausted, StockMovement::Sale { quantity: 5 }, "2024-01-02T09:00:00Z"),
        ];

        let projection =
            Projection::compute(store(), &records, &catalog, ts("2024-01-03T09:00:00Z"));

        assert_eq!(projection.current.len(), 1);
        assert_eq!(projection.current[0].batch.key, stocked);
        // Both batches stay in the full map.
        assert_eq!(projection.batches.len(), 2);
    }

    #[test]
    fn current_view_sorts_dated_before_undated_then_soonest_first() {
        let milk = product(10);
        let bread = product(20);
        let salt = product(30);
        let catalog = catalog_of(vec![
            CatalogEntry::new(milk, "Milk-1L", "bottle", 10, 2500),
            CatalogEntry::new(bread, "Bread", "loaf", 3, 1800),
            CatalogEntry::new(salt, "Salt", "box", 0, 900),
        ]);

        let soon = BatchKey::new(bread, Some(ts("2024-01-05T00:00:00Z")));
        let later = BatchKey::new(milk, Some(ts("2024-01-10T00:00:00Z")));
        let undated = BatchKey::no_expiry(salt);

        let records = vec![
            record(1, undated, StockMovement::Receipt { quantity: 9 }, "2024-01-01T00:00:00Z"),
            record(2, later, StockMovement::Receipt { quantity: 5 }, "2024-01-01T00:00:00Z"),
            record(3, soon, StockMovement::Receipt { quantity: 7 }, "2024-01-01T00:00:00Z"),
        ];

        let projection =
            Projection::compute(store(), &records, &catalog, ts("2024-01-02T00:00:00Z"));

        let keys: Vec<BatchKey> = projection.current.iter().map(|v| v.batch.key).collect();
        assert_eq!(keys, vec![soon, later, undated]);
        assert_eq!(projection.current[2].expiry.tier, ExpiryTier::Unset);
    }

    #[test]
    fn expiry_is_classified_at_projection_time() {
        let milk = product(10);
        let catalog = catalog_of(vec![CatalogEntry::new(milk, "Milk-1L", "bottle", 10, 2500)]);
        let key = BatchKey::new(milk, Some(ts("2024-01-10T09:00:00Z")));
        let records = vec![record(
            1,
            key,
            StockMovement::Receipt { quantity: 35 },
            "2024-01-01T09:00:00Z",
        )];

        let before =
            Projection::compute(store(), &records, &catalog, ts("2024-01-08T09:00:00Z"));
        assert_eq!(before.current[0].expiry.tier, ExpiryTier::Danger);
        assert_eq!(before.current[0].expiry.remaining, "2d 0h 0m");

        // Same records, later clock: only the classification moves.
        let after =
            Projection::compute(store(), &records, &catalog, ts("2024-01-11T09:00:00Z"));
        assert_eq!(after.current[0].expiry.tier, ExpiryTier::Expired);
        assert_eq!(after.current[0].batch.current_quantity, 35);
    }

    #[test]
    fn all_view_lists_every_catalog_product_with_derived_totals() {
        let milk = product(10);
        let bread = product(20);
        let catalog = catalog_of(vec![
            CatalogEntry::new(milk, "Milk-1L", "bottle", 10, 2500),
            CatalogEntry::new(bread, "Bread", "loaf", 3, 1800),
        ]);

        let early = BatchKey::new(milk, Some(ts("2024-01-10T00:00:00Z")));
        let late = BatchKey::new(milk, Some(ts("2024-01-17T00:00:00Z")));
        let records = vec![
            record(1, early, StockMovement::Receipt { quantity: 20 }, "2024-01-01T00:00:00Z"),
            record(2, late, StockMovement::Receipt { quantity: 15 }, "2024-01-02T00:00:00Z"),
            record(3, early, StockMovement::Sale { quantity: 4 }, "2024-01-03T00:00:00Z"),
        ];

        let projection =
            Projection::compute(store(), &records, &catalog, ts("2024-01-04T00:00:00Z"));

        // Name-sorted: Bread (no batches, total 0) before Milk-1L.
        assert_eq!(projection.all.len(), 2);
        assert_eq!(projection.all[0].product_name, "Bread");
        assert_eq!(projection.all[0].total_quantity, 0);
        assert_eq!(projection.all[1].product_name, "Milk-1L");
        assert_eq!(projection.all[1].total_quantity, 31);
    }

    #[test]
    fn all_view_total_matches_sum_of_batches() {
        let milk = product(10);
        let catalog = catalog_of(vec![CatalogEntry::new(milk, "Milk-1L", "bottle", 10, 2500)]);

        let early = BatchKey::new(milk, Some(ts("2024-01-10T00:00:00Z")));
        let undated = BatchKey::no_expiry(milk);
        let records = vec![
            record(1, early, StockMovement::Receipt { quantity: 12 }, "2024-01-01T00:00:00Z"),
            record(2, undated, StockMovement::Receipt { quantity: 8 }, "2024-01-01T00:00:00Z"),
            record(3, undated, StockMovement::Sale { quantity: 11 }, "2024-01-02T00:00:00Z"),
        ];

        let projection =
            Projection::compute(store(), &records, &catalog, ts("2024-01-03T00:00:00Z"));

        let batch_sum: i64 = projection
            .batches
            .values()
            .map(|b| b.current_quantity)
            .sum();
        assert_eq!(projection.all[0].total_quantity, batch_sum);
    }

    #[test]
    fn stored_total_mismatch_is_reported_and_derived_value_wins() {
        let milk = product(10);
        let catalog = catalog_of(vec![
            CatalogEntry::new(milk, "Milk-1L", "bottle", 10, 2500).with_stock_total(40),
        ]);

        let key = BatchKey::new(milk, Some(ts("2024-01-10T00:00:00Z")));
        let records = vec![record(
            1,
            key,
            StockMovement::Receipt { quantity: 35 },
            "2024-01-01T00:00:00Z",
        )];

        let projection =
            Projection::compute(store(), &records, &catalog, ts("2024-01-02T00:00:00Z"));

        assert_eq!(projection.all[0].total_quantity, 35);
        assert_eq!(
            projection.warnings,
            vec![ProjectionWarning::StoredTotalMismatch {
                product_id: milk,
                stored: 40,
                derived: 35,
            }]
        );
    }

    #[test]
    fn agreeing_stored_total_raises_no_warning() {
        let milk = product(10);
        let catalog = catalog_of(vec![
            CatalogEntry::new(milk, "Milk-1L", "bottle", 10, 2500).with_stock_total(35),
        ]);

        let key = BatchKey::no_expiry(milk);
        let records = vec![record(
            1,
            key,
            StockMovement::Receipt { quantity: 35 },
            "2024-01-01T00:00:00Z",
        )];

        let projection =
            Projection::compute(store(), &records, &catalog, ts("2024-01-02T00:00:00Z"));
        assert!(projection.warnings.is_empty());
    }

    #[test]
    fn reconstruction_warnings_carry_through() {
        let catalog = HashMap::new();
        let key = BatchKey::no_expiry(product(99));
        let records = vec![record(
            1,
            key,
            StockMovement::Receipt { quantity: 1 },
            "2024-01-01T00:00:00Z",
        )];

        let projection =
            Projection::compute(store(), &records, &catalog, ts("2024-01-02T00:00:00Z"));
        assert!(matches!(
            projection.warnings[0],
            ProjectionWarning::Reconstruction(ReconstructionWarning::MissingCatalogEntry { .. })
        ));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: no batch with non-positive quantity ever appears in
            /// the current view, for any mix of receipts and sales.
            #[test]
            fn current_view_never_shows_non_positive_stock(
                receipts in 0i64..50,
                sales in 0i64..50,
            ) {
                let milk = product(10);
                let catalog = catalog_of(vec![
                    CatalogEntry::new(milk, "Milk-1L", "bottle", 10, 2500),
                ]);
                let key = BatchKey::no_expiry(milk);

                let records = vec![
                    record(1, key, StockMovement::Receipt { quantity: receipts }, "2024-01-01T00:00:00Z"),
                    record(2, key, StockMovement::Sale { quantity: sales }, "2024-01-02T00:00:00Z"),
                ];

                let projection = Projection::compute(
                    store(),
                    &records,
                    &catalog,
                    "2024-01-03T00:00:00Z".parse().unwrap(),
                );

                for view in &projection.current {
                    prop_assert!(view.batch.current_quantity > 0);
                }
                // The full map still accounts for the batch either way.
                prop_assert_eq!(
                    projection.batches[&key].current_quantity,
                    receipts - sales
                );
            }
        }
    }
}

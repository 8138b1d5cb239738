//! `shelflife-ledger` — transaction model and batch ledger reconstruction.
//!
//! The ledger is an append-only sequence of stock movements. Current
//! quantities are never stored; they are derived by folding a store's full
//! transaction history per batch (product + expiry date). This crate holds the
//! record model, the reconstruction fold, and the expiry classifier — all
//! pure, no IO.

pub mod batch;
pub mod catalog;
pub mod expiry;
pub mod reconstruct;
pub mod transaction;

pub use batch::Batch;
pub use catalog::CatalogEntry;
pub use expiry::{ExpiryStatus, ExpiryTier, classify};
pub use reconstruct::{AdjustmentAudit, Reconstruction, ReconstructionWarning, reconstruct};
pub use transaction::{BatchKey, StockMovement, TransactionRecord};

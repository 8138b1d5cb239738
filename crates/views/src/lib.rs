//! `shelflife-views` — the two externally visible projections.
//!
//! `Projection::compute` is the pure recompute function: full record snapshot
//! plus catalog in, "current" and "all" views out. The filter engine composes
//! independent predicates over either view. No IO here; pulling the snapshot
//! and deciding when to recompute belong to the infra layer.

pub mod filter;
pub mod projection;

pub use filter::{BatchFilter, ExpiryFilter, ProductFilter, PromotionFilter, StockFilter};
pub use projection::{AggregateProduct, BatchView, Projection, ProjectionWarning};

//! Infrastructure layer: collaborator boundaries and orchestration.
//!
//! The domain crates are pure; everything that touches the outside world
//! lives here — the transaction store and product catalog traits (with
//! in-memory implementations for tests/dev), the change notifier, the
//! recompute engine that publishes projections, the disposal command, and the
//! background recompute worker.

pub mod catalog;
pub mod disposal;
pub mod notifier;
pub mod recompute;
pub mod transaction_store;
pub mod workers;

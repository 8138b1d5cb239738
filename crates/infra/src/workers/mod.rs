//! Background workers.

mod recompute_worker;

pub use recompute_worker::{RecomputeWorker, WorkerHandle};

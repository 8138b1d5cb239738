//! Transaction store boundary.
//!
//! The store owns append atomicity and snapshot consistency; the core only
//! requires that `load_store` returns a consistent snapshot to fold over.

mod in_memory;
mod r#trait;

pub use in_memory::InMemoryTransactionStore;
pub use r#trait::{TransactionStore, TransactionStoreError};

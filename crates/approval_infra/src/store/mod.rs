//! Durable local storage: pending transaction queue.

pub mod pending;

pub use pending::{PendingStoreError, PendingTxRecord, PendingTxStore};

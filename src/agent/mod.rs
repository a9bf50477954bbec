//! Periodic reconciliation cycle

pub mod sync;

pub use sync::SyncAgent;

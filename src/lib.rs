//! Skimmer: alert store reconciliation and dispatch daemon
//!
//! Skimmer periodically polls an alerts index, collapses duplicate
//! sightings of the same logical alert, delivers the actionable ones to
//! the configured notification channels, and retires the store documents
//! it has absorbed.
//!
//! # Cycle
//!
//! fetch → [`reconcile`] → [`notify::Dispatcher`] fan-out → delete.
//! Delivery is best-effort per channel; the store is the only durable
//! state, so a failed delete simply causes re-delivery on a later pass.
//!
//! # Example
//!
//! ```no_run
//! use skimmer::reconcile::reconcile;
//!
//! let batch = vec![]; // records fetched from the store
//! let outcome = reconcile(batch);
//! assert!(outcome.to_notify.is_empty());
//! ```

pub mod agent;
pub mod config;
pub mod metrics;
pub mod model;
pub mod notify;
pub mod reconcile;
pub mod store;

// Re-export commonly used types
pub use config::{ChannelConfig, Config, ConfigError};
pub use model::{AlertPayload, AlertRecord, AlertStatus};
pub use reconcile::{reconcile, Reconciliation};

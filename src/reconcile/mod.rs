//! Reconciliation engine
//!
//! Collapses duplicate sightings of the same logical alert and decides
//! which alerts are due for delivery and which store documents are
//! superseded. Pure, no I/O.

pub mod engine;

pub use engine::{reconcile, Reconciliation};

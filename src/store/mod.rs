//! Alert store access
//!
//! The cycle driver only sees the [`AlertStore`] trait; the built-in
//! implementation talks to an Elasticsearch-compatible HTTP API.

pub mod client;

pub use client::{AlertStore, HttpStore, StoreError};

//! Notification fan-out
//!
//! Channels deliver a whole alert batch with bounded retries; the
//! dispatcher spawns one task per channel and records each outcome in the
//! shared failure gauge without blocking the reconciliation cycle.

pub mod channel;
pub mod dispatcher;
pub mod webhook;

pub use channel::{build_channels, Channel, DeliveryError};
pub use dispatcher::Dispatcher;
pub use webhook::WebhookChannel;

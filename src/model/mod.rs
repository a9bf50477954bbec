//! Typed alert records as they appear in the alerts index
//!
//! Each raw hit carries a `rule_kind` tag that selects the payload shape;
//! decoding resolves the tag once, everything downstream works with the
//! closed [`AlertPayload`] enum.

pub mod record;

pub use record::{AlertCommon, AlertPayload, AlertRecord, AlertStatus};

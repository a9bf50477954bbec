//! Alert record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of one alert occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
}

impl AlertStatus {
    /// Slot index in the reconciler's per-key two-slot grouping
    pub(crate) fn slot(self) -> usize {
        match self {
            AlertStatus::Active => 0,
            AlertStatus::Resolved => 1,
        }
    }
}

/// Fields shared by every rule kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCommon {
    pub rule_id: String,
    pub rule_name: String,
    pub alert_id: String,
    pub status: AlertStatus,
    pub triggered: DateTime<Utc>,
    pub context_message: String,
    /// Open-ended per-rule extras, passed through to channels untouched
    #[serde(default)]
    pub custom_data: serde_json::Map<String, serde_json::Value>,
}

/// Rule-kind-dependent alert payload
///
/// The `rule_kind` tag fully determines which extra fields are populated;
/// an unrecognized kind fails deserialization of the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule_kind", rename_all = "snake_case")]
pub enum AlertPayload {
    /// Threshold rule: a grouped match count crossed its limit
    ThresholdCount {
        #[serde(flatten)]
        common: AlertCommon,
        grouping_key: String,
        match_count: u64,
    },
    /// Query rule: a single matching value was observed
    QueryMatch {
        #[serde(flatten)]
        common: AlertCommon,
        value: serde_json::Value,
    },
}

impl AlertPayload {
    /// Fields shared by all kinds
    pub fn common(&self) -> &AlertCommon {
        match self {
            AlertPayload::ThresholdCount { common, .. } => common,
            AlertPayload::QueryMatch { common, .. } => common,
        }
    }

    pub fn status(&self) -> AlertStatus {
        self.common().status
    }

    pub fn triggered(&self) -> DateTime<Utc> {
        self.common().triggered
    }

    /// Identity that is stable across duplicate sightings of the same
    /// real-world occurrence. Threshold alerts repeat per grouping key,
    /// query alerts per alert id.
    pub fn unique_key(&self) -> String {
        match self {
            AlertPayload::ThresholdCount {
                common,
                grouping_key,
                ..
            } => format!("{}{}", common.rule_id, grouping_key),
            AlertPayload::QueryMatch { common, .. } => {
                format!("{}{}", common.rule_id, common.alert_id)
            }
        }
    }
}

/// One raw hit from the alerts index: store document id plus payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(rename = "_id")]
    pub record_id: String,
    #[serde(rename = "_source")]
    pub payload: AlertPayload,
}

impl AlertRecord {
    pub fn unique_key(&self) -> String {
        self.payload.unique_key()
    }
}

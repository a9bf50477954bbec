//! Batch reconciliation

use std::collections::HashMap;

use crate::model::AlertRecord;

/// Outcome of reconciling one fetched batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Alerts that must be handed to every configured channel
    pub to_notify: Vec<AlertRecord>,
    /// Store document ids that are superseded and safe to purge
    pub to_delete: Vec<String>,
}

/// Reconcile one unordered batch of alert records.
///
/// Records are grouped by [`unique_key`](AlertRecord::unique_key) into two
/// slots per key, one per status. Within a slot the record with the latest
/// `triggered` timestamp wins; the loser's document id goes to `to_delete`.
/// Ties keep the first-seen record.
///
/// Per key, a resolved occurrence is always notified and always retired.
/// An active occurrence is notified only when it re-triggered strictly
/// after the resolution (and is then kept in the store awaiting its own
/// resolution). An active occurrence with no resolution at all stays
/// untouched: it is re-evaluated on a later pass, never delivered on its
/// own.
///
/// Output order follows first appearance of each key in the input, so the
/// function is deterministic for a given input sequence.
pub fn reconcile(records: Vec<AlertRecord>) -> Reconciliation {
    let mut out = Reconciliation::default();
    let mut groups: HashMap<String, [Option<AlertRecord>; 2]> = HashMap::new();
    let mut key_order: Vec<String> = Vec::new();

    for record in records {
        let key = record.unique_key();
        let slot = record.payload.status().slot();
        let group = groups.entry(key.clone()).or_insert_with(|| {
            key_order.push(key);
            [None, None]
        });

        match &group[slot] {
            // Duplicate sighting: keep only the latest, first-seen wins ties
            Some(held) if held.payload.triggered() < record.payload.triggered() => {
                out.to_delete.push(held.record_id.clone());
                group[slot] = Some(record);
            }
            Some(_) => out.to_delete.push(record.record_id),
            None => group[slot] = Some(record),
        }
    }

    for key in key_order {
        let Some([active, resolved]) = groups.remove(&key) else {
            continue;
        };

        if let Some(resolved) = resolved {
            // A resolution is always reported and always retired
            out.to_delete.push(resolved.record_id.clone());

            if let Some(active) = active {
                if active.payload.triggered() > resolved.payload.triggered() {
                    // Re-trigger after the resolution: report it too, but
                    // keep its document until its own resolution arrives
                    out.to_notify.push(resolved);
                    out.to_notify.push(active);
                } else {
                    // Stale relative to the resolution
                    out.to_delete.push(active.record_id);
                    out.to_notify.push(resolved);
                }
            } else {
                out.to_notify.push(resolved);
            }
        }
        // A lone active occurrence stays pending: not notified, not deleted
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlertCommon, AlertPayload, AlertStatus};
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap()
    }

    fn threshold(doc: &str, rule: &str, group: &str, status: AlertStatus, minute: u32) -> AlertRecord {
        AlertRecord {
            record_id: doc.to_string(),
            payload: AlertPayload::ThresholdCount {
                common: AlertCommon {
                    rule_id: rule.to_string(),
                    rule_name: "threshold rule".to_string(),
                    alert_id: format!("{doc}-alert"),
                    status,
                    triggered: ts(minute),
                    context_message: String::new(),
                    custom_data: serde_json::Map::new(),
                },
                grouping_key: group.to_string(),
                match_count: 1,
            },
        }
    }

    fn query(doc: &str, rule: &str, alert: &str, status: AlertStatus, minute: u32) -> AlertRecord {
        AlertRecord {
            record_id: doc.to_string(),
            payload: AlertPayload::QueryMatch {
                common: AlertCommon {
                    rule_id: rule.to_string(),
                    rule_name: "query rule".to_string(),
                    alert_id: alert.to_string(),
                    status,
                    triggered: ts(minute),
                    context_message: String::new(),
                    custom_data: serde_json::Map::new(),
                },
                value: serde_json::json!(1),
            },
        }
    }

    fn notified_ids(result: &Reconciliation) -> Vec<&str> {
        result
            .to_notify
            .iter()
            .map(|r| r.record_id.as_str())
            .collect()
    }

    #[test]
    fn test_resolution_dominance() {
        // resolved after active: only the resolution is reported, both retired
        let batch = vec![
            threshold("d-active", "r1", "g1", AlertStatus::Active, 0),
            threshold("d-resolved", "r1", "g1", AlertStatus::Resolved, 5),
        ];

        let result = reconcile(batch);
        assert_eq!(notified_ids(&result), vec!["d-resolved"]);
        assert_eq!(result.to_delete, vec!["d-resolved", "d-active"]);
    }

    #[test]
    fn test_retrigger_after_resolution() {
        // active strictly after resolved: both reported, active kept in store
        let batch = vec![
            threshold("d-resolved", "r1", "g1", AlertStatus::Resolved, 5),
            threshold("d-active", "r1", "g1", AlertStatus::Active, 9),
        ];

        let result = reconcile(batch);
        assert_eq!(notified_ids(&result), vec!["d-resolved", "d-active"]);
        assert_eq!(result.to_delete, vec!["d-resolved"]);
    }

    #[test]
    fn test_lone_active_stays_pending() {
        let batch = vec![threshold("d1", "r1", "g1", AlertStatus::Active, 0)];

        let result = reconcile(batch);
        assert!(result.to_notify.is_empty());
        assert!(result.to_delete.is_empty());
    }

    #[test]
    fn test_equal_timestamps_on_active_and_resolved_favor_resolution() {
        // active not strictly after resolved counts as stale
        let batch = vec![
            threshold("d-active", "r1", "g1", AlertStatus::Active, 5),
            threshold("d-resolved", "r1", "g1", AlertStatus::Resolved, 5),
        ];

        let result = reconcile(batch);
        assert_eq!(notified_ids(&result), vec!["d-resolved"]);
        assert_eq!(result.to_delete, vec!["d-resolved", "d-active"]);
    }

    #[test]
    fn test_duplicate_sightings_keep_latest() {
        let batch = vec![
            threshold("d-old", "r1", "g1", AlertStatus::Resolved, 1),
            threshold("d-new", "r1", "g1", AlertStatus::Resolved, 8),
        ];

        let result = reconcile(batch);
        assert_eq!(notified_ids(&result), vec!["d-new"]);
        // displaced duplicate first, then the reported resolution itself
        assert_eq!(result.to_delete, vec!["d-old", "d-new"]);
    }

    #[test]
    fn test_tie_break_first_seen_wins_both_orders() {
        let first = threshold("d-first", "r1", "g1", AlertStatus::Resolved, 3);
        let second = threshold("d-second", "r1", "g1", AlertStatus::Resolved, 3);

        let result = reconcile(vec![first.clone(), second.clone()]);
        assert_eq!(notified_ids(&result), vec!["d-first"]);
        assert!(result.to_delete.contains(&"d-second".to_string()));

        let result = reconcile(vec![second, first]);
        assert_eq!(notified_ids(&result), vec!["d-second"]);
        assert!(result.to_delete.contains(&"d-first".to_string()));
    }

    #[test]
    fn test_dedup_idempotence() {
        let batch = vec![
            threshold("d1", "r1", "g1", AlertStatus::Active, 0),
            threshold("d2", "r1", "g1", AlertStatus::Resolved, 5),
            threshold("d3", "r1", "g1", AlertStatus::Resolved, 2),
            query("d4", "r2", "a1", AlertStatus::Active, 7),
            query("d5", "r2", "a1", AlertStatus::Resolved, 3),
        ];

        let once = reconcile(batch.clone());
        let twice = reconcile(batch);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_kinds_do_not_collide() {
        // a threshold alert and a query alert from different rules must not
        // merge even if their key components happen to concatenate alike
        let batch = vec![
            threshold("d1", "r1", "g1", AlertStatus::Resolved, 1),
            query("d2", "r2", "a9", AlertStatus::Resolved, 1),
        ];

        let result = reconcile(batch);
        assert_eq!(notified_ids(&result), vec!["d1", "d2"]);
        assert_eq!(result.to_delete, vec!["d1", "d2"]);
    }

    #[test]
    fn test_every_input_record_accounted_for() {
        let batch = vec![
            threshold("d1", "r1", "g1", AlertStatus::Active, 0),
            threshold("d2", "r1", "g1", AlertStatus::Active, 4),
            threshold("d3", "r1", "g1", AlertStatus::Resolved, 6),
            threshold("d4", "r3", "g2", AlertStatus::Active, 2),
        ];

        let result = reconcile(batch);
        // d1 displaced by d2, d2 stale under d3's resolution, d3 reported,
        // d4 pending
        assert_eq!(notified_ids(&result), vec!["d3"]);
        assert_eq!(result.to_delete, vec!["d1", "d3", "d2"]);
    }
}

//! Field-level conflict detection.

use crate::models::{EntityType, SyncConflict};
use crate::store::Row;

/// Fields never considered for conflicts: identity and sync bookkeeping.
pub const EXCLUDED_FIELDS: [&str; 3] = ["id", "created_at", "synced_at"];

/// Diff a local mutation payload against the remote row.
///
/// A conflict is recorded only when both sides define the field and the
/// values differ. A field present remotely but absent locally is an update
/// of a field the caller didn't touch, not a conflict.
pub fn detect_field_conflicts(
    entity_type: EntityType,
    entity_id: &str,
    local: &Row,
    remote: &Row,
    now_ms: i64,
) -> Vec<SyncConflict> {
    remote
        .iter()
        .filter(|(field, _)| !EXCLUDED_FIELDS.contains(&field.as_str()))
        .filter_map(|(field, remote_value)| {
            let local_value = local.get(field)?;
            if local_value == remote_value {
                return None;
            }
            Some(SyncConflict::new(
                entity_type,
                entity_id,
                field.clone(),
                local_value.clone(),
                remote_value.clone(),
                now_ms,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn agreeing_rows_yield_no_conflicts() {
        let local = row(&[("name", json!("Alpha")), ("budget", json!(5000))]);
        let remote = row(&[("name", json!("Alpha")), ("budget", json!(5000))]);

        let conflicts =
            detect_field_conflicts(EntityType::Project, "P1", &local, &remote, 1_000);
        assert_eq!(conflicts, vec![]);
    }

    #[test]
    fn each_differing_field_yields_one_conflict() {
        let local = row(&[
            ("name", json!("Alpha")),
            ("budget", json!(5000)),
            ("status", json!("active")),
        ]);
        let remote = row(&[
            ("name", json!("Alpha v2")),
            ("budget", json!(4000)),
            ("status", json!("active")),
        ]);

        let mut conflicts =
            detect_field_conflicts(EntityType::Project, "P1", &local, &remote, 1_000);
        conflicts.sort_by(|a, b| a.field.cmp(&b.field));

        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].field, "budget");
        assert_eq!(conflicts[0].local_value, json!(5000));
        assert_eq!(conflicts[0].remote_value, json!(4000));
        assert_eq!(conflicts[1].field, "name");
    }

    #[test]
    fn fields_untouched_locally_are_not_conflicts() {
        let local = row(&[("budget", json!(5000))]);
        let remote = row(&[("budget", json!(5000)), ("name", json!("Only remote"))]);

        let conflicts =
            detect_field_conflicts(EntityType::Project, "P1", &local, &remote, 1_000);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn excluded_fields_never_conflict() {
        let local = row(&[
            ("id", json!("local-id")),
            ("created_at", json!(1)),
            ("synced_at", json!(2)),
            ("budget", json!(10)),
        ]);
        let remote = row(&[
            ("id", json!("remote-id")),
            ("created_at", json!(9)),
            ("synced_at", json!(8)),
            ("budget", json!(10)),
        ]);

        let conflicts =
            detect_field_conflicts(EntityType::Project, "P1", &local, &remote, 1_000);
        assert!(conflicts.is_empty());
    }
}

//! Conflict resolution strategies and the per-entity-type registry.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{ConflictResolution, EntityType};
use crate::store::Row;

/// Named resolution strategy: a pure function of (local, remote) rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    LastWriteWins,
    Merge,
    Manual,
}

impl StrategyKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastWriteWins => "last_write_wins",
            Self::Merge => "merge",
            Self::Manual => "manual",
        }
    }

    /// The ledger resolution recorded when this strategy settles a conflict.
    ///
    /// `manual` never settles anything automatically.
    pub const fn as_resolution(self) -> Option<ConflictResolution> {
        match self {
            Self::LastWriteWins => Some(ConflictResolution::LastWriteWins),
            Self::Merge => Some(ConflictResolution::Merge),
            Self::Manual => None,
        }
    }

    /// Produce the resolved row, or refuse with `ManualResolutionRequired`.
    pub fn resolve(self, local: &Row, remote: &Row, now_ms: i64) -> Result<Row> {
        match self {
            Self::LastWriteWins => Ok(last_write_wins(local, remote)),
            Self::Merge => Ok(merge_rows(local, remote, now_ms)),
            Self::Manual => Err(Error::ManualResolutionRequired(
                "strategy 'manual' requires explicit resolution".to_string(),
            )),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "last_write_wins" => Ok(Self::LastWriteWins),
            "merge" => Ok(Self::Merge),
            "manual" => Ok(Self::Manual),
            other => Err(Error::InvalidInput(format!("unknown strategy '{other}'"))),
        }
    }
}

/// The whole row with the later `updated_at` (fallback `created_at`) wins.
/// Ties go to the remote row.
fn last_write_wins(local: &Row, remote: &Row) -> Row {
    if row_timestamp(local) > row_timestamp(remote) {
        local.clone()
    } else {
        remote.clone()
    }
}

/// Start from the local row; for every remote field that differs, take the
/// deduplicated union when both values are arrays, otherwise the remote
/// value. `updated_at` is stamped to the resolution time.
fn merge_rows(local: &Row, remote: &Row, now_ms: i64) -> Row {
    let mut merged = local.clone();
    for (field, remote_value) in remote {
        let winner = match merged.get(field) {
            Some(local_value) if local_value == remote_value => continue,
            Some(Value::Array(local_items)) => match remote_value {
                Value::Array(remote_items) => {
                    Value::Array(array_union(local_items, remote_items))
                }
                _ => remote_value.clone(),
            },
            _ => remote_value.clone(),
        };
        merged.insert(field.clone(), winner);
    }
    merged.insert("updated_at".to_string(), Value::from(now_ms));
    merged
}

/// Resolve a single disputed field by the generic merge rule: array union
/// when both sides are arrays, remote value otherwise.
pub fn merge_field(local_value: &Value, remote_value: &Value) -> Value {
    match (local_value, remote_value) {
        (Value::Array(local_items), Value::Array(remote_items)) => {
            Value::Array(array_union(local_items, remote_items))
        }
        _ => remote_value.clone(),
    }
}

fn array_union(local: &[Value], remote: &[Value]) -> Vec<Value> {
    let mut union = Vec::with_capacity(local.len() + remote.len());
    for item in local.iter().chain(remote) {
        if !union.contains(item) {
            union.push(item.clone());
        }
    }
    union
}

fn row_timestamp(row: &Row) -> i64 {
    row.get("updated_at")
        .or_else(|| row.get("created_at"))
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

/// Per-entity-type strategy defaults, injected at engine construction.
#[derive(Clone, Debug)]
pub struct StrategyRegistry {
    defaults: HashMap<EntityType, StrategyKind>,
    fallback: StrategyKind,
}

impl StrategyRegistry {
    /// Registry with an explicit mapping and fallback.
    #[must_use]
    pub fn new(defaults: HashMap<EntityType, StrategyKind>, fallback: StrategyKind) -> Self {
        Self { defaults, fallback }
    }

    /// Strategy to apply for an entity type.
    #[must_use]
    pub fn strategy_for(&self, entity_type: EntityType) -> StrategyKind {
        self.defaults
            .get(&entity_type)
            .copied()
            .unwrap_or(self.fallback)
    }

    /// Override the strategy for one entity type (builder-style).
    #[must_use]
    pub fn with_strategy(mut self, entity_type: EntityType, strategy: StrategyKind) -> Self {
        self.defaults.insert(entity_type, strategy);
        self
    }
}

impl Default for StrategyRegistry {
    /// Ledger entities take last-writer-wins; collaborative entities merge;
    /// everything else falls back to last-writer-wins.
    fn default() -> Self {
        let defaults = HashMap::from([
            (EntityType::Invoice, StrategyKind::LastWriteWins),
            (EntityType::Payment, StrategyKind::LastWriteWins),
            (EntityType::Project, StrategyKind::Merge),
            (EntityType::Client, StrategyKind::Merge),
        ]);
        Self::new(defaults, StrategyKind::LastWriteWins)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn last_write_wins_takes_whole_later_row() {
        let local = row(&[("updated_at", json!(1_000)), ("amount", json!(100))]);
        let remote = row(&[("updated_at", json!(2_000)), ("amount", json!(200))]);

        let resolved = StrategyKind::LastWriteWins
            .resolve(&local, &remote, 9_000)
            .unwrap();
        assert_eq!(resolved.get("amount"), Some(&json!(200)));
        assert_eq!(resolved.get("updated_at"), Some(&json!(2_000)));
    }

    #[test]
    fn last_write_wins_prefers_local_when_newer() {
        let local = row(&[("updated_at", json!(3_000)), ("amount", json!(100))]);
        let remote = row(&[("updated_at", json!(2_000)), ("amount", json!(200))]);

        let resolved = StrategyKind::LastWriteWins
            .resolve(&local, &remote, 9_000)
            .unwrap();
        assert_eq!(resolved.get("amount"), Some(&json!(100)));
    }

    #[test]
    fn last_write_wins_falls_back_to_created_at() {
        let local = row(&[("created_at", json!(5_000)), ("amount", json!(1))]);
        let remote = row(&[("created_at", json!(1_000)), ("amount", json!(2))]);

        let resolved = StrategyKind::LastWriteWins
            .resolve(&local, &remote, 9_000)
            .unwrap();
        assert_eq!(resolved.get("amount"), Some(&json!(1)));
    }

    #[test]
    fn merge_unions_arrays_without_duplicates() {
        let local = row(&[("tags", json!(["a", "b"]))]);
        let remote = row(&[("tags", json!(["b", "c"]))]);

        let resolved = StrategyKind::Merge.resolve(&local, &remote, 9_000).unwrap();
        assert_eq!(resolved.get("tags"), Some(&json!(["a", "b", "c"])));
        assert_eq!(resolved.get("updated_at"), Some(&json!(9_000)));
    }

    #[test]
    fn merge_prefers_remote_scalars_and_keeps_local_only_fields() {
        let local = row(&[("budget", json!(5000)), ("notes", json!("local only"))]);
        let remote = row(&[("budget", json!(4000)), ("status", json!("active"))]);

        let resolved = StrategyKind::Merge.resolve(&local, &remote, 9_000).unwrap();
        assert_eq!(resolved.get("budget"), Some(&json!(4000)));
        assert_eq!(resolved.get("notes"), Some(&json!("local only")));
        assert_eq!(resolved.get("status"), Some(&json!("active")));
    }

    #[test]
    fn manual_always_refuses() {
        let error = StrategyKind::Manual
            .resolve(&Row::new(), &Row::new(), 0)
            .unwrap_err();
        assert!(matches!(error, Error::ManualResolutionRequired(_)));
    }

    #[test]
    fn merge_field_applies_generic_rule() {
        assert_eq!(
            merge_field(&json!(["a"]), &json!(["a", "b"])),
            json!(["a", "b"])
        );
        assert_eq!(merge_field(&json!(1), &json!(2)), json!(2));
    }

    #[test]
    fn registry_defaults_split_ledger_and_collaborative_entities() {
        let registry = StrategyRegistry::default();
        assert_eq!(
            registry.strategy_for(EntityType::Invoice),
            StrategyKind::LastWriteWins
        );
        assert_eq!(
            registry.strategy_for(EntityType::Project),
            StrategyKind::Merge
        );
        // Unmapped types use the fallback
        assert_eq!(
            registry.strategy_for(EntityType::TimeEntry),
            StrategyKind::LastWriteWins
        );
    }

    #[test]
    fn registry_overrides_apply() {
        let registry =
            StrategyRegistry::default().with_strategy(EntityType::Expense, StrategyKind::Manual);
        assert_eq!(
            registry.strategy_for(EntityType::Expense),
            StrategyKind::Manual
        );
    }

    #[test]
    fn strategy_kind_parses_from_str() {
        assert_eq!(
            "last_write_wins".parse::<StrategyKind>().unwrap(),
            StrategyKind::LastWriteWins
        );
        assert!("optimistic".parse::<StrategyKind>().is_err());
    }
}

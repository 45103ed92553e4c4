//! Business entity kinds and their field schemas.
//!
//! Every synced record belongs to one of a closed set of entity types. Each
//! type carries the remote table it lives in and a concrete field schema so
//! payloads can be validated up front and field diffing never compares
//! values of mismatched shape.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::store::Row;

/// Fields managed by the engine rather than declared per entity.
pub const BOOKKEEPING_FIELDS: [&str; 6] = [
    "id",
    "created_at",
    "updated_at",
    "synced_at",
    "deleted",
    "deleted_at",
];

/// Kind of value a declared field holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Bool,
    /// Unix milliseconds
    Timestamp,
    /// List of strings (e.g. tags); merged as a deduplicated union
    TextList,
}

impl FieldKind {
    /// Check a JSON value against this kind. `null` clears a field and is
    /// accepted for every kind.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Text => value.is_string() || value.is_null(),
            Self::Number | Self::Timestamp => value.is_number() || value.is_null(),
            Self::Bool => value.is_boolean() || value.is_null(),
            Self::TextList => match value {
                Value::Null => true,
                Value::Array(items) => items.iter().all(Value::is_string),
                _ => false,
            },
        }
    }
}

/// One declared field on an entity type.
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

const PROJECT_FIELDS: &[FieldSpec] = &[
    field("name", FieldKind::Text),
    field("client_id", FieldKind::Text),
    field("status", FieldKind::Text),
    field("budget", FieldKind::Number),
    field("hourly_rate", FieldKind::Number),
    field("tags", FieldKind::TextList),
    field("notes", FieldKind::Text),
];

const CLIENT_FIELDS: &[FieldSpec] = &[
    field("name", FieldKind::Text),
    field("email", FieldKind::Text),
    field("phone", FieldKind::Text),
    field("address", FieldKind::Text),
    field("tags", FieldKind::TextList),
    field("notes", FieldKind::Text),
];

const INVOICE_FIELDS: &[FieldSpec] = &[
    field("number", FieldKind::Text),
    field("client_id", FieldKind::Text),
    field("project_id", FieldKind::Text),
    field("amount", FieldKind::Number),
    field("tax_rate", FieldKind::Number),
    field("status", FieldKind::Text),
    field("due_date", FieldKind::Timestamp),
    field("paid", FieldKind::Bool),
];

const PAYMENT_FIELDS: &[FieldSpec] = &[
    field("invoice_id", FieldKind::Text),
    field("amount", FieldKind::Number),
    field("method", FieldKind::Text),
    field("reference", FieldKind::Text),
    field("received_at", FieldKind::Timestamp),
];

const TIME_ENTRY_FIELDS: &[FieldSpec] = &[
    field("project_id", FieldKind::Text),
    field("description", FieldKind::Text),
    field("minutes", FieldKind::Number),
    field("billable", FieldKind::Bool),
    field("started_at", FieldKind::Timestamp),
];

const EXPENSE_FIELDS: &[FieldSpec] = &[
    field("project_id", FieldKind::Text),
    field("description", FieldKind::Text),
    field("amount", FieldKind::Number),
    field("category", FieldKind::Text),
    field("receipt_url", FieldKind::Text),
    field("incurred_at", FieldKind::Timestamp),
];

/// The business record kinds this engine synchronizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Project,
    Client,
    Invoice,
    Payment,
    TimeEntry,
    Expense,
}

impl EntityType {
    pub const ALL: [Self; 6] = [
        Self::Project,
        Self::Client,
        Self::Invoice,
        Self::Payment,
        Self::TimeEntry,
        Self::Expense,
    ];

    /// Lowercase tag used in payloads, events, and CLI arguments.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Client => "client",
            Self::Invoice => "invoice",
            Self::Payment => "payment",
            Self::TimeEntry => "time_entry",
            Self::Expense => "expense",
        }
    }

    /// Remote table holding records of this type.
    pub const fn table(self) -> &'static str {
        match self {
            Self::Project => "Projects",
            Self::Client => "Clients",
            Self::Invoice => "Invoices",
            Self::Payment => "Payments",
            Self::TimeEntry => "Time_Entries",
            Self::Expense => "Expenses",
        }
    }

    /// Declared fields for this type.
    pub const fn schema(self) -> &'static [FieldSpec] {
        match self {
            Self::Project => PROJECT_FIELDS,
            Self::Client => CLIENT_FIELDS,
            Self::Invoice => INVOICE_FIELDS,
            Self::Payment => PAYMENT_FIELDS,
            Self::TimeEntry => TIME_ENTRY_FIELDS,
            Self::Expense => EXPENSE_FIELDS,
        }
    }

    /// Validate a mutation payload against this type's schema.
    ///
    /// Bookkeeping fields are always accepted; every other field must be
    /// declared and carry a value of the declared kind.
    pub fn validate_payload(self, payload: &Row) -> Result<()> {
        for (name, value) in payload {
            if BOOKKEEPING_FIELDS.contains(&name.as_str()) {
                continue;
            }
            let Some(spec) = self.schema().iter().find(|spec| spec.name == name) else {
                return Err(Error::InvalidInput(format!(
                    "unknown field '{name}' for entity type '{}'",
                    self.as_str()
                )));
            };
            if !spec.kind.accepts(value) {
                return Err(Error::InvalidInput(format!(
                    "field '{name}' on '{}' expects {:?}, got {value}",
                    self.as_str(),
                    spec.kind
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|entity_type| entity_type.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown entity type '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect::<Map<_, _>>()
    }

    #[test]
    fn entity_type_round_trips_through_str() {
        for entity_type in EntityType::ALL {
            let parsed: EntityType = entity_type.as_str().parse().unwrap();
            assert_eq!(parsed, entity_type);
        }
        assert!("spaceship".parse::<EntityType>().is_err());
    }

    #[test]
    fn every_entity_type_declares_a_schema() {
        for entity_type in EntityType::ALL {
            let schema = entity_type.schema();
            assert!(!schema.is_empty(), "{entity_type} has no declared fields");
            for spec in schema {
                assert!(
                    !BOOKKEEPING_FIELDS.contains(&spec.name),
                    "{entity_type} declares bookkeeping field '{}'",
                    spec.name
                );
            }
        }
    }

    #[test]
    fn validate_payload_accepts_declared_fields() {
        let payload = row(&[
            ("name", json!("Website redesign")),
            ("budget", json!(5000)),
            ("tags", json!(["design", "web"])),
        ]);
        EntityType::Project.validate_payload(&payload).unwrap();
    }

    #[test]
    fn validate_payload_accepts_bookkeeping_fields() {
        let payload = row(&[("id", json!("P1")), ("updated_at", json!(1000))]);
        EntityType::Invoice.validate_payload(&payload).unwrap();
    }

    #[test]
    fn validate_payload_rejects_unknown_field() {
        let payload = row(&[("warp_factor", json!(9))]);
        let error = EntityType::Project.validate_payload(&payload).unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
    }

    #[test]
    fn validate_payload_rejects_wrong_kind() {
        let payload = row(&[("budget", json!("lots"))]);
        assert!(EntityType::Project.validate_payload(&payload).is_err());

        let payload = row(&[("tags", json!([1, 2]))]);
        assert!(EntityType::Project.validate_payload(&payload).is_err());
    }

    #[test]
    fn validate_payload_allows_null_to_clear() {
        let payload = row(&[("notes", Value::Null), ("budget", Value::Null)]);
        EntityType::Project.validate_payload(&payload).unwrap();
    }
}

//! Sync conflict ledger model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::EntityType;

/// A unique identifier for a conflict record, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictId(Uuid);

impl ConflictId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for ConflictId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConflictId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// How a conflict was settled.
///
/// Manual resolution picks one of `local`/`remote`/`merge`; automatic
/// resolution records the strategy that produced the winning row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    Local,
    Remote,
    Merge,
    LastWriteWins,
}

impl ConflictResolution {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::Merge => "merge",
            Self::LastWriteWins => "last_write_wins",
        }
    }
}

impl fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One disputed field on one entity, recorded at apply time.
///
/// Conflicts are append-only evidence; once `resolved` is set the record is
/// immutable apart from the resolution metadata written with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConflict {
    /// Conflict record identifier
    pub id: ConflictId,
    /// Entity kind involved
    pub entity_type: EntityType,
    /// Remote id of the entity
    pub entity_id: String,
    /// Disputed field name
    pub field: String,
    /// Value the local mutation carried
    pub local_value: Value,
    /// Value the remote row held at apply time
    pub remote_value: Value,
    /// Detection timestamp (Unix ms)
    pub timestamp: i64,
    /// Whether the dispute has been settled
    pub resolved: bool,
    /// How it was settled, once resolved
    pub resolution: Option<ConflictResolution>,
    /// Resolution timestamp (Unix ms)
    pub resolved_at: Option<i64>,
    /// Who settled it ("system" for automatic resolution)
    pub resolved_by: Option<String>,
}

impl SyncConflict {
    /// Record a fresh, unresolved dispute over one field.
    #[must_use]
    pub fn new(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        field: impl Into<String>,
        local_value: Value,
        remote_value: Value,
        timestamp: i64,
    ) -> Self {
        Self {
            id: ConflictId::new(),
            entity_type,
            entity_id: entity_id.into(),
            field: field.into(),
            local_value,
            remote_value,
            timestamp,
            resolved: false,
            resolution: None,
            resolved_at: None,
            resolved_by: None,
        }
    }

    /// Mark this conflict settled, writing all resolution metadata at once.
    pub fn mark_resolved(
        &mut self,
        resolution: ConflictResolution,
        resolved_by: impl Into<String>,
        resolved_at: i64,
    ) {
        self.resolved = true;
        self.resolution = Some(resolution);
        self.resolved_at = Some(resolved_at);
        self.resolved_by = Some(resolved_by.into());
    }
}

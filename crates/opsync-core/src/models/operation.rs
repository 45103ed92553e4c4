//! Sync operation model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::EntityType;
use crate::store::Row;

/// Default attempt budget before an operation is parked as failed.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// A unique identifier for a sync operation, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Create a new unique operation ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OperationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// What a queued mutation does to its entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

impl OperationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the sync produced the mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationSource {
    Local,
    Remote,
}

/// Where an operation sits in its lifecycle.
///
/// Transitions only move forward (`pending -> completed | failed | conflict`)
/// except the explicit `failed -> pending` reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Pending,
    Completed,
    Failed,
    Conflict,
}

impl OperationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Conflict => "conflict",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single mutation intent queued for application to the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOperation {
    /// Unique identifier
    pub id: OperationId,
    /// What the mutation does
    pub kind: OperationKind,
    /// Which entity kind it touches
    pub entity_type: EntityType,
    /// Remote id of the entity
    pub entity_id: String,
    /// Field map to apply
    pub payload: Row,
    /// Queue timestamp (Unix ms)
    pub timestamp: i64,
    /// Origin of the mutation
    pub source: OperationSource,
    /// Lifecycle state
    pub status: OperationStatus,
    /// Attempts so far; never exceeds `max_retries`
    pub retry_count: u32,
    /// Attempt budget, fixed at creation
    pub max_retries: u32,
    /// Message from the most recent failed attempt
    pub last_error: Option<String>,
    /// Earliest time (Unix ms) the next attempt may run
    pub next_retry_at: Option<i64>,
    /// Set when the operation completes
    pub completed_at: Option<i64>,
    /// Set when the operation is parked as failed
    pub failed_at: Option<i64>,
}

impl SyncOperation {
    /// Create a new pending operation with the default retry budget.
    #[must_use]
    pub fn new(
        kind: OperationKind,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        payload: Row,
        source: OperationSource,
    ) -> Self {
        Self {
            id: OperationId::new(),
            kind,
            entity_type,
            entity_id: entity_id.into(),
            payload,
            timestamp: crate::util::now_ms(),
            source,
            status: OperationStatus::Pending,
            retry_count: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            last_error: None,
            next_retry_at: None,
            completed_at: None,
            failed_at: None,
        }
    }

    /// Override the retry budget (builder-style, used at queue time).
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Whether this operation may run at `now` (pending and past any backoff).
    #[must_use]
    pub fn is_due(&self, now_ms: i64) -> bool {
        self.status == OperationStatus::Pending
            && self.next_retry_at.map_or(true, |at| at <= now_ms)
    }

    /// Reset a failed operation back to pending for another round of attempts.
    pub fn reset_for_retry(&mut self) {
        self.status = OperationStatus::Pending;
        self.retry_count = 0;
        self.last_error = None;
        self.next_retry_at = None;
        self.failed_at = None;
    }
}

//! Queue-based synchronization: detection, resolution, retry, orchestration.

pub mod backoff;
pub mod detector;
pub mod engine;
pub mod strategy;

pub use detector::{detect_field_conflicts, EXCLUDED_FIELDS};
pub use engine::{
    SyncEngine, SyncEngineConfig, CONFLICTS_TABLE, DEFAULT_RETENTION_DAYS, OPERATIONS_TABLE,
    STATUS_TABLE,
};
pub use strategy::{merge_field, StrategyKind, StrategyRegistry};

//! Generic row-CRUD storage over named tables.
//!
//! The remote system-of-record and the engine's own bookkeeping tables are
//! both reached through the same `RowStore` trait, so the engine never cares
//! which backend it is talking to.

mod memory;
mod sqlite;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use memory::MemoryRowStore;
pub use sqlite::SqliteRowStore;

/// One record in a named table: an opaque field map.
pub type Row = serde_json::Map<String, Value>;

/// Generic create/read/query/update/delete over named tables.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Insert a row, generating an `id` field when absent. Returns the id.
    async fn create(&self, table: &str, row: Row) -> Result<String>;

    /// All rows of a table.
    async fn read(&self, table: &str) -> Result<Vec<Row>>;

    /// A single row by id; `None` when absent.
    async fn read_one(&self, table: &str, id: &str) -> Result<Option<Row>>;

    /// Rows whose fields equal every entry of `filter`.
    async fn query(&self, table: &str, filter: &Row) -> Result<Vec<Row>>;

    /// Shallow-merge `patch` into the row. Returns false when absent.
    async fn update(&self, table: &str, id: &str, patch: Row) -> Result<bool>;

    /// Physically remove a row. Returns false when absent.
    async fn delete(&self, table: &str, id: &str) -> Result<bool>;
}

/// Equality match of a row against a filter map.
pub(crate) fn row_matches(row: &Row, filter: &Row) -> bool {
    filter
        .iter()
        .all(|(field, expected)| row.get(field) == Some(expected))
}

/// The row's `id` field as a string, if present.
pub(crate) fn row_id(row: &Row) -> Option<String> {
    row.get("id").and_then(Value::as_str).map(str::to_string)
}

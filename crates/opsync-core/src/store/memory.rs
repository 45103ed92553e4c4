//! In-memory row store, the reference backend and test double.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;

use super::{row_matches, RowStore, Row};

/// Tables of rows held in process memory.
///
/// Rows are keyed by id in a `BTreeMap`; with UUID v7 ids iteration order is
/// also insertion order.
#[derive(Default)]
pub struct MemoryRowStore {
    tables: RwLock<HashMap<String, BTreeMap<String, Row>>>,
}

impl MemoryRowStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in a table (test/diagnostic helper).
    pub async fn len(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map_or(0, BTreeMap::len)
    }

    /// Whether a table has no rows.
    pub async fn is_empty(&self, table: &str) -> bool {
        self.len(table).await == 0
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn create(&self, table: &str, mut row: Row) -> Result<String> {
        let id = match super::row_id(&row) {
            Some(id) => id,
            None => {
                let id = Uuid::now_v7().to_string();
                row.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };

        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(id.clone(), row);
        Ok(id)
    }

    async fn read(&self, table: &str) -> Result<Vec<Row>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn read_one(&self, table: &str, id: &str) -> Result<Option<Row>> {
        let tables = self.tables.read().await;
        Ok(tables.get(table).and_then(|rows| rows.get(id)).cloned())
    }

    async fn query(&self, table: &str, filter: &Row) -> Result<Vec<Row>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|rows| {
                rows.values()
                    .filter(|row| row_matches(row, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.get_mut(table).and_then(|rows| rows.get_mut(id)) else {
            return Ok(false);
        };
        for (field, value) in patch {
            row.insert(field, value);
        }
        Ok(true)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(table)
            .map_or(false, |rows| rows.remove(id).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn create_generates_id_when_absent() {
        let store = MemoryRowStore::new();
        let id = store
            .create("Projects", row(&[("name", json!("Alpha"))]))
            .await
            .unwrap();
        assert!(!id.is_empty());

        let fetched = store.read_one("Projects", &id).await.unwrap().unwrap();
        assert_eq!(fetched.get("name"), Some(&json!("Alpha")));
        assert_eq!(fetched.get("id"), Some(&json!(id)));
    }

    #[tokio::test]
    async fn create_keeps_caller_supplied_id() {
        let store = MemoryRowStore::new();
        let id = store
            .create("Projects", row(&[("id", json!("P1"))]))
            .await
            .unwrap();
        assert_eq!(id, "P1");
    }

    #[tokio::test]
    async fn update_merges_and_reports_missing_rows() {
        let store = MemoryRowStore::new();
        store
            .create(
                "Projects",
                row(&[("id", json!("P1")), ("name", json!("Alpha")), ("budget", json!(1))]),
            )
            .await
            .unwrap();

        let updated = store
            .update("Projects", "P1", row(&[("budget", json!(2))]))
            .await
            .unwrap();
        assert!(updated);

        let fetched = store.read_one("Projects", "P1").await.unwrap().unwrap();
        assert_eq!(fetched.get("budget"), Some(&json!(2)));
        assert_eq!(fetched.get("name"), Some(&json!("Alpha")));

        let missing = store
            .update("Projects", "nope", row(&[("budget", json!(3))]))
            .await
            .unwrap();
        assert!(!missing);
    }

    #[tokio::test]
    async fn query_filters_on_equality() {
        let store = MemoryRowStore::new();
        store
            .create("Invoices", row(&[("id", json!("I1")), ("status", json!("draft"))]))
            .await
            .unwrap();
        store
            .create("Invoices", row(&[("id", json!("I2")), ("status", json!("sent"))]))
            .await
            .unwrap();

        let drafts = store
            .query("Invoices", &row(&[("status", json!("draft"))]))
            .await
            .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].get("id"), Some(&json!("I1")));
    }

    #[tokio::test]
    async fn delete_removes_rows() {
        let store = MemoryRowStore::new();
        store
            .create("Clients", row(&[("id", json!("C1"))]))
            .await
            .unwrap();

        assert!(store.delete("Clients", "C1").await.unwrap());
        assert!(!store.delete("Clients", "C1").await.unwrap());
        assert!(store.is_empty("Clients").await);
    }
}

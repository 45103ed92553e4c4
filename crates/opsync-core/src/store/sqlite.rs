//! SQLite-backed row store.
//!
//! One generic `rows` table keyed by (table name, id) with the row body as
//! JSON text. Good enough for a single-process queue; the remote
//! system-of-record in production deployments sits behind the same trait.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::{row_matches, RowStore, Row};

/// Durable row store over a local SQLite file.
pub struct SqliteRowStore {
    conn: Mutex<Connection>,
}

impl SqliteRowStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS rows (
                table_name TEXT NOT NULL,
                id TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (table_name, id)
            );
            CREATE INDEX IF NOT EXISTS idx_rows_table ON rows(table_name);",
        )?;
        info!("Row store initialized");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn parse_body(body: &str) -> Result<Row> {
        match serde_json::from_str::<Value>(body)? {
            Value::Object(row) => Ok(row),
            other => Err(Error::Store(format!("row body is not an object: {other}"))),
        }
    }
}

#[async_trait]
impl RowStore for SqliteRowStore {
    async fn create(&self, table: &str, mut row: Row) -> Result<String> {
        let id = match super::row_id(&row) {
            Some(id) => id,
            None => {
                let id = Uuid::now_v7().to_string();
                row.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };
        let body = serde_json::to_string(&row)?;

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO rows (table_name, id, body) VALUES (?, ?, ?)",
            params![table, id, body],
        )?;
        Ok(id)
    }

    async fn read(&self, table: &str) -> Result<Vec<Row>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT body FROM rows WHERE table_name = ? ORDER BY id")?;
        let bodies = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        bodies.iter().map(|body| Self::parse_body(body)).collect()
    }

    async fn read_one(&self, table: &str, id: &str) -> Result<Option<Row>> {
        let conn = self.conn.lock().await;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM rows WHERE table_name = ? AND id = ?",
                params![table, id],
                |row| row.get(0),
            )
            .optional()?;

        body.as_deref().map(Self::parse_body).transpose()
    }

    async fn query(&self, table: &str, filter: &Row) -> Result<Vec<Row>> {
        let rows = self.read(table).await?;
        Ok(rows
            .into_iter()
            .filter(|row| row_matches(row, filter))
            .collect())
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> Result<bool> {
        let conn = self.conn.lock().await;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM rows WHERE table_name = ? AND id = ?",
                params![table, id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(body) = body else {
            return Ok(false);
        };

        let mut row = Self::parse_body(&body)?;
        for (field, value) in patch {
            row.insert(field, value);
        }
        let merged = serde_json::to_string(&row)?;

        conn.execute(
            "UPDATE rows SET body = ? WHERE table_name = ? AND id = ?",
            params![merged, table, id],
        )?;
        Ok(true)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let removed = conn.execute(
            "DELETE FROM rows WHERE table_name = ? AND id = ?",
            params![table, id],
        )?;
        Ok(removed > 0)
    }
}

// src/repositories/local_storage.rs
//
// Key/value local storage
//
// Holds the persisted session and the PKCE code verifier between runs.
// Values are opaque strings; callers own their encoding.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::db::{get_connection, ConnectionPool};
use crate::error::AppResult;

pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> AppResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove_item(&self, key: &str) -> AppResult<()>;
}

pub struct SqliteLocalStorage {
    pool: Arc<ConnectionPool>,
}

impl SqliteLocalStorage {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

impl LocalStorage for SqliteLocalStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let conn = get_connection(&self.pool)?;
        let value = conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        conn.execute(
            "INSERT OR REPLACE INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Deferred inquiry storage.
//!
//! Holds at most one payload per correlation key. Saving under an occupied
//! key replaces the previous payload.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use super::error::InquiryError;
use super::payload::DeferredInquiry;
use crate::network::protocol::now_millis;

/// Keyed single-slot store for deferred inquiries.
pub trait InquiryStore: Send {
    /// Stores `inquiry` under `key`, replacing any previous payload.
    fn save(&self, key: &str, inquiry: &DeferredInquiry) -> Result<(), InquiryError>;

    /// Loads the payload stored under `key`.
    fn load(&self, key: &str) -> Result<Option<DeferredInquiry>, InquiryError>;

    /// Removes the payload under `key`. Returns true if one was removed.
    fn remove(&self, key: &str) -> Result<bool, InquiryError>;
}

/// In-memory store. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryInquiryStore {
    entries: Arc<Mutex<HashMap<String, DeferredInquiry>>>,
}

impl MemoryInquiryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payloads.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl InquiryStore for MemoryInquiryStore {
    fn save(&self, key: &str, inquiry: &DeferredInquiry) -> Result<(), InquiryError> {
        self.entries.lock().insert(key.to_string(), inquiry.clone());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<DeferredInquiry>, InquiryError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<bool, InquiryError> {
        Ok(self.entries.lock().remove(key).is_some())
    }
}

/// SQLite-backed store, shared with whatever wrote the payload.
pub struct SqliteInquiryStore {
    conn: Connection,
}

impl SqliteInquiryStore {
    /// Opens or creates a store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, InquiryError> {
        let store = SqliteInquiryStore {
            conn: Connection::open(path)?,
        };
        store.create_tables()?;
        Ok(store)
    }

    /// Creates an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, InquiryError> {
        let store = SqliteInquiryStore {
            conn: Connection::open_in_memory()?,
        };
        store.create_tables()?;
        Ok(store)
    }

    fn create_tables(&self) -> Result<(), InquiryError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS deferred_inquiries (
                correlation_key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Stores a raw JSON payload without validating it.
    pub fn save_raw(&self, key: &str, payload: &str) -> Result<(), InquiryError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO deferred_inquiries (correlation_key, payload, created_at)
             VALUES (?1, ?2, ?3)",
            params![key, payload, now_millis() as i64],
        )?;
        Ok(())
    }

    /// Number of stored payloads.
    pub fn count(&self) -> Result<usize, InquiryError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM deferred_inquiries", [], |row| {
                    row.get(0)
                })?;
        Ok(count as usize)
    }
}

impl InquiryStore for SqliteInquiryStore {
    fn save(&self, key: &str, inquiry: &DeferredInquiry) -> Result<(), InquiryError> {
        let payload = serde_json::to_string(inquiry)?;
        self.save_raw(key, &payload)
    }

    fn load(&self, key: &str) -> Result<Option<DeferredInquiry>, InquiryError> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM deferred_inquiries WHERE correlation_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn remove(&self, key: &str) -> Result<bool, InquiryError> {
        let removed = self.conn.execute(
            "DELETE FROM deferred_inquiries WHERE correlation_key = ?1",
            params![key],
        )?;
        Ok(removed > 0)
    }
}

//! Draft persistence
//!
//! The composer mirrors its HTML into a key-value store after every edit so
//! that reopening restores the last draft. [`SqliteDraftStore`] keeps one
//! row per key in the user's data directory.

use anyhow::Context;
use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{GroupcastError, Result};

/// Key-value storage for draft HTML
pub trait DraftStore: Send + Sync {
    /// The stored draft for `key`, if any
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Store `html` under `key`, replacing any previous draft
    fn save(&self, key: &str, html: &str) -> Result<()>;

    /// Remove the draft stored under `key`
    fn clear(&self, key: &str) -> Result<()>;
}

/// SQLite-backed draft store
pub struct SqliteDraftStore {
    db_path: PathBuf,
}

impl SqliteDraftStore {
    /// Open the store in the user's data directory
    ///
    /// `GROUPCAST_DRAFT_DB` overrides the location.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("GROUPCAST_DRAFT_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "groupcast", "groupcast")
            .ok_or_else(|| GroupcastError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("drafts.db"))
    }

    /// Open the store at a specific database path
    ///
    /// # Examples
    ///
    /// ```
    /// use groupcast::composer::draft::{DraftStore, SqliteDraftStore};
    ///
    /// let dir = tempfile::TempDir::new().unwrap();
    /// let store = SqliteDraftStore::new_with_path(dir.path().join("drafts.db")).unwrap();
    /// store.save("composer-draft", "<p>Hi</p>").unwrap();
    /// assert_eq!(store.load("composer-draft").unwrap().as_deref(), Some("<p>Hi</p>"));
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for draft database")
                .map_err(|e| GroupcastError::Storage(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Path of the backing database
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open draft database")
            .map_err(|e| GroupcastError::Storage(e.to_string()).into())
    }

    fn init(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS drafts (
                key TEXT PRIMARY KEY,
                html TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create drafts table")
        .map_err(|e| GroupcastError::Storage(e.to_string()))?;
        Ok(())
    }
}

impl DraftStore for SqliteDraftStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let conn = self.open()?;
        let html = conn
            .query_row(
                "SELECT html FROM drafts WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to load draft")
            .map_err(|e| GroupcastError::Storage(e.to_string()))?;
        Ok(html)
    }

    fn save(&self, key: &str, html: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO drafts (key, html, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET html = excluded.html, updated_at = excluded.updated_at",
            params![key, html, Utc::now().to_rfc3339()],
        )
        .context("Failed to save draft")
        .map_err(|e| GroupcastError::Storage(e.to_string()))?;
        tracing::trace!("Saved draft {} ({} bytes)", key, html.len());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute("DELETE FROM drafts WHERE key = ?", params![key])
            .context("Failed to clear draft")
            .map_err(|e| GroupcastError::Storage(e.to_string()))?;
        tracing::debug!("Cleared draft {}", key);
        Ok(())
    }
}

/// In-memory draft store
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    drafts: Mutex<HashMap<String, String>>,
}

impl MemoryDraftStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let drafts = self
            .drafts
            .lock()
            .map_err(|_| GroupcastError::Storage("draft store lock poisoned".into()))?;
        Ok(drafts.get(key).cloned())
    }

    fn save(&self, key: &str, html: &str) -> Result<()> {
        let mut drafts = self
            .drafts
            .lock()
            .map_err(|_| GroupcastError::Storage("draft store lock poisoned".into()))?;
        drafts.insert(key.to_string(), html.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let mut drafts = self
            .drafts
            .lock()
            .map_err(|_| GroupcastError::Storage("draft store lock poisoned".into()))?;
        drafts.remove(key);
        Ok(())
    }
}

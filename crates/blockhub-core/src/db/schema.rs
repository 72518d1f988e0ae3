//! Database schema and initialization

use crate::error::{BlockhubError, Result};
use rusqlite::{params, Connection};
use std::path::Path;

/// Main database handle
pub struct Database {
    pub(crate) conn: Connection,
}

const SCHEMA_VERSION: i32 = 1;

const CREATE_TABLES: &str = r#"
-- Module-native items, one row per (module, item_id)
CREATE TABLE IF NOT EXISTS content_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    module TEXT NOT NULL,
    item_id TEXT NOT NULL,
    title TEXT NOT NULL,
    excerpt TEXT,
    content TEXT NOT NULL DEFAULT '',
    author_name TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '[]',
    status TEXT NOT NULL,
    difficulty TEXT,
    views_count INTEGER NOT NULL DEFAULT 0,
    likes_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    payload TEXT NOT NULL,
    imported_at TEXT NOT NULL,
    UNIQUE(module, item_id)
);

-- Full-text search index
CREATE VIRTUAL TABLE IF NOT EXISTS content_fts USING fts5(
    title,
    excerpt,
    content,
    tags,
    tokenize='unicode61 remove_diacritics 2'
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_content_items_module ON content_items(module);
CREATE INDEX IF NOT EXISTS idx_content_items_created ON content_items(module, created_at);
CREATE INDEX IF NOT EXISTS idx_content_items_status ON content_items(module, status);
"#;

const CREATE_TRIGGERS: &str = r#"
-- Sync FTS on insert
CREATE TRIGGER IF NOT EXISTS content_items_ai
AFTER INSERT ON content_items
BEGIN
    INSERT INTO content_fts(rowid, title, excerpt, content, tags)
    VALUES (new.id, new.title, COALESCE(new.excerpt, ''), new.content, new.tags);
END;

-- Sync FTS on update
CREATE TRIGGER IF NOT EXISTS content_items_au
AFTER UPDATE ON content_items
BEGIN
    DELETE FROM content_fts WHERE rowid = old.id;
    INSERT INTO content_fts(rowid, title, excerpt, content, tags)
    VALUES (new.id, new.title, COALESCE(new.excerpt, ''), new.content, new.tags);
END;

-- Sync FTS on delete
CREATE TRIGGER IF NOT EXISTS content_items_ad
AFTER DELETE ON content_items
BEGIN
    DELETE FROM content_fts WHERE rowid = old.id;
END;
"#;

impl Database {
    /// Open database at path, creating if necessary
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Initialize database schema
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;
             PRAGMA busy_timeout = 5000;",
        )?;

        self.conn.execute_batch(CREATE_TABLES)?;
        self.conn.execute_batch(CREATE_TRIGGERS)?;

        self.migrate()?;

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let version = self
            .conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok();
        Ok(version)
    }

    /// Bring an existing store up to the current schema
    pub fn migrate(&self) -> Result<()> {
        let current = self.schema_version()?.unwrap_or(0);

        if current > SCHEMA_VERSION {
            return Err(BlockhubError::Config(format!(
                "database schema version {} is newer than supported version {}",
                current, SCHEMA_VERSION
            )));
        }

        if current < SCHEMA_VERSION {
            tracing::info!(from = current, to = SCHEMA_VERSION, "Migrating database schema");
        }

        Ok(())
    }
}

//! Key-value settings storage.
//!
//! Holds named byte slots, the way a platform preferences store would:
//! - SqliteSettings: one `settings` table in a local SQLite database
//! - MemorySettings: a HashMap, for tests and benchmarks
//!
//! Every write replaces the slot; there is no partial update.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};

pub trait SettingsStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn write(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for Box<T> {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        (**self).write(key, value)
    }
}

/// Default database path (~/.local/share/stikqr/stikqr.db or platform equivalent)
pub fn default_db_path() -> Result<PathBuf> {
    let data_dir = directories::ProjectDirs::from("", "", "stikqr")
        .ok_or(Error::NoProjectDir("data"))?
        .data_dir()
        .to_path_buf();

    std::fs::create_dir_all(&data_dir)?;
    Ok(data_dir.join("stikqr.db"))
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY NOT NULL,
            value BLOB NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Database handle. Open once per command, reuse across all operations.
pub struct SqliteSettings {
    conn: Connection,
}

impl SqliteSettings {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        log::debug!("opened settings database at {}", path.display());
        Ok(SqliteSettings { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(SqliteSettings { conn })
    }
}

impl SettingsStore for SqliteSettings {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;

        Ok(value)
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;

        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemorySettings {
    slots: HashMap<String, Vec<u8>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

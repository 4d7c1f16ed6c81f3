//! SQLite history backend
//!
//! Unbounded table; every operation opens its own connection so the store can
//! be shared freely between request tasks.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, params};

use super::model::HistoryEntry;
use super::serialization::{body_from_column, body_to_column, headers_from_column, headers_to_column};
use super::storage::{HistoryStore, StorageBackend};
use crate::http::Method;
use crate::{RestdeskError, Result};

pub struct SqliteHistory {
    db_path: PathBuf,
}

impl SqliteHistory {
    pub const DB_FILE: &'static str = "history.db";

    /// Create with specific path (no I/O until `init`/`save`)
    pub fn new_with_path(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.db_path, flags)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                method TEXT,
                url TEXT,
                headers TEXT,
                body TEXT,
                status INTEGER,
                response_time REAL,
                timestamp TEXT
            );
            ",
        )?;
        Ok(())
    }
}

impl HistoryStore for SqliteHistory {
    fn init(&self) -> Result<()> {
        let conn = self.connect()?;
        Self::init_schema(&conn)
    }

    fn save(&self, entry: &HistoryEntry) -> Result<()> {
        let conn = self.connect()?;
        Self::init_schema(&conn)?;
        conn.execute(
            "INSERT INTO history (method, url, headers, body, status, response_time, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.method.as_str(),
                entry.url,
                headers_to_column(&entry.headers)?,
                body_to_column(&entry.body),
                i64::from(entry.status),
                entry.response_time,
                entry.timestamp,
            ],
        )?;
        Ok(())
    }

    fn load(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        if !self.db_path.exists() {
            return Ok(Vec::new());
        }
        let conn = self.connect()?;
        Self::init_schema(&conn)?;

        let mut stmt = conn.prepare(
            "SELECT id, method, url, headers, body, status, response_time, timestamp
             FROM history ORDER BY id DESC LIMIT ?1",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<i64>>(5)?,
                row.get::<_, Option<f64>>(6)?,
                row.get::<_, Option<String>>(7)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, method, url, headers, body, status, response_time, timestamp) = row?;
            let method = method.unwrap_or_default();
            let method = method.parse::<Method>().map_err(|_| {
                RestdeskError::Storage(format!("row {} has unknown method '{}'", id, method))
            })?;
            entries.push(HistoryEntry {
                id: Some(id),
                method,
                url: url.unwrap_or_default(),
                headers: headers_from_column(headers),
                body: body_from_column(body),
                status: status.and_then(|s| u16::try_from(s).ok()).unwrap_or_default(),
                response_time: response_time.unwrap_or_default(),
                timestamp: timestamp.unwrap_or_default(),
            });
        }
        Ok(entries)
    }

    fn clear(&self) -> Result<()> {
        if !self.db_path.exists() {
            return Ok(());
        }
        let conn = self.connect()?;
        Self::init_schema(&conn)?;
        conn.execute("DELETE FROM history", [])?;
        Ok(())
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Sqlite
    }
}

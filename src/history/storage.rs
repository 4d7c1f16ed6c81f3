use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::json_file::JsonFileHistory;
use super::model::HistoryEntry;
use super::sqlite::SqliteHistory;
use crate::config::AppConfig;
use crate::{RestdeskError, Result};

/// Default number of entries returned by `load`.
pub const DEFAULT_LOAD_LIMIT: usize = 200;

/// Persistence for request/response history.
///
/// Implementations return errors; callers that treat history as best-effort
/// go through [`crate::history::recorder`].
pub trait HistoryStore: Send + Sync {
    /// Idempotently create whatever backing structure is needed.
    fn init(&self) -> Result<()>;

    /// Append one entry.
    fn save(&self, entry: &HistoryEntry) -> Result<()>;

    /// At most `limit` entries, most recent first. An absent store is empty.
    fn load(&self, limit: usize) -> Result<Vec<HistoryEntry>>;

    /// Delete every entry.
    fn clear(&self) -> Result<()>;

    fn backend(&self) -> StorageBackend;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Json,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Json => "json",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            StorageBackend::Sqlite => SqliteHistory::DB_FILE,
            StorageBackend::Json => JsonFileHistory::HISTORY_FILE,
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = RestdeskError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "json" => Ok(StorageBackend::Json),
            _ => Err(RestdeskError::Config(format!(
                "Unknown storage backend: {} (expected sqlite or json)",
                s
            ))),
        }
    }
}

/// Construct the store for `backend` under `data_dir` without touching disk.
pub fn store_for(backend: StorageBackend, data_dir: &Path) -> Box<dyn HistoryStore> {
    let path = data_dir.join(backend.file_name());
    match backend {
        StorageBackend::Sqlite => Box::new(SqliteHistory::new_with_path(path)),
        StorageBackend::Json => Box::new(JsonFileHistory::new_with_path(path)),
    }
}

/// Construct and initialize the store selected by `config`.
pub fn open_store(config: &AppConfig) -> Result<Box<dyn HistoryStore>> {
    let store = store_for(config.storage, &config.data_dir);
    store.init()?;
    Ok(store)
}

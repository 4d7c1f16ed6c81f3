use super::model::HistoryEntry;
use super::storage::{HistoryStore, StorageBackend};
use crate::Result;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Keep only the most recent entries in the flat file.
pub const MAX_ENTRIES: usize = 200;

/// Flat JSON array of entries, oldest first on disk.
pub struct JsonFileHistory {
    file_path: PathBuf,
}

impl JsonFileHistory {
    pub const HISTORY_FILE: &'static str = "history.json";

    /// Create with specific path (internal/testing use)
    pub fn new_with_path(path: PathBuf) -> Self {
        Self { file_path: path }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Ensure directory exists
    fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn read_entries(file: &mut File) -> Result<Vec<HistoryEntry>> {
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_entries(file: &mut File, entries: &[HistoryEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        // Truncate in place so the lock we hold stays valid
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

impl HistoryStore for JsonFileHistory {
    fn init(&self) -> Result<()> {
        self.ensure_dir()
    }

    /// Read-modify-write under an exclusive lock.
    ///
    /// A corrupt file is replaced rather than blocking new history.
    fn save(&self, entry: &HistoryEntry) -> Result<()> {
        self.ensure_dir()?;
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.file_path)?;
        file.lock_exclusive()?;

        let mut entries = match Self::read_entries(&mut file) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "Discarding unreadable history file {}: {}",
                    self.file_path.display(),
                    e
                );
                Vec::new()
            }
        };

        let mut entry = entry.clone();
        entry.id = None;
        entries.push(entry);
        let skip = entries.len().saturating_sub(MAX_ENTRIES);
        let entries: Vec<HistoryEntry> = entries.into_iter().skip(skip).collect();

        Self::write_entries(&mut file, &entries)?;
        // Unlock on drop
        Ok(())
    }

    fn load(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }
        let mut file = File::open(&self.file_path)?;
        file.lock_shared()?;
        let entries = Self::read_entries(&mut file)?;

        let skip = entries.len().saturating_sub(limit);
        Ok(entries.into_iter().skip(skip).rev().collect())
    }

    fn clear(&self) -> Result<()> {
        if !self.file_path.exists() {
            return Ok(());
        }
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.file_path)?;
        file.lock_exclusive()?;
        Self::write_entries(&mut file, &[])
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HeaderFields, Method};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_dummy_entry(url: &str) -> HistoryEntry {
        HistoryEntry {
            id: Some(99),
            method: Method::Get,
            url: url.to_string(),
            headers: HeaderFields::new(),
            body: json!(""),
            status: 200,
            response_time: 1.5,
            timestamp: "2024-05-01 10:00:00".to_string(),
        }
    }

    fn storage(temp_dir: &TempDir) -> JsonFileHistory {
        JsonFileHistory::new_with_path(temp_dir.path().join(JsonFileHistory::HISTORY_FILE))
    }

    #[test]
    fn test_append_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        storage.save(&create_dummy_entry("u1")).unwrap();
        storage.save(&create_dummy_entry("u2")).unwrap();

        let list = storage.load(200).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].url, "u2");
        assert_eq!(list[1].url, "u1");
        // Position-based, no ids on disk
        assert_eq!(list[0].id, None);
    }

    #[test]
    fn test_load_limit() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        for i in 0..10 {
            storage.save(&create_dummy_entry(&i.to_string())).unwrap();
        }

        let tail = storage.load(3).unwrap();
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].url, "9");
        assert_eq!(tail[2].url, "7");
    }

    #[test]
    fn test_file_is_a_json_array() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        storage.save(&create_dummy_entry("u1")).unwrap();

        let content = fs::read_to_string(storage.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["method"], "GET");
    }

    #[test]
    fn test_corrupt_file_is_replaced_on_save() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        fs::write(storage.path(), "{not an array").unwrap();

        assert!(storage.load(10).is_err());
        storage.save(&create_dummy_entry("fresh")).unwrap();
        let list = storage.load(10).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].url, "fresh");
    }

    #[test]
    fn test_clear_writes_empty_array() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        storage.clear().unwrap();
        assert!(!storage.path().exists());

        storage.save(&create_dummy_entry("u1")).unwrap();
        storage.clear().unwrap();
        assert_eq!(fs::read_to_string(storage.path()).unwrap().trim(), "[]");
        assert!(storage.load(200).unwrap().is_empty());
    }
}

//! Best-effort history operations.
//!
//! Storage failures are logged and swallowed here so they never interrupt the
//! request/response workflow.

use crate::history::model::HistoryEntry;
use crate::history::storage::HistoryStore;
use crate::logger::EventLog;

/// 记录请求历史
///
/// 这是一个 Best-effort 操作，如果写入失败会记录错误日志，但不会返回错误。
pub fn record_history(store: &dyn HistoryStore, log: &dyn EventLog, entry: &HistoryEntry) {
    match store.save(entry) {
        Ok(()) => tracing::debug!("Saved history entry: {}", entry.summary()),
        Err(e) => log.error(&format!("Failed to save history: {}", e)),
    }
}

/// Most recent entries first; empty on any read failure.
pub fn recent_history(store: &dyn HistoryStore, log: &dyn EventLog, limit: usize) -> Vec<HistoryEntry> {
    store.load(limit).unwrap_or_else(|e| {
        log.error(&format!("Failed to load history: {}", e));
        Vec::new()
    })
}

/// Returns whether the store was actually cleared.
pub fn clear_history(store: &dyn HistoryStore, log: &dyn EventLog) -> bool {
    match store.clear() {
        Ok(()) => {
            log.info("User cleared history");
            true
        }
        Err(e) => {
            log.error(&format!("Failed to clear history: {}", e));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::json_file::JsonFileHistory;
    use crate::history::storage::StorageBackend;
    use crate::http::{HeaderFields, Method};
    use crate::logger::{EventLevel, MemoryEventLog};
    use crate::{RestdeskError, Result};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    /// Fails every operation.
    struct BrokenStore;

    impl HistoryStore for BrokenStore {
        fn init(&self) -> Result<()> {
            Err(RestdeskError::Storage("disk on fire".to_string()))
        }
        fn save(&self, _entry: &HistoryEntry) -> Result<()> {
            Err(RestdeskError::Storage("disk on fire".to_string()))
        }
        fn load(&self, _limit: usize) -> Result<Vec<HistoryEntry>> {
            Err(RestdeskError::Storage("disk on fire".to_string()))
        }
        fn clear(&self) -> Result<()> {
            Err(RestdeskError::Storage("disk on fire".to_string()))
        }
        fn backend(&self) -> StorageBackend {
            StorageBackend::Sqlite
        }
    }

    #[test]
    fn test_failures_are_logged_not_raised() {
        let log = MemoryEventLog::new();

        assert!(recent_history(&BrokenStore, &log, 10).is_empty());
        assert!(!clear_history(&BrokenStore, &log));

        let records = log.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|(level, _)| *level == EventLevel::Error));
        assert!(records[0].1.starts_with("Failed to load history"));
        assert!(records[1].1.contains("disk on fire"));
    }

    #[test]
    fn test_save_failure_is_logged() {
        let log = MemoryEventLog::new();
        let entry = HistoryEntry {
            id: None,
            method: Method::Get,
            url: "http://example.test".to_string(),
            headers: HeaderFields::new(),
            body: json!(""),
            status: 200,
            response_time: 1.5,
            timestamp: "2024-05-01 10:00:00".to_string(),
        };

        record_history(&BrokenStore, &log, &entry);

        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, EventLevel::Error);
        assert_eq!(records[0].1, "Failed to save history: 历史记录存储错误: disk on fire");
    }

    #[test]
    fn test_corrupt_json_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileHistory::new_with_path(temp_dir.path().join("history.json"));
        fs::write(store.path(), "garbage").unwrap();
        let log = MemoryEventLog::new();

        assert!(recent_history(&store, &log, 200).is_empty());
        assert_eq!(log.count(EventLevel::Error), 1);
    }

    #[test]
    fn test_clear_logs_info() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileHistory::new_with_path(temp_dir.path().join("history.json"));
        let log = MemoryEventLog::new();

        assert!(clear_history(&store, &log));
        assert_eq!(
            log.records(),
            vec![(EventLevel::Info, "User cleared history".to_string())]
        );
    }
}

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use tracing_subscriber::{EnvFilter, fmt};

use crate::Result;

/// 初始化日志系统
///
/// 支持通过 RUST_LOG 环境变量控制日志级别
/// 默认级别: info
///
/// 示例:
/// - RUST_LOG=debug restdesk send GET https://example.com
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::debug!("Logger initialized");
}

/// 事件日志 (请求完成/失败、历史记录操作等)
///
/// Injected into the session so tests can swap in [`MemoryEventLog`].
pub trait EventLog: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Error,
}

impl EventLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventLevel::Info => "INFO",
            EventLevel::Error => "ERROR",
        }
    }
}

/// Appends timestamped records to a plain-text log file.
pub struct FileEventLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileEventLog {
    pub const LOG_DIR: &'static str = "logs";
    pub const LOG_FILE: &'static str = "app.log";

    /// Open `<data_dir>/logs/app.log`, creating directories as needed.
    pub fn in_data_dir(data_dir: &Path) -> Result<Self> {
        Self::open(data_dir.join(Self::LOG_DIR).join(Self::LOG_FILE))
    }

    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record(&self, level: EventLevel, message: &str) {
        let line = format!(
            "{} {}: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            level.as_str(),
            message
        );
        // A poisoned lock only means another writer panicked mid-line
        let mut file = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(file, "{}", line) {
            tracing::warn!("Failed to write log file {}: {}", self.path.display(), e);
        }
    }
}

impl EventLog for FileEventLog {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
        self.write_record(EventLevel::Info, message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
        self.write_record(EventLevel::Error, message);
    }
}

/// Only forwards to `tracing`; used when the log file cannot be opened.
#[derive(Debug, Default)]
pub struct TracingEventLog;

impl EventLog for TracingEventLog {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Keeps records in memory for assertions.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    records: Mutex<Vec<(EventLevel, String)>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(EventLevel, String)> {
        self.lock().clone()
    }

    pub fn count(&self, level: EventLevel) -> usize {
        self.lock().iter().filter(|(l, _)| *l == level).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(EventLevel, String)>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl EventLog for MemoryEventLog {
    fn info(&self, message: &str) {
        self.lock().push((EventLevel::Info, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.lock().push((EventLevel::Error, message.to_string()));
    }
}

pub mod json_file;
pub mod model;
pub mod printer;
pub mod recorder;
pub mod selector;
pub mod serialization;
pub mod sqlite;
pub mod storage;

pub use model::HistoryEntry;
pub use storage::{DEFAULT_LOAD_LIMIT, HistoryStore, StorageBackend, open_store, store_for};

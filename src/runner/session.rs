use std::sync::Arc;

use crate::history::model::HistoryEntry;
use crate::history::recorder::{clear_history, recent_history, record_history};
use crate::history::storage::HistoryStore;
use crate::http::RequestInput;
use crate::logger::EventLog;
use crate::runner::executor::RequestExecutor;
use crate::runner::types::Exchange;
use crate::{RestdeskError, Result};

/// One request cycle: execute, persist on transport success, then log.
pub struct Session {
    executor: RequestExecutor,
    store: Arc<dyn HistoryStore>,
    log: Arc<dyn EventLog>,
}

impl Session {
    pub fn new(executor: RequestExecutor, store: Arc<dyn HistoryStore>, log: Arc<dyn EventLog>) -> Self {
        Self { executor, store, log }
    }

    pub fn log(&self) -> &dyn EventLog {
        self.log.as_ref()
    }

    pub async fn send(&self, input: &RequestInput) -> Result<Exchange> {
        match self.executor.execute(input).await {
            Ok(exchange) => {
                let entry = exchange.to_history_entry();
                self.with_store(move |store, log| record_history(store, log, &entry))
                    .await;
                self.log.info(&format!(
                    "{} {} -> {} ({:.2} ms)",
                    exchange.method,
                    exchange.url,
                    exchange.status.code(),
                    exchange.elapsed_ms
                ));
                Ok(exchange)
            }
            Err(RestdeskError::Transport(e)) => {
                self.log.error(&format!("Request error: {}", e));
                Err(RestdeskError::Transport(e))
            }
            Err(e) => {
                tracing::warn!("Request rejected: {}", e);
                Err(e)
            }
        }
    }

    pub async fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        self.with_store(move |store, log| recent_history(store, log, limit))
            .await
            .unwrap_or_default()
    }

    pub async fn clear_history(&self) -> bool {
        self.with_store(clear_history).await.unwrap_or(false)
    }

    /// Store calls block (file locks, SQLite busy waits), keep them off the runtime.
    async fn with_store<T, F>(&self, op: F) -> Option<T>
    where
        F: FnOnce(&dyn HistoryStore, &dyn EventLog) -> T + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let log = Arc::clone(&self.log);
        match tokio::task::spawn_blocking(move || op(store.as_ref(), log.as_ref())).await {
            Ok(value) => Some(value),
            Err(e) => {
                self.log.error(&format!("History task failed: {}", e));
                None
            }
        }
    }
}

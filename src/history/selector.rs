use crate::Result;
use crate::RestdeskError;
use crate::history::model::HistoryEntry;
use crate::history::serialization::body_to_column;
use crate::http::response::to_pretty_string;
use crate::http::{HeaderFields, RequestInput};
use inquire::Select;
use serde_json::Value;

/// How to pick a history entry for re-sending
pub enum SelectionStrategy {
    Interactive,
    Index(usize),
}

/// `entries` are most recent first; index 0 is the latest request.
pub fn select_entry(entries: &[HistoryEntry], strategy: SelectionStrategy) -> Result<HistoryEntry> {
    if entries.is_empty() {
        return Err(RestdeskError::HistoryNotFound("history is empty".to_string()));
    }
    match strategy {
        SelectionStrategy::Index(n) => entries.get(n).cloned().ok_or_else(|| {
            RestdeskError::HistoryNotFound(format!(
                "#{} ({} available)",
                n,
                entries.len()
            ))
        }),
        SelectionStrategy::Interactive => select_interactive(entries),
    }
}

fn select_interactive(entries: &[HistoryEntry]) -> Result<HistoryEntry> {
    #[derive(Clone)]
    struct EntryWrapper {
        index: usize,
        display: String,
    }

    impl std::fmt::Display for EntryWrapper {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.display)
        }
    }

    let options: Vec<EntryWrapper> = entries
        .iter()
        .enumerate()
        .map(|(index, e)| EntryWrapper {
            index,
            display: format_entry_for_display(e),
        })
        .collect();

    let selected = Select::new("Select a request to re-send:", options)
        .with_page_size(15)
        .with_help_message("Enter to select, type to filter")
        .prompt()
        .map_err(|e| RestdeskError::Interaction(e.to_string()))?;

    Ok(entries[selected.index].clone())
}

fn format_entry_for_display(e: &HistoryEntry) -> String {
    let text = format!("[{}] {}", e.status, e.summary());
    if text.chars().count() < 120 {
        text
    } else {
        let cut: String = text.chars().take(115).collect();
        format!("{}...", cut)
    }
}

/// Rebuild editable request input from a stored entry.
pub fn to_request_input(entry: &HistoryEntry) -> RequestInput {
    RequestInput::new(entry.method, &entry.url)
        .with_headers(&headers_text(&entry.headers))
        .with_body(&body_text(&entry.body))
}

/// Headers as indented JSON, or empty when there are none.
pub fn headers_text(headers: &HeaderFields) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let object = headers
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    to_pretty_string(&Value::Object(object))
}

/// Structured bodies are shown indented, strings verbatim.
pub fn body_text(body: &Value) -> String {
    match body {
        Value::Object(_) | Value::Array(_) => to_pretty_string(body),
        other => body_to_column(other),
    }
}

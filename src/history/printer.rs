use super::model::HistoryEntry;
use crate::http::Status;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

/// Render entries (already most recent first) as a table.
///
/// `keyword` filters case-insensitively on the entry summary.
pub fn history_table(entries: &[HistoryEntry], keyword: Option<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "Time", "Method", "URL", "Status", "Duration"]);

    let keyword = keyword.unwrap_or_default();
    for (index, entry) in entries.iter().enumerate() {
        if !entry.matches(keyword) {
            continue;
        }
        let status_color = if Status::new(entry.status).is_ok_ish() {
            Color::Green
        } else {
            Color::Red
        };

        table.add_row(vec![
            Cell::new(index),
            Cell::new(&entry.timestamp),
            Cell::new(entry.method),
            Cell::new(&entry.url).add_attribute(Attribute::Dim),
            Cell::new(entry.status).fg(status_color),
            Cell::new(format!("{:.2}ms", entry.response_time)),
        ]);
    }

    table
}

pub fn print_history(entries: &[HistoryEntry], keyword: Option<&str>) {
    if entries.is_empty() {
        println!("No history yet");
        return;
    }
    println!("{}", history_table(entries, keyword));
}

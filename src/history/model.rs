use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::{HeaderFields, Method};

/// `YYYY-MM-DD HH:MM:SS`, local clock.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// 历史记录条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// SQLite 自增 ID (JSON 文件后端中不存在)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    pub method: Method,

    pub url: String,

    #[serde(default)]
    pub headers: HeaderFields,

    /// 提交时的请求体: 能解析为 JSON 则为结构化值, 否则为原始字符串
    #[serde(default = "empty_body")]
    pub body: Value,

    pub status: u16,

    /// 请求耗时 (毫秒)
    pub response_time: f64,

    pub timestamp: String,
}

fn empty_body() -> Value {
    Value::String(String::new())
}

impl HistoryEntry {
    /// One line for lists and pickers: `"{timestamp} - {METHOD} {url}"`.
    pub fn summary(&self) -> String {
        let url: String = self.url.chars().take(60).collect();
        format!("{} - {} {}", self.timestamp, self.method, url)
    }

    pub fn matches(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        keyword.is_empty() || self.summary().to_lowercase().contains(&keyword)
    }
}

/// Round to 3 decimals, the precision kept in history.
pub fn round_ms(ms: f64) -> f64 {
    (ms * 1000.0).round() / 1000.0
}

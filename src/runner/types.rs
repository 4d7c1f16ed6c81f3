use serde_json::Value;

use crate::history::model::{HistoryEntry, now_timestamp, round_ms};
use crate::http::{HeaderFields, Method, Request, RequestInput, Response, Status};

/// 一次完整的请求/响应 (用于显示和写入历史记录)
#[derive(Debug, Clone)]
pub struct Exchange {
    pub method: Method,
    pub url: String,
    pub headers: HeaderFields,
    pub body: Value,

    pub status: Status,
    pub elapsed_ms: f64,
    /// Indented JSON when the response parses, raw text otherwise
    pub pretty_body: String,
    pub pretty_headers: String,
    pub raw_text: String,
    pub timestamp: String,
}

impl Exchange {
    pub fn new(request: Request, response: Response) -> Self {
        Self {
            method: request.method,
            url: request.url,
            headers: request.headers,
            body: request.body,
            status: response.status,
            elapsed_ms: response.elapsed_ms(),
            pretty_body: response.pretty_body(),
            pretty_headers: response.pretty_headers(),
            raw_text: response.body,
            timestamp: now_timestamp(),
        }
    }

    pub fn to_history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            id: None,
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            status: self.status.code(),
            response_time: round_ms(self.elapsed_ms),
            timestamp: self.timestamp.clone(),
        }
    }
}

/// Result of one background request, handed back to the interactive loop.
#[derive(Debug)]
pub struct Completion {
    pub input: RequestInput,
    pub result: crate::Result<Exchange>,
}

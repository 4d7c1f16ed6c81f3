use std::time::Duration;

use reqwest::header::HeaderMap as Headers;
use serde::Serialize;
use serde_json::{Map, Value};
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::http::types::Status;

pub struct Response {
    pub status: Status,
    pub headers: Headers,
    pub body: String, // 原始响应文本
    pub duration: Duration,
}

impl Response {
    pub fn new(status: u16, headers: Headers, body: String, duration: Duration) -> Self {
        Self {
            status: Status::new(status),
            headers,
            body,
            duration,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }

    /// Indented JSON when the body parses, the raw text otherwise.
    pub fn pretty_body(&self) -> String {
        try_pretty_json(&self.body).unwrap_or_else(|| self.body.clone())
    }

    /// Response headers as an indented JSON object.
    pub fn pretty_headers(&self) -> String {
        let mut object = Map::new();
        for (name, value) in self.headers.iter() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            match object.get_mut(name.as_str()) {
                // Repeated headers are folded into one comma-separated value
                Some(Value::String(existing)) => {
                    existing.push_str(", ");
                    existing.push_str(&value);
                }
                _ => {
                    object.insert(name.as_str().to_string(), Value::String(value));
                }
            }
        }
        to_pretty_string(&Value::Object(object))
    }
}

/// Parse `text` as JSON and re-serialize it with 4-space indentation.
pub fn try_pretty_json(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    Some(to_pretty_string(&value))
}

pub fn to_pretty_string(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    // Serializing a Value into a Vec cannot fail
    if value.serialize(&mut serializer).is_err() {
        return value.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| value.to_string())
}

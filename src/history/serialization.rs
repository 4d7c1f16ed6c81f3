//! Text encodings for the `headers` and `body` columns of the SQLite table.

use serde_json::Value;

use crate::http::HeaderFields;

/// Structured bodies become compact JSON; everything else its string form.
pub fn body_to_column(body: &Value) -> String {
    match body {
        Value::Object(_) | Value::Array(_) => body.to_string(),
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Re-parse the stored text as JSON when possible.
///
/// A string body that happened to look like JSON comes back as a structured
/// value after one save/load cycle.
pub fn body_from_column(text: Option<String>) -> Value {
    let text = text.unwrap_or_default();
    if text.is_empty() {
        return Value::String(text);
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

pub fn headers_to_column(headers: &HeaderFields) -> serde_json::Result<String> {
    serde_json::to_string(headers)
}

/// Missing or unreadable header text loads as an empty map.
pub fn headers_from_column(text: Option<String>) -> HeaderFields {
    text.filter(|t| !t.is_empty())
        .and_then(|t| serde_json::from_str(&t).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_body_round_trip() {
        let body = json!({"user": {"name": "Alice", "tags": ["a", "b"]}});
        let stored = body_to_column(&body);
        assert_eq!(stored, r#"{"user":{"name":"Alice","tags":["a","b"]}}"#);
        assert_eq!(body_from_column(Some(stored)), body);
    }

    #[test]
    fn test_plain_text_body_round_trip() {
        let body = json!("hello world, not json");
        let stored = body_to_column(&body);
        assert_eq!(stored, "hello world, not json");
        assert_eq!(body_from_column(Some(stored)), body);
    }

    #[test]
    fn test_json_looking_string_is_promoted() {
        let body = json!("[1, 2, 3]");
        let loaded = body_from_column(Some(body_to_column(&body)));
        assert_eq!(loaded, json!([1, 2, 3]));
    }

    #[test]
    fn test_empty_and_null_bodies() {
        assert_eq!(body_to_column(&Value::Null), "");
        assert_eq!(body_from_column(None), json!(""));
        assert_eq!(body_from_column(Some(String::new())), json!(""));
    }

    #[test]
    fn test_headers_column() {
        let mut headers = HeaderFields::new();
        headers.insert("Accept".to_string(), "text/plain".to_string());
        let stored = headers_to_column(&headers).unwrap();
        assert_eq!(headers_from_column(Some(stored)), headers);
        assert!(headers_from_column(Some("not json".to_string())).is_empty());
        assert!(headers_from_column(None).is_empty());
    }
}

use std::collections::BTreeMap;

use reqwest::header::{CONTENT_TYPE, HeaderMap as Headers, HeaderName, HeaderValue};
use serde_json::Value;

use crate::Result;
use crate::error::ValidationError;
use crate::http::types::Method;

/// Header name → value, as typed by the user.
pub type HeaderFields = BTreeMap<String, String>;

/// 用户输入的原始请求 (header 和 body 均为编辑器中的文本)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInput {
    pub method: Method,
    pub url: String,
    pub headers: String,
    pub body: String,
}

impl RequestInput {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: url.to_string(),
            headers: String::new(),
            body: String::new(),
        }
    }

    pub fn with_headers(mut self, headers: &str) -> Self {
        self.headers = headers.to_string();
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }
}

/// What actually goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Empty,
    Json(String),
    Text(String),
}

impl Payload {
    pub fn as_str(&self) -> &str {
        match self {
            Payload::Empty => "",
            Payload::Json(s) | Payload::Text(s) => s,
        }
    }
}

/// A validated request, ready for dispatch.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: HeaderFields,
    /// Negotiated body: parsed JSON, or the raw text as a string value.
    pub body: Value,
    pub payload: Payload,
    header_map: Headers,
}

impl Request {
    /// Validate user input. Fails before any network activity.
    pub fn prepare(input: &RequestInput) -> Result<Self> {
        let url = input.url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingUrl.into());
        }

        let headers = parse_headers(&input.headers)?;
        let mut header_map = to_header_map(&headers)?;

        let raw_body = input.body.trim();
        let body = negotiate_body(raw_body);
        let payload = payload_for(input.method, &body, raw_body);

        if matches!(payload, Payload::Json(_)) && !header_map.contains_key(CONTENT_TYPE) {
            header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(Self {
            method: input.method,
            url: url.to_string(),
            headers,
            body,
            payload,
            header_map,
        })
    }

    pub fn header_map(&self) -> &Headers {
        &self.header_map
    }
}

/// Empty text yields no headers; anything else must be a JSON object.
pub fn parse_headers(text: &str) -> std::result::Result<HeaderFields, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(HeaderFields::new());
    }

    let value: Value =
        serde_json::from_str(text).map_err(|e| ValidationError::InvalidHeaders(e.to_string()))?;
    let Value::Object(object) = value else {
        return Err(ValidationError::InvalidHeaders(
            "headers must be a JSON object".to_string(),
        ));
    };

    let mut headers = HeaderFields::new();
    for (key, value) in object {
        let value = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(ValidationError::InvalidHeaders(format!(
                    "value of header '{}' must be a string, got {}",
                    key, other
                )));
            }
        };
        headers.insert(key, value);
    }
    Ok(headers)
}

fn to_header_map(headers: &HeaderFields) -> std::result::Result<Headers, ValidationError> {
    let mut map = Headers::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ValidationError::InvalidHeaders(format!("'{}': {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ValidationError::InvalidHeaders(format!("'{}': {}", key, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Body is optionally JSON: parse it if possible, otherwise keep the text.
pub fn negotiate_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::String(String::new());
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

pub fn is_structured(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// GET/DELETE never carry a body. POST/PUT send structured bodies as
/// compact JSON and everything else as the literal input text.
pub fn payload_for(method: Method, body: &Value, raw: &str) -> Payload {
    if !method.sends_body() {
        return Payload::Empty;
    }
    if is_structured(body) {
        return Payload::Json(body.to_string());
    }
    if raw.is_empty() {
        Payload::Empty
    } else {
        Payload::Text(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RestdeskError;
    use serde_json::json;

    #[test]
    fn test_empty_url_fails_validation() {
        let input = RequestInput::new(Method::Get, "   ");
        let err = Request::prepare(&input).unwrap_err();
        assert!(matches!(
            err,
            RestdeskError::Validation(ValidationError::MissingUrl)
        ));
    }

    #[test]
    fn test_parse_headers_object() {
        let headers = parse_headers(r#"{"Accept": "application/json", "X-Retry": 3}"#).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["Accept"], "application/json");
        assert_eq!(headers["X-Retry"], "3");
    }

    #[test]
    fn test_parse_headers_empty_text() {
        assert!(parse_headers("").unwrap().is_empty());
        assert!(parse_headers("  \n ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_headers_rejects_non_object() {
        for text in ["[1, 2]", "42", "\"text\"", "null", "{bad json"] {
            let err = parse_headers(text).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidHeaders(_)),
                "expected invalid headers for {}",
                text
            );
        }
    }

    #[test]
    fn test_parse_headers_carries_parser_message() {
        let err = parse_headers("{bad json").unwrap_err();
        let ValidationError::InvalidHeaders(msg) = err else {
            panic!("Expected InvalidHeaders");
        };
        assert!(msg.contains("line 1"));
    }

    #[test]
    fn test_invalid_header_name_fails_validation() {
        let input = RequestInput::new(Method::Get, "http://example.test")
            .with_headers(r#"{"bad header": "x"}"#);
        assert!(matches!(
            Request::prepare(&input),
            Err(RestdeskError::Validation(ValidationError::InvalidHeaders(_)))
        ));
    }

    #[test]
    fn test_negotiate_body() {
        assert_eq!(negotiate_body(r#"{"a": 1}"#), json!({"a": 1}));
        assert_eq!(negotiate_body("[1,2]"), json!([1, 2]));
        assert_eq!(negotiate_body("42"), json!(42));
        assert_eq!(negotiate_body("name=foo"), json!("name=foo"));
        assert_eq!(negotiate_body(""), json!(""));
    }

    #[test]
    fn test_get_and_delete_never_send_body() {
        for method in [Method::Get, Method::Delete] {
            let input = RequestInput::new(method, "http://example.test")
                .with_body(r#"{"ignored": true}"#);
            let request = Request::prepare(&input).unwrap();
            assert_eq!(request.payload, Payload::Empty);
            // The negotiated body is still kept for history
            assert_eq!(request.body, json!({"ignored": true}));
        }
    }

    #[test]
    fn test_structured_body_sent_as_json() {
        let input = RequestInput::new(Method::Post, "http://example.test")
            .with_body("{ \"name\" : \"foo\", \"tags\": [1, 2] }");
        let request = Request::prepare(&input).unwrap();
        assert_eq!(
            request.payload,
            Payload::Json(r#"{"name":"foo","tags":[1,2]}"#.to_string())
        );
        assert_eq!(
            request.header_map().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_user_content_type_is_kept() {
        let input = RequestInput::new(Method::Put, "http://example.test")
            .with_headers(r#"{"Content-Type": "application/vnd.api+json"}"#)
            .with_body("[1]");
        let request = Request::prepare(&input).unwrap();
        assert_eq!(
            request.header_map().get(CONTENT_TYPE).unwrap(),
            "application/vnd.api+json"
        );
    }

    #[test]
    fn test_scalar_body_sent_as_literal_text() {
        let input = RequestInput::new(Method::Put, "http://example.test").with_body("42");
        let request = Request::prepare(&input).unwrap();
        assert_eq!(request.payload, Payload::Text("42".to_string()));
        assert!(request.header_map().get(CONTENT_TYPE).is_none());

        let input = RequestInput::new(Method::Post, "http://example.test").with_body("a=1&b=2");
        let request = Request::prepare(&input).unwrap();
        assert_eq!(request.payload.as_str(), "a=1&b=2");
    }
}

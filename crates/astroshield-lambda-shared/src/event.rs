//! Invocation event and reply shapes.
//!
//! Three inbound shapes are recognised:
//!
//! - plain `{method, path, headers, body}`
//! - API Gateway REST (v1): `httpMethod` / `path`
//! - API Gateway HTTP API (v2): `requestContext.http.method` / `rawPath`
//!
//! Header names are lowercased on the way in. A string body is taken as-is
//! (base64-decoded when `isBase64Encoded` is set); any other JSON body is
//! re-serialized so the schema layer sees the same text either way.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::dispatcher::Reply;

/// Header mapping with lowercase names.
pub type Headers = BTreeMap<String, String>;

/// Reasons a payload is not a usable invocation event.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("invocation event must be a JSON object")]
    NotAnObject,

    #[error("invocation event has no HTTP method")]
    MissingMethod,

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("invocation event has no path")]
    MissingPath,

    #[error("body is flagged base64 but does not decode: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("body is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("malformed invocation event: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    method: Option<String>,
    http_method: Option<String>,
    path: Option<String>,
    raw_path: Option<String>,
    request_context: Option<RawRequestContext>,
    headers: Option<BTreeMap<String, Value>>,
    body: Option<Value>,
    is_base64_encoded: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRequestContext {
    http: Option<RawHttp>,
}

#[derive(Debug, Default, Deserialize)]
struct RawHttp {
    method: Option<String>,
    path: Option<String>,
}

/// Inbound request as delivered by the hosting platform, after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationEvent {
    pub method: Method,
    /// Raw path, possibly with base path and query string still attached.
    pub path: String,
    pub headers: Headers,
    pub body: Option<String>,
}

impl InvocationEvent {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Add a header; the name is lowercased.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Decode any of the recognised event shapes.
    pub fn from_payload(payload: Value) -> Result<Self, EventError> {
        if !payload.is_object() {
            return Err(EventError::NotAnObject);
        }

        let raw: RawEvent = serde_json::from_value(payload)?;
        let http = raw.request_context.and_then(|ctx| ctx.http).unwrap_or_default();

        let method = raw
            .method
            .or(raw.http_method)
            .or(http.method)
            .filter(|m| !m.trim().is_empty())
            .ok_or(EventError::MissingMethod)?;
        let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| EventError::InvalidMethod(method))?;

        let path = raw
            .path
            .or(raw.raw_path)
            .or(http.path)
            .filter(|p| !p.is_empty())
            .ok_or(EventError::MissingPath)?;

        let headers = raw
            .headers
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(name, value)| {
                let value = match value {
                    Value::Null => return None,
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                Some((name.to_ascii_lowercase(), value))
            })
            .collect();

        let body = decode_body(raw.body, raw.is_base64_encoded.unwrap_or(false))?;

        Ok(Self {
            method,
            path,
            headers,
            body,
        })
    }
}

fn decode_body(body: Option<Value>, base64: bool) -> Result<Option<String>, EventError> {
    match body {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if base64 => {
            let bytes = BASE64.decode(text.trim())?;
            Ok(Some(String::from_utf8(bytes)?))
        }
        Some(Value::String(text)) => Ok(Some(text)),
        Some(other) => Ok(Some(serde_json::to_string(&other)?)),
    }
}

/// Reply handed back to the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationReply {
    pub status_code: u16,
    pub headers: Headers,
    pub body: String,
    /// Bodies are always JSON text.
    pub is_base64_encoded: bool,
}

impl From<Reply> for InvocationReply {
    fn from(reply: Reply) -> Self {
        Self {
            status_code: reply.status.as_u16(),
            headers: reply.headers,
            body: reply.body,
            is_base64_encoded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_event() {
        let event = InvocationEvent::from_payload(json!({
            "method": "post",
            "path": "/encrypt",
            "headers": { "Content-Type": "application/json" },
            "body": "{\"value\":\"x\"}"
        }))
        .unwrap();

        assert_eq!(event.method, Method::POST);
        assert_eq!(event.path, "/encrypt");
        assert_eq!(event.header("content-type"), Some("application/json"));
        assert_eq!(event.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(event.body.as_deref(), Some("{\"value\":\"x\"}"));
    }

    #[test]
    fn test_rest_api_event() {
        let event = InvocationEvent::from_payload(json!({
            "resource": "/{proxy+}",
            "httpMethod": "GET",
            "path": "/health",
            "headers": null,
            "body": null,
            "isBase64Encoded": false,
            "requestContext": { "stage": "prod" }
        }))
        .unwrap();

        assert_eq!(event.method, Method::GET);
        assert_eq!(event.path, "/health");
        assert!(event.headers.is_empty());
        assert_eq!(event.body, None);
    }

    #[test]
    fn test_http_api_event() {
        let event = InvocationEvent::from_payload(json!({
            "version": "2.0",
            "rawPath": "/analyze",
            "rawQueryString": "",
            "requestContext": { "http": { "method": "POST", "path": "/analyze" } },
            "body": "eyJkYXRhIjoic2F0LTQyIn0=",
            "isBase64Encoded": true
        }))
        .unwrap();

        assert_eq!(event.method, Method::POST);
        assert_eq!(event.path, "/analyze");
        assert_eq!(event.body.as_deref(), Some("{\"data\":\"sat-42\"}"));
    }

    #[test]
    fn test_event_with_both_path_and_raw_path() {
        let event = InvocationEvent::from_payload(json!({
            "httpMethod": "GET",
            "requestContext": { "http": { "method": "GET" } },
            "rawPath": "/health",
            "path": "/health"
        }))
        .unwrap();

        assert_eq!(event.method, Method::GET);
        assert_eq!(event.path, "/health");
    }

    #[test]
    fn test_path_is_preferred_over_raw_path() {
        let event = InvocationEvent::from_payload(json!({
            "method": "GET",
            "path": "/prod/health",
            "rawPath": "/health"
        }))
        .unwrap();

        assert_eq!(event.path, "/prod/health");
    }

    #[test]
    fn test_object_body_is_reserialized() {
        let event = InvocationEvent::from_payload(json!({
            "method": "POST",
            "path": "/encrypt",
            "body": { "value": "abc" }
        }))
        .unwrap();

        assert_eq!(event.body.as_deref(), Some("{\"value\":\"abc\"}"));
    }

    #[test]
    fn test_non_string_header_values() {
        let event = InvocationEvent::from_payload(json!({
            "method": "GET",
            "path": "/",
            "headers": { "X-Retry": 3, "X-Null": null }
        }))
        .unwrap();

        assert_eq!(event.header("x-retry"), Some("3"));
        assert_eq!(event.header("x-null"), None);
    }

    #[test]
    fn test_rejects_unrecognised_payloads() {
        assert!(matches!(
            InvocationEvent::from_payload(json!("GET /")),
            Err(EventError::NotAnObject)
        ));
        assert!(matches!(
            InvocationEvent::from_payload(json!({ "path": "/" })),
            Err(EventError::MissingMethod)
        ));
        assert!(matches!(
            InvocationEvent::from_payload(json!({ "method": "GET" })),
            Err(EventError::MissingPath)
        ));
        assert!(matches!(
            InvocationEvent::from_payload(json!({ "method": "GE T", "path": "/" })),
            Err(EventError::InvalidMethod(_))
        ));
        assert!(matches!(
            InvocationEvent::from_payload(json!({ "method": 5, "path": "/" })),
            Err(EventError::Malformed(_))
        ));
    }

    #[test]
    fn test_bad_base64_body() {
        let result = InvocationEvent::from_payload(json!({
            "method": "POST",
            "path": "/encrypt",
            "body": "not base64!",
            "isBase64Encoded": true
        }));
        assert!(matches!(result, Err(EventError::Base64(_))));
    }

    #[test]
    fn test_reply_serialization() {
        let reply = InvocationReply {
            status_code: 200,
            headers: Headers::new(),
            body: "{}".to_string(),
            is_base64_encoded: false,
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["isBase64Encoded"], false);
        assert_eq!(json["body"], "{}");
    }
}

//! Test utilities for event adapter and handler testing.
//!
//! Shared by this crate's unit tests and, through the `test-utils` feature,
//! by the Lambda and HTTP service crates.
//!
//! # Usage
//!
//! ```ignore
//! use astroshield_lambda_shared::test_utils::{plain_event, test_adapter, mock_request_id};
//!
//! #[tokio::test]
//! async fn health_is_ok() {
//!     let reply = test_adapter()
//!         .handle(plain_event("GET", "/health", None), &mock_request_id("health"))
//!         .await;
//!     assert_eq!(reply.status_code, 200);
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use astroshield_lib::{
    AnalysisResult, Analyzer, Encryptor, Error, FixedClock, Prediction, Provider, Result,
    Services,
};

use crate::adapter::EventAdapter;
use crate::config::AdapterConfig;

/// Instant returned by [`fixed_clock`]: 2024-01-21T12:00:00Z.
pub fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 21, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn fixed_clock() -> FixedClock {
    FixedClock(fixed_instant())
}

/// Mock providers on a fixed clock.
pub fn fixed_services() -> Services {
    Services::mock().with_clock(fixed_clock())
}

/// Adapter over [`fixed_services`] with default configuration.
pub fn test_adapter() -> EventAdapter {
    EventAdapter::new(fixed_services(), AdapterConfig::default())
}

/// Adapter over [`fixed_services`] with the given configuration.
pub fn test_adapter_with(config: AdapterConfig) -> EventAdapter {
    EventAdapter::new(fixed_services(), config)
}

/// Create a mock request ID in the format "test-request-{suffix}".
pub fn mock_request_id(suffix: &str) -> String {
    format!("test-request-{}", suffix)
}

/// `{method, path, headers, body}` event.
pub fn plain_event(method: &str, path: &str, body: Option<Value>) -> Value {
    json!({
        "method": method,
        "path": path,
        "headers": { "Content-Type": "application/json" },
        "body": body.map(|b| b.to_string()),
    })
}

/// API Gateway REST (payload v1) event.
pub fn rest_api_event(method: &str, path: &str, body: Option<Value>) -> Value {
    json!({
        "resource": "/{proxy+}",
        "path": path,
        "httpMethod": method,
        "headers": { "Content-Type": "application/json", "X-Forwarded-Proto": "https" },
        "multiValueHeaders": {},
        "queryStringParameters": null,
        "requestContext": { "stage": "prod", "httpMethod": method, "path": path },
        "body": body.map(|b| b.to_string()),
        "isBase64Encoded": false,
    })
}

/// API Gateway HTTP API (payload v2) event.
pub fn http_api_event(method: &str, path: &str, body: Option<Value>) -> Value {
    json!({
        "version": "2.0",
        "routeKey": "$default",
        "rawPath": path,
        "rawQueryString": "",
        "headers": { "content-type": "application/json" },
        "requestContext": {
            "stage": "$default",
            "http": { "method": method, "path": path, "protocol": "HTTP/1.1" },
        },
        "body": body.map(|b| b.to_string()),
        "isBase64Encoded": false,
    })
}

/// Encryptor whose backend is always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEncryptor;

/// Message carried by [`FailingEncryptor`] errors.
pub const FAILING_ENCRYPTOR_MESSAGE: &str = "key store unreachable";

#[async_trait]
impl Provider for FailingEncryptor {
    fn name(&self) -> &'static str {
        "failing-encryptor"
    }
}

#[async_trait]
impl Encryptor for FailingEncryptor {
    async fn encrypt(&self, _value: &str, _at: DateTime<Utc>) -> Result<String> {
        Err(Error::provider(self.name(), FAILING_ENCRYPTOR_MESSAGE))
    }
}

/// Analyzer that reports a likelihood outside `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutOfBoundsAnalyzer;

#[async_trait]
impl Provider for OutOfBoundsAnalyzer {
    fn name(&self) -> &'static str {
        "out-of-bounds-analyzer"
    }
}

#[async_trait]
impl Analyzer for OutOfBoundsAnalyzer {
    async fn analyze(&self, _data: &str, _mode: &str, at: DateTime<Utc>) -> Result<AnalysisResult> {
        Ok(AnalysisResult {
            likelihood: 1.7,
            confidence: 0.5,
            predictions: vec![Prediction {
                time: astroshield_lib::format_timestamp(at),
                event: "orbital_maneuver".to_string(),
                probability: 0.5,
            }],
            recommendations: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InvocationEvent;

    #[test]
    fn test_event_builders_decode() {
        for payload in [
            plain_event("POST", "/encrypt", Some(json!({ "value": "x" }))),
            rest_api_event("POST", "/encrypt", Some(json!({ "value": "x" }))),
            http_api_event("POST", "/encrypt", Some(json!({ "value": "x" }))),
        ] {
            let event = InvocationEvent::from_payload(payload).unwrap();
            assert_eq!(event.path, "/encrypt");
            assert_eq!(event.body.as_deref(), Some(r#"{"value":"x"}"#));
        }
    }

    #[test]
    fn test_mock_request_id() {
        assert_eq!(mock_request_id("abc"), "test-request-abc");
    }

    #[tokio::test]
    async fn test_failing_encryptor() {
        let err = FailingEncryptor.encrypt("x", fixed_instant()).await.unwrap_err();
        assert!(err.to_string().contains(FAILING_ENCRYPTOR_MESSAGE));
    }
}

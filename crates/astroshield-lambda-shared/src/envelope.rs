//! Uniform error envelope returned by every failing reply.
//!
//! Shaped after RFC 9457 Problem Details but keyed for this API:
//! `{error, detail, status, violations?, instance?}`.

use http::StatusCode;
use serde::{Deserialize, Serialize};

use astroshield_lib::{Error as LibError, ValidationFailure, Violation};

/// Detail returned for internal errors unless raw messages are exposed.
pub const OPAQUE_INTERNAL_DETAIL: &str = "An internal error occurred";

pub const ERROR_VALIDATION: &str = "Validation Error";
pub const ERROR_NOT_FOUND: &str = "Not Found";
pub const ERROR_INTERNAL: &str = "Internal Error";
pub const ERROR_INVALID_EVENT: &str = "Invalid Event";
pub const ERROR_BAD_REQUEST: &str = "Bad Request";

/// Error body shared by the Lambda and HTTP surfaces.
///
/// # Example
///
/// ```
/// use astroshield_lambda_shared::ErrorEnvelope;
///
/// let envelope = ErrorEnvelope::not_found("GET", "/nope").with_request_id("req-1");
/// assert_eq!(envelope.status, 404);
/// assert_eq!(envelope.instance.as_deref(), Some("req-1"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Short error class, e.g. `Validation Error`.
    pub error: String,

    /// Human-readable explanation of this occurrence.
    pub detail: String,

    pub status: u16,

    /// Every violated rule, for validation failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,

    /// Request identifier of the failing invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>, detail: impl Into<String>, status: StatusCode) -> Self {
        Self {
            error: error.into(),
            detail: detail.into(),
            status: status.as_u16(),
            violations: Vec::new(),
            instance: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 naming each offending field and rule.
    pub fn validation(failure: ValidationFailure) -> Self {
        let mut envelope =
            Self::new(ERROR_VALIDATION, failure.to_string(), StatusCode::BAD_REQUEST);
        envelope.violations = failure.into_violations();
        envelope
    }

    /// 404 for an unknown method/path combination.
    pub fn not_found(method: &str, path: &str) -> Self {
        Self::new(
            ERROR_NOT_FOUND,
            format!("No route for {} {}", method, path),
            StatusCode::NOT_FOUND,
        )
    }

    /// 500. `detail` reaches the client verbatim.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(ERROR_INTERNAL, detail, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// 400 for a payload that is not a recognisable invocation event.
    pub fn invalid_event(detail: impl Into<String>) -> Self {
        Self::new(ERROR_INVALID_EVENT, detail, StatusCode::BAD_REQUEST)
    }

    /// 400 for a transport-level problem such as an oversized body.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(ERROR_BAD_REQUEST, detail, StatusCode::BAD_REQUEST)
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl std::fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.detail)
    }
}

impl std::error::Error for ErrorEnvelope {}

/// Convert a library error into an envelope.
///
/// Internal failures carry [`OPAQUE_INTERNAL_DETAIL`] unless `expose` is set.
pub fn from_lib_error(error: &LibError, request_id: &str, expose: bool) -> ErrorEnvelope {
    let envelope = match error {
        LibError::Validation(failure) => ErrorEnvelope::validation(failure.clone()),
        _ if expose => ErrorEnvelope::internal(error.to_string()),
        _ => ErrorEnvelope::internal(OPAQUE_INTERNAL_DETAIL),
    };
    envelope.with_request_id(request_id)
}

//! Request correlation identifiers.
//!
//! The Lambda runtime supplies one per invocation. The HTTP service takes the
//! `x-request-id` header, or generates a UUID v7 (time-sortable) when absent.

use uuid::Uuid;

use crate::event::Headers;

/// Header carrying a caller-supplied request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Newtype wrapper for request correlation IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new UUID v7 request ID.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take `x-request-id` from lowercased headers, or generate one.
    pub fn extract_or_generate(headers: &Headers) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(RequestId::from)
            .unwrap_or_else(RequestId::generate)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_uuid_v7() {
        let id = RequestId::generate();
        let parsed = Uuid::parse_str(id.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }

    #[test]
    fn test_extract_from_header() {
        let mut headers = Headers::new();
        headers.insert(REQUEST_ID_HEADER.into(), "abc-123".into());
        assert_eq!(RequestId::extract_or_generate(&headers).as_str(), "abc-123");
    }

    #[test]
    fn test_blank_header_generates() {
        let mut headers = Headers::new();
        headers.insert(REQUEST_ID_HEADER.into(), "  ".into());
        let id = RequestId::extract_or_generate(&headers);
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(RequestId::new("req-9").to_string(), "req-9");
    }
}

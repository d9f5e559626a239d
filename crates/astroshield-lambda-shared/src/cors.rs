//! Fixed cross-origin header set.

use http::header::{
    HeaderName, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};

use crate::event::Headers;

/// Cross-origin headers attached to every reply.
///
/// Header names are lowercase, as produced by the `http` crate constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    headers: Vec<(HeaderName, String)>,
}

impl CorsPolicy {
    /// Any origin, method and header, with credentials allowed.
    pub fn permissive() -> Self {
        Self {
            headers: vec![
                (ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
                (ACCESS_CONTROL_ALLOW_CREDENTIALS, "true".to_string()),
                (ACCESS_CONTROL_ALLOW_METHODS, "*".to_string()),
                (ACCESS_CONTROL_ALLOW_HEADERS, "*".to_string()),
            ],
        }
    }

    /// Overwrite the policy headers in `headers`.
    pub fn apply(&self, headers: &mut Headers) {
        for (name, value) in &self.headers {
            headers.insert(name.as_str().to_string(), value.clone());
        }
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::permissive()
    }
}

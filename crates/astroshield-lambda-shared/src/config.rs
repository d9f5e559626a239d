//! Event adapter configuration.
//!
//! Both translation toggles are explicit fields rather than defaults buried in
//! the adapter:
//!
//! - `ASTROSHIELD_BASE_PATH`: prefix stripped from every inbound path (unset: no stripping)
//! - `ASTROSHIELD_LIFESPAN`: `off` (default) or `on`
//! - `ASTROSHIELD_EXPOSE_INTERNAL_ERRORS`: `true` to return raw internal error
//!   messages to clients (default: `false`)
//!
//! # Example
//!
//! ```
//! use astroshield_lambda_shared::{AdapterConfig, Lifespan};
//!
//! let config = AdapterConfig::default()
//!     .with_base_path("/prod/")
//!     .with_lifespan(Lifespan::On);
//! assert_eq!(config.route_path("/prod/health"), "/health");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const ENV_BASE_PATH: &str = "ASTROSHIELD_BASE_PATH";
pub const ENV_LIFESPAN: &str = "ASTROSHIELD_LIFESPAN";
pub const ENV_EXPOSE_INTERNAL_ERRORS: &str = "ASTROSHIELD_EXPOSE_INTERNAL_ERRORS";

/// Whether provider startup/shutdown hooks are delegated to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lifespan {
    /// The hosting platform owns the process lifecycle; hooks never run.
    #[default]
    Off,
    /// Run provider startup before the first invocation and shutdown at exit.
    On,
}

impl FromStr for Lifespan {
    type Err = String;

    /// Accepts `off` and `on`; `auto` is treated as `on`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(Lifespan::Off),
            "on" | "auto" => Ok(Lifespan::On),
            other => Err(format!("unknown lifespan mode '{}', expected 'off' or 'on'", other)),
        }
    }
}

impl fmt::Display for Lifespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifespan::Off => write!(f, "off"),
            Lifespan::On => write!(f, "on"),
        }
    }
}

/// Configuration for translating invocation events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Prefix stripped from inbound paths, normalized to `/segment`.
    pub base_path: Option<String>,
    /// Provider lifecycle delegation.
    pub lifespan: Lifespan,
    /// Return raw internal error messages to clients.
    pub expose_internal_errors: bool,
}

impl AdapterConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and replaced by their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_path) = lookup(ENV_BASE_PATH) {
            config = config.with_base_path(base_path);
        }

        if let Some(raw) = lookup(ENV_LIFESPAN) {
            match raw.parse() {
                Ok(lifespan) => config.lifespan = lifespan,
                Err(e) => warn!(error = %e, "ignoring {}", ENV_LIFESPAN),
            }
        }

        if let Some(raw) = lookup(ENV_EXPOSE_INTERNAL_ERRORS) {
            config.expose_internal_errors = parse_flag(&raw);
        }

        config
    }

    /// Strip `base_path` from inbound paths. Empty or `/` disables stripping.
    pub fn with_base_path(mut self, base_path: impl AsRef<str>) -> Self {
        let trimmed = base_path.as_ref().trim().trim_matches('/');
        self.base_path = if trimmed.is_empty() {
            None
        } else {
            Some(format!("/{}", trimmed))
        };
        self
    }

    pub fn with_lifespan(mut self, lifespan: Lifespan) -> Self {
        self.lifespan = lifespan;
        self
    }

    pub fn with_expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// Map an inbound path to the path used for routing.
    ///
    /// Drops any query string, then strips `base_path` when it matches a
    /// whole leading segment sequence. Paths that do not start with the base
    /// path are routed unchanged.
    pub fn route_path(&self, path: &str) -> String {
        let path = normalize_path(path);
        let path = if path.is_empty() { "/" } else { path };

        let Some(base) = self.base_path.as_deref() else {
            return path.to_string();
        };

        match path.strip_prefix(base) {
            Some("") => "/".to_string(),
            Some(rest) if rest.starts_with('/') => rest.to_string(),
            _ => path.to_string(),
        }
    }
}

/// Strip the query string from a request path.
pub fn normalize_path(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

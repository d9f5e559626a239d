//! Capability interfaces for the verification, encryption, analysis and
//! object assessment backends.
//!
//! Route handlers depend on these traits only. The `Mock*` implementations
//! return deterministic placeholder results and are the defaults wired into
//! [`Services::mock`](crate::Services::mock); a real backend replaces one of
//! them without touching the dispatcher or the event adapter.
//!
//! Provider calls are async and fallible because a real backend is a remote,
//! potentially slow dependency.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Map, Value};

use crate::clock::format_timestamp;
use crate::error::Result;
use crate::models::{AnalysisResult, Prediction};

/// Checks applied by the mock verifier, in report order.
pub const MOCK_CHECKS: [&str; 3] = ["format", "schema", "integrity"];

/// Prefix of every value produced by [`MockEncryptor`].
pub const MOCK_CIPHER_PREFIX: &str = "encrypted_";

/// Event name reported by [`MockAnalyzer`].
pub const MOCK_PREDICTED_EVENT: &str = "orbital_maneuver";

/// Label reported by [`MockAssessor`] for every object.
pub const MOCK_ASSESSMENT: &str = "nominal";

/// Lifecycle shared by every provider.
///
/// The hooks only run when the event adapter delegates lifespan control to
/// the application; by default the hosting platform owns the process
/// lifecycle and they are never called.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short name used in log events and error messages.
    fn name(&self) -> &'static str;

    /// Acquire connections or warm caches before the first request.
    async fn startup(&self) -> Result<()> {
        Ok(())
    }

    /// Release resources after the last request.
    async fn shutdown(&self) {}
}

/// Outcome reported by a [`Verifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub verified: bool,
    pub message: String,
    pub checks_passed: Vec<String>,
    pub data_type: String,
}

/// Verifies structured payloads.
#[async_trait]
pub trait Verifier: Provider {
    async fn verify(&self, data: &Map<String, Value>) -> Result<Verification>;
}

/// Encrypts string values.
///
/// Implementations must return a non-empty value for any input of at least
/// one character. Whether output is deterministic is up to the provider.
#[async_trait]
pub trait Encryptor: Provider {
    async fn encrypt(&self, value: &str, at: DateTime<Utc>) -> Result<String>;
}

/// Predicts orbital events.
///
/// `mode` selects the analysis model. Implementations populate
/// `predictions` and `recommendations` according to it; likelihood,
/// confidence and probabilities must lie in `[0, 1]`.
#[async_trait]
pub trait Analyzer: Provider {
    async fn analyze(&self, data: &str, mode: &str, at: DateTime<Utc>) -> Result<AnalysisResult>;
}

/// Label and confidence reported by an [`Assessor`].
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub label: String,
    /// In `[0, 1]`.
    pub confidence: f64,
}

/// Assesses tracked space objects.
#[async_trait]
pub trait Assessor: Provider {
    /// Overall assessment of one object from optional observations.
    async fn assess(
        &self,
        object_id: &str,
        observations: Option<&Map<String, Value>>,
    ) -> Result<Assessment>;

    /// Behaviour class of one object from optional behaviour data.
    async fn classify(
        &self,
        object_id: &str,
        behavior: Option<&Map<String, Value>>,
    ) -> Result<Assessment>;
}

/// Accepts every payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockVerifier;

#[async_trait]
impl Provider for MockVerifier {
    fn name(&self) -> &'static str {
        "mock-verifier"
    }
}

#[async_trait]
impl Verifier for MockVerifier {
    async fn verify(&self, data: &Map<String, Value>) -> Result<Verification> {
        let data_type = match data.get("type") {
            None | Some(Value::Null) => "unknown".to_string(),
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
        };

        Ok(Verification {
            verified: true,
            message: "Data verification successful".to_string(),
            checks_passed: MOCK_CHECKS.iter().map(|c| c.to_string()).collect(),
            data_type,
        })
    }
}

/// Tags the plaintext with a prefix and the epoch second. Not encryption.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockEncryptor;

#[async_trait]
impl Provider for MockEncryptor {
    fn name(&self) -> &'static str {
        "mock-encryptor"
    }
}

#[async_trait]
impl Encryptor for MockEncryptor {
    async fn encrypt(&self, value: &str, at: DateTime<Utc>) -> Result<String> {
        Ok(format!("{}{}_{}", MOCK_CIPHER_PREFIX, value, at.timestamp()))
    }
}

/// Returns the same single-maneuver forecast for every input.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAnalyzer;

#[async_trait]
impl Provider for MockAnalyzer {
    fn name(&self) -> &'static str {
        "mock-analyzer"
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze(&self, _data: &str, _mode: &str, at: DateTime<Utc>) -> Result<AnalysisResult> {
        Ok(AnalysisResult {
            likelihood: 0.85,
            confidence: 0.92,
            predictions: vec![Prediction {
                time: format_timestamp(at + TimeDelta::hours(24)),
                event: MOCK_PREDICTED_EVENT.to_string(),
                probability: 0.75,
            }],
            recommendations: vec![
                "Monitor for potential orbital adjustments".to_string(),
                "Review conjunction screening for the next 24 hours".to_string(),
            ],
        })
    }
}

/// Reports every object as nominal.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAssessor;

#[async_trait]
impl Provider for MockAssessor {
    fn name(&self) -> &'static str {
        "mock-assessor"
    }
}

#[async_trait]
impl Assessor for MockAssessor {
    async fn assess(
        &self,
        _object_id: &str,
        _observations: Option<&Map<String, Value>>,
    ) -> Result<Assessment> {
        Ok(Assessment {
            label: MOCK_ASSESSMENT.to_string(),
            confidence: 0.95,
        })
    }

    async fn classify(
        &self,
        _object_id: &str,
        _behavior: Option<&Map<String, Value>>,
    ) -> Result<Assessment> {
        Ok(Assessment {
            label: MOCK_ASSESSMENT.to_string(),
            confidence: 0.95,
        })
    }
}

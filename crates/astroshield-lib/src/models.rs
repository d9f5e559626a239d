//! Request and response records for every endpoint, with their field tables.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{FieldSpec, FieldType, Schema};

/// API name reported by the root endpoint.
pub const API_NAME: &str = "AstroShield API";

/// API version reported by the root endpoint.
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Analysis mode applied when a request omits `analysisMode`.
pub const DEFAULT_ANALYSIS_MODE: &str = "orbital_prediction";

fn default_analysis_mode() -> String {
    DEFAULT_ANALYSIS_MODE.to_string()
}

/// Response of `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
    pub version: String,
}

impl Schema for RootResponse {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("message", FieldType::String),
        FieldSpec::required("status", FieldType::String),
        FieldSpec::required("version", FieldType::String).min_length(1),
    ];
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"` when the process can answer.
    pub status: String,
    /// ISO-8601 UTC instant of the check.
    pub timestamp: String,
}

impl Schema for HealthResponse {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("status", FieldType::String),
        FieldSpec::required("timestamp", FieldType::String).min_length(1),
    ];
}

/// Body of `POST /verify`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// Arbitrary structured payload to verify. May be empty.
    pub data: Map<String, Value>,
}

impl VerifyRequest {
    /// The `data.type` entry when it is a string.
    pub fn data_type(&self) -> Option<&str> {
        self.data.get("type").and_then(Value::as_str)
    }
}

impl Schema for VerifyRequest {
    const FIELDS: &'static [FieldSpec] = &[FieldSpec::required("data", FieldType::Object)];
}

/// Supplementary information attached to a verification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyDetails {
    pub timestamp: String,
    pub checks_passed: Vec<String>,
    pub data_type: String,
}

const VERIFY_DETAILS_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("timestamp", FieldType::String).min_length(1),
    FieldSpec::required("checks_passed", FieldType::Array).items(FieldType::String),
    FieldSpec::required("data_type", FieldType::String),
];

/// Response of `POST /verify`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub verified: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<VerifyDetails>,
}

impl Schema for VerifyResponse {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("verified", FieldType::Boolean),
        FieldSpec::required("message", FieldType::String),
        FieldSpec::optional("details", FieldType::Object).nested(VERIFY_DETAILS_FIELDS),
    ];
}

/// Body of `POST /encrypt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptRequest {
    /// Plaintext to encrypt. At least one character.
    pub value: String,
}

impl Schema for EncryptRequest {
    const FIELDS: &'static [FieldSpec] =
        &[FieldSpec::required("value", FieldType::String).min_length(1)];
}

/// Response of `POST /encrypt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptResponse {
    pub encrypted_value: String,
    pub timestamp: String,
}

impl Schema for EncryptResponse {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("encryptedValue", FieldType::String).min_length(1),
        FieldSpec::required("timestamp", FieldType::String).min_length(1),
    ];
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Subject of the analysis (e.g. a satellite identifier).
    pub data: String,
    /// Analysis model to apply.
    #[serde(default = "default_analysis_mode")]
    pub analysis_mode: String,
}

impl Schema for AnalyzeRequest {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("data", FieldType::String).min_length(1),
        FieldSpec::optional("analysisMode", FieldType::String),
    ];
}

/// A single predicted orbital event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// ISO-8601 UTC instant of the predicted event.
    pub time: String,
    pub event: String,
    pub probability: f64,
}

const PREDICTION_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("time", FieldType::String).min_length(1),
    FieldSpec::required("event", FieldType::String).min_length(1),
    FieldSpec::required("probability", FieldType::Number).range(0.0, 1.0),
];

/// Outcome of an orbital-event analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub likelihood: f64,
    pub confidence: f64,
    pub predictions: Vec<Prediction>,
    pub recommendations: Vec<String>,
}

const ANALYSIS_RESULT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("likelihood", FieldType::Number).range(0.0, 1.0),
    FieldSpec::required("confidence", FieldType::Number).range(0.0, 1.0),
    FieldSpec::required("predictions", FieldType::Array).nested(PREDICTION_FIELDS),
    FieldSpec::required("recommendations", FieldType::Array).items(FieldType::String),
];

impl Schema for AnalysisResult {
    const FIELDS: &'static [FieldSpec] = ANALYSIS_RESULT_FIELDS;
}

/// Response of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis_result: AnalysisResult,
    pub timestamp: String,
}

impl Schema for AnalyzeResponse {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("analysisResult", FieldType::Object).nested(ANALYSIS_RESULT_FIELDS),
        FieldSpec::required("timestamp", FieldType::String).min_length(1),
    ];
}

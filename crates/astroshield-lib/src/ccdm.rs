//! Object assessment records (camouflage, concealment, deception and
//! maneuvering).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{FieldSpec, FieldType, Schema};

/// Body of `POST /analyze_object`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeObjectRequest {
    pub object_id: String,
    #[serde(default)]
    pub observation_data: Option<Map<String, Value>>,
}

impl Schema for AnalyzeObjectRequest {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("object_id", FieldType::String).min_length(1),
        FieldSpec::optional("observation_data", FieldType::Object),
    ];
}

/// Response of `POST /analyze_object`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectAssessment {
    pub object_id: String,
    pub ccdm_assessment: String,
    pub confidence_level: f64,
    pub timestamp: String,
}

impl Schema for ObjectAssessment {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("object_id", FieldType::String).min_length(1),
        FieldSpec::required("ccdm_assessment", FieldType::String).min_length(1),
        FieldSpec::required("confidence_level", FieldType::Number).range(0.0, 1.0),
        FieldSpec::required("timestamp", FieldType::String).min_length(1),
    ];
}

/// Body of `POST /classify_behavior`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyBehaviorRequest {
    pub object_id: String,
    #[serde(default)]
    pub behavior_data: Option<Map<String, Value>>,
}

impl Schema for ClassifyBehaviorRequest {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("object_id", FieldType::String).min_length(1),
        FieldSpec::optional("behavior_data", FieldType::Object),
    ];
}

/// Response of `POST /classify_behavior`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorClassification {
    pub object_id: String,
    pub behavior_class: String,
    pub confidence_level: f64,
    pub supporting_evidence: Map<String, Value>,
}

impl Schema for BehaviorClassification {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("object_id", FieldType::String).min_length(1),
        FieldSpec::required("behavior_class", FieldType::String).min_length(1),
        FieldSpec::required("confidence_level", FieldType::Number).range(0.0, 1.0),
        FieldSpec::required("supporting_evidence", FieldType::Object),
    ];
}

/// Body of `POST /bulk_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAnalysisRequest {
    pub object_ids: Vec<String>,
}

impl Schema for BulkAnalysisRequest {
    const FIELDS: &'static [FieldSpec] =
        &[FieldSpec::required("object_ids", FieldType::Array).items(FieldType::String)];
}

/// One entry of a bulk analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAssessment {
    pub object_id: String,
    pub ccdm_assessment: String,
    pub confidence_level: f64,
}

const BULK_ASSESSMENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("object_id", FieldType::String),
    FieldSpec::required("ccdm_assessment", FieldType::String).min_length(1),
    FieldSpec::required("confidence_level", FieldType::Number).range(0.0, 1.0),
];

/// Response of `POST /bulk_analysis`, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAnalysisResponse {
    pub results: Vec<BulkAssessment>,
}

impl Schema for BulkAnalysisResponse {
    const FIELDS: &'static [FieldSpec] =
        &[FieldSpec::required("results", FieldType::Array).nested(BULK_ASSESSMENT_FIELDS)];
}

//! AstroShield library entry points.
//!
//! This crate holds everything that does not depend on the hosting platform:
//! the payload schemas and their validator, the provider capability traits
//! with their mock implementations, the static indicator catalogue and
//! dashboard data, and the route handlers. The Lambda and HTTP service crates
//! only translate transport shapes and should depend on the items exported
//! here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod ccdm;
pub mod clock;
pub mod dashboard;
pub mod error;
pub mod handlers;
pub mod indicators;
pub mod models;
pub mod providers;
pub mod schema;

pub use ccdm::{
    AnalyzeObjectRequest, BehaviorClassification, BulkAnalysisRequest, BulkAnalysisResponse,
    BulkAssessment, ClassifyBehaviorRequest, ObjectAssessment,
};
pub use clock::{format_timestamp, Clock, FixedClock, SystemClock};
pub use dashboard::{AnalyticsReport, ComprehensiveReport, StabilityMetrics, StabilityReport};
pub use error::{Error, Result};
pub use handlers::Services;
pub use indicators::{
    IndicatorCategoriesResponse, IndicatorCategoryRequest, IndicatorCategoryResponse,
    IndicatorDetails, IndicatorsResponse,
};
pub use models::{
    AnalysisResult, AnalyzeRequest, AnalyzeResponse, EncryptRequest, EncryptResponse,
    HealthResponse, Prediction, RootResponse, VerifyDetails, VerifyRequest, VerifyResponse,
    API_NAME, API_VERSION, DEFAULT_ANALYSIS_MODE,
};
pub use providers::{
    Analyzer, Assessment, Assessor, Encryptor, MockAnalyzer, MockAssessor, MockEncryptor,
    MockVerifier, Provider, Verification, Verifier,
};
pub use schema::{RuleKind, Schema, ValidationFailure, Violation};

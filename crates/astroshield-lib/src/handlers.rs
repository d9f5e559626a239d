//! Route handlers and the provider set they run against.
//!
//! Each handler takes an already-validated request and returns a response
//! record. Apart from the injected [`Clock`] and providers they are pure, so
//! concurrent invocations never share mutable state.
//!
//! Log events carry the endpoint name and input sizes only; raw `value` and
//! `data` contents never reach the log. Failures are returned unlogged; the
//! dispatcher records each one once.

use std::sync::Arc;

use tracing::info;

use crate::ccdm::{
    AnalyzeObjectRequest, BehaviorClassification, BulkAnalysisRequest, BulkAnalysisResponse,
    BulkAssessment, ClassifyBehaviorRequest, ObjectAssessment,
};
use crate::clock::{format_timestamp, Clock, SystemClock};
use crate::dashboard::{self, AnalyticsReport, ComprehensiveReport, StabilityReport};
use crate::error::Result;
use crate::indicators::{
    self, IndicatorCategoriesResponse, IndicatorCategoryRequest, IndicatorCategoryResponse,
    IndicatorsResponse,
};
use crate::models::{
    AnalyzeRequest, AnalyzeResponse, EncryptRequest, EncryptResponse, HealthResponse,
    RootResponse, VerifyDetails, VerifyRequest, VerifyResponse, API_NAME, API_VERSION,
};
use crate::providers::{
    Analyzer, Assessor, Encryptor, MockAnalyzer, MockAssessor, MockEncryptor, MockVerifier,
    Provider, Verifier,
};

/// Immutable provider set shared by every invocation.
#[derive(Clone)]
pub struct Services {
    verifier: Arc<dyn Verifier>,
    encryptor: Arc<dyn Encryptor>,
    analyzer: Arc<dyn Analyzer>,
    assessor: Arc<dyn Assessor>,
    clock: Arc<dyn Clock>,
}

impl Services {
    /// Mock providers and the system clock.
    pub fn mock() -> Self {
        Self {
            verifier: Arc::new(MockVerifier),
            encryptor: Arc::new(MockEncryptor),
            analyzer: Arc::new(MockAnalyzer),
            assessor: Arc::new(MockAssessor),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_verifier(mut self, verifier: impl Verifier + 'static) -> Self {
        self.verifier = Arc::new(verifier);
        self
    }

    pub fn with_encryptor(mut self, encryptor: impl Encryptor + 'static) -> Self {
        self.encryptor = Arc::new(encryptor);
        self
    }

    pub fn with_analyzer(mut self, analyzer: impl Analyzer + 'static) -> Self {
        self.analyzer = Arc::new(analyzer);
        self
    }

    pub fn with_assessor(mut self, assessor: impl Assessor + 'static) -> Self {
        self.assessor = Arc::new(assessor);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Run every provider's startup hook, stopping at the first failure.
    pub async fn startup(&self) -> Result<()> {
        start_provider(self.verifier.as_ref()).await?;
        start_provider(self.encryptor.as_ref()).await?;
        start_provider(self.analyzer.as_ref()).await?;
        start_provider(self.assessor.as_ref()).await
    }

    /// Run every provider's shutdown hook.
    pub async fn shutdown(&self) {
        stop_provider(self.verifier.as_ref()).await;
        stop_provider(self.encryptor.as_ref()).await;
        stop_provider(self.analyzer.as_ref()).await;
        stop_provider(self.assessor.as_ref()).await;
    }
}

async fn start_provider<P: Provider + ?Sized>(provider: &P) -> Result<()> {
    info!(provider = provider.name(), "starting provider");
    provider.startup().await
}

async fn stop_provider<P: Provider + ?Sized>(provider: &P) {
    info!(provider = provider.name(), "stopping provider");
    provider.shutdown().await;
}

impl Default for Services {
    fn default() -> Self {
        Self::mock()
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("verifier", &self.verifier.name())
            .field("encryptor", &self.encryptor.name())
            .field("analyzer", &self.analyzer.name())
            .field("assessor", &self.assessor.name())
            .finish()
    }
}

/// `GET /`
pub fn root() -> RootResponse {
    info!(endpoint = "root", "handling root request");
    RootResponse {
        message: format!("Welcome to {}", API_NAME),
        status: "operational".to_string(),
        version: API_VERSION.to_string(),
    }
}

/// `GET /health`
pub fn health(services: &Services) -> HealthResponse {
    info!(endpoint = "health", "handling health check");
    HealthResponse {
        status: "healthy".to_string(),
        timestamp: format_timestamp(services.clock.now()),
    }
}

/// `POST /verify`
pub async fn verify(services: &Services, request: &VerifyRequest) -> Result<VerifyResponse> {
    info!(
        endpoint = "verify",
        keys = request.data.len(),
        data_type = request.data_type().unwrap_or("unknown"),
        "handling verify request"
    );

    let now = services.clock.now();
    let outcome = services
        .verifier
        .verify(&request.data)
        .await?;

    Ok(VerifyResponse {
        verified: outcome.verified,
        message: outcome.message,
        details: Some(VerifyDetails {
            timestamp: format_timestamp(now),
            checks_passed: outcome.checks_passed,
            data_type: outcome.data_type,
        }),
    })
}

/// `POST /encrypt`
pub async fn encrypt(services: &Services, request: &EncryptRequest) -> Result<EncryptResponse> {
    info!(
        endpoint = "encrypt",
        value_len = request.value.chars().count(),
        "handling encrypt request"
    );

    let now = services.clock.now();
    let encrypted_value = services
        .encryptor
        .encrypt(&request.value, now)
        .await?;

    Ok(EncryptResponse {
        encrypted_value,
        timestamp: format_timestamp(now),
    })
}

/// `POST /analyze`
pub async fn analyze(services: &Services, request: &AnalyzeRequest) -> Result<AnalyzeResponse> {
    info!(
        endpoint = "analyze",
        data_len = request.data.chars().count(),
        analysis_mode = %request.analysis_mode,
        "handling analyze request"
    );

    let now = services.clock.now();
    let analysis_result = services
        .analyzer
        .analyze(&request.data, &request.analysis_mode, now)
        .await?;

    Ok(AnalyzeResponse {
        analysis_result,
        timestamp: format_timestamp(now),
    })
}

/// `GET /api/comprehensive/data`
pub fn comprehensive_data(services: &Services) -> ComprehensiveReport {
    info!(endpoint = "comprehensive_data", "handling dashboard request");
    dashboard::comprehensive_report(services.clock.now())
}

/// `GET /api/stability/metrics`
pub fn stability_metrics(services: &Services) -> StabilityReport {
    info!(endpoint = "stability_metrics", "handling dashboard request");
    dashboard::stability_report(services.clock.now())
}

/// `GET /api/analytics/data`
pub fn analytics_data(services: &Services) -> AnalyticsReport {
    info!(endpoint = "analytics_data", "handling dashboard request");
    dashboard::analytics_report(services.clock.now())
}

/// `GET /indicators`
pub fn indicator_catalogue() -> IndicatorsResponse {
    info!(endpoint = "indicators", "listing indicator catalogue");
    IndicatorsResponse {
        indicators: indicators::catalogue(),
    }
}

/// `GET /indicators/categories`
pub fn indicator_categories() -> IndicatorCategoriesResponse {
    info!(endpoint = "indicator_categories", "listing indicator categories");
    IndicatorCategoriesResponse {
        categories: indicators::categories()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

/// `POST /indicators/category`
pub fn indicators_by_category(request: &IndicatorCategoryRequest) -> IndicatorCategoryResponse {
    let found = indicators::category(&request.category);
    info!(
        endpoint = "indicators_by_category",
        known = found.is_some(),
        "looking up indicator category"
    );
    IndicatorCategoryResponse {
        category: request.category.clone(),
        indicators: found.map(|category| category.details()).unwrap_or_default(),
    }
}

/// `POST /analyze_object`
pub async fn analyze_object(
    services: &Services,
    request: &AnalyzeObjectRequest,
) -> Result<ObjectAssessment> {
    info!(
        endpoint = "analyze_object",
        observations = request.observation_data.as_ref().map_or(0, |d| d.len()),
        "handling object analysis"
    );

    let now = services.clock.now();
    let assessment = services
        .assessor
        .assess(&request.object_id, request.observation_data.as_ref())
        .await?;

    Ok(ObjectAssessment {
        object_id: request.object_id.clone(),
        ccdm_assessment: assessment.label,
        confidence_level: assessment.confidence,
        timestamp: format_timestamp(now),
    })
}

/// `POST /classify_behavior`
pub async fn classify_behavior(
    services: &Services,
    request: &ClassifyBehaviorRequest,
) -> Result<BehaviorClassification> {
    info!(
        endpoint = "classify_behavior",
        behavior_keys = request.behavior_data.as_ref().map_or(0, |d| d.len()),
        "handling behaviour classification"
    );

    let class = services
        .assessor
        .classify(&request.object_id, request.behavior_data.as_ref())
        .await?;

    Ok(BehaviorClassification {
        object_id: request.object_id.clone(),
        behavior_class: class.label,
        confidence_level: class.confidence,
        supporting_evidence: Default::default(),
    })
}

/// `POST /bulk_analysis`
///
/// Objects are assessed in request order; the first provider failure fails
/// the whole batch.
pub async fn bulk_analysis(
    services: &Services,
    request: &BulkAnalysisRequest,
) -> Result<BulkAnalysisResponse> {
    info!(
        endpoint = "bulk_analysis",
        objects = request.object_ids.len(),
        "handling bulk analysis"
    );

    let mut results = Vec::with_capacity(request.object_ids.len());
    for object_id in &request.object_ids {
        let assessment = services.assessor.assess(object_id, None).await?;
        results.push(BulkAssessment {
            object_id: object_id.clone(),
            ccdm_assessment: assessment.label,
            confidence_level: assessment.confidence,
        });
    }

    Ok(BulkAnalysisResponse { results })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::Error;
    use crate::providers::Verification;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Map, Value};

    struct RejectingVerifier;

    #[async_trait]
    impl Provider for RejectingVerifier {
        fn name(&self) -> &'static str {
            "rejecting"
        }

        async fn startup(&self) -> Result<()> {
            Err(Error::provider("rejecting", "no credentials"))
        }
    }

    #[async_trait]
    impl Verifier for RejectingVerifier {
        async fn verify(&self, _data: &Map<String, Value>) -> Result<Verification> {
            Err(Error::provider("rejecting", "backend down"))
        }
    }

    fn fixed_services() -> Services {
        Services::mock().with_clock(FixedClock(
            Utc.with_ymd_and_hms(2024, 1, 21, 12, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_root() {
        let response = root();
        assert_eq!(response.message, "Welcome to AstroShield API");
        assert_eq!(response.status, "operational");
        assert_eq!(response.version, "1.0.0");
    }

    #[test]
    fn test_health_uses_clock() {
        let response = health(&fixed_services());
        assert_eq!(response.status, "healthy");
        assert_eq!(response.timestamp, "2024-01-21T12:00:00.000000Z");
    }

    #[tokio::test]
    async fn test_verify_details() {
        let request = VerifyRequest {
            data: json!({ "id": 1 }).as_object().unwrap().clone(),
        };
        let response = verify(&fixed_services(), &request).await.unwrap();
        let details = response.details.unwrap();
        assert!(response.verified);
        assert_eq!(details.data_type, "unknown");
        assert_eq!(details.timestamp, "2024-01-21T12:00:00.000000Z");
    }

    #[tokio::test]
    async fn test_verify_provider_failure_propagates() {
        let services = fixed_services().with_verifier(RejectingVerifier);
        let request = VerifyRequest { data: Map::new() };
        let err = verify(&services, &request).await.unwrap_err();
        assert_eq!(err.failure_class(), "internal");
    }

    #[tokio::test]
    async fn test_startup_stops_at_failing_provider() {
        let services = Services::mock().with_verifier(RejectingVerifier);
        let err = services.startup().await.unwrap_err();
        assert!(err.to_string().contains("no credentials"));
    }

    #[test]
    fn test_services_debug_names_providers() {
        let debug = format!("{:?}", Services::mock());
        assert!(debug.contains("mock-encryptor"));
        assert!(debug.contains("mock-assessor"));
    }

    #[test]
    fn test_dashboards_use_clock() {
        let services = fixed_services();
        assert_eq!(
            stability_metrics(&services).timestamp,
            "2024-01-21T12:00:00.000000Z"
        );
        assert!(comprehensive_data(&services).alerts.is_empty());
        let analytics = analytics_data(&services);
        assert_eq!(
            analytics.trends.daily.last().unwrap().timestamp,
            "2024-01-21T12:00:00.000000Z"
        );
    }

    #[test]
    fn test_indicator_lookup_unknown_category_is_empty() {
        let request = IndicatorCategoryRequest {
            category: "weather_indicators".to_string(),
        };
        let response = indicators_by_category(&request);
        assert_eq!(response.category, "weather_indicators");
        assert!(response.indicators.is_empty());
    }

    #[test]
    fn test_indicator_lookup_known_category() {
        let request = IndicatorCategoryRequest {
            category: "launch_indicators".to_string(),
        };
        let response = indicators_by_category(&request);
        assert_eq!(
            response.indicators.keys().collect::<Vec<_>>(),
            vec!["launch_site", "un_registry"]
        );
        assert_eq!(indicator_catalogue().indicators.len(), 9);
        assert_eq!(indicator_categories().categories[0], "stability_indicators");
    }

    #[tokio::test]
    async fn test_analyze_object_echoes_id() {
        let request = AnalyzeObjectRequest {
            object_id: "2024-001A".to_string(),
            observation_data: None,
        };
        let response = analyze_object(&fixed_services(), &request).await.unwrap();
        assert_eq!(response.object_id, "2024-001A");
        assert_eq!(response.ccdm_assessment, "nominal");
        assert_eq!(response.confidence_level, 0.95);
        assert_eq!(response.timestamp, "2024-01-21T12:00:00.000000Z");
    }

    #[tokio::test]
    async fn test_bulk_analysis_keeps_request_order() {
        let request = BulkAnalysisRequest {
            object_ids: vec!["b".to_string(), "a".to_string(), "b".to_string()],
        };
        let response = bulk_analysis(&fixed_services(), &request).await.unwrap();
        let ids: Vec<&str> = response.results.iter().map(|r| r.object_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "b"]);

        let empty = BulkAnalysisRequest { object_ids: vec![] };
        let response = bulk_analysis(&fixed_services(), &empty).await.unwrap();
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_classify_behavior() {
        let request = ClassifyBehaviorRequest {
            object_id: "2024-001A".to_string(),
            behavior_data: Some(Map::new()),
        };
        let response = classify_behavior(&fixed_services(), &request).await.unwrap();
        assert_eq!(response.behavior_class, "nominal");
        assert!(response.supporting_evidence.is_empty());
    }
}

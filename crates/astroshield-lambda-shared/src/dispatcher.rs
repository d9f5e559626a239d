//! Static route table and the single place replies are finished.
//!
//! The dispatcher resolves `(method, path)` to one endpoint, decodes and
//! validates the body, runs the handler, validates the handler's response,
//! and turns every outcome into a [`Reply`]. CORS headers and the error
//! envelope are applied here and nowhere else.

use http::{header::CONTENT_TYPE, Method, StatusCode};
use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};

use astroshield_lib::schema::{self, Schema};
use astroshield_lib::{
    handlers, AnalyzeObjectRequest, AnalyzeRequest, BulkAnalysisRequest, ClassifyBehaviorRequest,
    EncryptRequest, Error, IndicatorCategoryRequest, Result, Services, VerifyRequest,
};

use crate::cors::CorsPolicy;
use crate::envelope::{from_lib_error, ErrorEnvelope, OPAQUE_INTERNAL_DETAIL};
use crate::event::Headers;
use crate::request_id::RequestId;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Route handler selected by the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Root,
    Health,
    Verify,
    Encrypt,
    Analyze,
    ComprehensiveData,
    StabilityMetrics,
    AnalyticsData,
    Indicators,
    IndicatorCategories,
    IndicatorsByCategory,
    AnalyzeObject,
    ClassifyBehavior,
    BulkAnalysis,
}

impl Endpoint {
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Root => "root",
            Endpoint::Health => "health",
            Endpoint::Verify => "verify",
            Endpoint::Encrypt => "encrypt",
            Endpoint::Analyze => "analyze",
            Endpoint::ComprehensiveData => "comprehensive_data",
            Endpoint::StabilityMetrics => "stability_metrics",
            Endpoint::AnalyticsData => "analytics_data",
            Endpoint::Indicators => "indicators",
            Endpoint::IndicatorCategories => "indicator_categories",
            Endpoint::IndicatorsByCategory => "indicators_by_category",
            Endpoint::AnalyzeObject => "analyze_object",
            Endpoint::ClassifyBehavior => "classify_behavior",
            Endpoint::BulkAnalysis => "bulk_analysis",
        }
    }
}

/// `(method, path, endpoint)` for every registered route.
pub const ROUTES: &[(&str, &str, Endpoint)] = &[
    ("GET", "/", Endpoint::Root),
    ("GET", "/health", Endpoint::Health),
    ("POST", "/verify", Endpoint::Verify),
    ("POST", "/encrypt", Endpoint::Encrypt),
    ("POST", "/analyze", Endpoint::Analyze),
    ("GET", "/api/comprehensive/data", Endpoint::ComprehensiveData),
    ("GET", "/api/stability/metrics", Endpoint::StabilityMetrics),
    ("GET", "/api/analytics/data", Endpoint::AnalyticsData),
    ("GET", "/indicators", Endpoint::Indicators),
    ("GET", "/indicators/categories", Endpoint::IndicatorCategories),
    ("POST", "/indicators/category", Endpoint::IndicatorsByCategory),
    ("POST", "/analyze_object", Endpoint::AnalyzeObject),
    ("POST", "/classify_behavior", Endpoint::ClassifyBehavior),
    ("POST", "/bulk_analysis", Endpoint::BulkAnalysis),
];

/// Outcome of looking a request up in [`ROUTES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Route(Endpoint),
    /// `OPTIONS` on a registered path.
    Preflight,
    NotFound,
}

/// Resolve a routing path (base path and query already removed).
pub fn resolve(method: &Method, path: &str) -> Resolution {
    let mut known_path = false;
    for (route_method, route_path, endpoint) in ROUTES {
        if *route_path != path {
            continue;
        }
        if method.as_str() == *route_method {
            return Resolution::Route(*endpoint);
        }
        known_path = true;
    }

    if known_path && *method == Method::OPTIONS {
        Resolution::Preflight
    } else {
        Resolution::NotFound
    }
}

/// Request as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Routing path.
    pub path: String,
    pub headers: Headers,
    pub body: Option<String>,
    pub request_id: RequestId,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
            body: None,
            request_id: RequestId::generate(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<RequestId>) -> Self {
        self.request_id = request_id.into();
        self
    }
}

/// Finished reply. Built only by [`Dispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: String,
}

/// Routes requests to handlers and finishes every reply.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    services: Services,
    cors: CorsPolicy,
    expose_internal_errors: bool,
}

impl Dispatcher {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            cors: CorsPolicy::permissive(),
            expose_internal_errors: false,
        }
    }

    /// Return raw internal error messages in envelopes.
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Dispatch one request. Never fails; errors become envelope replies.
    pub async fn dispatch(&self, request: Request) -> Reply {
        let span = info_span!(
            "dispatch",
            request_id = %request.request_id,
            method = %request.method,
            path = %request.path,
        );
        self.route(request).instrument(span).await
    }

    async fn route(&self, request: Request) -> Reply {
        let endpoint = match resolve(&request.method, &request.path) {
            Resolution::Route(endpoint) => endpoint,
            Resolution::Preflight => {
                info!("answering preflight");
                return self.finish(StatusCode::OK, None);
            }
            Resolution::NotFound => {
                warn!("no matching route");
                let envelope = ErrorEnvelope::not_found(request.method.as_str(), &request.path)
                    .with_request_id(request.request_id.as_str());
                return self.reject(envelope);
            }
        };

        match self.invoke(endpoint, &request).await {
            Ok(body) => {
                info!(endpoint = endpoint.name(), status = 200, "request completed");
                self.finish(StatusCode::OK, Some(body))
            }
            Err(err) => {
                let envelope = from_lib_error(
                    &err,
                    request.request_id.as_str(),
                    self.expose_internal_errors,
                );
                if matches!(err, Error::Validation(_)) {
                    warn!(
                        endpoint = endpoint.name(),
                        status = envelope.status,
                        error = %err,
                        "request rejected"
                    );
                } else {
                    error!(
                        endpoint = endpoint.name(),
                        status = envelope.status,
                        failure_class = err.failure_class(),
                        error = %err,
                        "request failed"
                    );
                }
                self.reject(envelope)
            }
        }
    }

    async fn invoke(&self, endpoint: Endpoint, request: &Request) -> Result<String> {
        let body = request.body.as_deref();
        match endpoint {
            Endpoint::Root => render(endpoint, &handlers::root()),
            Endpoint::Health => render(endpoint, &handlers::health(&self.services)),
            Endpoint::Verify => {
                let input: VerifyRequest = schema::parse_body(body)?;
                let output = handlers::verify(&self.services, &input).await?;
                render(endpoint, &output)
            }
            Endpoint::Encrypt => {
                let input: EncryptRequest = schema::parse_body(body)?;
                let output = handlers::encrypt(&self.services, &input).await?;
                render(endpoint, &output)
            }
            Endpoint::Analyze => {
                let input: AnalyzeRequest = schema::parse_body(body)?;
                let output = handlers::analyze(&self.services, &input).await?;
                render(endpoint, &output)
            }
            Endpoint::ComprehensiveData => {
                render(endpoint, &handlers::comprehensive_data(&self.services))
            }
            Endpoint::StabilityMetrics => {
                render(endpoint, &handlers::stability_metrics(&self.services))
            }
            Endpoint::AnalyticsData => render(endpoint, &handlers::analytics_data(&self.services)),
            Endpoint::Indicators => render(endpoint, &handlers::indicator_catalogue()),
            Endpoint::IndicatorCategories => render(endpoint, &handlers::indicator_categories()),
            Endpoint::IndicatorsByCategory => {
                let input: IndicatorCategoryRequest = schema::parse_body(body)?;
                render(endpoint, &handlers::indicators_by_category(&input))
            }
            Endpoint::AnalyzeObject => {
                let input: AnalyzeObjectRequest = schema::parse_body(body)?;
                let output = handlers::analyze_object(&self.services, &input).await?;
                render(endpoint, &output)
            }
            Endpoint::ClassifyBehavior => {
                let input: ClassifyBehaviorRequest = schema::parse_body(body)?;
                let output = handlers::classify_behavior(&self.services, &input).await?;
                render(endpoint, &output)
            }
            Endpoint::BulkAnalysis => {
                let input: BulkAnalysisRequest = schema::parse_body(body)?;
                let output = handlers::bulk_analysis(&self.services, &input).await?;
                render(endpoint, &output)
            }
        }
    }

    /// Build a reply with the CORS policy applied. `None` means an empty body.
    pub fn finish(&self, status: StatusCode, body: Option<String>) -> Reply {
        let mut headers = Headers::new();
        self.cors.apply(&mut headers);

        let body = match body {
            Some(body) => {
                headers.insert(CONTENT_TYPE.as_str().to_string(), JSON_CONTENT_TYPE.to_string());
                body
            }
            None => String::new(),
        };

        Reply {
            status,
            headers,
            body,
        }
    }

    /// Build an error reply from an envelope.
    pub fn reject(&self, envelope: ErrorEnvelope) -> Reply {
        let status = envelope.status_code();
        let body = serde_json::to_string(&envelope).unwrap_or_else(|e| {
            error!(error = %e, "failed to serialize error envelope");
            format!(
                r#"{{"error":"Internal Error","detail":"{}","status":500}}"#,
                OPAQUE_INTERNAL_DETAIL
            )
        });
        self.finish(status, Some(body))
    }
}

/// Validate a handler response against its own schema, then serialize it.
fn render<T>(endpoint: Endpoint, record: &T) -> Result<String>
where
    T: Schema + Serialize,
{
    schema::check(record).map_err(|failure| Error::InvalidResponse {
        endpoint: endpoint.name(),
        failure,
    })?;
    Ok(serde_json::to_string(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixed_services, FailingEncryptor};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Services::mock())
    }

    fn json_body(reply: &Reply) -> Value {
        serde_json::from_str(&reply.body).unwrap()
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve(&Method::GET, "/"), Resolution::Route(Endpoint::Root));
        assert_eq!(
            resolve(&Method::POST, "/encrypt"),
            Resolution::Route(Endpoint::Encrypt)
        );
        assert_eq!(resolve(&Method::OPTIONS, "/verify"), Resolution::Preflight);
        assert_eq!(resolve(&Method::OPTIONS, "/nope"), Resolution::NotFound);
        assert_eq!(resolve(&Method::GET, "/encrypt"), Resolution::NotFound);
        assert_eq!(resolve(&Method::GET, "/health/"), Resolution::NotFound);
        assert_eq!(
            resolve(&Method::GET, "/api/analytics/data"),
            Resolution::Route(Endpoint::AnalyticsData)
        );
        assert_eq!(
            resolve(&Method::OPTIONS, "/indicators/category"),
            Resolution::Preflight
        );
    }

    #[test]
    fn test_route_table_has_unique_entries() {
        for (i, (method, path, endpoint)) in ROUTES.iter().enumerate() {
            let duplicates = ROUTES[i + 1..]
                .iter()
                .filter(|(m, p, _)| m == method && p == path)
                .count();
            assert_eq!(duplicates, 0, "{} {} registered twice", method, path);
            assert!(path.starts_with('/'));
            assert!(!endpoint.name().is_empty());
        }
    }

    #[tokio::test]
    async fn test_every_get_route_renders_valid_response() {
        let dispatcher = dispatcher();
        for (method, path, _) in ROUTES.iter().filter(|(m, _, _)| *m == "GET") {
            let request = Request::new(Method::from_bytes(method.as_bytes()).unwrap(), *path);
            let reply = dispatcher.dispatch(request).await;
            assert_eq!(reply.status, StatusCode::OK, "GET {}: {}", path, reply.body);
        }
    }

    #[tokio::test]
    async fn test_indicator_category_lookup() {
        let request = Request::new(Method::POST, "/indicators/category")
            .with_body(r#"{"category":"rf_indicators"}"#);
        let reply = dispatcher().dispatch(request).await;
        let body = json_body(&reply);

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(
            body["indicators"]["rf_detection"]["algorithm"],
            "Convolutional Neural Network"
        );

        let request = Request::new(Method::POST, "/indicators/category").with_body(r#"{}"#);
        let reply = dispatcher().dispatch(request).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&reply)["violations"][0]["field"], "category");
    }

    #[tokio::test]
    async fn test_bulk_analysis_validates_ids() {
        let request =
            Request::new(Method::POST, "/bulk_analysis").with_body(r#"{"object_ids":["a",1]}"#);
        let reply = dispatcher().dispatch(request).await;

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&reply)["violations"][0]["field"], "object_ids[1]");
    }

    #[tokio::test]
    async fn test_root_reply() {
        let reply = dispatcher().dispatch(Request::new(Method::GET, "/")).await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.headers["content-type"], "application/json");
        assert_eq!(json_body(&reply)["message"], "Welcome to AstroShield API");
    }

    #[tokio::test]
    async fn test_preflight_has_empty_body_and_cors() {
        let reply = dispatcher()
            .dispatch(Request::new(Method::OPTIONS, "/analyze"))
            .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.is_empty());
        assert!(!reply.headers.contains_key("content-type"));
        assert_eq!(reply.headers["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let request = Request::new(Method::GET, "/nope").with_request_id("req-404");
        let reply = dispatcher().dispatch(request).await;
        let body = json_body(&reply);

        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["instance"], "req-404");
        assert_eq!(reply.headers["access-control-allow-credentials"], "true");
    }

    #[tokio::test]
    async fn test_validation_envelope() {
        let request = Request::new(Method::POST, "/encrypt").with_body(r#"{"value":""}"#);
        let reply = dispatcher().dispatch(request).await;
        let body = json_body(&reply);

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(body["violations"][0]["field"], "value");
        assert_eq!(body["violations"][0]["rule"], "min length 1");
    }

    #[tokio::test]
    async fn test_missing_body_is_validation_error() {
        let reply = dispatcher()
            .dispatch(Request::new(Method::POST, "/verify"))
            .await;
        let body = json_body(&reply);

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(body["violations"][0]["field"], "body");
        assert_eq!(body["violations"][0]["code"], "required");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_provider_failure_logged_once() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let dispatcher = Dispatcher::new(fixed_services().with_encryptor(FailingEncryptor));
        let request = Request::new(Method::POST, "/encrypt").with_body(r#"{"value":"x"}"#);
        let reply = dispatcher.dispatch(request).await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let error_lines: Vec<&str> = output.lines().filter(|l| l.contains(" ERROR ")).collect();
        assert_eq!(error_lines.len(), 1, "{}", output);
        assert!(error_lines[0].contains("request failed"));
        assert!(error_lines[0].contains("endpoint=\"encrypt\""));
    }

    #[tokio::test]
    async fn test_reject_applies_cors() {
        let reply = dispatcher().reject(ErrorEnvelope::invalid_event("bad"));

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.headers["access-control-allow-methods"], "*");
        assert_eq!(reply.headers["content-type"], "application/json");
    }
}

//! Translation between invocation events and the dispatcher.
//!
//! Event to request, dispatch, reply to event-reply. No state survives an
//! invocation.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use astroshield_lib::{Result, Services};

use crate::config::{AdapterConfig, Lifespan};
use crate::dispatcher::{Dispatcher, Request};
use crate::envelope::ErrorEnvelope;
use crate::event::{InvocationEvent, InvocationReply};
use crate::request_id::RequestId;

/// Bridges platform events and the [`Dispatcher`].
///
/// Cheap to clone; the dispatcher is shared.
#[derive(Debug, Clone)]
pub struct EventAdapter {
    dispatcher: Arc<Dispatcher>,
    config: AdapterConfig,
}

impl EventAdapter {
    pub fn new(services: Services, config: AdapterConfig) -> Self {
        let dispatcher =
            Dispatcher::new(services).expose_internal_errors(config.expose_internal_errors);
        Self {
            dispatcher: Arc::new(dispatcher),
            config,
        }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle a raw platform payload.
    ///
    /// A payload that is not a recognisable event yields a 400 envelope
    /// reply; this never fails.
    pub async fn handle(&self, payload: Value, request_id: &str) -> InvocationReply {
        match InvocationEvent::from_payload(payload) {
            Ok(event) => self.handle_event(event, request_id).await,
            Err(e) => {
                warn!(request_id, error = %e, "rejecting invocation event");
                let envelope =
                    ErrorEnvelope::invalid_event(e.to_string()).with_request_id(request_id);
                self.dispatcher.reject(envelope).into()
            }
        }
    }

    /// Handle an already decoded event.
    pub async fn handle_event(&self, event: InvocationEvent, request_id: &str) -> InvocationReply {
        let request = self.to_request(event, request_id);
        self.dispatcher.dispatch(request).await.into()
    }

    /// Map an event to a dispatcher request, applying base-path stripping.
    pub fn to_request(&self, event: InvocationEvent, request_id: &str) -> Request {
        let path = self.config.route_path(&event.path);
        Request {
            method: event.method,
            path,
            headers: event.headers,
            body: event.body,
            request_id: RequestId::new(request_id),
        }
    }

    /// Run provider startup hooks when lifespan delegation is on.
    pub async fn startup(&self) -> Result<()> {
        if self.config.lifespan == Lifespan::Off {
            return Ok(());
        }
        info!(lifespan = %self.config.lifespan, "running provider startup hooks");
        self.dispatcher.services().startup().await
    }

    /// Run provider shutdown hooks when lifespan delegation is on.
    pub async fn shutdown(&self) {
        if self.config.lifespan == Lifespan::Off {
            return;
        }
        info!(lifespan = %self.config.lifespan, "running provider shutdown hooks");
        self.dispatcher.services().shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astroshield_lib::{MockVerifier, Provider, Verification, Verifier};
    use async_trait::async_trait;
    use http::Method;
    use serde_json::{json, Map};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn adapter(config: AdapterConfig) -> EventAdapter {
        EventAdapter::new(Services::mock(), config)
    }

    #[tokio::test]
    async fn test_handle_plain_event() {
        let reply = adapter(AdapterConfig::default())
            .handle(json!({ "method": "GET", "path": "/health" }), "req-1")
            .await;

        assert_eq!(reply.status_code, 200);
        assert!(!reply.is_base64_encoded);
        assert!(reply.body.contains("healthy"));
    }

    #[tokio::test]
    async fn test_malformed_event_is_400_with_cors() {
        let reply = adapter(AdapterConfig::default())
            .handle(json!([1, 2, 3]), "req-2")
            .await;
        let body: Value = serde_json::from_str(&reply.body).unwrap();

        assert_eq!(reply.status_code, 400);
        assert_eq!(body["error"], "Invalid Event");
        assert_eq!(body["instance"], "req-2");
        assert_eq!(reply.headers["access-control-allow-origin"], "*");
    }

    #[test]
    fn test_to_request_strips_base_path_and_query() {
        let adapter = adapter(AdapterConfig::default().with_base_path("/prod"));
        let event = InvocationEvent::new(Method::GET, "/prod/health?verbose=1")
            .with_header("X-Trace", "t")
            .with_body("ignored");
        let request = adapter.to_request(event, "req-3");

        assert_eq!(request.path, "/health");
        assert_eq!(request.request_id.as_str(), "req-3");
        assert_eq!(request.headers["x-trace"], "t");
        assert_eq!(request.body.as_deref(), Some("ignored"));
    }

    #[derive(Debug, Clone, Default)]
    struct CountingVerifier {
        started: Arc<AtomicUsize>,
        stopped: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Provider for CountingVerifier {
        fn name(&self) -> &'static str {
            "counting-verifier"
        }

        async fn startup(&self) -> Result<()> {
            self.started.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn shutdown(&self) {
            self.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Verifier for CountingVerifier {
        async fn verify(&self, data: &Map<String, Value>) -> Result<Verification> {
            MockVerifier.verify(data).await
        }
    }

    fn counting_adapter(config: AdapterConfig) -> (EventAdapter, CountingVerifier) {
        let verifier = CountingVerifier::default();
        let services = Services::mock().with_verifier(verifier.clone());
        (EventAdapter::new(services, config), verifier)
    }

    #[tokio::test]
    async fn test_lifespan_on_runs_hooks_once() {
        let (adapter, verifier) =
            counting_adapter(AdapterConfig::default().with_lifespan(Lifespan::On));

        adapter.startup().await.unwrap();
        assert_eq!(verifier.started.load(Ordering::SeqCst), 1);
        assert_eq!(verifier.stopped.load(Ordering::SeqCst), 0);

        adapter.shutdown().await;
        assert_eq!(verifier.started.load(Ordering::SeqCst), 1);
        assert_eq!(verifier.stopped.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lifespan_off_skips_hooks() {
        let (adapter, verifier) = counting_adapter(AdapterConfig::default());
        assert_eq!(adapter.config().lifespan, Lifespan::Off);

        assert!(adapter.startup().await.is_ok());
        adapter.shutdown().await;
        assert_eq!(verifier.started.load(Ordering::SeqCst), 0);
        assert_eq!(verifier.stopped.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_expose_flag_reaches_dispatcher() {
        let adapter = adapter(AdapterConfig::default().with_expose_internal_errors(true));
        assert!(adapter.config().expose_internal_errors);
        assert!(format!("{:?}", adapter.dispatcher()).contains("expose_internal_errors: true"));
    }
}

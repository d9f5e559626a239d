//! Lambda entry point for the AstroShield API.
//!
//! Configuration comes from the environment only: `ASTROSHIELD_BASE_PATH`,
//! `ASTROSHIELD_LIFESPAN`, `ASTROSHIELD_EXPOSE_INTERNAL_ERRORS` and `RUST_LOG`.

#![deny(warnings)]

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use astroshield_lambda_shared::{init_tracing, AdapterConfig, EventAdapter, InvocationReply};
use astroshield_lib::{Services, API_VERSION};

/// Entry point used by the Lambda runtime.
pub async fn run() -> Result<(), Error> {
    init_tracing()?;

    let config = AdapterConfig::from_env();
    info!(
        version = API_VERSION,
        base_path = config.base_path.as_deref().unwrap_or("-"),
        lifespan = %config.lifespan,
        "starting AstroShield Lambda"
    );

    let adapter = EventAdapter::new(Services::mock(), config);
    adapter.startup().await.inspect_err(|e| {
        error!(error = %e, "provider startup failed");
    })?;

    let shared = adapter.clone();
    let result = lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let adapter = shared.clone();
        async move { handler(&adapter, event).await }
    }))
    .await;

    adapter.shutdown().await;
    result
}

/// Lambda handler invoked per request.
///
/// Never returns `Err`: malformed events and handler failures become
/// envelope replies so API Gateway always receives a proxy response.
pub async fn handler(
    adapter: &EventAdapter,
    event: LambdaEvent<Value>,
) -> Result<InvocationReply, Error> {
    let request_id = event.context.request_id.clone();
    Ok(adapter.handle(event.payload, &request_id).await)
}

//! Shared infrastructure for the AstroShield Lambda function and HTTP service.
//!
//! - [`Dispatcher`]: static route table, response validation, CORS and error envelopes
//! - [`EventAdapter`]: platform event to request and reply to platform reply
//! - [`AdapterConfig`]: base-path stripping, lifespan delegation, error exposure
//! - [`ErrorEnvelope`]: uniform error body
//! - [`init_tracing`] / [`init_logging`]: tracing subscriber setup
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides event builders, a fixed clock and
//! misbehaving providers. Enable the `test-utils` feature to access it from
//! dependent crates.

#![deny(warnings)]

mod adapter;
mod config;
mod cors;
mod dispatcher;
mod envelope;
mod event;
mod logging;
mod request_id;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapter::EventAdapter;
pub use config::{
    normalize_path, AdapterConfig, Lifespan, ENV_BASE_PATH, ENV_EXPOSE_INTERNAL_ERRORS,
    ENV_LIFESPAN,
};
pub use cors::CorsPolicy;
pub use dispatcher::{resolve, Dispatcher, Endpoint, Reply, Request, Resolution, ROUTES};
pub use envelope::{
    from_lib_error, ErrorEnvelope, ERROR_BAD_REQUEST, ERROR_INTERNAL, ERROR_INVALID_EVENT,
    ERROR_NOT_FOUND, ERROR_VALIDATION, OPAQUE_INTERNAL_DETAIL,
};
pub use event::{EventError, Headers, InvocationEvent, InvocationReply};
pub use logging::{init_logging, init_tracing, LogFormat, LoggingConfig};
pub use request_id::{RequestId, REQUEST_ID_HEADER};

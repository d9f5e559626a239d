//! Local HTTP server for the AstroShield API.
//!
//! Every request goes through the same [`EventAdapter`] the Lambda function
//! uses, so routing, validation, CORS and error envelopes are identical. The
//! router has no routes of its own; a single fallback forwards everything.

#![deny(warnings)]

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::Response,
    Router,
};
use http_body_util::LengthLimitError;
use tower_http::trace::TraceLayer;
use tracing::warn;

use astroshield_lambda_shared::{
    ErrorEnvelope, EventAdapter, Headers, InvocationEvent, InvocationReply, RequestId,
    REQUEST_ID_HEADER,
};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the router around an adapter.
pub fn app(adapter: EventAdapter) -> Router {
    Router::new()
        .fallback(forward)
        .with_state(adapter)
        .layer(TraceLayer::new_for_http())
}

async fn forward(State(adapter): State<EventAdapter>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let headers: Headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let request_id = RequestId::extract_or_generate(&headers);

    let body = match read_body(body).await {
        Ok(body) => body,
        Err(detail) => {
            warn!(request_id = %request_id, detail = %detail, "rejecting request body");
            let envelope = ErrorEnvelope::bad_request(detail).with_request_id(request_id.as_str());
            let reply = adapter.dispatcher().reject(envelope).into();
            return into_response(reply, &request_id);
        }
    };

    let event = InvocationEvent {
        method: parts.method,
        path: parts.uri.path().to_string(),
        headers,
        body,
    };

    let reply = adapter.handle_event(event, request_id.as_str()).await;
    into_response(reply, &request_id)
}

async fn read_body(body: Body) -> Result<Option<String>, String> {
    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| body_error_detail(&e))?;
    if bytes.is_empty() {
        return Ok(None);
    }
    String::from_utf8(bytes.to_vec())
        .map(Some)
        .map_err(|_| "request body is not valid UTF-8".to_string())
}

/// Client-facing detail for a body that could not be read.
fn body_error_detail(err: &axum::Error) -> String {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return format!("request body exceeds {} bytes", MAX_BODY_BYTES);
        }
        source = current.source();
    }
    format!("failed to read request body: {}", err)
}

fn into_response(reply: InvocationReply, request_id: &RequestId) -> Response {
    let mut response = Response::new(Body::from(reply.body));
    *response.status_mut() =
        StatusCode::from_u16(reply.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let headers = response.headers_mut();
    for (name, value) in reply.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            headers.insert(name, value);
        }
    }
    if let Ok(value) = HeaderValue::try_from(request_id.as_str()) {
        headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_oversized_body_detail_names_limit() {
        let body = Body::from("x".repeat(MAX_BODY_BYTES + 1));
        let detail = read_body(body).await.unwrap_err();
        assert_eq!(detail, format!("request body exceeds {} bytes", MAX_BODY_BYTES));
    }

    #[test]
    fn test_stream_failure_is_not_reported_as_oversized() {
        let err = axum::Error::new(std::io::Error::other("connection reset"));
        let detail = body_error_detail(&err);
        assert!(detail.starts_with("failed to read request body"));
        assert!(detail.contains("connection reset"));
        assert!(!detail.contains("exceeds"));
    }

    #[tokio::test]
    async fn test_empty_body_is_none() {
        assert_eq!(read_body(Body::empty()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_utf8_body() {
        let detail = read_body(Body::from(vec![0xff, 0xfe])).await.unwrap_err();
        assert_eq!(detail, "request body is not valid UTF-8");
    }
}

//! Axum middleware applied to the router.
//!
//! [`log_exchange`] wraps every request in a `request` span and emits one log
//! line per exchange. Handlers that deserialise a body attach its obscured
//! rendering as a [`RequestBodyLog`] / [`ResponseBodyLog`] response extension;
//! the middleware picks those up after the handler has run.

use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::state::AppState;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response header carrying the id of the request span.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Obscured request body for the exchange log.
#[derive(Debug, Clone)]
pub struct RequestBodyLog(pub String);

/// Obscured response payload for the exchange log.
#[derive(Debug, Clone)]
pub struct ResponseBodyLog(pub String);

/// Attach obscured bodies to `resp`. `None` leaves the slot empty.
pub fn attach_body_logs(
    resp: &mut Response,
    request_body: Option<String>,
    response_body: Option<String>,
) {
    if let Some(body) = request_body {
        resp.extensions_mut().insert(RequestBodyLog(body));
    }
    if let Some(body) = response_body {
        resp.extensions_mut().insert(ResponseBodyLog(body));
    }
}

/// Log one line per exchange inside a per-request span.
pub async fn log_exchange(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!(
        "request",
        service_name = %state.service_name,
        request_id = %request_id,
    );

    async move {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let started = Instant::now();

        let mut resp = next.run(req).await;

        let request_body = resp
            .extensions()
            .get::<RequestBodyLog>()
            .map(|b| b.0.as_str())
            .unwrap_or_default();
        let response_body = resp
            .extensions()
            .get::<ResponseBodyLog>()
            .map(|b| b.0.as_str())
            .unwrap_or_default();

        info!(
            method = %method,
            path = %path,
            status = resp.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            request_body,
            response_body,
            "request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            resp.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        resp
    }
    .instrument(span)
    .await
}

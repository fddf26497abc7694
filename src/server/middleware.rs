use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use tracing::{debug, error, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 每個 HTTP 請求的 request id，沿用 client 帶來的值或新產生一個
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    fn from_request(req: &Request<Body>) -> (Self, HeaderValue) {
        let inbound = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .filter(|v| !v.is_empty())
            .and_then(|v| Some((v.to_str().ok()?.to_string(), v.clone())));

        match inbound {
            Some((id, value)) => (Self(id), value),
            None => {
                let id = Uuid::new_v4().to_string();
                let value = HeaderValue::from_str(&id).unwrap_or(HeaderValue::from_static("invalid"));
                (Self(id), value)
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub async fn correlation_middleware(mut req: Request<Body>, next: Next) -> Response {
    let (correlation_id, header) = CorrelationId::from_request(&req);
    req.extensions_mut().insert(correlation_id);

    let mut response = next.run(req).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, header);
    response
}

pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let correlation_id = req
        .extensions()
        .get::<CorrelationId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;
    if status.is_server_error() {
        error!(%correlation_id, %method, %path, status = status.as_u16(), duration_ms, "request failed");
    } else if status.is_client_error() {
        warn!(%correlation_id, %method, %path, status = status.as_u16(), duration_ms, "request rejected");
    } else {
        debug!(%correlation_id, %method, %path, status = status.as_u16(), duration_ms, "request");
    }

    response
}

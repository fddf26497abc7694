use super::mcp::handle_payload;
use super::middleware::CorrelationId;
use super::state::{AppState, SessionGuard};
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

pub const SSE_MESSAGE_PATH: &str = "/sse/message";
const SESSION_BUFFER: usize = 32;

fn request_id(correlation: Option<Extension<CorrelationId>>) -> String {
    correlation
        .map(|Extension(id)| id.as_str().to_string())
        .unwrap_or_default()
}

/// 直接回應的 transport：`POST /mcp`
pub async fn handle_mcp(
    State(state): State<Arc<AppState>>,
    correlation: Option<Extension<CorrelationId>>,
    body: String,
) -> Response {
    let request_id = request_id(correlation);
    match handle_payload(&state, &body, &request_id).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// 串流 transport：`GET /sse` 開啟事件串流，第一個事件告知 client 送訊息的位置
pub async fn handle_sse(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::channel::<serde_json::Value>(SESSION_BUFFER);
    state.sessions.insert(session_id.clone(), tx).await;
    debug!("SSE session opened: {}", session_id);

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("{}?sessionId={}", SSE_MESSAGE_PATH, session_id));
    let guard = SessionGuard::new(session_id, state.sessions.clone());

    let messages = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        match rx.recv().await {
            Some(message) => {
                let event = Event::default().event("message").data(message.to_string());
                Some((Ok::<_, Infallible>(event), (rx, guard)))
            }
            None => None,
        }
    });

    let events = stream::once(async move { Ok::<_, Infallible>(endpoint) }).chain(messages);
    Sse::new(events).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// `POST /sse/message?sessionId=...`：回應經由該 session 的事件串流送出
pub async fn handle_sse_message(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
    correlation: Option<Extension<CorrelationId>>,
    body: String,
) -> Response {
    let Some(session_id) = query.session_id else {
        debug!("SSE message without sessionId");
        return (StatusCode::NOT_FOUND, "Session not found").into_response();
    };
    let Some(sender) = state.sessions.get(&session_id).await else {
        debug!("unknown SSE session: {}", session_id);
        return (StatusCode::NOT_FOUND, "Session not found").into_response();
    };

    let request_id = request_id(correlation);
    let state = state.clone();
    tokio::spawn(async move {
        if let Some(response) = handle_payload(&state, &body, &request_id).await {
            if sender.send(response).await.is_err() {
                warn!("SSE session {} closed before the response was delivered", session_id);
            }
        }
    });

    (StatusCode::ACCEPTED, "Accepted").into_response()
}

pub async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
    }))
}

pub async fn handle_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

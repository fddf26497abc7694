use super::state::AppState;
use super::types::{json_err, json_ok, JsonRpcRequest, RpcErrorCode, ToolCallParams, ToolCallResult};
use serde_json::{json, Value};
use tracing::{debug, info, Instrument};

pub const SERVER_NAME: &str = "secure-privacy-mcp";
pub const SERVER_VERSION: &str = "1.1.0";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

pub const INSTALL_TOOL_NAME: &str = "install_secure_privacy_banner";
pub const INSTALL_TOOL_DESCRIPTION: &str = "Fully install Secure Privacy cookie banner on the user's website in one step. Use this when user asks to add cookie banner or implement GDPR compliance.";

/// 處理一個 HTTP body（單筆或 batch）；全部都是 notification 時回傳 `None`。
/// `request_id` 記在每筆 rpc span 上，對應 HTTP 層的 `x-request-id`
pub async fn handle_payload(state: &AppState, body: &str, request_id: &str) -> Option<Value> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        debug!(body_len = body.len(), "rpc parse error");
        return Some(json_err(Value::Null, RpcErrorCode::ParseError, "parse error"));
    };

    match value {
        Value::Array(batch) => {
            if batch.is_empty() {
                return Some(json_err(Value::Null, RpcErrorCode::InvalidRequest, "empty batch"));
            }
            debug!(batch_size = batch.len(), "rpc batch request");
            let mut out = Vec::with_capacity(batch.len());
            for item in batch {
                if let Some(response) = handle_value(state, item, request_id).await {
                    out.push(response);
                }
            }
            if out.is_empty() {
                None
            } else {
                Some(Value::Array(out))
            }
        }
        other => handle_value(state, other, request_id).await,
    }
}

async fn handle_value(state: &AppState, value: Value, request_id: &str) -> Option<Value> {
    match serde_json::from_value::<JsonRpcRequest>(value) {
        Ok(req) => handle_single(state, req, request_id).await,
        Err(err) => Some(json_err(Value::Null, RpcErrorCode::InvalidRequest, err.to_string())),
    }
}

async fn handle_single(state: &AppState, req: JsonRpcRequest, request_id: &str) -> Option<Value> {
    let span = tracing::info_span!(
        "rpc_request",
        request_id = %request_id,
        method = %req.method,
        has_id = req.id.is_some()
    );
    dispatch(state, req).instrument(span).await
}

async fn dispatch(state: &AppState, req: JsonRpcRequest) -> Option<Value> {
    let Some(id) = req.id else {
        debug!(method = %req.method, "rpc notification");
        return None;
    };

    if let Some(version) = req.jsonrpc.as_deref() {
        if version != "2.0" {
            debug!(method = %req.method, "rpc invalid jsonrpc version");
            return Some(json_err(id, RpcErrorCode::InvalidRequest, "jsonrpc must be '2.0'"));
        }
    }

    let response = match req.method.as_str() {
        "initialize" => json_ok(id, initialize_result(req.params.as_ref())),
        "ping" => json_ok(id, json!({})),
        "tools/list" => json_ok(id, json!({ "tools": [install_tool_definition()] })),
        "tools/call" => handle_tool_call(state, id, req.params).await,
        _ => {
            debug!(method = %req.method, "rpc method not found");
            json_err(id, RpcErrorCode::MethodNotFound, "method not found")
        }
    };
    Some(response)
}

fn initialize_result(params: Option<&Value>) -> Value {
    let protocol_version = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    json!({
        "protocolVersion": protocol_version,
        "capabilities": { "tools": {} },
        "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
    })
}

pub fn install_tool_definition() -> Value {
    json!({
        "name": INSTALL_TOOL_NAME,
        "description": INSTALL_TOOL_DESCRIPTION,
        "inputSchema": { "type": "object", "properties": {} },
    })
}

async fn handle_tool_call(state: &AppState, id: Value, params: Option<Value>) -> Value {
    let params = match params.map(serde_json::from_value::<ToolCallParams>) {
        Some(Ok(params)) => params,
        Some(Err(err)) => return json_err(id, RpcErrorCode::InvalidParams, err.to_string()),
        None => return json_err(id, RpcErrorCode::InvalidParams, "missing params"),
    };

    if params.name != INSTALL_TOOL_NAME {
        return json_err(id, RpcErrorCode::InvalidParams, format!("Unknown tool: {}", params.name));
    }

    info!("🔧 Tool call: {}", params.name);
    let outcome = state.installer.run_tool().await;
    json_ok(id, ToolCallResult::text(outcome.text, outcome.is_error))
}

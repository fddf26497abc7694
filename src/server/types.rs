use serde::{Deserialize, Serialize};

#[repr(i64)]
#[derive(Clone, Copy, Debug)]
pub enum RpcErrorCode {
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: Option<String>,
    /// 沒有 id 欄位的訊息是 notification，不需回應；`"id": null` 仍要回應
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<serde_json::Value>,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

/// 欄位存在時一律是 `Some`，包含 `null`
fn present_id<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse<T> {
    pub jsonrpc: &'static str,
    pub id: serde_json::Value,
    pub result: T,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: &'static str,
    pub id: serde_json::Value,
    pub error: JsonRpcErrorBody,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcErrorBody {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<TextContent>,
    pub is_error: bool,
}

impl ToolCallResult {
    pub fn text(text: String, is_error: bool) -> Self {
        Self {
            content: vec![TextContent { kind: "text", text }],
            is_error,
        }
    }
}

pub fn json_ok<T: Serialize>(id: serde_json::Value, result: T) -> serde_json::Value {
    serde_json::to_value(JsonRpcResponse { jsonrpc: "2.0", id, result }).unwrap_or(serde_json::Value::Null)
}

pub fn json_err(id: serde_json::Value, code: RpcErrorCode, message: impl Into<String>) -> serde_json::Value {
    serde_json::to_value(JsonRpcError {
        jsonrpc: "2.0",
        id,
        error: JsonRpcErrorBody {
            code: code as i64,
            message: message.into(),
        },
    })
    .unwrap_or(serde_json::Value::Null)
}

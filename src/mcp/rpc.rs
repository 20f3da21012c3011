//! JSON-RPC protocol representations and formatting utilities
//!
//! Decodes inbound request frames and renders `ProtocolError`s and results as
//! JSON-RPC 2.0 response payloads.

use rust_mcp_sdk::schema::{
    JsonrpcErrorResponse, JsonrpcResultResponse, RequestId, Result as McpResult, RpcError,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::errors::ProtocolError;

pub const JSONRPC_VERSION: &str = "2.0";

/// Id echoed when a frame could not be decoded far enough to read its own.
pub const UNKNOWN_REQUEST_ID: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

fn default_version() -> String {
    JSONRPC_VERSION.to_string()
}

/// Decodes one frame. Malformed JSON and shape violations are both parse errors.
pub fn decode_request(text: &str) -> Result<JsonRpcRequest, ProtocolError> {
    let request: JsonRpcRequest =
        serde_json::from_str(text).map_err(|_| ProtocolError::Parse)?;

    if request.jsonrpc != JSONRPC_VERSION {
        return Err(ProtocolError::Parse);
    }

    Ok(request)
}

pub fn is_json_rpc_error(value: &Value) -> bool {
    value.get("error").is_some()
}

pub fn json_rpc_error(id: &str, err: &ProtocolError) -> Value {
    let response = JsonrpcErrorResponse::new(
        RpcError {
            code: i64::from(err.code()),
            data: None,
            message: err.to_string(),
        },
        Some(RequestId::String(id.to_string())),
    );

    serde_json::to_value(response).unwrap_or_else(|_| {
        json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": id,
            "error": {"code": err.code(), "message": err.to_string()}
        })
    })
}

pub fn json_rpc_result(id: &str, result: Map<String, Value>) -> Value {
    let response = JsonrpcResultResponse::new(
        RequestId::String(id.to_string()),
        McpResult {
            meta: None,
            extra: Some(result.clone()),
        },
    );

    serde_json::to_value(response).unwrap_or_else(|_| {
        json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": id,
            "result": result
        })
    })
}

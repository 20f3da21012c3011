//! The central Model Context Protocol engine
//!
//! Routes decoded JSON-RPC requests to `initialize`, `tools/list` and
//! `tools/call`, runs tool bindings on their own task, and turns every outcome
//! into exactly one response payload.

use std::sync::Arc;

use rust_mcp_sdk::schema::{
    Implementation, InitializeResult, ProtocolVersion, ServerCapabilities,
    ServerCapabilitiesTools,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::domain::utils::render_text;
use crate::errors::{ProtocolError, ToolError};
use crate::mcp::rpc::{
    decode_request, is_json_rpc_error, json_rpc_error, json_rpc_result, JsonRpcRequest,
    UNKNOWN_REQUEST_ID,
};
use crate::AppState;

pub const SUPPORTED_PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Serialize)]
struct TextContent {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

#[derive(Debug, Serialize)]
struct ContentEnvelope {
    content: Vec<TextContent>,
}

/// Handles one inbound text frame and returns the response to send back.
pub async fn handle_text_message(state: &AppState, text: &str) -> Value {
    match decode_request(text) {
        Ok(request) => handle_json_rpc_request(state, request).await,
        Err(err) => {
            warn!(error = %err, "rejected undecodable mcp frame");
            json_rpc_error(UNKNOWN_REQUEST_ID, &err)
        }
    }
}

pub async fn handle_json_rpc_request(state: &AppState, request: JsonRpcRequest) -> Value {
    let audit_params = redact_audit_params(&request.params);

    let response = match dispatch(state, &request.method, request.params).await {
        Ok(result) => json_rpc_result(&request.id, result),
        Err(err) => json_rpc_error(&request.id, &err),
    };

    info!(
        method = %request.method,
        params = %audit_params,
        outcome = if is_json_rpc_error(&response) { "failure" } else { "success" },
        "mcp action audited"
    );

    response
}

async fn dispatch(
    state: &AppState,
    method: &str,
    params: Map<String, Value>,
) -> Result<Map<String, Value>, ProtocolError> {
    match method {
        "initialize" => initialize_result(),
        "tools/list" => {
            let mut result = Map::new();
            result.insert("tools".to_string(), to_json(state.tools.list())?);
            Ok(result)
        }
        "tools/call" => {
            let (name, arguments) = tool_call_params(params)?;
            let value = execute_tool(state, &name, arguments).await?;
            content_envelope(&value)
        }
        other => Err(ProtocolError::MethodNotFound(other.to_string())),
    }
}

fn initialize_result() -> Result<Map<String, Value>, ProtocolError> {
    let initialize_result = InitializeResult {
        server_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: None,
            description: None,
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools {
                list_changed: Some(false),
            }),
            resources: None,
            prompts: None,
            ..Default::default()
        },
        protocol_version: ProtocolVersion::V2024_11_05.into(),
        instructions: None,
        meta: None,
    };

    match to_json(initialize_result)? {
        Value::Object(result) => Ok(result),
        _ => Err(ProtocolError::Internal(
            "initialize result is not an object".to_string(),
        )),
    }
}

fn tool_call_params(
    mut params: Map<String, Value>,
) -> Result<(String, Map<String, Value>), ProtocolError> {
    let name = match params.remove("name") {
        Some(Value::String(name)) => name,
        _ => return Err(ProtocolError::MissingToolName),
    };

    let arguments = match params.remove("arguments") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(arguments)) => arguments,
        Some(_) => {
            return Err(ToolError::invalid_arguments(&name, "arguments must be an object").into())
        }
    };

    Ok((name, arguments))
}

/// Wraps a tool result in the text content envelope. The text rendering is
/// lossy: structured results arrive as JSON text.
pub fn content_envelope(value: &Value) -> Result<Map<String, Value>, ProtocolError> {
    let envelope = ContentEnvelope {
        content: vec![TextContent {
            kind: "text",
            text: render_text(value),
        }],
    };

    match to_json(envelope)? {
        Value::Object(result) => Ok(result),
        _ => Err(ProtocolError::Internal(
            "content envelope is not an object".to_string(),
        )),
    }
}

/// Runs one tool on its own task so a panicking binding cannot take the
/// connection down, applying the configured timeout if any.
pub async fn execute_tool(
    state: &AppState,
    name: &str,
    arguments: Map<String, Value>,
) -> Result<Value, ProtocolError> {
    if !state.tools.exists(name) {
        return Err(ProtocolError::ToolNotFound(name.to_string()));
    }

    let tools = Arc::clone(&state.tools);
    let tool_name = name.to_string();
    let mut task = tokio::spawn(async move { tools.execute(&tool_name, arguments).await });

    let joined = match state.tool_timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                task.abort();
                return Err(ToolError::TimedOut {
                    tool: name.to_string(),
                    seconds: limit.as_secs(),
                }
                .into());
            }
        },
        None => task.await,
    };

    match joined {
        Ok(Ok(value)) => {
            debug!(tool = %name, "tool call succeeded");
            Ok(value)
        }
        Ok(Err(err)) => {
            warn!(tool = %name, error = %err, "tool call failed");
            Err(err.into())
        }
        Err(err) => Err(join_failure(name, err)),
    }
}

fn join_failure(name: &str, err: JoinError) -> ProtocolError {
    if !err.is_panic() {
        return ProtocolError::Internal(format!("tool '{name}' was cancelled"));
    }

    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());

    warn!(tool = %name, panic = %message, "tool call panicked");
    ProtocolError::Internal(format!("tool '{name}' panicked: {message}"))
}

fn to_json<T: Serialize>(value: T) -> Result<Value, ProtocolError> {
    serde_json::to_value(value).map_err(|err| ProtocolError::Internal(err.to_string()))
}

pub fn redact_audit_params(params: &Map<String, Value>) -> Value {
    redact_audit_value(&Value::Object(params.clone()))
}

pub fn redact_audit_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String("[REDACTED]".to_string()))
                    } else {
                        (key.clone(), redact_audit_value(item))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_audit_value).collect()),
        _ => value.clone(),
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase();
    matches!(
        normalized.as_str(),
        "authorization"
            | "proxy-authorization"
            | "cookie"
            | "bearer"
            | "api_key"
            | "apikey"
            | "x-api-key"
    ) || normalized.contains("token")
        || normalized.contains("secret")
        || normalized.contains("password")
        || normalized.contains("credential")
}

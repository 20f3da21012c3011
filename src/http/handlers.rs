//! Axum HTTP handlers for the web server
//!
//! Provides the MCP WebSocket and JSON-RPC endpoints, the stateless tool call
//! endpoint, and metadata endpoints.

use axum::{
    body::Bytes,
    extract::{ws::WebSocketUpgrade, State},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::schema::ToolDescriptor;
use crate::errors::{AppError, ProtocolError};
use crate::mcp::{
    rpc::{json_rpc_error, UNKNOWN_REQUEST_ID},
    server::{execute_tool, handle_text_message},
    session::run_session,
};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub active_connections: usize,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub message: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub mcp_endpoint: &'static str,
    pub tools_endpoint: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ConnectionSummary {
    pub id: String,
    pub connected_at: String,
}

#[derive(Debug, Serialize)]
pub struct ConnectionsResponse {
    pub count: usize,
    pub connections: Vec<ConnectionSummary>,
}

#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Deserialize)]
pub struct ToolCallBody {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        active_connections: state.connections.len(),
    })
}

/// Open WebSocket sessions, oldest first.
pub async fn connections(State(state): State<AppState>) -> Json<ConnectionsResponse> {
    let connections = state
        .connections
        .snapshot()
        .into_iter()
        .map(|info| ConnectionSummary {
            id: info.id.to_string(),
            connected_at: info.connected_at.to_rfc3339(),
        })
        .collect::<Vec<_>>();

    Json(ConnectionsResponse {
        count: connections.len(),
        connections,
    })
}

pub async fn discovery() -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        message: "MCP server is running",
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        mcp_endpoint: "/mcp",
        tools_endpoint: "/tools",
    })
}

pub async fn list_tools(State(state): State<AppState>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: state.tools.list(),
    })
}

/// One tool execution without the JSON-RPC envelope. The result is returned
/// as the tool produced it, not stringified.
pub async fn call_tool(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, AppError> {
    let call: ToolCallBody = serde_json::from_slice(&body).map_err(|_| {
        AppError::bad_request(
            "invalid_tool_call",
            "body must be a JSON object with a string name and optional arguments object",
        )
    })?;

    let arguments = call.arguments.unwrap_or_default();
    match execute_tool(&state, &call.name, arguments).await {
        Ok(result) => Ok(Json(json!({ "result": result }))),
        Err(err) => Ok(Json(json!({ "error": tool_call_error_message(err) }))),
    }
}

fn tool_call_error_message(err: ProtocolError) -> String {
    match err {
        ProtocolError::Internal(message) => message,
        other => other.to_string(),
    }
}

pub async fn mcp_endpoint(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    match std::str::from_utf8(&body) {
        Ok(text) => Json(handle_text_message(&state, text).await),
        Err(_) => Json(json_rpc_error(UNKNOWN_REQUEST_ID, &ProtocolError::Parse)),
    }
}

pub async fn mcp_websocket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, state))
}

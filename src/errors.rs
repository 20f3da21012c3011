use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest {
        code: &'static str,
        message: &'static str,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: &'static str) -> Self {
        Self::BadRequest { code, message }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, code, message.to_string())
            }
        };

        (
            status,
            Json(ErrorResponse {
                code: code.to_string(),
                message,
                details: json!({}),
            }),
        )
            .into_response()
    }
}

/// Failure raised by a tool binding. Apart from `UnknownTool`, every variant
/// surfaces to JSON-RPC callers as `-32603` with the display text preserved.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ToolError {
    #[error("Tool '{0}' not found")]
    UnknownTool(String),
    #[error("invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },
    #[error("{0}")]
    Domain(String),
    #[error("{0}")]
    Io(String),
    #[error("Error making request: {0}")]
    Transport(String),
    #[error("tool '{tool}' timed out after {seconds}s")]
    TimedOut { tool: String, seconds: u64 },
}

impl ToolError {
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }

    pub fn invalid_arguments(tool: &str, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            message: message.into(),
        }
    }
}

/// Protocol-level failure of a single JSON-RPC message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Parse error")]
    Parse,
    #[error("Method '{0}' not found")]
    MethodNotFound(String),
    #[error("Tool '{0}' not found")]
    ToolNotFound(String),
    #[error("Tool name is required")]
    MissingToolName,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProtocolError {
    pub fn code(&self) -> i32 {
        match self {
            Self::Parse => PARSE_ERROR,
            Self::MethodNotFound(_) | Self::ToolNotFound(_) | Self::MissingToolName => {
                METHOD_NOT_FOUND
            }
            Self::Internal(_) => INTERNAL_ERROR,
        }
    }
}

impl From<ToolError> for ProtocolError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::UnknownTool(name) => Self::ToolNotFound(name),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_codes_follow_json_rpc_reservations() {
        assert_eq!(ProtocolError::Parse.code(), -32700);
        assert_eq!(ProtocolError::MethodNotFound("x".into()).code(), -32601);
        assert_eq!(ProtocolError::ToolNotFound("x".into()).code(), -32601);
        assert_eq!(ProtocolError::MissingToolName.code(), -32601);
        assert_eq!(ProtocolError::Internal("x".into()).code(), -32603);
    }

    #[test]
    fn tool_errors_keep_their_message_as_internal_errors() {
        let err = ProtocolError::from(ToolError::domain("Division by zero is not allowed"));
        assert_eq!(err.code(), INTERNAL_ERROR);
        assert_eq!(
            err.to_string(),
            "Internal error: Division by zero is not allowed"
        );
    }

    #[test]
    fn unknown_tool_maps_to_not_found() {
        let err = ProtocolError::from(ToolError::UnknownTool("nope".into()));
        assert_eq!(err, ProtocolError::ToolNotFound("nope".into()));
        assert_eq!(err.to_string(), "Tool 'nope' not found");
    }
}

use std::sync::Arc;

use chrono::Local;
use serde::Deserialize;
use serde_json::Value;

use super::typed;
use crate::domain::{
    registry::ToolHandler,
    schema::{SchemaObject, ToolDescriptor},
};
use crate::errors::ToolError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TextArgs {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NoArgs {}

pub(crate) fn text_schema(description: &str) -> SchemaObject {
    SchemaObject::object()
        .property("text", SchemaObject::string(description))
        .required(&["text"])
}

pub fn tools() -> Vec<Arc<dyn ToolHandler>> {
    vec![
        typed(
            ToolDescriptor::new(
                "echo",
                "Echo back the input text",
                text_schema("Text to echo back"),
            ),
            echo,
        ),
        typed(
            ToolDescriptor::new("get_time", "Get current server time", SchemaObject::object()),
            get_time,
        ),
    ]
}

async fn echo(args: TextArgs) -> Result<Value, ToolError> {
    Ok(Value::String(args.text))
}

async fn get_time(_: NoArgs) -> Result<Value, ToolError> {
    Ok(Value::String(local_timestamp()))
}

/// Local wall-clock time, ISO-8601 without an offset.
pub fn local_timestamp() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

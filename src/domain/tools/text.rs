use std::sync::Arc;

use serde_json::Value;

use super::{
    basic::{text_schema, TextArgs},
    typed,
};
use crate::domain::{registry::ToolHandler, schema::ToolDescriptor};
use crate::errors::ToolError;

pub fn tools() -> Vec<Arc<dyn ToolHandler>> {
    vec![
        typed(
            ToolDescriptor::new(
                "uppercase",
                "Convert text to uppercase",
                text_schema("Text to convert to uppercase"),
            ),
            uppercase,
        ),
        typed(
            ToolDescriptor::new(
                "lowercase",
                "Convert text to lowercase",
                text_schema("Text to convert to lowercase"),
            ),
            lowercase,
        ),
        typed(
            ToolDescriptor::new(
                "reverse_string",
                "Reverse a string",
                text_schema("Text to reverse"),
            ),
            reverse_string,
        ),
        typed(
            ToolDescriptor::new(
                "string_length",
                "Get the length of a string",
                text_schema("Text to measure"),
            ),
            string_length,
        ),
    ]
}

async fn uppercase(args: TextArgs) -> Result<Value, ToolError> {
    Ok(Value::String(args.text.to_uppercase()))
}

async fn lowercase(args: TextArgs) -> Result<Value, ToolError> {
    Ok(Value::String(args.text.to_lowercase()))
}

async fn reverse_string(args: TextArgs) -> Result<Value, ToolError> {
    Ok(Value::String(args.text.chars().rev().collect()))
}

async fn string_length(args: TextArgs) -> Result<Value, ToolError> {
    Ok(Value::from(args.text.chars().count()))
}

//! Filesystem tools. Paths are used as given; the server applies no sandbox.

use std::{io::ErrorKind, sync::Arc};

use serde::Deserialize;
use serde_json::{json, Value};

use super::typed;
use crate::domain::{
    registry::ToolHandler,
    schema::{SchemaObject, ToolDescriptor},
};
use crate::errors::ToolError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReadFileArgs {
    pub filepath: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WriteFileArgs {
    pub filepath: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ListDirectoryArgs {
    pub path: String,
}

impl Default for ListDirectoryArgs {
    fn default() -> Self {
        Self {
            path: ".".to_string(),
        }
    }
}

pub fn tools() -> Vec<Arc<dyn ToolHandler>> {
    vec![
        typed(
            ToolDescriptor::new(
                "read_file",
                "Read contents of a file",
                SchemaObject::object()
                    .property("filepath", SchemaObject::string("Path to the file to read"))
                    .required(&["filepath"]),
            ),
            read_file,
        ),
        typed(
            ToolDescriptor::new(
                "write_file",
                "Write content to a file",
                SchemaObject::object()
                    .property(
                        "filepath",
                        SchemaObject::string("Path to the file to write"),
                    )
                    .property(
                        "content",
                        SchemaObject::string("Content to write to the file"),
                    )
                    .required(&["filepath", "content"]),
            ),
            write_file,
        ),
        typed(
            ToolDescriptor::new(
                "list_directory",
                "List files and directories in a path",
                SchemaObject::object()
                    .property("path", SchemaObject::string("Directory path to list"))
                    .required(&["path"]),
            ),
            list_directory,
        ),
    ]
}

async fn read_file(args: ReadFileArgs) -> Result<Value, ToolError> {
    match tokio::fs::read_to_string(&args.filepath).await {
        Ok(contents) => Ok(Value::String(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(ToolError::Io(format!(
            "File not found: {}",
            args.filepath
        ))),
        Err(err) => Err(ToolError::Io(format!("Error reading file: {err}"))),
    }
}

async fn write_file(args: WriteFileArgs) -> Result<Value, ToolError> {
    tokio::fs::write(&args.filepath, args.content.as_bytes())
        .await
        .map_err(|err| ToolError::Io(format!("Error writing file: {err}")))?;

    Ok(Value::String(format!(
        "Successfully wrote {} characters to {}",
        args.content.chars().count(),
        args.filepath
    )))
}

async fn list_directory(args: ListDirectoryArgs) -> Result<Value, ToolError> {
    let mut entries = match tokio::fs::read_dir(&args.path).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ToolError::Io(format!(
                "Directory not found: {}",
                args.path
            )))
        }
        Err(err) => return Err(ToolError::Io(format!("Error listing directory: {err}"))),
    };

    let mut items = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|err| ToolError::Io(format!("Error listing directory: {err}")))?
    {
        items.push(entry.file_name().to_string_lossy().into_owned());
    }
    items.sort();

    Ok(json!({
        "path": args.path,
        "count": items.len(),
        "items": items,
    }))
}

//! Declarative tool descriptors advertised through `tools/list`
//!
//! Schemas are documentation for clients; argument decoding happens in each
//! tool's typed argument struct.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    String,
    Number,
    Integer,
    Boolean,
    Array,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaObject {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaObject>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl SchemaObject {
    fn of(kind: SchemaType, description: Option<&str>) -> Self {
        Self {
            kind,
            description: description.map(str::to_string),
            properties: None,
            required: Vec::new(),
            default: None,
        }
    }

    /// Object schema with an empty property map.
    pub fn object() -> Self {
        Self {
            properties: Some(BTreeMap::new()),
            ..Self::of(SchemaType::Object, None)
        }
    }

    pub fn string(description: &str) -> Self {
        Self::of(SchemaType::String, Some(description))
    }

    pub fn number(description: &str) -> Self {
        Self::of(SchemaType::Number, Some(description))
    }

    pub fn map(description: &str) -> Self {
        Self::of(SchemaType::Object, Some(description))
    }

    pub fn property(mut self, name: &str, schema: SchemaObject) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), schema);
        self
    }

    pub fn required(mut self, names: &[&str]) -> Self {
        for name in names {
            if !self.required.iter().any(|existing| existing == name) {
                self.required.push((*name).to_string());
            }
        }
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: SchemaObject,
}

impl ToolDescriptor {
    pub fn new(name: &str, description: &str, input_schema: SchemaObject) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

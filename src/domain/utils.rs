//! Argument decoding and value shaping shared by the tool bindings

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{Map, Number, Value};

use crate::errors::ToolError;

/// A JSON number that remembers whether it arrived as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl Default for Numeric {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl Numeric {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Float(value) => value,
        }
    }

    /// Truncates toward zero, saturating at the i64 bounds.
    pub fn truncate(self) -> i64 {
        match self {
            Self::Int(value) => value,
            Self::Float(value) => value.trunc() as i64,
        }
    }

    pub fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }

    pub fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_add(b)
                .map_or_else(|| Self::Float(a as f64 + b as f64), Self::Int),
            _ => Self::Float(self.as_f64() + rhs.as_f64()),
        }
    }

    pub fn sub(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_sub(b)
                .map_or_else(|| Self::Float(a as f64 - b as f64), Self::Int),
            _ => Self::Float(self.as_f64() - rhs.as_f64()),
        }
    }

    pub fn mul(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_mul(b)
                .map_or_else(|| Self::Float(a as f64 * b as f64), Self::Int),
            _ => Self::Float(self.as_f64() * rhs.as_f64()),
        }
    }

    pub fn pow(self, exponent: Self) -> Self {
        if let (Self::Int(base), Self::Int(exp)) = (self, exponent) {
            if let Some(value) = u32::try_from(exp)
                .ok()
                .and_then(|exp| base.checked_pow(exp))
            {
                return Self::Int(value);
            }
        }

        Self::Float(self.as_f64().powf(exponent.as_f64()))
    }

    pub fn into_value(self) -> Result<Value, ToolError> {
        match self {
            Self::Int(value) => Ok(Value::from(value)),
            Self::Float(value) => float_value(value),
        }
    }
}

pub fn float_value(value: f64) -> Result<Value, ToolError> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| ToolError::domain("Result is not a finite number"))
}

/// Decodes a raw argument mapping into a tool's typed argument struct.
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Map<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args))
        .map_err(|err| ToolError::invalid_arguments(tool, err.to_string()))
}

/// Text placed in the `tools/call` content envelope. Strings pass through
/// verbatim; anything else is rendered as compact JSON, so structure is lost.
pub fn render_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::typed;
use crate::domain::{
    registry::ToolHandler,
    schema::{SchemaObject, ToolDescriptor},
    utils::parse_args,
};
use crate::errors::ToolError;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^https?://",
        r"(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?",
        r"|localhost",
        r"|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})",
        r"(?::\d+)?",
        r"(?:/?|[/?]\S+)$",
    ))
    .expect("url pattern is valid")
});

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ValidateUrlArgs {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MakeRequestArgs {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
}

impl Default for MakeRequestArgs {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: "GET".to_string(),
            headers: BTreeMap::new(),
        }
    }
}

pub fn tools(http_client: reqwest::Client) -> Vec<Arc<dyn ToolHandler>> {
    vec![
        typed(
            ToolDescriptor::new(
                "validate_url",
                "Validate if a string is a valid URL",
                SchemaObject::object()
                    .property("url", SchemaObject::string("URL to validate"))
                    .required(&["url"]),
            ),
            validate_url,
        ),
        Arc::new(MakeRequestTool::new(http_client)),
    ]
}

/// Client for `make_request`. Redirects are returned to the caller rather than
/// followed, so the reported status and url are those of the first response.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

pub fn is_valid_url(candidate: &str) -> bool {
    URL_PATTERN.is_match(candidate)
}

async fn validate_url(args: ValidateUrlArgs) -> Result<Value, ToolError> {
    Ok(Value::Bool(is_valid_url(&args.url)))
}

/// Outbound HTTP call through one shared connection pool.
pub struct MakeRequestTool {
    client: reqwest::Client,
}

impl MakeRequestTool {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ToolError> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| ToolError::Transport(format!("invalid header name '{name}': {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| ToolError::Transport(format!("invalid header value: {err}")))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

/// Repeated headers are joined with ", " under one name.
fn flatten_headers(headers: &HeaderMap) -> Map<String, Value> {
    headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            (name.as_str().to_string(), Value::String(joined))
        })
        .collect()
}

#[async_trait]
impl ToolHandler for MakeRequestTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "make_request",
            "Make an HTTP request to a URL",
            SchemaObject::object()
                .property("url", SchemaObject::string("URL to request"))
                .property(
                    "method",
                    SchemaObject::string("HTTP method (GET, POST, etc.)").with_default(json!("GET")),
                )
                .property(
                    "headers",
                    SchemaObject::map("HTTP headers").with_default(json!({})),
                )
                .required(&["url"]),
        )
    }

    async fn call(&self, args: Map<String, Value>) -> Result<Value, ToolError> {
        let args: MakeRequestArgs = parse_args("make_request", args)?;
        let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
            .map_err(|err| ToolError::Transport(format!("invalid method '{}': {err}", args.method)))?;
        let headers = Self::build_headers(&args.headers)?;

        let response = self
            .client
            .request(method, &args.url)
            .headers(headers)
            .send()
            .await
            .map_err(|err| ToolError::Transport(err.to_string()))?;

        let status_code = response.status().as_u16();
        let url = response.url().to_string();
        let headers = flatten_headers(response.headers());
        let content = response
            .text()
            .await
            .map_err(|err| ToolError::Transport(err.to_string()))?;

        Ok(json!({
            "status_code": status_code,
            "headers": headers,
            "content": content,
            "url": url,
        }))
    }
}

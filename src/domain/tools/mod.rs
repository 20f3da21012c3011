//! The built-in tool catalogue
//!
//! Each submodule contributes bindings for one family of tools. Most tools are
//! plain async functions over a typed argument struct, wrapped by [`typed`].

use std::{future::Future, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::{
    registry::{RegistryError, ToolHandler, ToolRegistry},
    schema::ToolDescriptor,
    utils::parse_args,
};
use crate::errors::ToolError;

pub mod basic;
pub mod files;
pub mod math;
pub mod text;
pub mod utility;
pub mod web;

pub struct TypedTool<A, F, Fut> {
    descriptor: ToolDescriptor,
    run: F,
    _signature: PhantomData<fn(A) -> Fut>,
}

/// Binds a descriptor to an async function taking decoded arguments.
pub fn typed<A, F, Fut>(descriptor: ToolDescriptor, run: F) -> Arc<dyn ToolHandler>
where
    A: DeserializeOwned + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    Arc::new(TypedTool {
        descriptor,
        run,
        _signature: PhantomData,
    })
}

#[async_trait]
impl<A, F, Fut> ToolHandler for TypedTool<A, F, Fut>
where
    A: DeserializeOwned + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    fn descriptor(&self) -> ToolDescriptor {
        self.descriptor.clone()
    }

    async fn call(&self, args: Map<String, Value>) -> Result<Value, ToolError> {
        let args = parse_args::<A>(&self.descriptor.name, args)?;
        (self.run)(args).await
    }
}

/// All built-in bindings in advertised order.
pub fn builtin_tools(http_client: reqwest::Client) -> Vec<Arc<dyn ToolHandler>> {
    let mut tools = basic::tools();
    tools.extend(math::tools());
    tools.extend(text::tools());
    tools.extend(files::tools());
    tools.extend(utility::tools());
    tools.extend(web::tools(http_client));
    tools
}

impl ToolRegistry {
    pub fn with_builtin_tools(http_client: reqwest::Client) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for tool in builtin_tools(http_client) {
            registry.register(tool)?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
pub(crate) async fn invoke(
    tools: Vec<Arc<dyn ToolHandler>>,
    name: &str,
    args: Value,
) -> Result<Value, ToolError> {
    let tool = tools
        .into_iter()
        .find(|tool| tool.descriptor().name == name)
        .expect("tool should be part of the family");
    let Value::Object(args) = args else {
        panic!("test arguments must be an object");
    };
    tool.call(args).await
}

//! Tool registry and the executor capability each tool implements

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::schema::ToolDescriptor;
use crate::errors::ToolError;

/// A named, independently implemented capability.
///
/// Implementations must hold no mutable state shared between invocations;
/// the registry calls them concurrently from every connection.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    async fn call(&self, args: Map<String, Value>) -> Result<Value, ToolError>;
}

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),
    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

struct Binding {
    descriptor: ToolDescriptor,
    handler: Arc<dyn ToolHandler>,
}

/// Name-keyed registry. Descriptors and bindings are stored together so a
/// listed tool always has exactly one handler.
#[derive(Default)]
pub struct ToolRegistry {
    bindings: Vec<Binding>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) -> Result<(), RegistryError> {
        let descriptor = handler.descriptor();
        if self.index.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateTool(descriptor.name));
        }

        self.index
            .insert(descriptor.name.clone(), self.bindings.len());
        self.bindings.push(Binding {
            descriptor,
            handler,
        });
        Ok(())
    }

    /// Descriptors in registration order.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.bindings
            .iter()
            .map(|binding| binding.descriptor.clone())
            .collect()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub async fn execute(&self, name: &str, args: Map<String, Value>) -> Result<Value, ToolError> {
        let Some(position) = self.index.get(name) else {
            return Err(ToolError::UnknownTool(name.to_string()));
        };

        self.bindings[*position].handler.call(args).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::schema::SchemaObject;

    struct Constant(&'static str);

    #[async_trait]
    impl ToolHandler for Constant {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new(self.0, "returns its own name", SchemaObject::object())
        }

        async fn call(&self, _args: Map<String, Value>) -> Result<Value, ToolError> {
            Ok(json!(self.0))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(Constant("zeta")))
            .expect("register zeta");
        registry
            .register(Arc::new(Constant("alpha")))
            .expect("register alpha");
        registry
    }

    #[test]
    fn lists_in_registration_order() {
        let names = registry()
            .list()
            .into_iter()
            .map(|descriptor| descriptor.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = registry();
        let err = registry
            .register(Arc::new(Constant("alpha")))
            .expect_err("duplicate must fail");
        assert_eq!(err, RegistryError::DuplicateTool("alpha".to_string()));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn executes_bound_handler() {
        let registry = registry();
        assert!(registry.exists("alpha"));
        let value = registry
            .execute("alpha", Map::new())
            .await
            .expect("alpha executes");
        assert_eq!(value, json!("alpha"));
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let err = registry()
            .execute("missing", Map::new())
            .await
            .expect_err("missing tool must fail");
        assert_eq!(err, ToolError::UnknownTool("missing".to_string()));
    }
}

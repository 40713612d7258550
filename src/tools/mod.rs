//! Local tools the model can call.
//!
//! Every tool implements [`Tool`] and is registered in a [`ToolRegistry`].
//! The registry turns its tools into [`FunctionDeclaration`]s for the model
//! and dispatches the model's function calls by name.

pub mod knowledge_base;
pub mod weather;

pub use knowledge_base::{KbRecord, KbResponse, KnowledgeBase, SearchKbTool};
pub use weather::{WeatherResponse, WeatherTool};

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

use crate::backend::{FunctionCall, FunctionDeclaration};
use crate::error::Result;
use crate::WorkflowError;

/// A capability the model may invoke through function calling.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used in function calls (e.g. `"get_weather"`).
    fn name(&self) -> &str;

    /// What the tool does, as shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's arguments.
    fn parameters(&self) -> Value;

    /// Run the tool with the model-supplied arguments.
    async fn execute(&self, args: &Value) -> Result<Value>;
}

/// Registry of tools, looked up by name.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        debug!(tool = tool.name(), "Registered tool");
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.register(Box::new(tool));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Execute the tool named by `call`.
    ///
    /// Fails with [`WorkflowError::UnknownTool`] when no such tool is registered.
    pub async fn execute(&self, call: &FunctionCall) -> Result<Value> {
        match self.tools.get(&call.name) {
            Some(tool) => {
                debug!(tool = %call.name, args = %call.args, "Executing tool");
                tool.execute(&call.args).await
            }
            None => {
                error!(tool = %call.name, "Tool not found");
                Err(WorkflowError::UnknownTool(call.name.clone()))
            }
        }
    }

    /// Declarations for every registered tool, sorted by name.
    pub fn declarations(&self) -> Vec<FunctionDeclaration> {
        let mut decls: Vec<FunctionDeclaration> = self
            .tools
            .values()
            .map(|tool| FunctionDeclaration {
                name: tool.name().into(),
                description: tool.description().into(),
                parameters: tool.parameters(),
            })
            .collect();
        decls.sort_by(|a, b| a.name.cmp(&b.name));
        decls
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Echoes its arguments back, for registry and tool-loop tests.
    pub(crate) struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echo the arguments"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }
        async fn execute(&self, args: &Value) -> Result<Value> {
            Ok(json!({"echo": args.clone()}))
        }
    }

    struct OtherTool;

    #[async_trait]
    impl Tool for OtherTool {
        fn name(&self) -> &str {
            "alpha"
        }
        fn description(&self) -> &str {
            "First alphabetically"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn execute(&self, _args: &Value) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    fn call(name: &str, args: Value) -> FunctionCall {
        FunctionCall {
            id: None,
            name: name.into(),
            args,
        }
    }

    #[test]
    fn test_registry_register_and_lookup() {
        let registry = ToolRegistry::new().with(EchoTool).with(OtherTool);
        assert_eq!(registry.len(), 2);
        assert!(registry.has("echo"));
        assert!(!registry.has("missing"));
        assert_eq!(registry.get("echo").unwrap().description(), "Echo the arguments");
        assert_eq!(registry.names(), vec!["alpha", "echo"]);
    }

    #[test]
    fn test_declarations_sorted() {
        let registry = ToolRegistry::new().with(EchoTool).with(OtherTool);
        let decls = registry.declarations();
        assert_eq!(decls[0].name, "alpha");
        assert_eq!(decls[1].name, "echo");
        assert_eq!(decls[1].parameters["properties"]["text"]["type"], "string");
    }

    #[tokio::test]
    async fn test_execute_known_tool() {
        let registry = ToolRegistry::new().with(EchoTool);
        let out = registry
            .execute(&call("echo", json!({"text": "hi"})))
            .await
            .unwrap();
        assert_eq!(out, json!({"echo": {"text": "hi"}}));
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let registry = ToolRegistry::default();
        assert!(registry.is_empty());
        let err = registry.execute(&call("nope", json!({}))).await.unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownTool(ref n) if n == "nope"));
    }
}

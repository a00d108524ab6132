use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, error};

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolCall};

/// A local function the model can ask to run
///
/// Handlers receive the argument object exactly as the model produced it. Returning an
/// [`AgentError`] through the `anyhow::Error` keeps its category; any other error is
/// reported as [`AgentError::ExecutionError`].
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: Value) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F> ToolHandler for F
where
    F: Fn(Value) -> anyhow::Result<Value> + Send + Sync,
{
    async fn call(&self, arguments: Value) -> anyhow::Result<Value> {
        self(arguments)
    }
}

/// Registry of tool descriptors and the handlers behind them
#[derive(Default)]
pub struct Toolbox {
    tools: Vec<Tool>,
    handlers: HashMap<String, Box<dyn ToolHandler>>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A later registration under the same name replaces the earlier one.
    pub fn with_tool<H: ToolHandler + 'static>(mut self, tool: Tool, handler: H) -> Self {
        match self.tools.iter_mut().find(|t| t.name == tool.name) {
            Some(existing) => *existing = tool.clone(),
            None => self.tools.push(tool.clone()),
        }
        self.handlers.insert(tool.name, Box::new(handler));
        self
    }

    /// Register a handler with typed arguments and result
    ///
    /// Arguments that do not deserialize into `A` fail with [`AgentError::InvalidParameters`].
    pub fn with_fn<A, R, F>(self, tool: Tool, handler: F) -> Self
    where
        A: DeserializeOwned + 'static,
        R: Serialize + 'static,
        F: Fn(A) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        let name = tool.name.clone();
        self.with_tool(tool, move |arguments: Value| -> anyhow::Result<Value> {
            let args: A = serde_json::from_value(arguments)
                .map_err(|e| AgentError::InvalidParameters(format!("{}: {}", name, e)))?;
            Ok(serde_json::to_value(handler(args)?)?)
        })
    }

    /// Descriptors in registration order, as sent to the model
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run the handler for `tool_call` and serialize its result for the transcript
    pub async fn call(&self, tool_call: &ToolCall) -> AgentResult<String> {
        let handler = self
            .handlers
            .get(&tool_call.name)
            .ok_or_else(|| AgentError::ToolNotFound(tool_call.name.clone()))?;

        debug!("Calling tool {} with {}", tool_call.name, tool_call.arguments);
        let output = handler
            .call(tool_call.arguments.clone())
            .await
            .map_err(|e| {
                error!("Tool {} failed: {:#}", tool_call.name, e);
                match e.downcast::<AgentError>() {
                    Ok(agent_error) => agent_error,
                    Err(e) => AgentError::ExecutionError(format!("{}: {:#}", tool_call.name, e)),
                }
            })?;

        Ok(render_output(output))
    }
}

/// Strings go to the model verbatim, everything else as JSON text
fn render_output(output: Value) -> String {
    match output {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Pair {
        a: f64,
        b: f64,
    }

    fn add_tool() -> Tool {
        Tool::new(
            "add",
            "Add two numbers together",
            json!({
                "type": "object",
                "properties": {"a": {"type": "number"}, "b": {"type": "number"}},
                "required": ["a", "b"]
            }),
        )
    }

    fn toolbox() -> Toolbox {
        Toolbox::new()
            .with_fn(add_tool(), |p: Pair| Ok(p.a + p.b))
            .with_tool(
                Tool::new("greet", "Greet someone", json!({"type": "object"})),
                |args: Value| -> anyhow::Result<Value> {
                    Ok(json!(format!("Hello, {}!", args["name"].as_str().unwrap_or("you"))))
                },
            )
            .with_tool(
                Tool::new("broken", "Always fails", json!({"type": "object"})),
                |_args: Value| -> anyhow::Result<Value> { Err(anyhow!("disk on fire")) },
            )
    }

    #[tokio::test]
    async fn test_typed_handler_result_is_json_text() -> AgentResult<()> {
        let output = toolbox()
            .call(&ToolCall::new("add", json!({"a": 15, "b": 7})))
            .await?;
        assert_eq!(output, "22.0");
        Ok(())
    }

    #[tokio::test]
    async fn test_string_result_is_verbatim() -> AgentResult<()> {
        let output = toolbox()
            .call(&ToolCall::new("greet", json!({"name": "Ada"})))
            .await?;
        assert_eq!(output, "Hello, Ada!");
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = toolbox()
            .call(&ToolCall::new("subtract", json!({})))
            .await
            .unwrap_err();
        assert_eq!(err, AgentError::ToolNotFound("subtract".to_string()));
    }

    #[tokio::test]
    async fn test_bad_arguments_are_invalid_parameters() {
        let err = toolbox()
            .call(&ToolCall::new("add", json!({"a": "fifteen"})))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters(ref m) if m.starts_with("add:")));
    }

    #[tokio::test]
    async fn test_handler_failure_is_execution_error() {
        let err = toolbox()
            .call(&ToolCall::new("broken", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ExecutionError(ref m) if m.contains("disk on fire")));
    }

    #[test]
    fn test_reregistering_replaces_descriptor() {
        let toolbox = toolbox().with_fn(
            Tool::new("add", "Add, but louder", json!({"type": "object"})),
            |p: Pair| Ok(p.a + p.b),
        );
        assert_eq!(toolbox.tools().len(), 3);
        assert_eq!(toolbox.tools()[0].description, "Add, but louder");
        assert!(toolbox.contains("add"));
        assert!(!toolbox.contains("subtract"));
    }
}

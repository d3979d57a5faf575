pub mod builtin;

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::protocol::completion::{CompletionTool, CompletionToolFunction};

/// Error type for tool registration and invocation.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    #[error("invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },
    #[error("registration error: {0}")]
    Registration(String),
}

/// A locally executable capability the model can select.
///
/// `parameters` returns the JSON schema advertised upstream; `invoke`
/// receives the finalized argument object and is responsible for its own
/// argument checking.
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn parameters(&self) -> Value;
    fn invoke(&self, args: &Value) -> Result<Value, ToolError>;
}

/// Fixed name → capability mapping, built once at startup and read-only
/// afterwards.
#[derive(Default)]
pub struct ToolRegistry {
    tools: FxHashMap<&'static str, Box<dyn Tool>>,
    // registration order, so advertised schemas are deterministic
    order: Vec<&'static str>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Membership is validated here, not per call.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Registration` for empty or duplicate names and
    /// for parameter schemas that are not JSON objects.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name();
        if name.is_empty() {
            return Err(ToolError::Registration(
                "tool name must not be empty".to_string(),
            ));
        }
        if !tool.parameters().is_object() {
            return Err(ToolError::Registration(format!(
                "tool '{name}' parameter schema must be a JSON object"
            )));
        }
        if self.tools.contains_key(name) {
            return Err(ToolError::Registration(format!(
                "duplicate tool name '{name}'"
            )));
        }
        self.order.push(name);
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Execute the named tool with finalized arguments.
    ///
    /// # Errors
    ///
    /// `UnknownTool` when the name is not registered; `InvalidArguments`
    /// when the arguments do not satisfy the tool's schema.
    pub fn invoke(&self, name: &str, args: &Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.invoke(args)
    }

    /// Tool declarations advertised to the completion upstream, in
    /// registration order.
    #[must_use]
    pub fn specs(&self) -> Vec<CompletionTool> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| CompletionTool {
                type_: "function".to_string(),
                function: CompletionToolFunction {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                    parameters: tool.parameters(),
                },
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Build the registry with the built-in tool set.
///
/// # Errors
///
/// Propagates registration failures; with the fixed built-in set this only
/// fires if a tool is added twice.
pub fn builtin_registry() -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(builtin::Add))?;
    registry.register(Box::new(builtin::Multiply))?;
    registry.register(Box::new(builtin::CurrentWeather))?;
    Ok(registry)
}

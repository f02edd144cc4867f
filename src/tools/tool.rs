//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use super::arguments::ToolArguments;
use super::types::{FunctionDefinition, FunctionParameters};
use crate::error::FoundryError;

/// Where a function call came from.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    pub thread_id: String,
    pub run_id: String,
    pub tool_call_id: String,
}

/// A user function the agent may call. Implement directly or use [`FnTool`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// Function name (must match what the model calls).
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> &FunctionParameters;

    /// Run the function. The returned JSON becomes the tool output.
    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, FoundryError>;

    /// Wire definition registered with the agent.
    fn definition(&self) -> FunctionDefinition {
        FunctionDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters().schema.clone(),
        }
    }
}

type ToolHandler = dyn Fn(ToolArguments, ToolExecutionContext) -> BoxFuture<'static, Result<serde_json::Value, FoundryError>>
    + Send
    + Sync;

/// Closure-based tool.
///
/// # Example
/// ```
/// use foundry_agents::tools::{FnTool, FunctionParameters};
///
/// let tool = FnTool::new(
///     "fetch_weather",
///     "Fetch the weather for a location",
///     FunctionParameters::object().string("location", "City name", true).build(),
///     |args, _ctx| async move {
///         let location = args.get_str("location")?;
///         Ok(serde_json::json!({ "weather": format!("Sunny in {location}") }))
///     },
/// );
/// ```
pub struct FnTool {
    name: String,
    description: String,
    parameters: FunctionParameters,
    handler: Arc<ToolHandler>,
}

impl FnTool {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: FunctionParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, FoundryError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |args, ctx| Box::pin(handler(args, ctx))),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &FunctionParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, FoundryError> {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

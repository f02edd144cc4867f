//! Tool collections: what an agent is created with, and how its function
//! calls are answered locally.

use std::collections::HashSet;
use std::sync::Arc;

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::ToolDefinition;
use super::validation::{validate_arguments, validate_function_definition};
use crate::error::FoundryError;
use crate::types::{RequiredToolCall, ToolOutput};

/// A set of user functions exposed to the agent.
#[derive(Clone)]
pub struct FunctionTool {
    functions: Vec<Arc<dyn Tool>>,
}

impl FunctionTool {
    /// Validate every function definition and reject duplicate names.
    pub fn new(functions: Vec<Arc<dyn Tool>>) -> Result<Self, FoundryError> {
        let mut seen = HashSet::new();
        for function in &functions {
            validate_function_definition(&function.definition())?;
            if !seen.insert(function.name().to_string()) {
                return Err(FoundryError::Validation(format!(
                    "function '{}' is defined more than once",
                    function.name()
                )));
            }
        }
        Ok(Self { functions })
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.functions
            .iter()
            .map(|f| ToolDefinition::Function {
                function: f.definition(),
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.functions.iter().find(|f| f.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name()).collect()
    }

    /// Answer one function call.
    ///
    /// Never fails: an unknown function, malformed arguments or a handler
    /// error become an `{"error": ...}` output so the run can continue.
    pub async fn execute(&self, call: &RequiredToolCall, ctx: &ToolExecutionContext) -> ToolOutput {
        let name = &call.function.name;
        let result = match self.get(name) {
            Some(function) => match ToolArguments::parse(&call.function.arguments) {
                Ok(args) => match validate_arguments(args.raw(), &function.parameters().schema) {
                    Ok(()) => function.execute(&args, ctx).await,
                    Err(message) => Err(FoundryError::InvalidArgument(message)),
                },
                Err(err) => Err(err),
            },
            None => Err(FoundryError::ToolExecution {
                tool_name: name.clone(),
                message: "function not found".to_string(),
            }),
        };

        let output = match result {
            Ok(value) => {
                tracing::debug!(tool = %name, call_id = %call.id, "Function call succeeded");
                render_output(value)
            }
            Err(err) => {
                tracing::warn!(tool = %name, call_id = %call.id, error = %err, "Function call failed");
                serde_json::json!({ "error": err.to_string() }).to_string()
            }
        };

        ToolOutput {
            tool_call_id: call.id.clone(),
            output,
        }
    }
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("functions", &self.names())
            .finish()
    }
}

/// String results are submitted verbatim, anything else as JSON text.
fn render_output(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Server-side code interpreter, optionally with uploaded files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeInterpreterTool {
    pub file_ids: Vec<String>,
}

impl CodeInterpreterTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_ids(file_ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            file_ids: file_ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ToolKind {
    Function(FunctionTool),
    CodeInterpreter(CodeInterpreterTool),
}

impl ToolKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Function(_) => "function",
            Self::CodeInterpreter(_) => "code_interpreter",
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        match self {
            Self::Function(f) => f.definitions(),
            Self::CodeInterpreter(_) => vec![ToolDefinition::CodeInterpreter],
        }
    }

    fn resources(&self) -> Option<(&'static str, serde_json::Value)> {
        match self {
            Self::CodeInterpreter(ci) if !ci.file_ids.is_empty() => Some((
                "code_interpreter",
                serde_json::json!({ "file_ids": ci.file_ids }),
            )),
            _ => None,
        }
    }
}

impl From<FunctionTool> for ToolKind {
    fn from(value: FunctionTool) -> Self {
        Self::Function(value)
    }
}

impl From<CodeInterpreterTool> for ToolKind {
    fn from(value: CodeInterpreterTool) -> Self {
        Self::CodeInterpreter(value)
    }
}

/// The tools an agent is created with. At most one entry per kind.
///
/// # Example
/// ```
/// use foundry_agents::tools::{builtin, FunctionTool, ToolSet};
///
/// let toolset = ToolSet::new()
///     .add(FunctionTool::new(builtin::user_functions())?)?;
/// assert_eq!(toolset.definitions().len(), 4);
/// # Ok::<(), foundry_agents::error::FoundryError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    tools: Vec<ToolKind>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, tool: impl Into<ToolKind>) -> Result<Self, FoundryError> {
        let tool = tool.into();
        if self.tools.iter().any(|t| t.label() == tool.label()) {
            return Err(FoundryError::Validation(format!(
                "toolset already contains a {} tool",
                tool.label()
            )));
        }
        self.tools.push(tool);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions sent in the create-agent request.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().flat_map(ToolKind::definitions).collect()
    }

    /// `tool_resources` for the create-agent request, if any tool needs one.
    pub fn resources(&self) -> Option<serde_json::Value> {
        let map: serde_json::Map<_, _> = self
            .tools
            .iter()
            .filter_map(ToolKind::resources)
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        (!map.is_empty()).then_some(serde_json::Value::Object(map))
    }

    fn functions(&self) -> Option<&FunctionTool> {
        self.tools.iter().find_map(|t| match t {
            ToolKind::Function(f) => Some(f),
            _ => None,
        })
    }

    /// Answer every pending call, in order. Outputs pair with calls by id.
    pub async fn execute_tool_calls(
        &self,
        calls: &[RequiredToolCall],
        thread_id: &str,
        run_id: &str,
    ) -> Vec<ToolOutput> {
        let mut outputs = Vec::with_capacity(calls.len());
        for call in calls {
            let ctx = ToolExecutionContext {
                thread_id: thread_id.to_string(),
                run_id: run_id.to_string(),
                tool_call_id: call.id.clone(),
            };
            let output = match self.functions() {
                Some(functions) => functions.execute(call, &ctx).await,
                None => ToolOutput {
                    tool_call_id: call.id.clone(),
                    output: serde_json::json!({
                        "error": format!("no functions registered to handle '{}'", call.function.name)
                    })
                    .to_string(),
                },
            };
            outputs.push(output);
        }
        outputs
    }
}

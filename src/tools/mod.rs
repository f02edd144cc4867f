//! Tool definitions attached to agents and local execution of function calls.

pub mod arguments;
pub mod builtin;
pub mod tool;
pub mod toolset;
pub mod types;
pub mod validation;

pub use arguments::ToolArguments;
pub use tool::{FnTool, Tool, ToolExecutionContext};
pub use toolset::{CodeInterpreterTool, FunctionTool, ToolKind, ToolSet};
pub use types::{FunctionDefinition, FunctionParameters, ToolDefinition};

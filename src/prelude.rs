//! Convenience re-exports for common use.

pub use crate::auth::{DefaultAzureCredential, TokenCredential};
pub use crate::client::{AgentsApi, AgentsClient, ProjectClient, RunWaitOptions};
pub use crate::config::ProjectConfig;
pub use crate::error::{FoundryError, Result};
pub use crate::session::{run_session, SessionReport, SessionRequest};
pub use crate::tools::{CodeInterpreterTool, FnTool, FunctionParameters, FunctionTool, Tool, ToolArguments, ToolSet};
pub use crate::types::{CreateAgentOptions, MessageRole, RunStatus, ThreadMessage, ThreadRun};

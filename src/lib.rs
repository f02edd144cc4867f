//! foundry-agents: client for hosted Azure AI Foundry agents.
//!
//! Creates agents with callable tools, opens threads, posts messages, runs
//! the agent (answering its function calls locally) and reads the
//! conversation back.
//!
//! # Quick Start
//!
//! ```no_run
//! use foundry_agents::prelude::*;
//!
//! # async fn example() -> foundry_agents::error::Result<()> {
//! let toolset = ToolSet::new()
//!     .add(FunctionTool::new(foundry_agents::tools::builtin::user_functions())?)?
//!     .add(CodeInterpreterTool::new())?;
//!
//! let client = ProjectClient::from_env()?;
//! let report = client
//!     .scoped(|client| async move {
//!         let agents = client.agents();
//!         run_session(&agents, &toolset, &SessionRequest::default()).await
//!     })
//!     .await?;
//! println!("run {}", report.run.status);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
pub mod session;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;

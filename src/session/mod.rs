//! The end-to-end session: create an agent with tools, talk to it once,
//! clean up and read the conversation back.

pub mod events;

pub use events::{ConsoleObserver, SessionEvent, SessionObserver};

use crate::client::{AgentsApi, RunWaitOptions};
use crate::error::FoundryError;
use crate::tools::ToolSet;
use crate::types::{CreateAgentOptions, MessageRole, RunStatus, ThreadMessage, ThreadRun};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_AGENT_NAME: &str = "my-assistant";
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant";
pub const DEFAULT_MESSAGE: &str =
    "Hello, send an email with the datetime and weather information in New York?";

/// What the session asks of the service.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub model: String,
    pub name: String,
    pub instructions: String,
    pub message: String,
    pub wait: RunWaitOptions,
}

impl Default for SessionRequest {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            name: DEFAULT_AGENT_NAME.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
            wait: RunWaitOptions::default(),
        }
    }
}

/// Everything the session produced.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub agent_id: String,
    pub thread_id: String,
    pub message_id: String,
    pub run: ThreadRun,
    /// Thread contents after the run, oldest first.
    pub messages: Vec<ThreadMessage>,
}

impl SessionReport {
    pub fn succeeded(&self) -> bool {
        self.run.status == RunStatus::Completed
    }
}

/// [`run_session_with`] reporting to the console.
pub async fn run_session(
    api: &dyn AgentsApi,
    toolset: &ToolSet,
    request: &SessionRequest,
) -> Result<SessionReport, FoundryError> {
    run_session_with(api, toolset, request, &ConsoleObserver).await
}

/// Create agent, create thread, post the message, run to completion,
/// delete the agent, list the thread's messages.
///
/// A failed run is reported and the session carries on; errors from any
/// service call end the session.
pub async fn run_session_with(
    api: &dyn AgentsApi,
    toolset: &ToolSet,
    request: &SessionRequest,
    observer: &dyn SessionObserver,
) -> Result<SessionReport, FoundryError> {
    let options = CreateAgentOptions::builder()
        .model(request.model.clone())
        .name(request.name.clone())
        .instructions(request.instructions.clone())
        .build()
        .with_toolset(toolset);

    let agent = api.create_agent(&options).await?;
    observer.on_event(&SessionEvent::AgentCreated {
        agent_id: agent.id.clone(),
    });

    let thread = api.create_thread().await?;
    observer.on_event(&SessionEvent::ThreadCreated {
        thread_id: thread.id.clone(),
    });

    let message = api
        .create_message(&thread.id, MessageRole::User, &request.message)
        .await?;
    observer.on_event(&SessionEvent::MessageCreated {
        message_id: message.id.clone(),
    });

    let run = api
        .create_and_process_run(&thread.id, &agent.id, toolset, request.wait.clone())
        .await?;
    observer.on_event(&SessionEvent::RunFinished { status: run.status });
    if run.status == RunStatus::Failed {
        observer.on_event(&SessionEvent::RunFailed {
            error: run.last_error.clone(),
        });
    }

    api.delete_agent(&agent.id).await?;
    observer.on_event(&SessionEvent::AgentDeleted {
        agent_id: agent.id.clone(),
    });

    let messages = api.list_all_messages(&thread.id).await?;
    observer.on_event(&SessionEvent::MessagesListed {
        messages: messages.clone(),
    });

    Ok(SessionReport {
        agent_id: agent.id,
        thread_id: thread.id,
        message_id: message.id,
        run,
        messages,
    })
}

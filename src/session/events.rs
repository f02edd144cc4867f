//! Progress events emitted while a session runs.

use std::fmt;

use crate::types::{RunError, RunStatus, ThreadMessage};

/// One step of the session, in the order they occur.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    AgentCreated { agent_id: String },
    ThreadCreated { thread_id: String },
    MessageCreated { message_id: String },
    RunFinished { status: RunStatus },
    RunFailed { error: Option<RunError> },
    AgentDeleted { agent_id: String },
    MessagesListed { messages: Vec<ThreadMessage> },
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AgentCreated { agent_id } => write!(f, "Created agent, ID: {agent_id}"),
            Self::ThreadCreated { thread_id } => write!(f, "Created thread, ID: {thread_id}"),
            Self::MessageCreated { message_id } => write!(f, "Created message, ID: {message_id}"),
            Self::RunFinished { status } => write!(f, "Run finished with status: {status}"),
            Self::RunFailed { error: Some(error) } => write!(f, "Run failed: {error}"),
            Self::RunFailed { error: None } => write!(f, "Run failed: no error detail reported"),
            Self::AgentDeleted { .. } => write!(f, "Deleted agent"),
            Self::MessagesListed { messages } => {
                write!(f, "Messages: {} message(s)", messages.len())?;
                for message in messages {
                    write!(f, "\n  [{}] {}", message.role, message.text())?;
                }
                Ok(())
            }
        }
    }
}

/// Receives session progress.
pub trait SessionObserver: Send + Sync {
    fn on_event(&self, event: &SessionEvent);
}

/// Prints each event to stdout and mirrors it as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::RunFailed { .. } => tracing::warn!(event = %event, "Session event"),
            SessionEvent::MessagesListed { messages } => {
                tracing::info!(count = messages.len(), "Session listed messages")
            }
            _ => tracing::info!(event = %event, "Session event"),
        }
        println!("{event}");
    }
}

//! The operations the session workflow needs, as a trait.

use async_trait::async_trait;

use super::agents::{AgentsClient, RunWaitOptions};
use crate::error::FoundryError;
use crate::tools::ToolSet;
use crate::types::{
    Agent, AgentThread, CreateAgentOptions, DeletionStatus, ListMessagesOptions, ListResponse,
    MessageRole, ThreadMessage, ThreadRun,
};

/// Agents operations used by [`run_session`](crate::session::run_session).
///
/// Implemented by [`AgentsClient`]; tests substitute in-memory fakes.
#[async_trait]
pub trait AgentsApi: Send + Sync {
    async fn create_agent(&self, options: &CreateAgentOptions) -> Result<Agent, FoundryError>;

    async fn create_thread(&self) -> Result<AgentThread, FoundryError>;

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, FoundryError>;

    async fn create_and_process_run(
        &self,
        thread_id: &str,
        agent_id: &str,
        toolset: &ToolSet,
        options: RunWaitOptions,
    ) -> Result<ThreadRun, FoundryError>;

    async fn delete_agent(&self, agent_id: &str) -> Result<DeletionStatus, FoundryError>;

    async fn list_messages(
        &self,
        thread_id: &str,
        options: &ListMessagesOptions,
    ) -> Result<ListResponse<ThreadMessage>, FoundryError>;

    async fn list_all_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, FoundryError>;
}

#[async_trait]
impl AgentsApi for AgentsClient {
    async fn create_agent(&self, options: &CreateAgentOptions) -> Result<Agent, FoundryError> {
        AgentsClient::create_agent(self, options).await
    }

    async fn create_thread(&self) -> Result<AgentThread, FoundryError> {
        AgentsClient::create_thread(self).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, FoundryError> {
        AgentsClient::create_message(self, thread_id, role, content).await
    }

    async fn create_and_process_run(
        &self,
        thread_id: &str,
        agent_id: &str,
        toolset: &ToolSet,
        options: RunWaitOptions,
    ) -> Result<ThreadRun, FoundryError> {
        AgentsClient::create_and_process_run(self, thread_id, agent_id, toolset, options).await
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<DeletionStatus, FoundryError> {
        AgentsClient::delete_agent(self, agent_id).await
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        options: &ListMessagesOptions,
    ) -> Result<ListResponse<ThreadMessage>, FoundryError> {
        AgentsClient::list_messages(self, thread_id, options).await
    }

    async fn list_all_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, FoundryError> {
        AgentsClient::list_all_messages(self, thread_id).await
    }
}

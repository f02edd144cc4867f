//! Agents data-plane operations: agents, threads, messages and runs.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::http::status_to_error;
use super::ClientInner;
use crate::error::FoundryError;
use crate::tools::ToolSet;
use crate::types::{
    Agent, AgentThread, CreateAgentOptions, CreateMessageRequest, CreateRunRequest,
    CreateThreadRequest, DeletionStatus, ListMessagesOptions, ListOptions, ListOrder,
    ListResponse, MessageRole, RunStatus, ThreadMessage, ThreadRun, ToolOutput,
};
use crate::util::timeout::with_optional_timeout;

const LIST_ALL_PAGE_SIZE: u32 = 100;

/// How [`AgentsClient::create_and_process_run`] waits.
///
/// Unset fields fall back to the project config (`poll_interval`,
/// `run_timeout`); with neither set the wait is unbounded. The cancellation
/// token is observed throughout, including while tool calls execute.
#[derive(Debug, Clone, Default)]
pub struct RunWaitOptions {
    pub poll_interval: Option<Duration>,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl RunWaitOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Agents operations of a [`ProjectClient`](super::ProjectClient).
#[derive(Clone)]
pub struct AgentsClient {
    inner: Arc<ClientInner>,
}

impl AgentsClient {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<T, FoundryError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.inner.ensure_open()?;

        let token = self
            .inner
            .credential
            .get_token(&self.inner.config.scopes)
            .await?;
        let (headers, request_id) = super::http::request_headers(&token.token)?;
        let url = format!("{}{}", self.inner.endpoint, path);

        debug!(%method, %path, %request_id, "Agents request");

        let mut request = self
            .inner
            .http
            .request(method.clone(), &url)
            .headers(headers)
            .query(&[("api-version", self.inner.config.api_version.as_str())])
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await?;
        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let headers = resp.headers().clone();
            let body_text = resp.text().await.unwrap_or_default();
            debug!(%method, %path, status, "Agents request failed");
            return Err(status_to_error(status, &headers, &body_text));
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, FoundryError> {
        self.inner
            .config
            .retry_policy
            .execute(|| self.send::<(), T>(Method::GET, path, query, None))
            .await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, FoundryError> {
        self.inner
            .config
            .retry_policy
            .execute(|| self.send::<(), T>(Method::DELETE, path, &[], None))
            .await
    }

    // Creating requests are sent exactly once.
    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, FoundryError> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    // Agents

    pub async fn create_agent(&self, options: &CreateAgentOptions) -> Result<Agent, FoundryError> {
        let agent: Agent = self.post("/assistants", options).await?;
        info!(agent_id = %agent.id, model = %agent.model, "Created agent");
        Ok(agent)
    }

    pub async fn get_agent(&self, agent_id: &str) -> Result<Agent, FoundryError> {
        self.get(&format!("/assistants/{}", non_empty("agent_id", agent_id)?), &[])
            .await
    }

    pub async fn list_agents(&self, options: &ListOptions) -> Result<ListResponse<Agent>, FoundryError> {
        self.get("/assistants", &options.query()).await
    }

    /// Fails with a not-found service error when the agent does not exist
    /// (including when it was already deleted).
    pub async fn delete_agent(&self, agent_id: &str) -> Result<DeletionStatus, FoundryError> {
        let status: DeletionStatus = self
            .delete(&format!("/assistants/{}", non_empty("agent_id", agent_id)?))
            .await?;
        info!(agent_id, deleted = status.deleted, "Deleted agent");
        Ok(status)
    }

    // Threads

    pub async fn create_thread(&self) -> Result<AgentThread, FoundryError> {
        self.create_thread_with(&CreateThreadRequest::default()).await
    }

    pub async fn create_thread_with(
        &self,
        request: &CreateThreadRequest,
    ) -> Result<AgentThread, FoundryError> {
        let thread: AgentThread = self.post("/threads", request).await?;
        info!(thread_id = %thread.id, "Created thread");
        Ok(thread)
    }

    pub async fn get_thread(&self, thread_id: &str) -> Result<AgentThread, FoundryError> {
        self.get(&format!("/threads/{}", non_empty("thread_id", thread_id)?), &[])
            .await
    }

    pub async fn delete_thread(&self, thread_id: &str) -> Result<DeletionStatus, FoundryError> {
        let status: DeletionStatus = self
            .delete(&format!("/threads/{}", non_empty("thread_id", thread_id)?))
            .await?;
        info!(thread_id, deleted = status.deleted, "Deleted thread");
        Ok(status)
    }

    // Messages

    pub async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Result<ThreadMessage, FoundryError> {
        let request = CreateMessageRequest {
            role,
            content: content.into(),
            metadata: None,
        };
        let path = format!("/threads/{}/messages", non_empty("thread_id", thread_id)?);
        let message: ThreadMessage = self.post(&path, &request).await?;
        info!(message_id = %message.id, thread_id, %role, "Created message");
        Ok(message)
    }

    /// One page of messages. The service orders newest first unless
    /// `order` is set.
    pub async fn list_messages(
        &self,
        thread_id: &str,
        options: &ListMessagesOptions,
    ) -> Result<ListResponse<ThreadMessage>, FoundryError> {
        let path = format!("/threads/{}/messages", non_empty("thread_id", thread_id)?);
        self.get(&path, &options.query()).await
    }

    /// Every message of the thread, oldest first.
    pub async fn list_all_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, FoundryError> {
        let mut options = ListMessagesOptions {
            list: ListOptions {
                limit: Some(LIST_ALL_PAGE_SIZE),
                order: Some(ListOrder::Asc),
                ..ListOptions::default()
            },
            run_id: None,
        };
        let mut messages = Vec::new();
        loop {
            let page = self.list_messages(thread_id, &options).await?;
            let cursor = page
                .last_id
                .clone()
                .or_else(|| page.data.last().map(|m| m.id.clone()));
            let has_more = page.has_more;
            messages.extend(page.data);
            match cursor {
                Some(cursor) if has_more => options.list.after = Some(cursor),
                _ => break,
            }
        }
        debug!(thread_id, count = messages.len(), "Listed all messages");
        Ok(messages)
    }

    // Runs

    pub async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<ThreadRun, FoundryError> {
        self.create_run_with(thread_id, &CreateRunRequest::new(agent_id)).await
    }

    pub async fn create_run_with(
        &self,
        thread_id: &str,
        request: &CreateRunRequest,
    ) -> Result<ThreadRun, FoundryError> {
        non_empty("assistant_id", &request.assistant_id)?;
        let path = format!("/threads/{}/runs", non_empty("thread_id", thread_id)?);
        let run: ThreadRun = self.post(&path, request).await?;
        info!(run_id = %run.id, thread_id, status = %run.status, "Created run");
        Ok(run)
    }

    pub async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<ThreadRun, FoundryError> {
        self.get(&run_path(thread_id, run_id)?, &[]).await
    }

    pub async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<ThreadRun, FoundryError> {
        let path = format!("{}/cancel", run_path(thread_id, run_id)?);
        let run: ThreadRun = self.post(&path, &serde_json::json!({})).await?;
        info!(run_id, thread_id, status = %run.status, "Cancelled run");
        Ok(run)
    }

    pub async fn submit_tool_outputs_to_run(
        &self,
        thread_id: &str,
        run_id: &str,
        tool_outputs: &[ToolOutput],
    ) -> Result<ThreadRun, FoundryError> {
        let path = format!("{}/submit_tool_outputs", run_path(thread_id, run_id)?);
        let body = serde_json::json!({ "tool_outputs": tool_outputs });
        let run: ThreadRun = self.post(&path, &body).await?;
        debug!(run_id, count = tool_outputs.len(), "Submitted tool outputs");
        Ok(run)
    }

    /// Create a run and poll it until it leaves the queued, in-progress and
    /// requires-action states, answering function calls with `toolset`.
    ///
    /// A run that asks for action without any tool calls is cancelled. On
    /// timeout the run is cancelled (best effort) and `Timeout` is returned;
    /// on cancellation through the token the run is cancelled and returned.
    pub async fn create_and_process_run(
        &self,
        thread_id: &str,
        agent_id: &str,
        toolset: &ToolSet,
        options: RunWaitOptions,
    ) -> Result<ThreadRun, FoundryError> {
        let run = self.create_run(thread_id, agent_id).await?;
        let run_id = run.id.clone();
        let poll_interval = options.poll_interval.unwrap_or(self.inner.config.poll_interval);
        let timeout = options.timeout.or(self.inner.config.run_timeout);

        let wait = self.process_run(run, toolset, poll_interval, options.cancel.as_ref());
        match with_optional_timeout(timeout, wait).await {
            Err(FoundryError::Timeout(ms)) if timeout.is_some() => {
                warn!(run_id = %run_id, timeout_ms = ms, "Run timed out, cancelling");
                if let Err(error) = self.cancel_run(thread_id, &run_id).await {
                    warn!(run_id = %run_id, %error, "Failed to cancel timed out run");
                }
                Err(FoundryError::Timeout(ms))
            }
            result => result,
        }
    }

    async fn process_run(
        &self,
        mut run: ThreadRun,
        toolset: &ToolSet,
        poll_interval: Duration,
        cancel: Option<&CancellationToken>,
    ) -> Result<ThreadRun, FoundryError> {
        let thread_id = run.thread_id.clone();

        while run.status.is_pending() {
            // Cancellation interrupts any part of the step, including tool execution.
            let next = tokio::select! {
                biased;
                _ = cancelled(cancel) => {
                    info!(run_id = %run.id, "Run wait cancelled");
                    return self.cancel_run(&thread_id, &run.id).await;
                }
                next = self.advance_run(&thread_id, &run.id, toolset, poll_interval) => next?,
            };
            run = next;
        }

        debug!(run_id = %run.id, status = %run.status, "Run settled");
        Ok(run)
    }

    /// One poll: wait, refresh the run and answer any requested tool calls.
    async fn advance_run(
        &self,
        thread_id: &str,
        run_id: &str,
        toolset: &ToolSet,
        poll_interval: Duration,
    ) -> Result<ThreadRun, FoundryError> {
        tokio::time::sleep(poll_interval).await;
        let run = self.get_run(thread_id, run_id).await?;
        debug!(run_id = %run.id, status = %run.status, "Polled run");

        if run.status != RunStatus::RequiresAction {
            return Ok(run);
        }

        let calls = run.pending_tool_calls();
        if calls.is_empty() {
            warn!(run_id = %run.id, "Run requires action but has no tool calls, cancelling");
            return self.cancel_run(thread_id, &run.id).await;
        }

        let outputs = toolset.execute_tool_calls(calls, thread_id, &run.id).await;
        self.submit_tool_outputs_to_run(thread_id, &run.id, &outputs).await
    }
}

impl std::fmt::Debug for AgentsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentsClient")
            .field("endpoint", &self.inner.endpoint)
            .finish()
    }
}

async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

fn non_empty<'a>(label: &str, value: &'a str) -> Result<&'a str, FoundryError> {
    if value.trim().is_empty() {
        return Err(FoundryError::InvalidArgument(format!("{label} must not be empty")));
    }
    Ok(value)
}

fn run_path(thread_id: &str, run_id: &str) -> Result<String, FoundryError> {
    Ok(format!(
        "/threads/{}/runs/{}",
        non_empty("thread_id", thread_id)?,
        non_empty("run_id", run_id)?
    ))
}

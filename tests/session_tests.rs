//! Session workflow against an in-memory agents service and over HTTP.

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use foundry_agents::auth::StaticTokenCredential;
use foundry_agents::client::{AgentsApi, ProjectClient, RunWaitOptions};
use foundry_agents::config::{ProjectConfig, ENDPOINT_OVERRIDE_ENV};
use foundry_agents::error::{ErrorCategory, FoundryError};
use foundry_agents::session::{
    run_session_with, SessionEvent, SessionObserver, SessionRequest, DEFAULT_MESSAGE,
};
use foundry_agents::tools::{builtin, CodeInterpreterTool, FunctionTool, ToolSet};
use foundry_agents::types::{
    Agent, AgentThread, CreateAgentOptions, DeletionStatus, ListMessagesOptions, ListResponse,
    MessageContent, MessageRole, MessageText, RequiredAction, RequiredFunction, RequiredToolCall,
    RunError, RunStatus, SubmitToolOutputsDetails, ThreadMessage, ThreadRun,
};

#[derive(Default)]
struct FakeAgents {
    calls: Mutex<Vec<String>>,
    messages: Mutex<Vec<ThreadMessage>>,
    deleted: Mutex<Vec<String>>,
    created_with: Mutex<Option<CreateAgentOptions>>,
    final_status: Option<RunStatus>,
    tool_outputs: Mutex<Vec<String>>,
}

impl FakeAgents {
    fn finishing_with(status: RunStatus) -> Self {
        Self {
            final_status: Some(status),
            ..Self::default()
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn message(id: &str, thread_id: &str, role: MessageRole, text: &str) -> ThreadMessage {
    ThreadMessage {
        id: id.into(),
        object: "thread.message".into(),
        created_at: Utc::now(),
        thread_id: thread_id.into(),
        status: None,
        role,
        content: vec![MessageContent::Text {
            text: MessageText {
                value: text.into(),
                annotations: vec![],
            },
        }],
        assistant_id: None,
        run_id: None,
        metadata: HashMap::new(),
    }
}

fn run(status: RunStatus) -> ThreadRun {
    ThreadRun {
        id: "run_1".into(),
        object: "thread.run".into(),
        thread_id: "thread_1".into(),
        assistant_id: "asst_1".into(),
        status,
        required_action: None,
        last_error: None,
        model: "gpt-4o-mini".into(),
        instructions: None,
        tools: vec![],
        created_at: Utc::now(),
        started_at: None,
        completed_at: None,
        failed_at: None,
        cancelled_at: None,
        expires_at: None,
        usage: None,
        metadata: HashMap::new(),
    }
}

#[async_trait]
impl AgentsApi for FakeAgents {
    async fn create_agent(&self, options: &CreateAgentOptions) -> Result<Agent, FoundryError> {
        self.record("create_agent");
        *self.created_with.lock().unwrap() = Some(options.clone());
        Ok(Agent {
            id: "asst_1".into(),
            object: "assistant".into(),
            created_at: Utc::now(),
            name: options.name.clone(),
            description: None,
            model: options.model.clone(),
            instructions: options.instructions.clone(),
            tools: options.tools.clone(),
            temperature: None,
            top_p: None,
            metadata: HashMap::new(),
        })
    }

    async fn create_thread(&self) -> Result<AgentThread, FoundryError> {
        self.record("create_thread");
        Ok(AgentThread {
            id: "thread_1".into(),
            object: "thread".into(),
            created_at: Utc::now(),
            metadata: HashMap::new(),
        })
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, FoundryError> {
        self.record("create_message");
        let created = message("msg_1", thread_id, role, content);
        self.messages.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn create_and_process_run(
        &self,
        thread_id: &str,
        _agent_id: &str,
        toolset: &ToolSet,
        _options: RunWaitOptions,
    ) -> Result<ThreadRun, FoundryError> {
        self.record("create_and_process_run");

        // The model asks for the email to be sent before answering.
        let mut pending = run(RunStatus::RequiresAction);
        pending.required_action = Some(RequiredAction::SubmitToolOutputs {
            submit_tool_outputs: SubmitToolOutputsDetails {
                tool_calls: vec![RequiredToolCall {
                    id: "call_1".into(),
                    kind: "function".into(),
                    function: RequiredFunction {
                        name: "send_email".into(),
                        arguments: r#"{"recipient":"user@example.com","subject":"Weather","body":"Sunny"}"#
                            .into(),
                    },
                }],
            },
        });
        let outputs = toolset
            .execute_tool_calls(pending.pending_tool_calls(), thread_id, &pending.id)
            .await;
        self.tool_outputs
            .lock()
            .unwrap()
            .extend(outputs.into_iter().map(|o| o.output));

        let status = self.final_status.unwrap_or(RunStatus::Completed);
        let mut finished = run(status);
        if status == RunStatus::Failed {
            finished.last_error = Some(RunError {
                code: "server_error".into(),
                message: "model overloaded".into(),
            });
        } else {
            self.messages.lock().unwrap().push(message(
                "msg_2",
                thread_id,
                MessageRole::Assistant,
                "I sent the email with the current time and New York weather.",
            ));
        }
        Ok(finished)
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<DeletionStatus, FoundryError> {
        self.record("delete_agent");
        let mut deleted = self.deleted.lock().unwrap();
        if deleted.iter().any(|id| id == agent_id) {
            return Err(FoundryError::api(404, format!("No assistant found with id '{agent_id}'.")));
        }
        deleted.push(agent_id.to_string());
        Ok(DeletionStatus {
            id: agent_id.into(),
            deleted: true,
            object: "assistant.deleted".into(),
        })
    }

    async fn list_messages(
        &self,
        _thread_id: &str,
        _options: &ListMessagesOptions,
    ) -> Result<ListResponse<ThreadMessage>, FoundryError> {
        self.record("list_messages");
        Ok(ListResponse {
            object: "list".into(),
            data: self.messages.lock().unwrap().clone(),
            first_id: None,
            last_id: None,
            has_more: false,
        })
    }

    async fn list_all_messages(&self, _thread_id: &str) -> Result<Vec<ThreadMessage>, FoundryError> {
        self.record("list_all_messages");
        Ok(self.messages.lock().unwrap().clone())
    }
}

#[derive(Default)]
struct RecordingObserver {
    lines: Mutex<Vec<String>>,
}

impl SessionObserver for RecordingObserver {
    fn on_event(&self, event: &SessionEvent) {
        self.lines.lock().unwrap().push(event.to_string());
    }
}

fn sample_toolset() -> ToolSet {
    ToolSet::new()
        .add(FunctionTool::new(builtin::user_functions()).unwrap())
        .unwrap()
        .add(CodeInterpreterTool::new())
        .unwrap()
}

#[tokio::test]
async fn completed_session_runs_steps_in_order() {
    let api = FakeAgents::default();
    let observer = RecordingObserver::default();

    let report = run_session_with(&api, &sample_toolset(), &SessionRequest::default(), &observer)
        .await
        .unwrap();

    assert_eq!(
        api.calls(),
        vec![
            "create_agent",
            "create_thread",
            "create_message",
            "create_and_process_run",
            "delete_agent",
            "list_all_messages",
        ]
    );
    assert_eq!(report.agent_id, "asst_1");
    assert_eq!(report.thread_id, "thread_1");
    assert_eq!(report.message_id, "msg_1");
    assert!(report.succeeded());

    // The posted message survives intact, followed by the reply.
    assert!(report.messages.len() >= 2);
    assert_eq!(report.messages[0].role, MessageRole::User);
    assert_eq!(
        report.messages[0].text(),
        "Hello, send an email with the datetime and weather information in New York?"
    );

    let lines = observer.lines.lock().unwrap().clone();
    assert_eq!(lines[0], "Created agent, ID: asst_1");
    assert_eq!(lines[1], "Created thread, ID: thread_1");
    assert_eq!(lines[2], "Created message, ID: msg_1");
    assert_eq!(lines[3], "Run finished with status: completed");
    assert_eq!(lines[4], "Deleted agent");
    assert!(lines[5].starts_with("Messages: 2 message(s)"));
}

#[tokio::test]
async fn agent_is_created_with_sample_configuration() {
    let api = FakeAgents::default();
    run_session_with(
        &api,
        &sample_toolset(),
        &SessionRequest::default(),
        &RecordingObserver::default(),
    )
    .await
    .unwrap();

    let options = api.created_with.lock().unwrap().clone().unwrap();
    assert_eq!(options.model, "gpt-4o-mini");
    assert_eq!(options.name.as_deref(), Some("my-assistant"));
    assert_eq!(options.instructions.as_deref(), Some("You are a helpful assistant"));
    let names: Vec<_> = options.tools.iter().filter_map(|t| t.function_name()).collect();
    assert!(names.contains(&"send_email"));
    assert_eq!(options.tools.len(), 5);

    let outputs = api.tool_outputs.lock().unwrap().clone();
    assert_eq!(outputs, vec![r#"{"message":"Email successfully sent to user@example.com."}"#]);
}

#[tokio::test]
async fn failed_run_is_reported_and_session_continues() {
    let api = FakeAgents::finishing_with(RunStatus::Failed);
    let observer = RecordingObserver::default();

    let report = run_session_with(&api, &sample_toolset(), &SessionRequest::default(), &observer)
        .await
        .unwrap();

    assert_eq!(report.run.status, RunStatus::Failed);
    assert!(!report.succeeded());
    assert_eq!(api.calls()[4..].to_vec(), vec!["delete_agent", "list_all_messages"]);

    let lines = observer.lines.lock().unwrap().clone();
    assert_eq!(lines[3], "Run finished with status: failed");
    assert_eq!(lines[4], "Run failed: server_error: model overloaded");
    assert_eq!(lines[5], "Deleted agent");
    // Only the user's message: the failed run produced no reply.
    assert_eq!(report.messages.len(), 1);
}

#[tokio::test]
async fn second_delete_of_same_agent_is_not_found() {
    let api = FakeAgents::default();
    let report = run_session_with(
        &api,
        &sample_toolset(),
        &SessionRequest::default(),
        &RecordingObserver::default(),
    )
    .await
    .unwrap();

    let err = api.delete_agent(&report.agent_id).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[tokio::test]
async fn missing_connection_string_fails_before_any_call() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let endpoint = server.uri();
    let result = ProjectConfig::from_lookup(|key| (key == ENDPOINT_OVERRIDE_ENV).then(|| endpoint.clone()))
        .and_then(|config| {
            ProjectClient::new(config, Arc::new(StaticTokenCredential::from_jwt(common::TOKEN)))
        });

    match result {
        Err(FoundryError::Configuration(msg)) => assert!(msg.contains("PROJECT_CONNECTION_STRING")),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[tokio::test]
async fn session_over_http_answers_tool_call_and_lists_after_failed_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/assistants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::agent_json("asst_1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::thread_json("thread_1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::message_json(
            "msg_1",
            "thread_1",
            "user",
            DEFAULT_MESSAGE,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::run_json("run_1", "thread_1", "queued")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::requires_action_json(
            "run_1",
            "thread_1",
            &[("call_1", "fetch_weather", r#"{"location":"New York"}"#)],
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs/run_1/submit_tool_outputs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::run_json("run_1", "thread_1", "in_progress")),
        )
        .expect(1)
        .mount(&server)
        .await;
    let mut failed = common::run_json("run_1", "thread_1", "failed");
    failed["last_error"] = json!({"code": "server_error", "message": "model overloaded"});
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(failed))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/assistants/asst_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "asst_1", "object": "assistant.deleted", "deleted": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [common::message_json("msg_1", "thread_1", "user", DEFAULT_MESSAGE)],
            "first_id": "msg_1",
            "last_id": "msg_1",
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let agents = common::client_for(&server).agents();
    let observer = RecordingObserver::default();
    let report = run_session_with(&agents, &sample_toolset(), &SessionRequest::default(), &observer)
        .await
        .unwrap();

    assert_eq!(report.run.status, RunStatus::Failed);
    assert_eq!(report.messages.len(), 1);
    assert_eq!(report.messages[0].role, MessageRole::User);
    assert_eq!(report.messages[0].text(), DEFAULT_MESSAGE);

    let requests = server.received_requests().await.unwrap_or_default();
    let order: Vec<String> = requests
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect();
    assert_eq!(
        order,
        vec![
            "POST /assistants",
            "POST /threads",
            "POST /threads/thread_1/messages",
            "POST /threads/thread_1/runs",
            "GET /threads/thread_1/runs/run_1",
            "POST /threads/thread_1/runs/run_1/submit_tool_outputs",
            "GET /threads/thread_1/runs/run_1",
            "DELETE /assistants/asst_1",
            "GET /threads/thread_1/messages",
        ]
    );

    let lines = observer.lines.lock().unwrap().clone();
    assert_eq!(lines[4], "Run failed: server_error: model overloaded");
    assert_eq!(lines[5], "Deleted agent");
}

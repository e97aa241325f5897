use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tagent::{
    Agent, AgentErrorKind, AgentPolicy, AgentRuntimeHooks, CancellationToken, FINAL_RESULT_TOOL,
    OutputMode, PromptError, Turn,
};
use tcommon::RunId;
use tprovider::{
    Message, ModelProvider, ModelRequest, ModelResponse, OutputItem, ProviderError,
    ProviderFuture, ProviderId, StopReason, TokenUsage, ToolCall,
};
use tschema::{FieldSpec, ObjectSchema, StructuredOutput};
use ttooling::{ToolDescriptor, ToolError, optional_bool};

#[derive(Debug, Deserialize, PartialEq)]
struct Verdict {
    advice: String,
    risk: i64,
}

impl StructuredOutput for Verdict {
    fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .field(FieldSpec::string("advice").describe("Advice returned to the customer"))
            .field(FieldSpec::integer("risk").range(0, 10))
    }
}

struct Account {
    name: String,
    balance_lookups: Mutex<u32>,
}

impl Account {
    fn john() -> Self {
        Self {
            name: "John".to_string(),
            balance_lookups: Mutex::new(0),
        }
    }
}

/// Replays scripted responses in order, repeating the last one once the
/// script runs out.
struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ModelResponse, ProviderError>>>,
    last: Mutex<Option<Result<ModelResponse, ProviderError>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<ModelResponse, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ModelProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Ollama
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);

            let next = self.script.lock().expect("script lock").pop_front();
            let mut last = self.last.lock().expect("last lock");
            match next {
                Some(response) => {
                    *last = Some(response.clone());
                    response
                }
                None => last
                    .clone()
                    .unwrap_or_else(|| Err(ProviderError::other("script is empty"))),
            }
        })
    }
}

struct PendingProvider;

impl ModelProvider for PendingProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Ollama
    }

    fn complete<'a>(
        &'a self,
        _request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(std::future::pending())
    }
}

#[derive(Default)]
struct RecordingHooks {
    events: Mutex<Vec<String>>,
}

impl AgentRuntimeHooks for RecordingHooks {
    fn on_run_start(&self, _run_id: &RunId, query: &str) {
        self.push(format!("start:{query}"));
    }

    fn on_model_request(&self, _run_id: &RunId, request_number: u32) {
        self.push(format!("request:{request_number}"));
    }

    fn on_tool_dispatched(&self, _run_id: &RunId, tool_call: &ToolCall, is_error: bool) {
        self.push(format!("tool:{}:{is_error}", tool_call.name));
    }

    fn on_corrective_retry(&self, _run_id: &RunId, retry: u32, _reason: &str) {
        self.push(format!("retry:{retry}"));
    }

    fn on_run_success(&self, _run_id: &RunId, model_requests: u32, _elapsed: Duration) {
        self.push(format!("success:{model_requests}"));
    }
}

impl RecordingHooks {
    fn push(&self, event: String) {
        self.events.lock().expect("events lock").push(event);
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().expect("events lock").clone()
    }
}

fn text(content: &str) -> Result<ModelResponse, ProviderError> {
    Ok(response(vec![OutputItem::Message(Message::assistant(content))]))
}

fn calls(calls: &[(&str, &str, &str)]) -> Result<ModelResponse, ProviderError> {
    Ok(response(
        calls
            .iter()
            .map(|(id, name, arguments)| {
                OutputItem::ToolCall(ToolCall {
                    id: id.to_string(),
                    name: name.to_string(),
                    arguments: arguments.to_string(),
                })
            })
            .collect(),
    ))
}

fn response(output: Vec<OutputItem>) -> ModelResponse {
    ModelResponse {
        provider: ProviderId::Ollama,
        model: "mistral".to_string(),
        output,
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage::default(),
    }
}

fn balance_tool() -> ToolDescriptor {
    ToolDescriptor::new(
        "customer_balance",
        "Returns the customer's current account balance",
        ObjectSchema::new().field(FieldSpec::boolean("include_pending")),
    )
}

fn agent_with(provider: Arc<dyn ModelProvider>, policy: AgentPolicy) -> Agent<Account, Verdict> {
    Agent::<Account, Verdict>::builder(provider, policy)
        .instructions("You are a support agent in our bank.")
        .fragment_fn(|account| {
            Box::pin(async move { Ok(format!("The customer's name is {:?}", account.name)) })
        })
        .tool_fn(balance_tool(), |context, args| {
            Box::pin(async move {
                let include_pending = optional_bool(&args, "include_pending")?.unwrap_or(false);
                *context.deps.balance_lookups.lock().expect("lookups lock") += 1;
                Ok(json!(if include_pending { "$123.45" } else { "$100.00" }))
            })
        })
        .build()
        .expect("agent should build")
}

fn agent(provider: Arc<dyn ModelProvider>) -> Agent<Account, Verdict> {
    agent_with(provider, AgentPolicy::new("mistral"))
}

#[tokio::test]
async fn valid_text_answer_completes_in_one_request() {
    let provider = ScriptedProvider::new(vec![text(r#"{"advice": "All good", "risk": 1}"#)]);
    let agent = agent(provider.clone());

    let outcome = agent
        .run("What is my balance?", &Account::john())
        .await
        .expect("run should succeed");

    assert_eq!(
        outcome.output,
        Verdict {
            advice: "All good".to_string(),
            risk: 1,
        }
    );
    assert_eq!(outcome.model_requests, 1);
    assert_eq!(outcome.retries_used, 0);

    let requests = provider.requests();
    assert_eq!(
        requests[0].system_prompt(),
        Some("You are a support agent in our bank.\n\nThe customer's name is \"John\"")
    );
    let tool_names: Vec<&str> = requests[0].tools.iter().map(|tool| tool.name.as_str()).collect();
    assert_eq!(tool_names, vec!["customer_balance", FINAL_RESULT_TOOL]);
}

#[tokio::test]
async fn tool_result_is_fed_back_before_final_result() {
    let provider = ScriptedProvider::new(vec![
        calls(&[("call_1", "customer_balance", r#"{"include_pending": true}"#)]),
        calls(&[(
            "call_2",
            FINAL_RESULT_TOOL,
            r#"{"advice": "Your balance is $123.45", "risk": 1}"#,
        )]),
    ]);
    let account = Account::john();
    let agent = agent(provider.clone());

    let outcome = agent
        .run("What is my balance?", &account)
        .await
        .expect("run should succeed");

    assert_eq!(outcome.output.advice, "Your balance is $123.45");
    assert_eq!(outcome.model_requests, 2);
    assert_eq!(*account.balance_lookups.lock().expect("lookups lock"), 1);

    let second = &provider.requests()[1];
    let tool_message = second
        .messages
        .iter()
        .find(|message| message.tool_call_id.as_deref() == Some("call_1"))
        .expect("tool result should be in the second request");
    assert_eq!(tool_message.content, "$123.45");

    assert!(matches!(
        outcome.transcript.last(),
        Some(Turn::ToolResult { content, is_error: false, .. }) if content == "Final result processed."
    ));
}

#[tokio::test]
async fn unknown_tool_costs_one_retry_and_lists_available_tools() {
    let provider = ScriptedProvider::new(vec![
        calls(&[("call_1", "transfer_funds", "{}")]),
        text(r#"{"advice": "Done", "risk": 0}"#),
    ]);
    let agent = agent(provider.clone());

    let outcome = agent
        .run("Move my money", &Account::john())
        .await
        .expect("run should recover");

    assert_eq!(outcome.retries_used, 1);
    assert_eq!(outcome.model_requests, 2);

    let feedback = outcome
        .transcript
        .iter()
        .find_map(|turn| match turn {
            Turn::ToolResult {
                content,
                is_error: true,
                ..
            } => Some(content.clone()),
            _ => None,
        })
        .expect("unknown tool should produce an error result");
    assert!(feedback.contains("transfer_funds"));
    assert!(feedback.contains("customer_balance"));
}

#[tokio::test]
async fn invalid_arguments_never_reach_the_handler() {
    let provider = ScriptedProvider::new(vec![
        calls(&[("call_1", "customer_balance", r#"{"include_pending": "yes"}"#)]),
        text(r#"{"advice": "Done", "risk": 0}"#),
    ]);
    let account = Account::john();
    let agent = agent(provider);

    let outcome = agent
        .run("What is my balance?", &account)
        .await
        .expect("run should recover");

    assert_eq!(outcome.retries_used, 1);
    assert_eq!(*account.balance_lookups.lock().expect("lookups lock"), 0);
}

#[tokio::test]
async fn exhausted_budget_fails_after_budget_plus_one_requests() {
    let provider = ScriptedProvider::new(vec![text("I would rather chat")]);
    let agent = agent_with(provider.clone(), AgentPolicy::new("mistral").with_max_retries(2));

    let error = agent
        .run("What is my balance?", &Account::john())
        .await
        .expect_err("run should exhaust retries");

    assert_eq!(error.kind, AgentErrorKind::UnexpectedModelBehavior);
    assert!(error.message.contains("maximum retries (2)"));
    assert_eq!(provider.requests().len(), 3);

    let correctives = error
        .transcript
        .iter()
        .filter(|turn| matches!(turn, Turn::Corrective(_)))
        .count();
    assert_eq!(correctives, 2);
}

#[tokio::test]
async fn zero_budget_fails_on_first_invalid_answer() {
    let provider = ScriptedProvider::new(vec![text(r#"{"advice": "Done"}"#)]);
    let agent = agent_with(provider.clone(), AgentPolicy::new("mistral").with_max_retries(0));

    let error = agent
        .run("What is my balance?", &Account::john())
        .await
        .expect_err("run should fail immediately");

    assert_eq!(error.kind, AgentErrorKind::UnexpectedModelBehavior);
    assert!(error.message.contains("risk"));
    assert_eq!(provider.requests().len(), 1);
}

#[tokio::test]
async fn corrective_feedback_lists_every_violation() {
    let provider = ScriptedProvider::new(vec![
        text(r#"{"risk": 15}"#),
        text(r#"{"advice": "Fixed", "risk": 5}"#),
    ]);
    let agent = agent(provider);

    let outcome = agent
        .run("What is my balance?", &Account::john())
        .await
        .expect("run should recover");

    let feedback = outcome
        .transcript
        .iter()
        .find_map(|turn| match turn {
            Turn::Corrective(feedback) => Some(feedback.clone()),
            _ => None,
        })
        .expect("corrective turn");
    assert!(feedback.contains("field `advice` is required but missing"));
    assert!(feedback.contains("field `risk` must be between 0 and 10, got 15"));
    assert_eq!(outcome.retries_used, 1);
}

#[tokio::test]
async fn failing_fragment_aborts_before_any_model_request() {
    let provider = ScriptedProvider::new(vec![text(r#"{"advice": "Done", "risk": 0}"#)]);
    let agent = Agent::<Account, Verdict>::builder(provider.clone(), AgentPolicy::new("mistral"))
        .fragment_fn(|_| Box::pin(async move { Err(PromptError::new("customer 999 not found")) }))
        .build()
        .expect("agent should build");

    let error = agent
        .run("What is my balance?", &Account::john())
        .await
        .expect_err("fragment failure should abort");

    assert_eq!(error.kind, AgentErrorKind::ContextResolution);
    assert!(error.message.contains("customer 999 not found"));
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn provider_failure_is_model_unavailable_with_transcript() {
    let provider = ScriptedProvider::new(vec![Err(ProviderError::unavailable("connection refused"))]);
    let agent = agent(provider);

    let error = agent
        .run("What is my balance?", &Account::john())
        .await
        .expect_err("provider failure should surface");

    assert_eq!(error.kind, AgentErrorKind::ModelUnavailable);
    assert!(error.message.contains("connection refused"));
    assert_eq!(error.transcript.len(), 2);
}

#[tokio::test]
async fn pre_cancelled_run_never_calls_the_model() {
    let provider = ScriptedProvider::new(vec![text(r#"{"advice": "Done", "risk": 0}"#)]);
    let agent = agent(provider.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let error = agent
        .run_with_cancellation("What is my balance?", &Account::john(), cancel)
        .await
        .expect_err("cancelled run should fail");

    assert_eq!(error.kind, AgentErrorKind::Cancelled);
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn cancellation_interrupts_a_pending_model_call() {
    let agent = agent(Arc::new(PendingProvider));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let error = agent
        .run_with_cancellation("What is my balance?", &Account::john(), cancel)
        .await
        .expect_err("cancelled run should fail");

    assert_eq!(error.kind, AgentErrorKind::Cancelled);
    assert_eq!(error.transcript.len(), 2);
}

#[test]
fn run_and_wait_drives_the_run_without_a_caller_runtime() {
    let provider = ScriptedProvider::new(vec![text(r#"{"advice": "All good", "risk": 2}"#)]);
    let agent = agent(provider);

    let outcome = agent
        .run_and_wait("What is my balance?", &Account::john())
        .expect("blocking run should succeed");

    assert_eq!(outcome.output.risk, 2);
}

#[tokio::test]
async fn run_and_wait_inside_a_runtime_is_a_runtime_error() {
    let provider = ScriptedProvider::new(vec![text(r#"{"advice": "All good", "risk": 2}"#)]);
    let agent = agent(provider.clone());

    let error = agent
        .run_and_wait("What is my balance?", &Account::john())
        .expect_err("nested blocking should be refused");

    assert_eq!(error.kind, AgentErrorKind::Runtime);
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn model_request_cap_stops_endless_tool_loops() {
    let provider = ScriptedProvider::new(vec![calls(&[(
        "call_1",
        "customer_balance",
        r#"{"include_pending": false}"#,
    )])]);
    let agent = agent_with(
        provider.clone(),
        AgentPolicy::new("mistral").with_max_model_requests(2),
    );

    let error = agent
        .run("What is my balance?", &Account::john())
        .await
        .expect_err("request cap should stop the run");

    assert_eq!(error.kind, AgentErrorKind::UnexpectedModelBehavior);
    assert_eq!(provider.requests().len(), 2);
}

#[tokio::test]
async fn final_result_alongside_other_tools_is_deferred() {
    let provider = ScriptedProvider::new(vec![
        calls(&[
            ("call_1", "customer_balance", r#"{"include_pending": true}"#),
            ("call_2", FINAL_RESULT_TOOL, r#"{"advice": "Too early", "risk": 0}"#),
        ]),
        calls(&[(
            "call_3",
            FINAL_RESULT_TOOL,
            r#"{"advice": "Your balance is $123.45", "risk": 0}"#,
        )]),
    ]);
    let agent = agent(provider);

    let outcome = agent
        .run("What is my balance?", &Account::john())
        .await
        .expect("run should succeed");

    assert_eq!(outcome.output.advice, "Your balance is $123.45");
    assert_eq!(outcome.model_requests, 2);
    assert_eq!(outcome.retries_used, 0);
}

#[tokio::test]
async fn handler_failures_are_reported_without_spending_budget() {
    let provider = ScriptedProvider::new(vec![
        calls(&[("call_1", "ledger", "")]),
        text(r#"{"advice": "Ledger is offline, try later", "risk": 3}"#),
    ]);
    let agent = Agent::<Account, Verdict>::builder(provider, AgentPolicy::new("mistral").with_max_retries(0))
        .tool_fn(
            ToolDescriptor::new("ledger", "Reads the ledger", ObjectSchema::new()),
            |_, _| Box::pin(async move { Err(ToolError::execution("ledger offline")) }),
        )
        .build()
        .expect("agent should build");

    let outcome = agent
        .run("What is my balance?", &Account::john())
        .await
        .expect("handler failure should not end the run");

    assert_eq!(outcome.retries_used, 0);
    assert!(outcome.transcript.iter().any(|turn| matches!(
        turn,
        Turn::ToolResult { content, is_error: true, .. } if content == "tool `ledger` failed: ledger offline"
    )));
}

#[tokio::test]
async fn text_mode_catalog_has_no_final_result_tool() {
    let provider = ScriptedProvider::new(vec![text(r#"{"advice": "All good", "risk": 1}"#)]);
    let agent = agent_with(
        provider.clone(),
        AgentPolicy::new("mistral").with_output_mode(OutputMode::Text),
    );

    agent
        .run("What is my balance?", &Account::john())
        .await
        .expect("run should succeed");

    let names: Vec<String> = provider.requests()[0]
        .tools
        .iter()
        .map(|tool| tool.name.clone())
        .collect();
    assert_eq!(names, vec!["customer_balance".to_string()]);
}

#[tokio::test]
async fn hooks_observe_the_corrective_cycle() {
    let provider = ScriptedProvider::new(vec![
        text("not json"),
        calls(&[("call_1", "customer_balance", r#"{"include_pending": false}"#)]),
        text(r#"{"advice": "Done", "risk": 0}"#),
    ]);
    let hooks = Arc::new(RecordingHooks::default());
    let agent = Agent::<Account, Verdict>::builder(provider, AgentPolicy::new("mistral"))
        .tool_fn(balance_tool(), |_, _| Box::pin(async move { Ok(json!("$1.00")) }))
        .hooks(hooks.clone())
        .build()
        .expect("agent should build");

    agent
        .run("balance", &Account::john())
        .await
        .expect("run should succeed");

    assert_eq!(
        hooks.events(),
        vec![
            "start:balance",
            "request:1",
            "retry:1",
            "request:2",
            "tool:customer_balance:false",
            "request:3",
            "success:3",
        ]
    );
}

#[test]
fn duplicate_tool_names_fail_at_build() {
    let provider = ScriptedProvider::new(Vec::new());
    let error = Agent::<Account, Verdict>::builder(provider, AgentPolicy::new("mistral"))
        .tool_fn(balance_tool(), |_, _| Box::pin(async move { Ok(json!(1)) }))
        .tool_fn(balance_tool(), |_, _| Box::pin(async move { Ok(json!(2)) }))
        .build()
        .expect_err("duplicate registration should be rejected");

    assert_eq!(error.kind, AgentErrorKind::Configuration);
    assert!(error.message.contains("customer_balance"));
}

#[test]
fn final_result_name_is_reserved_in_tool_mode() {
    let provider = ScriptedProvider::new(Vec::new());
    let error = Agent::<Account, Verdict>::builder(provider, AgentPolicy::new("mistral"))
        .tool_fn(
            ToolDescriptor::new(FINAL_RESULT_TOOL, "shadow", ObjectSchema::new()),
            |_, _| Box::pin(async move { Ok(json!(null)) }),
        )
        .build()
        .expect_err("reserved name should be rejected");

    assert_eq!(error.kind, AgentErrorKind::Configuration);
}

#[tokio::test]
async fn blank_system_prompt_is_left_out_of_the_request() {
    let provider = ScriptedProvider::new(vec![text(r#"{"advice": "All good", "risk": 1}"#)]);
    let agent = Agent::<Account, Verdict>::builder(provider.clone(), AgentPolicy::new("mistral"))
        .fragment_fn(|_| Box::pin(async move { Ok(String::new()) }))
        .build()
        .expect("agent should build");

    let outcome = agent
        .run("What is my balance?", &Account::john())
        .await
        .expect("run should succeed");

    let request = &provider.requests()[0];
    assert_eq!(request.system_prompt(), None);
    assert_eq!(request.messages[0].role, tprovider::Role::User);
    assert!(matches!(
        outcome.transcript.turns().first(),
        Some(Turn::UserPrompt(query)) if query == "What is my balance?"
    ));
}

#[tokio::test]
async fn blank_query_is_rejected_before_the_model_is_called() {
    let provider = ScriptedProvider::new(vec![text(r#"{"advice": "All good", "risk": 1}"#)]);
    let agent = agent(provider.clone());

    let error = agent
        .run("   ", &Account::john())
        .await
        .expect_err("blank query should be rejected");

    assert_eq!(error.kind, AgentErrorKind::Configuration);
    assert!(error.transcript.is_empty());
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn cancellation_interrupts_a_running_tool() {
    let provider = ScriptedProvider::new(vec![calls(&[(
        "call_1",
        "ledger",
        r#"{}"#,
    )])]);
    let agent = Agent::<Account, Verdict>::builder(provider.clone(), AgentPolicy::new("mistral"))
        .tool_fn(
            ToolDescriptor::new("ledger", "Reads the ledger", ObjectSchema::new()),
            |_, _| Box::pin(std::future::pending()),
        )
        .build()
        .expect("agent should build");
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let error = agent
        .run_with_cancellation("What is my balance?", &Account::john(), cancel)
        .await
        .expect_err("cancelled run should fail");

    assert_eq!(error.kind, AgentErrorKind::Cancelled);
    assert!(error.message.contains("ledger"));
    assert_eq!(provider.requests().len(), 1);
    assert!(matches!(error.transcript.last(), Some(Turn::ToolCalls { .. })));
}

#[tokio::test]
async fn cancellation_between_tool_calls_skips_the_rest() {
    let provider = ScriptedProvider::new(vec![calls(&[
        ("call_1", "freeze", "{}"),
        ("call_2", "customer_balance", r#"{"include_pending": true}"#),
    ])]);
    let account = Account::john();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let agent = Agent::<Account, Verdict>::builder(provider, AgentPolicy::new("mistral"))
        .tool_fn(
            ToolDescriptor::new("freeze", "Freezes the account", ObjectSchema::new()),
            move |_, _| {
                let trigger = trigger.clone();
                Box::pin(async move {
                    trigger.cancel();
                    Ok(json!("frozen"))
                })
            },
        )
        .tool_fn(balance_tool(), |context, _| {
            Box::pin(async move {
                *context.deps.balance_lookups.lock().expect("lookups lock") += 1;
                Ok(json!("$123.45"))
            })
        })
        .build()
        .expect("agent should build");

    let error = agent
        .run_with_cancellation("Freeze and check", &account, cancel)
        .await
        .expect_err("cancelled run should fail");

    assert_eq!(error.kind, AgentErrorKind::Cancelled);
    assert!(error.message.contains("customer_balance"));
    assert_eq!(*account.balance_lookups.lock().expect("lookups lock"), 0);
    assert!(matches!(
        error.transcript.last(),
        Some(Turn::ToolResult { name, content, .. }) if name == "freeze" && content == "frozen"
    ));
}

/// Looks up the balance once, then answers with the user's own query as
/// advice, so interleaved runs can be told apart.
struct EchoProvider;

impl ModelProvider for EchoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Ollama
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;

            let query = request
                .messages
                .iter()
                .find(|message| message.role == tprovider::Role::User)
                .map(|message| message.content.clone())
                .unwrap_or_default();
            let looked_up = request
                .messages
                .iter()
                .any(|message| message.tool_call_id.is_some());

            if looked_up {
                text(&json!({"advice": query, "risk": 1}).to_string())
            } else {
                calls(&[("call_1", "customer_balance", r#"{"include_pending": true}"#)])
            }
        })
    }
}

#[tokio::test]
async fn concurrent_runs_on_a_cloned_agent_keep_separate_transcripts() {
    let first_agent = agent(Arc::new(EchoProvider));
    let second_agent = first_agent.clone();
    let (first_account, second_account) = (Account::john(), Account::john());

    let (first, second) = tokio::join!(
        first_agent.run("What is my balance?", &first_account),
        second_agent.run("Please block my card", &second_account),
    );
    let first = first.expect("first run should succeed");
    let second = second.expect("second run should succeed");

    assert_eq!(first.output.advice, "What is my balance?");
    assert_eq!(second.output.advice, "Please block my card");
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.transcript.len(), second.transcript.len());
    assert!(!first.transcript.to_string().contains("block my card"));
    assert!(!second.transcript.to_string().contains("What is my balance?"));
    assert_eq!(*first_account.balance_lookups.lock().expect("lookups lock"), 1);
    assert_eq!(*second_account.balance_lookups.lock().expect("lookups lock"), 1);
}

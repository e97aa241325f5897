use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tbank::{
    BALANCE_QUERY, CustomerDatabase, LOST_CARD_QUERY, SupportDependencies, support_agent,
};
use tether::{
    AgentErrorKind, AgentPolicy, FINAL_RESULT_TOOL, Message, ModelProvider, ModelRequest,
    ModelResponse, OutputItem, ProviderError, ProviderFuture, ProviderId, StopReason, TokenUsage,
    ToolCall, Turn,
};

/// Plays back canned model responses and records every request it saw.
struct ScriptedModel {
    script: Mutex<VecDeque<ModelResponse>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    fn new(script: Vec<ModelResponse>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ModelProvider for ScriptedModel {
    fn id(&self) -> ProviderId {
        ProviderId::Ollama
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);

            let mut script = self.script.lock().expect("script lock");
            // The final entry repeats forever.
            let response = if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            };
            response.ok_or_else(|| ProviderError::other("script is empty"))
        })
    }
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

fn tool_call(id: &str, name: &str, arguments: &str) -> ModelResponse {
    response(vec![OutputItem::ToolCall(ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    })])
}

fn answer(text: &str) -> ModelResponse {
    response(vec![OutputItem::Message(Message::assistant(text))])
}

fn seeded(customer_id: u64) -> SupportDependencies {
    SupportDependencies::new(customer_id, Arc::new(CustomerDatabase::seeded()))
}

#[tokio::test]
async fn balance_query_reports_the_balance_with_low_risk() {
    let model = ScriptedModel::new(vec![
        tool_call("call_1", "customer_balance", r#"{"include_pending": true}"#),
        tool_call(
            "call_2",
            FINAL_RESULT_TOOL,
            r#"{"support_advice": "Hello John, your current account balance, including pending transactions, is $123.45.", "block_card": false, "risk": 1}"#,
        ),
    ]);
    let agent = support_agent(model.clone(), AgentPolicy::new("mistral")).expect("agent");
    let deps = seeded(123);

    let outcome = agent
        .run(BALANCE_QUERY, &deps)
        .await
        .expect("balance query should succeed");

    assert!((0..=10).contains(&outcome.output.risk));
    assert!(outcome.output.support_advice.contains("$123.45"));
    assert!(!outcome.output.block_card);

    let requests = model.requests();
    let system_prompt = requests[0].system_prompt().expect("system prompt first");
    assert!(system_prompt.starts_with("You are a support agent in our bank"));
    assert!(system_prompt.ends_with("The customer's name is 'John'"));

    assert!(outcome.transcript.iter().any(|turn| matches!(
        turn,
        Turn::ToolResult { name, content, is_error: false, .. }
            if name == "customer_balance" && content == "$123.45"
    )));
}

#[tokio::test]
async fn lost_card_query_blocks_the_card() {
    let model = ScriptedModel::new(vec![
        tool_call("call_1", "block_card", r#"{"include_pending": false}"#),
        answer(
            r#"{"support_advice": "I'm sorry to hear that, John. We are temporarily blocking your card to prevent unauthorized transactions.", "block_card": true, "risk": 8}"#,
        ),
    ]);
    let agent = support_agent(model, AgentPolicy::new("mistral")).expect("agent");
    let deps = seeded(123);

    let outcome = agent
        .run(LOST_CARD_QUERY, &deps)
        .await
        .expect("lost card query should succeed");

    assert!(outcome.output.block_card);
    assert!(deps.db.card_blocked(123).await.expect("john"));
    assert!(!deps.db.card_blocked(456).await.expect("kawya"));
}

#[tokio::test]
async fn unknown_customer_fails_before_the_model_is_called() {
    let model = ScriptedModel::new(vec![answer(
        r#"{"support_advice": "unused", "block_card": false, "risk": 0}"#,
    )]);
    let agent = support_agent(model.clone(), AgentPolicy::new("mistral")).expect("agent");

    let error = agent
        .run(BALANCE_QUERY, &seeded(999))
        .await
        .expect_err("unknown customer should fail");

    assert_eq!(error.kind, AgentErrorKind::ContextResolution);
    assert!(error.message.contains("customer 999 not found"));
    assert!(model.requests().is_empty());
}

#[tokio::test]
async fn persistent_out_of_range_risk_exhausts_the_budget() {
    let model = ScriptedModel::new(vec![answer(
        r#"{"support_advice": "Hello John", "block_card": false, "risk": 15}"#,
    )]);
    let agent = support_agent(model.clone(), AgentPolicy::new("mistral").with_max_retries(2))
        .expect("agent");

    let error = agent
        .run(BALANCE_QUERY, &seeded(123))
        .await
        .expect_err("budget should run out");

    assert_eq!(error.kind, AgentErrorKind::UnexpectedModelBehavior);
    assert!(error.message.contains("risk"));
    assert_eq!(model.requests().len(), 3);

    let correctives: Vec<&Turn> = error
        .transcript
        .iter()
        .filter(|turn| matches!(turn, Turn::Corrective(_)))
        .collect();
    assert_eq!(correctives.len(), 2);
    assert!(correctives.iter().all(|turn| turn.to_string().contains("between 0 and 10")));
}

#[test]
fn blocking_entry_point_runs_the_balance_query() {
    let model = ScriptedModel::new(vec![answer(
        r#"{"support_advice": "John, your balance is $123.45.", "block_card": false, "risk": 1}"#,
    )]);
    let agent = support_agent(model, AgentPolicy::new("mistral")).expect("agent");

    let outcome = agent
        .run_and_wait(BALANCE_QUERY, &seeded(123))
        .expect("blocking run should succeed");

    assert_eq!(outcome.output.risk, 1);
    assert_eq!(outcome.model_requests, 1);
}

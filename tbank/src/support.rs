//! The bank-support agent: instructions, customer-name fragment, and the
//! balance and card-blocking tools.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tether::{
    Agent, AgentError, AgentPolicy, BoxFuture, FieldSpec, ModelProvider, ObjectSchema,
    PromptError, PromptFragment, RunContext, SafeAgentHooks, SafeToolHooks, StructuredOutput,
    Tool, ToolDescriptor, ToolError, ToolFuture, TracingObservabilityHooks, required_bool,
};

use crate::CustomerDatabase;

pub const SUPPORT_INSTRUCTIONS: &str = "You are a support agent in our bank, give the \
customer support and judge the risk level(0-10) of their query. \
If blocking the card is necessary, return true. \
Reply using the customer's name.";

pub const BALANCE_QUERY: &str = "What is my balance?";
pub const LOST_CARD_QUERY: &str =
    "I just lost my card! I have needed to block the card. please block the card";

#[derive(Debug, Clone)]
pub struct SupportDependencies {
    pub customer_id: u64,
    pub db: Arc<CustomerDatabase>,
}

impl SupportDependencies {
    pub fn new(customer_id: u64, db: Arc<CustomerDatabase>) -> Self {
        Self { customer_id, db }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportResult {
    pub support_advice: String,
    pub block_card: bool,
    pub risk: i64,
}

impl StructuredOutput for SupportResult {
    fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .field(FieldSpec::string("support_advice").describe("Advice returned to the customer"))
            .field(FieldSpec::boolean("block_card").describe("Whether to block their card"))
            .field(
                FieldSpec::integer("risk")
                    .describe("Risk level of query")
                    .range(0, 10),
            )
    }
}

pub type SupportAgent = Agent<SupportDependencies, SupportResult>;

pub fn support_agent(
    provider: Arc<dyn ModelProvider>,
    policy: AgentPolicy,
) -> Result<SupportAgent, AgentError> {
    SupportAgent::builder(provider, policy)
        .instructions(SUPPORT_INSTRUCTIONS)
        .fragment(CustomerNameFragment)
        .tool(CustomerBalanceTool::new())
        .tool(BlockCardTool::new())
        .hooks(Arc::new(SafeAgentHooks::new(TracingObservabilityHooks)))
        .tool_hooks(Arc::new(SafeToolHooks::new(TracingObservabilityHooks)))
        .build()
}

pub struct CustomerNameFragment;

impl PromptFragment<SupportDependencies> for CustomerNameFragment {
    fn render<'a>(
        &'a self,
        deps: &'a SupportDependencies,
    ) -> BoxFuture<'a, Result<String, PromptError>> {
        Box::pin(async move {
            let name = deps
                .db
                .customer_name(deps.customer_id)
                .await
                .map_err(PromptError::from_error)?;
            Ok(format!("The customer's name is '{name}'"))
        })
    }
}

fn include_pending_parameters() -> ObjectSchema {
    ObjectSchema::new().field(
        FieldSpec::boolean("include_pending")
            .describe("Whether pending transactions are taken into account"),
    )
}

pub struct CustomerBalanceTool {
    descriptor: ToolDescriptor,
}

impl CustomerBalanceTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "customer_balance",
                "Returns the customer's current account balance.",
                include_pending_parameters(),
            ),
        }
    }
}

impl Default for CustomerBalanceTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool<SupportDependencies> for CustomerBalanceTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn invoke<'a>(
        &'a self,
        context: RunContext<'a, SupportDependencies>,
        args: Map<String, Value>,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            let include_pending = required_bool(&args, "include_pending")?;
            let balance = context
                .deps
                .db
                .customer_balance(context.deps.customer_id, include_pending)
                .await
                .map_err(|err| ToolError::execution(err.to_string()))?;

            Ok(Value::String(format!("${balance:.2}")))
        })
    }
}

pub struct BlockCardTool {
    descriptor: ToolDescriptor,
}

impl BlockCardTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "block_card",
                "Block the customer's card.",
                include_pending_parameters(),
            ),
        }
    }
}

impl Default for BlockCardTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool<SupportDependencies> for BlockCardTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn invoke<'a>(
        &'a self,
        context: RunContext<'a, SupportDependencies>,
        args: Map<String, Value>,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            let include_pending = required_bool(&args, "include_pending")?;
            context
                .deps
                .db
                .block_card(context.deps.customer_id, include_pending)
                .await
                .map_err(|err| ToolError::execution(err.to_string()))?;

            Ok(Value::Bool(true))
        })
    }
}

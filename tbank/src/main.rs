use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tbank::{
    BALANCE_QUERY, CustomerDatabase, LOST_CARD_QUERY, SupportDependencies, support_agent,
};
use tether::tprovider::adapters::ollama::OLLAMA_DEFAULT_MODEL;
use tether::{
    AgentError, AgentPolicy, DEFAULT_MAX_RETRIES, ProviderBuildConfig, ProviderError,
    build_provider, parse_provider_id,
};
use tracing_subscriber::EnvFilter;

/// Runs the bank-support agent against the demo customer table.
#[derive(Debug, Parser)]
#[command(name = "tbank", version, about = "Bank-support agent demo")]
struct Cli {
    /// Model provider: `ollama` or `openai`.
    #[arg(long, env = "TETHER_PROVIDER", default_value = "ollama")]
    provider: String,

    #[arg(long, env = "TETHER_MODEL", default_value = OLLAMA_DEFAULT_MODEL)]
    model: String,

    /// Overrides the provider's default endpoint.
    #[arg(long, env = "TETHER_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "TETHER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "TETHER_CUSTOMER_ID", default_value_t = 123)]
    customer_id: u64,

    /// Corrective retries allowed per query.
    #[arg(long, env = "TETHER_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Queries to run instead of the two built-in ones. Repeatable.
    #[arg(long = "query")]
    queries: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("unknown provider `{0}`; expected `ollama` or `openai`")]
    UnknownProvider(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Agent(#[from] AgentError),
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let db = Arc::new(CustomerDatabase::seeded());

    let code = match run(&cli, Arc::clone(&db)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(DemoError::Agent(error)) if error.is_model_fault() => {
            eprintln!("the model kept producing invalid answers: {error}");
            eprintln!("transcript:\n{}", error.transcript);
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    };

    println!("customers:");
    for customer in db.blocking_snapshot() {
        println!(
            "  {:>4} {:<8} {:>10.2} {:<8} card_blocked={}",
            customer.id, customer.name, customer.balance, customer.status, customer.card_blocked
        );
    }

    code
}

fn run(cli: &Cli, db: Arc<CustomerDatabase>) -> Result<(), DemoError> {
    let provider_id = parse_provider_id(&cli.provider)
        .ok_or_else(|| DemoError::UnknownProvider(cli.provider.clone()))?;

    let mut config = ProviderBuildConfig::new(provider_id);
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(api_key) = &cli.api_key {
        config = config.with_api_key(api_key.clone());
    }

    let provider = build_provider(config)?;
    let policy = AgentPolicy::new(cli.model.clone()).with_max_retries(cli.max_retries);
    let agent = support_agent(provider, policy)?;
    let deps = SupportDependencies::new(cli.customer_id, db);

    let queries: Vec<&str> = if cli.queries.is_empty() {
        vec![BALANCE_QUERY, LOST_CARD_QUERY]
    } else {
        cli.queries.iter().map(String::as_str).collect()
    };

    for query in queries {
        tracing::info!(query, customer_id = cli.customer_id, "running support query");
        let outcome = agent.run_and_wait(query, &deps)?;

        println!("> {query}");
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome.output)
                .unwrap_or_else(|_| format!("{:?}", outcome.output))
        );
        println!(
            "  ({} model requests, {} corrective retries)",
            outcome.model_requests, outcome.retries_used
        );
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

//! Gatechat CLI entry point

use std::fs;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use eyre::{Context, Result};
use tracing::info;

use gatechat::approval::DecisionCollector;
use gatechat::chat::{ChatSession, ConsoleOperator};
use gatechat::cli::{Cli, get_log_path};
use gatechat::config::Config;
use gatechat::gateway::{Gateway, GatewayClient};
use gatechat::planner::{AgentPlanner, ConsoleSink, PlanRunner};
use gatechat::{llm, prompts};

fn setup_logging(verbose: bool) -> Result<()> {
    // Log to a file so the console stays clean for the conversation
    let log_path = get_log_path();
    let log_dir = log_path
        .parent()
        .ok_or_else(|| eyre::eyre!("Log path {} has no parent directory", log_path.display()))?;

    fs::create_dir_all(log_dir).context("Failed to create log directory")?;

    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let command = Cli::command().after_help(format!("Logs are written to: {}", get_log_path().display()));
    let cli = Cli::from_arg_matches(&command.get_matches())?;

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Fail fast on missing credentials, before the first turn
    config.validate()?;

    info!(
        "Gatechat loaded config: provider={}, model={}, toolkits={:?}",
        config.llm.provider, config.llm.model, config.gateway.toolkits
    );

    let llm = llm::create_client(&config.llm).context("Failed to create LLM client")?;

    let gateway: Arc<dyn Gateway> =
        Arc::new(GatewayClient::from_config(&config.gateway).context("Failed to create gateway client")?);

    let tools = gateway
        .list_tools(&config.gateway.toolkits, config.gateway.tool_limit)
        .await
        .context("Failed to list gateway tools")?;
    info!("Retrieved {} tool definitions", tools.len());

    let system_prompt = prompts::load(&config.prompt)?;

    let planner = Arc::new(AgentPlanner::new(
        llm,
        Arc::clone(&gateway),
        system_prompt,
        tools,
        config.gateway.approve_tools.clone(),
        config.llm.max_tokens,
    ));

    let runner = PlanRunner::new(planner, Arc::new(ConsoleSink));
    let collector = DecisionCollector::new(gateway);

    let mut operator = ConsoleOperator::new()?;
    let mut session = ChatSession::new(runner, collector, cli.session);

    session.run(&mut operator, cli.message).await
}

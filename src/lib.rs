pub mod application;
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{client, executor, planner, registry, router};
pub use cli::{Cli, RunMode};
pub use config::{AppConfig, ChatConfig, ConfigError};
pub use infrastructure::{model, rpc, server};

use application::client::{HttpProtocolClient, LocalProtocolClient, ProtocolClient};
use application::executor::{ExecutorOptions, PlanExecutor};
use application::planner::GoalPlanner;
use application::registry::{DescriptorFilter, DescriptorRegistry};
use application::router::{ProtocolRouter, RouterSettings};
use application::tooling::HttpTaskRunner;
use domain::ResourceType;
use infrastructure::model::{ChatBackend, ProviderFactory};
use std::error::Error;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    init_tracing();
    info!(mode = ?cli.mode, "Starting ardf-mcp");
    debug!(config = ?cli.config, server_url = ?cli.server_url, "CLI arguments parsed");

    let config = AppConfig::load(cli.config.as_deref())?;
    match &cli.config {
        Some(path) => info!(path = %path.display(), "Loaded configuration from file"),
        None => info!("Loaded configuration from default path"),
    }

    match cli.mode {
        RunMode::Serve => {
            let router = Arc::new(build_router(&config)?);
            let addr = cli.addr.unwrap_or(config.server.bind);
            info!(%addr, "Starting JSON-RPC server");
            server::serve(router, config.server.clone(), addr).await?;
        }
        RunMode::Index => {
            let router = build_router(&config)?;
            let criteria = index_filter(&cli)?;
            let listing = router.ardf_list(&criteria);
            info!(total = listing.total, "Printing ARDF index");
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        RunMode::Agent => {
            let goal = load_goal(&cli)?;
            let client = protocol_client(&cli, &config)?;
            let chat_config = chat_config(&cli, &config)?;
            let chat: Arc<dyn ChatBackend> = Arc::from(ProviderFactory::create(&chat_config)?);
            let executor = PlanExecutor::new(
                client,
                chat,
                GoalPlanner::new(config.planner.clone()),
                ExecutorOptions::from_settings(&config.agent),
            );
            info!("Executing plan for goal");
            let report = executor.run(&goal).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    info!("ardf-mcp finished");
    Ok(())
}

/// Router over the configured catalog, wired to the task runner when one is
/// configured.
pub fn build_router(config: &AppConfig) -> Result<ProtocolRouter, Box<dyn Error>> {
    let registry = DescriptorRegistry::from_config(config)?;
    let router = ProtocolRouter::new(Arc::new(registry), RouterSettings::from_config(config));
    match &config.task_runner {
        Some(runner) => {
            let runner = HttpTaskRunner::from_config(runner)?;
            info!(endpoint = runner.endpoint(), "Delegated capabilities use the task runner");
            Ok(router.with_task_runner(Arc::new(runner)))
        }
        None => Ok(router),
    }
}

fn protocol_client(
    cli: &Cli,
    config: &AppConfig,
) -> Result<Arc<dyn ProtocolClient>, Box<dyn Error>> {
    match cli.server_url.clone().or_else(|| config.agent.server_url.clone()) {
        Some(url) => {
            info!(url = %url, "Agent talks to a remote server");
            Ok(Arc::new(HttpProtocolClient::new(url, config.agent.timeout)?))
        }
        None => {
            info!("Agent talks to an in-process router");
            Ok(Arc::new(LocalProtocolClient::new(Arc::new(build_router(
                config,
            )?))))
        }
    }
}

fn chat_config(cli: &Cli, config: &AppConfig) -> Result<ChatConfig, ConfigError> {
    let mut chat = match (&config.chat, &cli.provider, &cli.model) {
        (Some(chat), _, _) => chat.clone(),
        (None, Some(provider), Some(model)) => ChatConfig::new(provider, model),
        (None, _, _) => return Err(ConfigError::MissingChat),
    };
    if let Some(provider) = &cli.provider
        && !provider.eq_ignore_ascii_case(&chat.provider)
    {
        info!(
            from = chat.provider.as_str(),
            to = provider.as_str(),
            "Overriding chat provider based on CLI flag"
        );
        chat.provider = provider.clone();
        chat.base_url = None;
    }
    if let Some(model) = &cli.model {
        chat.model = model.clone();
    }
    Ok(chat)
}

fn index_filter(cli: &Cli) -> Result<DescriptorFilter, Box<dyn Error>> {
    let mut criteria = DescriptorFilter::default();
    if let Some(raw) = &cli.resource_type {
        let kind = ResourceType::parse(raw)
            .ok_or_else(|| format!("unknown descriptor type '{raw}'"))?;
        criteria.resource_type = Some(kind);
    }
    if let Some(domain) = &cli.domain {
        criteria = criteria.with_domain(domain.clone());
    }
    Ok(criteria.with_tags(cli.tags.iter().cloned()))
}

fn load_goal(cli: &Cli) -> Result<String, Box<dyn Error>> {
    if let Some(path) = &cli.goal_file {
        info!(path = %path.display(), "Loading goal from file");
        return Ok(fs::read_to_string(path)?.trim().to_string());
    }

    if !cli.goal.is_empty() {
        debug!("Using goal provided through CLI arguments");
        return Ok(cli.goal.join(" ").trim().to_string());
    }

    if !io::stdin().is_terminal() {
        info!("Reading goal from standard input");
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer.trim().to_string());
    }

    warn!("Goal not provided via arguments, file, or stdin");
    Err("goal required via arguments, --goal-file, or stdin".into())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .with_level(true)
            .init();
    });
}

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pact_state_api::{SearchGateway, SearchServiceClient, TokenProvider, verifier_header_argument};
use pact_state_engine::{Dispatcher, FixtureTable};
use pact_state_server::{AppState, StateChangeMode, StateChangeServer, resolve_bind_address};
use pact_state_util::expand_tilde;
use tracing::info;

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "pact-state", version, about = "Seeds the search service for pact provider-state changes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve POST /provider_state_change (default)
    Serve(ServeArgs),
    /// Print an Authorization header argument for the pact verifier
    Token,
}

#[derive(Debug, Default, Args)]
struct ServeArgs {
    /// Address to listen on [env: PROVIDER_STATE_BIND] [default: 0.0.0.0:5175]
    #[arg(long)]
    bind: Option<String>,
    /// Fixture file replacing the bundled fixtures [env: PROVIDER_STATE_FIXTURES]
    #[arg(long)]
    fixtures: Option<String>,
    /// Search service base URL [env: SEARCH_SERVICE_URL]
    #[arg(long)]
    search_service_url: Option<String>,
    /// Echo request bodies instead of seeding fixtures
    #[arg(long)]
    echo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command.unwrap_or_else(|| Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(apply_overrides(config, &args), args.echo).await,
        Command::Token => print_token(&config),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn apply_overrides(mut config: Config, args: &ServeArgs) -> Config {
    if let Some(bind) = &args.bind {
        config.bind_address = Some(bind.clone());
    }
    if let Some(fixtures) = &args.fixtures {
        config.fixtures_path = Some(expand_tilde(fixtures));
    }
    if let Some(url) = &args.search_service_url {
        config.search_service_url = url.clone();
    }
    config
}

async fn serve(config: Config, echo: bool) -> Result<()> {
    let mode = if echo { StateChangeMode::Echo } else { StateChangeMode::Seed(build_dispatcher(&config)?) };
    let bind_address = resolve_bind_address(config.bind_address.as_deref())?;

    let running = StateChangeServer::new(bind_address, AppState::new(mode)).start().await?;
    tokio::signal::ctrl_c().await.context("listen for shutdown signal")?;
    info!("shutdown requested");
    running.stop().await
}

fn build_dispatcher(config: &Config) -> Result<Dispatcher> {
    let fixtures = load_fixtures(config.fixtures_path.as_ref())?;
    let client = SearchServiceClient::new(&config.search_service_url, &config.token_provider())
        .with_context(|| format!("create search service client for {}", config.search_service_url))?;
    info!(
        search_service_url = %client.base_url(),
        fixtures = fixtures.len(),
        "search service client ready"
    );
    let gateway: Arc<dyn SearchGateway> = Arc::new(client);
    Ok(Dispatcher::new(fixtures, gateway))
}

fn load_fixtures(path: Option<&PathBuf>) -> Result<FixtureTable> {
    match path {
        Some(path) => FixtureTable::load_from_path(path).with_context(|| format!("load fixtures from {}", path.display())),
        None => FixtureTable::embedded().context("load bundled fixtures"),
    }
}

fn print_token(config: &Config) -> Result<()> {
    let token = config.token_provider().bearer_token().context("mint bearer token")?;
    println!("{}", verifier_header_argument(&token));
    Ok(())
}

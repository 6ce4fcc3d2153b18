//! Tally Service - usage event recorder and stats HTTP API.
//!
//! Run with: `cargo run -p tally-service`

use std::path::PathBuf;

use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use tally_service::{AppState, Config, api};
use tally_store::Store;

/// Tally Service - records per-device usage events and serves stats.
#[derive(Parser, Debug)]
#[command(name = "tally-service")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long, global = true)]
    bind: Option<String>,

    /// Store file path (overrides config).
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server in the foreground (default behavior).
    Run,

    /// Clear every counter in the store file and exit.
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tally_service=info".parse()?)
                .add_directive("tally_store=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let config = load_config(&args)?;

    match args.command {
        Some(Command::Reset) => reset_store(&config),
        Some(Command::Run) | None => run_server(config).await,
    }
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    // CLI args win over the file
    if let Some(bind) = &args.bind {
        config.server.bind.clone_from(bind);
    }
    if let Some(path) = &args.store {
        config.storage.path.clone_from(path);
    }

    config.validate()?;
    Ok(config)
}

fn reset_store(config: &Config) -> anyhow::Result<()> {
    let store = Store::open(&config.storage.path)?;
    store.reset()?;
    println!("Reset store at {}", config.storage.path.display());
    Ok(())
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let addr = config.server.socket_addr()?;
    // Creates the file with empty mappings if it is missing
    let store = Store::open(&config.storage.path)?;
    let state = AppState::new(store);

    let app = Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

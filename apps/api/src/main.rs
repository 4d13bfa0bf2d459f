mod cli;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod rules;
mod state;
mod template;
mod upload;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::Config;
use crate::extraction::{RuleCache, RuleExtractor};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "tatatulis")]
#[command(about = "Extracts formatting rules from writing guidelines and builds .docx templates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,

    /// Extract rules from a guideline and print them.
    /// Without a path, the first .docx/.txt under ~/Documents is used.
    Extract {
        path: Option<PathBuf>,

        /// Directory for extracted_rules_<name>.json
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Extract rules and write a .docx template in one go
    Template {
        path: PathBuf,

        /// Output path (default: template_<name>.docx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tatatulis v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.google_api_key.clone()).context("failed to build LLM client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize rule cache
    let cache = RuleCache::open(&config.cache_dir)
        .with_context(|| format!("failed to open cache at {}", config.cache_dir.display()))?;
    info!("Rule cache at {}", cache.dir().display());

    let extractor = Arc::new(RuleExtractor::new(Arc::new(llm), cache));

    match cli.command {
        Command::Serve => serve(config, extractor).await,
        Command::Extract { path, out_dir } => cli::run_extract(&extractor, path, &out_dir).await,
        Command::Template { path, output } => cli::run_template(&extractor, &path, output).await,
    }
}

async fn serve(config: Config, extractor: Arc<RuleExtractor>) -> Result<()> {
    let state = AppState {
        extractor,
        config: config.clone(),
    };

    // One span per request, tagged with a fresh id
    let app = build_router(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                info_span!(
                    "request",
                    id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

mod config;
mod errors;
mod generation;
mod llm_client;
mod models;
mod quality;
mod sample;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::errors::PipelineError;
use crate::generation::orchestrator::Orchestrator;
use crate::generation::phases::LlmPhases;
use crate::llm_client::gemini::GeminiTransport;
use crate::llm_client::rate_limit::RateLimiter;
use crate::llm_client::ModelClient;
use crate::models::request::AssignmentRequest;

#[derive(Parser, Debug)]
#[command(
    name = "takehome",
    about = "Generate time-bounded take-home assignments and rubrics from a job description",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and print the generated assignment as JSON
    Generate(RequestArgs),
    /// Run extraction and scoping once and print the scope validation result
    Preview(RequestArgs),
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Path to an assignment request JSON file
    #[arg(long, required_unless_present = "sample", conflicts_with = "sample")]
    request: Option<PathBuf>,
    /// Use the built-in senior backend sample request
    #[arg(long)]
    sample: bool,
}

impl RequestArgs {
    /// Reads the request. An unreadable file is an internal error; a file
    /// that reads but does not parse is an invalid request.
    fn load(&self) -> Result<AssignmentRequest, PipelineError> {
        match &self.request {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read request file {}", path.display()))?;
                AssignmentRequest::from_json(&raw)
            }
            None => Ok(sample::sample_request()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration first (errors on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging; stdout is reserved for the JSON result
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting takehome v{}", env!("CARGO_PKG_VERSION"));

    // One model client per process, shared by every phase
    let transport = GeminiTransport::new(config.gemini_api_key.clone(), config.gemini_model.clone())
        .context("Failed to build the Gemini HTTP client")?;
    let limiter = Arc::new(RateLimiter::per_minute(config.rate_limit_per_minute));
    let client = ModelClient::new(Arc::new(transport), limiter, config.backoff_policy());
    info!(
        "Model client initialized (model: {}, {} rpm, {} attempts)",
        config.gemini_model, config.rate_limit_per_minute, config.retry_attempts
    );

    let orchestrator = Orchestrator::new(
        Arc::new(LlmPhases::new(client)),
        config.pipeline_timeout(),
    );

    match cli.command {
        Command::Generate(args) => match args.load() {
            Ok(request) => emit(orchestrator.run(&request).await),
            Err(e) => emit::<()>(Err(e)),
        },
        Command::Preview(args) => match args.load() {
            Ok(request) => emit(orchestrator.preview_scope(&request).await),
            Err(e) => emit::<()>(Err(e)),
        },
    }
}

/// Prints the result, or the error report, as pretty JSON on stdout.
fn emit<T: Serialize>(outcome: Result<T, PipelineError>) -> Result<ExitCode> {
    let (json, code) = match outcome {
        Ok(value) => (serde_json::to_string_pretty(&value)?, ExitCode::SUCCESS),
        Err(e) => (serde_json::to_string_pretty(&e.report())?, ExitCode::FAILURE),
    };
    println!("{json}");
    Ok(code)
}

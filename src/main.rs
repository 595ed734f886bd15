//! PromptDirector function entry point
//!
//! Runs as a subprocess under the platform's function wrapper: the request
//! JSON arrives via the FUNCTION_REQUEST env var (or stdin), the response
//! JSON is printed to stdout as a single line. Internal failures (bad
//! config, unreadable request) still produce a sanitized 500 envelope on
//! stdout with exit code 0 so the parent can read them; logs go to stderr
//! only.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use prompt_director::{
    config::Config,
    extract::sanitize_error,
    handler::{handle, InvokeRequest, InvokeResponse},
    orchestrator::PromptDirector,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable carrying the request JSON.
const REQUEST_ENV_VAR: &str = "FUNCTION_REQUEST";

#[derive(Parser)]
#[command(name = "prompt-director")]
#[command(about = "Generate image-synthesis prompts from speech transcripts")]
#[command(version)]
struct Cli {
    /// Config file path (default: ~/.config/prompt-director/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .with_writer(std::io::stderr)
        .init();

    let response = run(&cli).await.unwrap_or_else(internal_error);

    match serde_json::to_string(&response) {
        Ok(json) => println!("{}", json),
        Err(err) => println!(
            "{}",
            serde_json::json!({
                "statusCode": 500,
                "body": { "error": sanitize_error(&err.to_string()) }
            })
        ),
    }
}

async fn run(cli: &Cli) -> Result<InvokeResponse> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path.clone())?,
        None => Config::load()?,
    };
    if let Err(err) = config.validate() {
        tracing::warn!(error = %err, "no provider credentials configured");
    }

    let director = PromptDirector::from_config(&config);
    let request = read_request()?;

    info!("processing invocation");
    Ok(handle(&director, request).await)
}

/// Map any bootstrap or intake failure onto the error envelope, sanitized.
fn internal_error(err: anyhow::Error) -> InvokeResponse {
    InvokeResponse {
        status_code: 500,
        body: serde_json::json!({ "error": sanitize_error(&err.to_string()) }),
    }
}

/// Read the request from the env var, falling back to stdin. Missing input
/// is treated as an empty request.
fn read_request() -> Result<InvokeRequest> {
    let raw = match std::env::var(REQUEST_ENV_VAR) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let raw = if raw.trim().is_empty() { "{}".to_string() } else { raw };
    Ok(serde_json::from_str(&raw)?)
}

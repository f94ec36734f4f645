use anyhow::Result;
use clap::Parser;
use reqwest::Method;
use std::io::Read;
use std::path::PathBuf;
use storygate::handler::ForwardHandler;
use storygate::models::{Config, GenerateRequest};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "storygate")]
#[command(about = "Forward a story-generation request to Gemini with key failover")]
struct CliArgs {
    /// Path to a request envelope JSON file; reads stdin when omitted.
    #[arg(value_name = "REQUEST")]
    request: Option<PathBuf>,
}

fn read_request(args: &CliArgs) -> storygate::Result<GenerateRequest> {
    let raw = match &args.request {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&raw)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storygate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let request = match read_request(&args) {
        Ok(request) => request,
        Err(e) => {
            error!("Failed to read request envelope: {}", e);
            std::process::exit(1);
        }
    };

    let config = Config::from_env();
    info!("Loaded {} API key(s) from environment", config.api_keys.len());

    let handler = ForwardHandler::new(&config);
    let response = handler.handle(Method::POST, &request).await;

    println!("{}", serde_json::to_string_pretty(&response.body)?);

    if response.status != 200 {
        error!("Generation failed with status {}", response.status);
        std::process::exit(1);
    }

    info!("Generation completed successfully");
    Ok(())
}

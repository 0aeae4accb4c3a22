use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use klaxon::classifiers::openai::OpenAiClassifier;
use klaxon::classifiers::perspective::PerspectiveScorer;
use klaxon::config::Config;
use klaxon::pipeline::Pipeline;
use klaxon::slack::post::SlackPoster;
use klaxon::slack::server::{run_server, AppState};

/// Klaxon: toxicity alerts for Slack workspaces.
///
/// Listens for message events, runs each message through two independent
/// moderation classifiers, and posts an alert into the offending thread
/// when either one flags the content.
#[derive(Parser)]
#[command(name = "klaxon", version, about)]
struct Cli {
    /// Listen port (overrides the PORT env var)
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind the events listener to
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("klaxon=info")),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load()?;
    // Missing secrets are fatal here, before the listener binds
    config.require_secrets()?;

    let scorer = PerspectiveScorer::new(
        config.perspective_api_key.clone(),
        &config.perspective_api_url,
    )?;
    let classifier =
        OpenAiClassifier::new(config.openai_api_key.clone(), &config.openai_api_url)?;
    let sink = SlackPoster::new(config.slack_bot_token.clone(), &config.slack_api_url)?;

    let pipeline = Arc::new(Pipeline::new(
        Arc::new(scorer),
        Arc::new(classifier),
        Arc::new(sink),
    ));

    info!("Classifiers ready: Perspective API + OpenAI moderation");

    let state = AppState {
        pipeline,
        signing_secret: config.slack_signing_secret.clone().into(),
    };

    let port = cli.port.unwrap_or(config.port);
    run_server(state, port, &cli.bind).await
}

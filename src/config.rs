use std::env;

use anyhow::Result;

/// Default Slack Events API listen port.
pub const DEFAULT_PORT: u16 = 5000;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
pub struct Config {
    /// Bot user OAuth token (`xoxb-...`) used for `chat.postMessage`.
    pub slack_bot_token: String,
    /// Signing secret used to verify that inbound events really came from Slack.
    pub slack_signing_secret: String,
    /// Google Perspective API key (toxicity scoring).
    pub perspective_api_key: String,
    /// OpenAI API key (moderation category flags).
    pub openai_api_key: String,
    /// Port the events listener binds to (PORT env var, default 5000).
    pub port: u16,
    /// Perspective API base URL (overridable for local testing).
    pub perspective_api_url: String,
    /// OpenAI API base URL (overridable for local testing).
    pub openai_api_url: String,
    /// Slack Web API base URL (overridable for local testing).
    pub slack_api_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing secrets are tolerated here so `load()` only fails on
    /// malformed values; call `require_secrets()` before serving to turn
    /// absences into a startup error.
    pub fn load() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT is not a valid port number: {raw}"))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            slack_bot_token: env::var("SLACK_BOT_TOKEN").unwrap_or_default(),
            slack_signing_secret: env::var("SLACK_SIGNING_SECRET").unwrap_or_default(),
            perspective_api_key: env::var("PERSPECTIVE_API_KEY").unwrap_or_default(),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            port,
            perspective_api_url: env::var("PERSPECTIVE_API_URL").unwrap_or_else(|_| {
                crate::classifiers::perspective::DEFAULT_API_URL.to_string()
            }),
            openai_api_url: env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| crate::classifiers::openai::DEFAULT_API_URL.to_string()),
            slack_api_url: env::var("SLACK_API_URL")
                .unwrap_or_else(|_| crate::slack::post::DEFAULT_API_URL.to_string()),
        })
    }

    /// Check that every required secret is present.
    /// Call this at startup, before the listener binds — a missing secret
    /// is a configuration error, never a runtime one.
    pub fn require_secrets(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("SLACK_BOT_TOKEN", &self.slack_bot_token),
            ("SLACK_SIGNING_SECRET", &self.slack_signing_secret),
            ("PERSPECTIVE_API_KEY", &self.perspective_api_key),
            ("OPENAI_API_KEY", &self.openai_api_key),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            anyhow::bail!(
                "Missing required environment variables: {}.\n\
                 Add them to your .env file. See .env.example for details.",
                missing.join(", ")
            );
        }
        Ok(())
    }
}

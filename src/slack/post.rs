// Outbound alert delivery via the Slack Web API.
//
// One `chat.postMessage` call per alert, posting as a fixed display name
// and threading under the offending message. Delivery failure is terminal
// for the event but never for the process: the sink logs and returns
// absent rather than raising.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Production Slack Web API base URL.
pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Display name alerts are posted under.
pub const ALERT_USERNAME: &str = "toxicity_alert";

/// Trait for delivering a rendered alert into a conversation.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Post `body` to `channel`, threaded under `thread_ts` when given.
    /// Returns the delivered message timestamp, or `None` on any failure.
    async fn post_alert(&self, channel: &str, body: &str, thread_ts: Option<&str>)
        -> Option<String>;
}

/// Slack `chat.postMessage` alert sink.
pub struct SlackPoster {
    client: Client,
    base_url: String,
    bot_token: String,
}

impl SlackPoster {
    /// Create a new poster using the given bot token.
    pub fn new(bot_token: String, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent("klaxon/0.1 (slack-toxicity-alerts)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token,
        })
    }

    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<String> {
        let url = format!("{}/chat.postMessage", self.base_url);

        let request = PostMessageRequest {
            channel,
            text,
            thread_ts,
            username: ALERT_USERNAME,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.bot_token)
            .json(&request)
            .send()
            .await
            .context("Failed to call chat.postMessage")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Slack API returned {}: {}", status, body);
        }

        let result: PostMessageResponse = response
            .json()
            .await
            .context("Failed to parse chat.postMessage response")?;

        // Slack reports most failures inside a 200 envelope
        if !result.ok {
            anyhow::bail!(
                "chat.postMessage failed: {}",
                result.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }

        result
            .message
            .map(|m| m.ts)
            .context("chat.postMessage response missing message timestamp")
    }
}

#[async_trait]
impl AlertSink for SlackPoster {
    async fn post_alert(
        &self,
        channel: &str,
        body: &str,
        thread_ts: Option<&str>,
    ) -> Option<String> {
        match self.post_message(channel, body, thread_ts).await {
            Ok(ts) => {
                info!(channel, ts, "Alert posted");
                Some(ts)
            }
            Err(e) => {
                warn!(error = %e, channel, "Failed to deliver alert, dropping event");
                None
            }
        }
    }
}

// --- Slack Web API request/response types ---

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
    username: &'a str,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
    message: Option<PostedMessage>,
}

#[derive(Deserialize)]
struct PostedMessage {
    ts: String,
}

// OpenAI moderation endpoint implementation.
//
// The moderation API returns a flagged/not-flagged verdict plus a mapping
// of category name → boolean. Only categories whose value is literally
// `true` make it into the verdict — the API also emits score fields and
// null-able category entries, and those must not leak into alert text.
//
// API docs: https://platform.openai.com/docs/api-reference/moderations

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::traits::{FlagVerdict, ModerationClassifier};

/// Production OpenAI API base URL.
pub const DEFAULT_API_URL: &str = "https://api.openai.com";

/// OpenAI moderation classifier.
pub struct OpenAiClassifier {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClassifier {
    /// Create a new moderation classifier with the given API key.
    pub fn new(api_key: String, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent("klaxon/0.1 (slack-toxicity-alerts)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// One moderation request. Exactly one outbound call, no retries.
    async fn moderate(&self, text: &str) -> Result<Option<FlagVerdict>> {
        let url = format!("{}/v1/moderations", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ModerationRequest { input: text })
            .send()
            .await
            .context("Failed to call OpenAI moderation API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI moderation API returned {}: {}", status, body);
        }

        let result: ModerationResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI moderation response")?;

        Ok(flagged_verdict(&result))
    }
}

#[async_trait]
impl ModerationClassifier for OpenAiClassifier {
    async fn classify(&self, text: &str) -> Option<FlagVerdict> {
        match self.moderate(text).await {
            Ok(Some(verdict)) => {
                debug!(
                    categories = ?verdict.categories,
                    text_preview = super::preview(text),
                    "OpenAI moderation flagged text"
                );
                Some(verdict)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "OpenAI moderation call failed, continuing without flags");
                None
            }
        }
    }
}

/// Normalize a moderation response into a verdict.
///
/// Reads the first result entry. Not flagged (or no results at all) means
/// no verdict. Flagged means a verdict whose categories are exactly the
/// names mapped to boolean `true` — false values and anything that is
/// truthy-but-not-boolean are excluded. Names keep the order the provider
/// sent them in (serde_json's preserve_order feature).
fn flagged_verdict(response: &ModerationResponse) -> Option<FlagVerdict> {
    let result = response.results.first()?;
    if !result.flagged {
        return None;
    }

    let categories: Vec<String> = result
        .categories
        .iter()
        .filter(|(_, value)| matches!(value, Value::Bool(true)))
        .map(|(name, _)| name.clone())
        .collect();

    Some(FlagVerdict { categories })
}

// --- OpenAI moderation request/response types ---

#[derive(Serialize)]
struct ModerationRequest<'a> {
    input: &'a str,
}

#[derive(Deserialize)]
struct ModerationResponse {
    #[serde(default)]
    results: Vec<ModerationResult>,
}

#[derive(Deserialize)]
struct ModerationResult {
    #[serde(default)]
    flagged: bool,
    // Values stay raw JSON so the strict `== true` filter can reject
    // non-boolean entries instead of coercing them.
    #[serde(default)]
    categories: serde_json::Map<String, Value>,
}

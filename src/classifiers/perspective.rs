// Google Perspective API implementation.
//
// Perspective analyzes text for toxicity and returns a summary score per
// requested attribute. We request only TOXICITY and set doNotStore so
// workspace messages are never retained by the API.
//
// API docs: https://developers.perspectiveapi.com/s/about-the-api-methods

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::traits::{ScoreVerdict, ToxicityScorer};

/// Production Perspective API base URL.
pub const DEFAULT_API_URL: &str = "https://commentanalyzer.googleapis.com";

/// Perspective API toxicity scorer.
pub struct PerspectiveScorer {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PerspectiveScorer {
    /// Create a new Perspective scorer with the given API key.
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

    /// One `comments:analyze` request. Exactly one outbound call, no retries.
    async fn analyze(&self, text: &str) -> Result<Option<ScoreVerdict>> {
        let url = format!("{}/v1alpha1/comments:analyze", self.base_url);

        let request = AnalyzeRequest {
            comment: Comment {
                text: text.to_string(),
            },
            languages: vec!["en".to_string()],
            requested_attributes: RequestedAttributes {
                toxicity: AttributeConfig {},
            },
            do_not_store: true,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .context("Failed to call Perspective API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Perspective API returned {}: {}", status, body);
        }

        let result: AnalyzeResponse = response
            .json()
            .await
            .context("Failed to parse Perspective API response")?;

        Ok(extract_toxicity(&result).map(|toxicity| ScoreVerdict { toxicity }))
    }
}

#[async_trait]
impl ToxicityScorer for PerspectiveScorer {
    async fn score(&self, text: &str) -> Option<ScoreVerdict> {
        match self.analyze(text).await {
            Ok(Some(verdict)) => {
                debug!(
                    toxicity = verdict.toxicity,
                    text_preview = super::preview(text),
                    "Perspective scored text"
                );
                Some(verdict)
            }
            Ok(None) => {
                // Response parsed but carried no TOXICITY score.
                debug!("Perspective response missing TOXICITY summary score");
                None
            }
            Err(e) => {
                warn!(error = %e, "Perspective call failed, continuing without a score");
                None
            }
        }
    }
}

/// Pull the TOXICITY summary score out of an analyze response, if present.
fn extract_toxicity(response: &AnalyzeResponse) -> Option<f64> {
    response
        .attribute_scores
        .get("TOXICITY")
        .map(|score| score.summary_score.value)
}

// --- Perspective API request/response types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    comment: Comment,
    languages: Vec<String>,
    requested_attributes: RequestedAttributes,
    do_not_store: bool,
}

#[derive(Serialize)]
struct Comment {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct RequestedAttributes {
    toxicity: AttributeConfig,
}

#[derive(Serialize)]
struct AttributeConfig {}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    #[serde(default)]
    attribute_scores: HashMap<String, AttributeScore>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributeScore {
    summary_score: SummaryScore,
}

#[derive(Deserialize)]
struct SummaryScore {
    value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_toxicity_score() {
        let raw = serde_json::json!({
            "attributeScores": {
                "TOXICITY": {
                    "summaryScore": { "value": 0.91, "type": "PROBABILITY" },
                    "spanScores": []
                }
            },
            "languages": ["en"]
        });
        let response: AnalyzeResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(extract_toxicity(&response), Some(0.91));
    }

    #[test]
    fn missing_toxicity_attribute_is_absent() {
        let raw = serde_json::json!({
            "attributeScores": {
                "INSULT": { "summaryScore": { "value": 0.4 } }
            }
        });
        let response: AnalyzeResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(extract_toxicity(&response), None);
    }

    #[test]
    fn empty_response_is_absent() {
        let response: AnalyzeResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(extract_toxicity(&response), None);
    }

    #[test]
    fn request_body_shape_matches_api() {
        let request = AnalyzeRequest {
            comment: Comment {
                text: "hello".to_string(),
            },
            languages: vec!["en".to_string()],
            requested_attributes: RequestedAttributes {
                toxicity: AttributeConfig {},
            },
            do_not_store: true,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["comment"]["text"], "hello");
        assert_eq!(value["languages"][0], "en");
        assert!(value["requestedAttributes"]["TOXICITY"].is_object());
        assert_eq!(value["doNotStore"], true);
    }
}

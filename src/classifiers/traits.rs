// Classifier traits — the swap-ready abstraction.
//
// Both traits return Option rather than Result: a provider that errors,
// times out, or answers with an unexpected shape has simply produced no
// signal for this message. Implementations log the cause and downgrade;
// nothing propagates to the event handler.

use async_trait::async_trait;

/// A toxicity score for one piece of text, from 0.0 (benign) to 1.0
/// (very toxic). Returned exactly as the provider reported it — no
/// clamping or rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVerdict {
    pub toxicity: f64,
}

/// A category-flag verdict for one piece of text. Only exists when the
/// provider flagged the content; `categories` holds the names the provider
/// marked strictly `true`, in the provider's own iteration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagVerdict {
    pub categories: Vec<String>,
}

/// Trait for scoring text toxicity. Implementations must be async because
/// providers require HTTP API calls.
#[async_trait]
pub trait ToxicityScorer: Send + Sync {
    /// Score a single text. `None` means the provider produced no usable
    /// signal (unreachable, non-success status, or malformed response).
    async fn score(&self, text: &str) -> Option<ScoreVerdict>;
}

/// Trait for category-flag moderation of text.
#[async_trait]
pub trait ModerationClassifier: Send + Sync {
    /// Classify a single text. `None` means either "not flagged" or "no
    /// usable signal" — unflagged content contributes nothing to an alert.
    async fn classify(&self, text: &str) -> Option<FlagVerdict>;
}

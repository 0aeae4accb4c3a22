// Verdict aggregation — the decision core of the pipeline.
//
// Pure and deterministic: two optional classifier verdicts in, one alert
// decision plus rendered body out. No I/O lives here. The trigger rule is
// deliberately alert-liberal (fail-open): any one classifier producing a
// usable signal is enough to alert, and a missing classifier never blocks
// the other's alert — but never forces one either.

use crate::classifiers::traits::{FlagVerdict, ScoreVerdict};

/// Fixed first line of every alert.
pub const ALERT_PREAMBLE: &str = "Toxic content detected in the conversation.";

/// The aggregate decision for one message.
///
/// `body` is only meaningful when `triggered` is true; callers must check
/// `triggered` before using it.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateVerdict {
    pub triggered: bool,
    pub body: String,
}

/// Reconcile the two classifier verdicts into a single alert decision.
///
/// Triggered when either verdict is present. Rendering is order-fixed:
/// preamble, then the Perspective score section (exact score, no
/// reformatting), then the OpenAI category section (names joined by ", ").
/// A score standing alone triggers regardless of how low it is — there is
/// intentionally no minimum-score threshold.
pub fn aggregate(score: Option<ScoreVerdict>, flags: Option<FlagVerdict>) -> AggregateVerdict {
    let triggered = score.is_some() || flags.is_some();

    let mut body = String::from(ALERT_PREAMBLE);
    if let Some(score) = &score {
        body.push_str(&format!(" Perspective API: toxicity score {}\n", score.toxicity));
    }
    if let Some(flags) = &flags {
        body.push_str(&format!(" OpenAI moderation: {}", flags.categories.join(", ")));
    }

    AggregateVerdict { triggered, body }
}

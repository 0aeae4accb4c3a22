// Per-event orchestration: filter → classify → aggregate → dispatch.
//
// This is a shell with no decision logic of its own — the alert decision
// lives entirely in verdict::aggregate. The pipeline owns nothing mutable
// and keeps nothing between events, so concurrent invocations are
// independent by construction.

use std::sync::Arc;

use tracing::debug;

use crate::classifiers::traits::{ModerationClassifier, ToxicityScorer};
use crate::slack::post::AlertSink;
use crate::slack::MessageEvent;
use crate::verdict::aggregate;

/// The moderation pipeline for one workspace.
pub struct Pipeline {
    scorer: Arc<dyn ToxicityScorer>,
    classifier: Arc<dyn ModerationClassifier>,
    sink: Arc<dyn AlertSink>,
}

impl Pipeline {
    pub fn new(
        scorer: Arc<dyn ToxicityScorer>,
        classifier: Arc<dyn ModerationClassifier>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            scorer,
            classifier,
            sink,
        }
    }

    /// Run one message event through the pipeline.
    ///
    /// Non-qualifying events (sub-typed, bot-authored, or not a message at
    /// all) are dropped before any classifier is called. For qualifying
    /// events both classifiers run concurrently — they have no ordering
    /// dependency — and the alert is posted only when the aggregate verdict
    /// triggers. Nothing here can fail the caller: classifier and delivery
    /// failures were already downgraded at their own layer.
    pub async fn handle_event(&self, event: &MessageEvent) {
        if !should_process(event) {
            debug!(
                event_type = %event.event_type,
                subtype = ?event.subtype,
                bot_id = ?event.bot_id,
                "Skipping non-qualifying event"
            );
            return;
        }

        let (score, flags) = tokio::join!(
            self.scorer.score(&event.text),
            self.classifier.classify(&event.text),
        );

        let verdict = aggregate(score, flags);
        if !verdict.triggered {
            debug!(channel = %event.channel, "No classifier signal, no alert");
            return;
        }

        // At most one alert per event; delivery failure is logged by the
        // sink and the event is dropped without retry.
        self.sink
            .post_alert(&event.channel, &verdict.body, event.ts.as_deref())
            .await;
    }
}

/// Only plain human-authored new messages qualify: no sub-type marker
/// (edits, joins, system messages) and no bot identity.
pub fn should_process(event: &MessageEvent) -> bool {
    if event.event_type != "message" {
        return false;
    }
    if event.subtype.as_deref().is_some_and(|s| !s.is_empty()) {
        return false;
    }
    if event.bot_id.as_deref().is_some_and(|b| !b.is_empty()) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> MessageEvent {
        MessageEvent {
            event_type: "message".to_string(),
            channel: "C123".to_string(),
            text: "hello".to_string(),
            ts: Some("1700000000.000100".to_string()),
            subtype: None,
            bot_id: None,
        }
    }

    #[test]
    fn plain_message_qualifies() {
        assert!(should_process(&event()));
    }

    #[test]
    fn subtyped_message_dropped() {
        let mut e = event();
        e.subtype = Some("message_changed".to_string());
        assert!(!should_process(&e));
    }

    #[test]
    fn bot_message_dropped() {
        let mut e = event();
        e.bot_id = Some("B024BE7LH".to_string());
        assert!(!should_process(&e));
    }

    #[test]
    fn empty_subtype_and_bot_id_still_qualify() {
        let mut e = event();
        e.subtype = Some(String::new());
        e.bot_id = Some(String::new());
        assert!(should_process(&e));
    }

    #[test]
    fn non_message_event_dropped() {
        let mut e = event();
        e.event_type = "reaction_added".to_string();
        assert!(!should_process(&e));
    }

    #[test]
    fn empty_text_still_qualifies() {
        // Empty text is a valid classifier input, not a filter condition
        let mut e = event();
        e.text = String::new();
        assert!(should_process(&e));
    }
}

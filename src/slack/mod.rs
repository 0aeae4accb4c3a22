// Slack transport — inbound Events API payloads, request-signature
// verification, the axum listener, and the outbound chat.postMessage call.

use serde::Deserialize;

pub mod post;
pub mod server;
pub mod signature;

/// One inner event from an Events API `event_callback` envelope.
///
/// Slack sends many event shapes through the same callback; only the fields
/// the pipeline needs are modeled, and everything beyond `type` is optional
/// so non-message events still deserialize cleanly.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEvent {
    /// Inner event type tag; the pipeline only handles `"message"`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Conversation the message was posted in.
    #[serde(default)]
    pub channel: String,
    /// Raw message body. May legitimately be empty.
    #[serde(default)]
    pub text: String,
    /// Message timestamp — the thread anchor for any alert reply.
    pub ts: Option<String>,
    /// Sub-type marker (edits, joins, system messages). Plain new messages
    /// carry none.
    pub subtype: Option<String>,
    /// Present when the message was authored by a bot identity.
    pub bot_id: Option<String>,
}

// Content classifiers — trait-based abstraction for swappable providers.
//
// Two independent providers look at every message: Perspective returns a
// continuous toxicity score, OpenAI moderation returns a flagged/not-flagged
// verdict with named categories. Both are normalized to the same
// "verdict or absent" shape so the aggregator never sees provider errors.

pub mod traits;
pub mod perspective;
pub mod openai;

/// Char-boundary-safe preview of a message for debug logs. Messages can
/// contain emoji and accented text, so a fixed byte offset cannot be used
/// to truncate them.
pub(crate) fn preview(text: &str) -> &str {
    match text.char_indices().nth(50) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

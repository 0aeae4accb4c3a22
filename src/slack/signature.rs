// Slack request-signature verification.
//
// Every Events API request carries two headers:
//   X-Slack-Request-Timestamp: unix seconds when Slack sent the request
//   X-Slack-Signature:         "v0=" + hex(HMAC-SHA256(secret, "v0:{ts}:{body}"))
//
// Requests older than STALE_AFTER_SECS are rejected even with a valid
// signature, which bounds replay of captured requests.
//
// https://api.slack.com/authentication/verifying-requests-from-slack

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signature scheme version prefix Slack currently uses.
pub const VERSION: &str = "v0";

/// Maximum accepted age of a signed request: 5 minutes.
pub const STALE_AFTER_SECS: u64 = 300;

/// Verify a request against the workspace signing secret.
///
/// `timestamp` and `signature` are the raw header values; `body` is the
/// unmodified request body bytes.
pub fn verify(secret: &str, timestamp: &str, signature: &str, body: &[u8]) -> bool {
    let Ok(sent_at) = timestamp.parse::<u64>() else {
        return false;
    };
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    if now.saturating_sub(sent_at) > STALE_AFTER_SECS {
        return false;
    }

    constant_time_eq(signature, &sign(secret, timestamp, body))
}

/// Compute the expected signature header value for a body.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| HmacSha256::new_from_slice(b"fallback").unwrap());
    mac.update(format!("{VERSION}:{timestamp}:").as_bytes());
    mac.update(body);
    format!("{VERSION}={}", hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

// Events listener tests — drive the axum router directly via tower oneshot.
//
// Covers signature enforcement, the url_verification challenge echo, and
// a signed event_callback flowing all the way to the alert sink.

use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use klaxon::classifiers::traits::{
    FlagVerdict, ModerationClassifier, ScoreVerdict, ToxicityScorer,
};
use klaxon::pipeline::Pipeline;
use klaxon::slack::post::AlertSink;
use klaxon::slack::server::{build_router, AppState};
use klaxon::slack::signature;

const SIGNING_SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";

// ============================================================
// Mocks
// ============================================================

struct FixedScorer(Option<ScoreVerdict>);

#[async_trait]
impl ToxicityScorer for FixedScorer {
    async fn score(&self, _text: &str) -> Option<ScoreVerdict> {
        self.0.clone()
    }
}

struct FixedClassifier(Option<FlagVerdict>);

#[async_trait]
impl ModerationClassifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Option<FlagVerdict> {
        self.0.clone()
    }
}

#[derive(Default)]
struct RecordingSink {
    posts: Mutex<Vec<(String, String, Option<String>)>>,
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn post_alert(
        &self,
        channel: &str,
        body: &str,
        thread_ts: Option<&str>,
    ) -> Option<String> {
        self.posts.lock().unwrap().push((
            channel.to_string(),
            body.to_string(),
            thread_ts.map(|t| t.to_string()),
        ));
        Some("1700000001.000200".to_string())
    }
}

fn app_state(
    score: Option<ScoreVerdict>,
    flags: Option<FlagVerdict>,
) -> (AppState, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let pipeline = Arc::new(Pipeline::new(
        Arc::new(FixedScorer(score)),
        Arc::new(FixedClassifier(flags)),
        sink.clone(),
    ));
    (
        AppState {
            pipeline,
            signing_secret: SIGNING_SECRET.into(),
        },
        sink,
    )
}

fn signed_request(body: &str) -> Request<Body> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        .to_string();
    let sig = signature::sign(SIGNING_SECRET, &timestamp, body.as_bytes());

    Request::builder()
        .method("POST")
        .uri("/slack/events")
        .header("content-type", "application/json")
        .header("x-slack-request-timestamp", timestamp)
        .header("x-slack-signature", sig)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ============================================================
// Signature enforcement
// ============================================================

#[tokio::test]
async fn unsigned_request_is_rejected() {
    let (state, sink) = app_state(Some(ScoreVerdict { toxicity: 0.9 }), None);
    let app = build_router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/slack/events")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"type":"url_verification","challenge":"x"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(sink.posts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn tampered_body_is_rejected() {
    let (state, sink) = app_state(Some(ScoreVerdict { toxicity: 0.9 }), None);
    let app = build_router(state);

    let mut request = signed_request(r#"{"type":"url_verification","challenge":"x"}"#);
    *request.body_mut() = Body::from(r#"{"type":"url_verification","challenge":"y"}"#);

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(sink.posts.lock().unwrap().is_empty());
}

// ============================================================
// URL verification challenge
// ============================================================

#[tokio::test]
async fn challenge_is_echoed() {
    let (state, _sink) = app_state(None, None);
    let app = build_router(state);

    let response = app
        .oneshot(signed_request(
            r#"{"type":"url_verification","challenge":"3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P"));
}

// ============================================================
// Event callbacks
// ============================================================

#[tokio::test]
async fn signed_message_event_reaches_the_sink() {
    let (state, sink) = app_state(
        Some(ScoreVerdict { toxicity: 0.91 }),
        Some(FlagVerdict {
            categories: vec!["harassment".to_string(), "hate".to_string()],
        }),
    );
    let app = build_router(state);

    let payload = r#"{
        "type": "event_callback",
        "event": {
            "type": "message",
            "channel": "C024BE91L",
            "text": "I hate you, you are worthless",
            "ts": "1700000000.000100",
            "user": "U2147483697"
        }
    }"#;

    let response = app.oneshot(signed_request(payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let posts = sink.posts.lock().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].0, "C024BE91L");
    assert!(posts[0].1.contains("Toxic content detected in the conversation."));
    assert_eq!(posts[0].2.as_deref(), Some("1700000000.000100"));
}

#[tokio::test]
async fn bot_message_is_acknowledged_but_dropped() {
    let (state, sink) = app_state(Some(ScoreVerdict { toxicity: 0.99 }), None);
    let app = build_router(state);

    let payload = r#"{
        "type": "event_callback",
        "event": {
            "type": "message",
            "channel": "C024BE91L",
            "text": "bot chatter",
            "ts": "1700000000.000100",
            "bot_id": "B024BE7LH"
        }
    }"#;

    let response = app.oneshot(signed_request(payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(sink.posts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn non_message_callback_is_acknowledged() {
    let (state, sink) = app_state(Some(ScoreVerdict { toxicity: 0.99 }), None);
    let app = build_router(state);

    let payload = r#"{
        "type": "event_callback",
        "event": {
            "type": "reaction_added",
            "reaction": "thumbsup"
        }
    }"#;

    let response = app.oneshot(signed_request(payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(sink.posts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn garbage_payload_is_a_bad_request() {
    let (state, _sink) = app_state(None, None);
    let app = build_router(state);

    let response = app.oneshot(signed_request("not json at all")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

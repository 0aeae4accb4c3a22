// Events API listener — axum server for POST /slack/events.
//
// Every request is signature-checked against the workspace signing secret
// over the raw body before any JSON parsing happens. Slack's two payload
// kinds are handled: `url_verification` (the challenge echo Slack sends
// when the endpoint URL is registered) and `event_callback` (the envelope
// around actual workspace events).

use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::signature;
use super::MessageEvent;
use crate::pipeline::Pipeline;

/// Shared application state threaded through the axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub signing_secret: Arc<str>,
}

/// Start the events listener and block until it exits.
pub async fn run_server(state: AppState, port: u16, bind: &str) -> Result<()> {
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Klaxon listening for Slack events on http://{addr}/slack/events");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router. Public so integration tests can drive it without
/// binding a socket.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/slack/events", post(slack_events))
        .with_state(state)
}

/// An Events API request body, after signature verification.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EventsPayload {
    UrlVerification { challenge: String },
    EventCallback { event: MessageEvent },
    #[serde(other)]
    Other,
}

async fn slack_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let timestamp = header_str(&headers, "x-slack-request-timestamp");
    let provided = header_str(&headers, "x-slack-signature");

    if !signature::verify(&state.signing_secret, timestamp, provided, &body) {
        warn!("Rejected request with missing or invalid Slack signature");
        return (StatusCode::UNAUTHORIZED, "invalid signature").into_response();
    }

    let payload: EventsPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Unparseable Events API payload");
            return (StatusCode::BAD_REQUEST, "invalid payload").into_response();
        }
    };

    match payload {
        EventsPayload::UrlVerification { challenge } => {
            info!("Answering Events API URL verification challenge");
            Json(serde_json::json!({ "challenge": challenge })).into_response()
        }
        EventsPayload::EventCallback { event } => {
            state.pipeline.handle_event(&event).await;
            StatusCode::OK.into_response()
        }
        EventsPayload::Other => {
            debug!("Ignoring unrecognized Events API payload type");
            StatusCode::OK.into_response()
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

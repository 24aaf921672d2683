use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::dto::{WebhookBody, WebhookEvent};
use super::router::dispatch;
use crate::state::AppState;

pub fn bot_routes() -> Router<AppState> {
    Router::new().route("/webhook", post(webhook))
}

/// POST /webhook. Acknowledges at once; each event is answered in its own task.
#[instrument(skip(state, body))]
pub async fn webhook(State(state): State<AppState>, Json(body): Json<WebhookBody>) -> Json<Value> {
    let total = body.events.len();
    let mut accepted = 0;
    for event in body.events.into_iter().filter_map(WebhookEvent::into_inbound) {
        accepted += 1;
        let st = state.clone();
        tokio::spawn(async move {
            dispatch(&st, event).await;
        });
    }
    debug!(total, accepted, "webhook events");
    Json(json!({ "status": "ok" }))
}

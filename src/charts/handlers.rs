use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{instrument, warn};

use crate::state::AppState;

pub fn chart_routes() -> Router<AppState> {
    Router::new().route("/chart/:token", get(get_chart))
}

/// GET /chart/:token. Single-use image URL handed to the chat platform.
#[instrument(skip(state))]
pub async fn get_chart(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    match state.charts.take_once(&token) {
        Some(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        None => {
            warn!(%token, "chart token unknown, consumed or expired");
            (StatusCode::NOT_FOUND, "圖表不存在或已過期").into_response()
        }
    }
}

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Router};

use crate::error::{AppError, AppResult};
use crate::exposition;
use crate::state::AppState;

/// GET /metrics -- run one emitter pass and render it.
///
/// The pass runs on its own task and completes even if the client
/// disconnects or the request times out.
async fn metrics(State(state): State<AppState>) -> AppResult<Response> {
    let emitter = Arc::clone(&state.emitter);
    let (feed, _) = tokio::spawn(async move { emitter.scrape().await })
        .await
        .map_err(|e| AppError::InternalError(format!("Scrape task failed: {e}")))?;

    let registry = exposition::registry_for(&feed)?;
    if state.config.exporter.process_enabled() {
        exposition::register_process_metrics(&registry)?;
    }
    let (content_type, body) = exposition::encode(&registry)?;

    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics))
}

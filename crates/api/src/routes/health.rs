use std::collections::BTreeMap;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
    /// Number of tracked accounts.
    pub accounts: usize,
    /// Accounts with a stored snapshot (fresh or stale).
    pub cached_accounts: usize,
    /// Stored per-item facts, by collector.
    pub cached_facts: BTreeMap<&'static str, usize>,
    pub collectors: Vec<&'static str>,
}

/// GET /health -- liveness plus cache fill levels. Never calls upstream.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.emitter.cache_stats().await;
    let cached_facts = stats
        .facts
        .iter()
        .map(|(kind, count)| (kind.as_str(), *count))
        .collect();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        started_at: state.started_at,
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        accounts: state.emitter.accounts().len(),
        cached_accounts: stats.accounts,
        cached_facts,
        collectors: state
            .config
            .exporter
            .collectors
            .iter()
            .map(|kind| kind.as_str())
            .collect(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

use std::sync::Arc;

use chrono::{DateTime, Utc};
use steam_exporter_core::emitter::MetricEmitter;
use steam_exporter_core::upstream::SteamApi;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Owns every cache; lives for the whole process.
    pub emitter: Arc<MetricEmitter>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, api: Arc<dyn SteamApi>) -> Self {
        let emitter = MetricEmitter::new(api, &config.exporter.emitter_settings());
        Self {
            config: Arc::new(config),
            emitter: Arc::new(emitter),
            started_at: Utc::now(),
        }
    }
}

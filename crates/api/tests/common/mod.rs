#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use steam_exporter_api::config::{ExporterConfig, ServerConfig};
use steam_exporter_api::router::build_app_router;
use steam_exporter_api::state::AppState;
use steam_exporter_core::collector::CollectorKind;
use steam_exporter_core::testing::FakeSteamApi;
use steam_exporter_core::upstream::OwnedItem;

pub const ALICE: u64 = 76561197960287930;
pub const BOB: u64 = 76561197960287931;

/// Build a test `ServerConfig` tracking `accounts` with `collectors` active.
pub fn test_config(accounts: Vec<u64>, collectors: Vec<CollectorKind>) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        exporter: ExporterConfig {
            api_key: "test-key".to_string(),
            accounts,
            collectors,
            upstream_timeout_secs: 5,
            cache_ttl_secs: 86_400,
            retry_ttl_secs: 3_600,
            store_country: "de".to_string(),
            language: "english".to_string(),
        },
    }
}

/// Build the full application router on top of a scripted upstream.
pub fn build_test_app(api: Arc<FakeSteamApi>, config: ServerConfig) -> Router {
    let state = AppState::new(config.clone(), api);
    build_app_router(state, &config)
}

/// A fake upstream with two accounts and two priced games.
pub fn two_accounts() -> Arc<FakeSteamApi> {
    Arc::new(
        FakeSteamApi::new()
            .with_account(
                ALICE,
                "alice",
                vec![game(400, "Portal", 120), game(70, "Half-Life", 30)],
            )
            .with_account(BOB, "bob", vec![game(400, "Portal", 5)])
            .with_price(400, 999, 249)
            .with_price(70, 999, 999),
    )
}

pub fn game(item_id: u32, name: &str, minutes: u64) -> OwnedItem {
    OwnedItem {
        item_id,
        name: name.to_string(),
        playtime_minutes: minutes,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

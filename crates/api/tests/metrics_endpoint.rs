//! Integration tests for `GET /metrics`.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_text, build_test_app, get, test_config, two_accounts, ALICE, BOB};
use steam_exporter_core::collector::CollectorKind;
use steam_exporter_core::error::UpstreamError;

fn line_for<'a>(text: &'a str, family: &str, steam_id: u64, app_id: u32) -> Option<&'a str> {
    let id = format!(r#"steam_id="{steam_id}""#);
    let app = format!(r#"app_id="{app_id}""#);
    text.lines().find(|line| {
        line.starts_with(&format!("{family}{{")) && line.contains(&id) && line.contains(&app)
    })
}

// ---------------------------------------------------------------------------
// Test: samples for every account and game, in the text format
// ---------------------------------------------------------------------------

#[tokio::test]
async fn metrics_render_playtime_and_prices() {
    let app = build_test_app(
        two_accounts(),
        test_config(vec![ALICE, BOB], vec![CollectorKind::Playtime, CollectorKind::Price]),
    );

    let response = get(app, "/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; version=0.0.4"
    );
    let text = body_text(response).await;

    assert_eq!(
        line_for(&text, "steam_playtime", ALICE, 400),
        Some(r#"steam_playtime{app_id="400",name="Portal",steam_id="76561197960287930",steam_profile_name="alice"} 120"#)
    );
    assert!(line_for(&text, "steam_playtime", BOB, 400).unwrap().ends_with(" 5"));
    assert!(line_for(&text, "steam_game_price_initial", ALICE, 70).unwrap().ends_with(" 999"));
    assert!(line_for(&text, "steam_game_price_final", BOB, 400).unwrap().ends_with(" 249"));
    assert!(!text.contains("steam_achievements"));
}

// ---------------------------------------------------------------------------
// Test: a warm cache serves the next scrape without upstream calls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_scrape_is_served_from_cache() {
    let api = two_accounts();
    let app = build_test_app(
        Arc::clone(&api),
        test_config(vec![ALICE, BOB], vec![CollectorKind::Playtime, CollectorKind::Price]),
    );

    let first = body_text(get(app.clone(), "/metrics").await).await;
    let calls = api.calls();
    let second = body_text(get(app, "/metrics").await).await;

    assert_eq!(api.calls(), calls);
    assert_eq!(first, second);
    // One price lookup per (account, game).
    assert_eq!(api.price_calls(400), 2);
    assert_eq!(api.price_calls(70), 1);
}

// ---------------------------------------------------------------------------
// Test: an unavailable account is left out, the rest still render
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unavailable_account_is_omitted() {
    let api = two_accounts();
    api.fail_owned_items(BOB, UpstreamError::Transport("connection reset".into()));
    let app = build_test_app(
        Arc::clone(&api),
        test_config(vec![ALICE, BOB], vec![CollectorKind::Playtime]),
    );

    let response = get(app, "/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(line_for(&text, "steam_playtime", ALICE, 400).is_some());
    assert!(!text.contains(&BOB.to_string()));
}

// ---------------------------------------------------------------------------
// Test: a failed price renders as zero
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_price_renders_zero() {
    let api = two_accounts();
    api.fail_price(70, UpstreamError::Status { status: 429, body: String::new() });
    let app = build_test_app(api, test_config(vec![ALICE], vec![CollectorKind::Price]));

    let text = body_text(get(app, "/metrics").await).await;

    assert!(line_for(&text, "steam_game_price_initial", ALICE, 70).unwrap().ends_with(" 0"));
    assert!(line_for(&text, "steam_game_price_final", ALICE, 70).unwrap().ends_with(" 0"));
    assert!(line_for(&text, "steam_game_price_final", ALICE, 400).unwrap().ends_with(" 249"));
}

// ---------------------------------------------------------------------------
// Test: process metrics follow the `process` collector
// ---------------------------------------------------------------------------

#[cfg(target_os = "linux")]
#[tokio::test]
async fn process_metrics_only_when_enabled() {
    let with = build_test_app(
        two_accounts(),
        test_config(vec![ALICE], vec![CollectorKind::Playtime, CollectorKind::Process]),
    );
    let without = build_test_app(
        two_accounts(),
        test_config(vec![ALICE], vec![CollectorKind::Playtime]),
    );

    assert!(body_text(get(with, "/metrics").await)
        .await
        .contains("process_cpu_seconds_total"));
    assert!(!body_text(get(without, "/metrics").await)
        .await
        .contains("process_"));
}

// ---------------------------------------------------------------------------
// Test: nothing to report still yields a valid (empty) exposition
// ---------------------------------------------------------------------------

#[tokio::test]
async fn all_accounts_unavailable_renders_empty_body() {
    let api = Arc::new(steam_exporter_core::testing::FakeSteamApi::new());
    let app = build_test_app(api, test_config(vec![ALICE], vec![CollectorKind::Playtime]));

    let response = get(app, "/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.is_empty());
}

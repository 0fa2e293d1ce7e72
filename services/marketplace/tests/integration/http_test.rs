use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use bytes::Bytes;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use uuid::Uuid;

use fixlane_marketplace::domain::types::PlatformSettings;
use fixlane_marketplace::domain::webhook::PAYMENT_INTENT_SUCCEEDED;
use fixlane_marketplace::handlers::webhooks::STRIPE_SIGNATURE;
use fixlane_marketplace::infra::realtime::RealtimeHub;
use fixlane_marketplace::infra::stripe::StripeGateway;
use fixlane_marketplace::router::build_router;
use fixlane_marketplace::state::AppState;
use fixlane_testing::auth::MockAuth;
use fixlane_testing::fixture::payment_intent_body;
use fixlane_testing::webhook::sign_webhook;

use crate::helpers::WEBHOOK_SECRET;

fn server_with(db: DatabaseConnection, webhook_secret: Option<&str>) -> TestServer {
    let state = AppState {
        db,
        gateway: StripeGateway::new("http://127.0.0.1:9", "sk_test", Duration::from_secs(1))
            .unwrap(),
        realtime: RealtimeHub::new(),
        settings: PlatformSettings {
            currency: "usd".to_owned(),
            platform_fee_percent: 10,
            support_email: "support@fixlane.test".to_owned(),
        },
        webhook_secret: webhook_secret.map(str::to_owned),
    };
    TestServer::new(build_router(state)).unwrap()
}

fn server() -> TestServer {
    server_with(DatabaseConnection::Disconnected, Some(WEBHOOK_SECRET))
}

fn as_user(mut request: TestRequest, auth: MockAuth) -> TestRequest {
    for (name, value) in auth.headers().iter() {
        request = request.add_header(name.clone(), value.clone());
    }
    request
}

#[tokio::test]
async fn should_answer_liveness_check() {
    let response = server().get("/healthz").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    server()
        .get("/readyz")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_require_identity_headers() {
    let server = server();
    server
        .get("/users/@me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/jobs")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_hide_database_failures_behind_internal_error() {
    let response = as_user(server().get("/users/@me"), MockAuth::owner(Uuid::now_v7())).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INTERNAL");
}

#[tokio::test]
async fn should_serve_platform_settings_without_identity() {
    let response = server().get("/platform/settings").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["currency"], "usd");
    assert_eq!(body["platform_fee_percent"], 10);
}

#[tokio::test]
async fn should_reserve_platform_stats_for_admins() {
    let response = as_user(
        server().get("/platform/stats"),
        MockAuth::owner(Uuid::now_v7()),
    )
    .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_reserve_user_sync_for_admins() {
    let response = as_user(
        server().post("/users").json(&json!({
            "id": Uuid::now_v7(),
            "email": "new@example.com",
            "name": "New",
        })),
        MockAuth::provider(Uuid::now_v7()),
    )
    .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_reject_webhook_without_signature_header() {
    let body = payment_intent_body(PAYMENT_INTENT_SUCCEEDED, "pi_1");

    let response = server().post("/webhooks/stripe").bytes(Bytes::from(body)).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_INPUT");
}

#[tokio::test]
async fn should_reject_empty_webhook_body() {
    let header = sign_webhook(WEBHOOK_SECRET, b"", Utc::now().timestamp());

    let response = server()
        .post("/webhooks/stripe")
        .add_header(
            HeaderName::from_static(STRIPE_SIGNATURE),
            HeaderValue::from_str(&header).unwrap(),
        )
        .bytes(Bytes::new())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_reject_forged_webhook() {
    let body = payment_intent_body(PAYMENT_INTENT_SUCCEEDED, "pi_1");
    let header = sign_webhook("whsec_forged", &body, Utc::now().timestamp());

    let response = server()
        .post("/webhooks/stripe")
        .add_header(
            HeaderName::from_static(STRIPE_SIGNATURE),
            HeaderValue::from_str(&header).unwrap(),
        )
        .bytes(Bytes::from(body))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "WEBHOOK_REJECTED");
}

#[tokio::test]
async fn should_reject_webhook_when_secret_is_unset() {
    let body = payment_intent_body(PAYMENT_INTENT_SUCCEEDED, "pi_1");
    let header = sign_webhook(WEBHOOK_SECRET, &body, Utc::now().timestamp());
    let server = server_with(DatabaseConnection::Disconnected, None);

    let response = server
        .post("/webhooks/stripe")
        .add_header(
            HeaderName::from_static(STRIPE_SIGNATURE),
            HeaderValue::from_str(&header).unwrap(),
        )
        .bytes(Bytes::from(body))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

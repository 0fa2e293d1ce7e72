use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use fixlane_core::config::Config;
use fixlane_core::tracing::init_tracing;

use fixlane_marketplace::config::MarketplaceConfig;
use fixlane_marketplace::domain::types::PlatformSettings;
use fixlane_marketplace::infra::realtime::RealtimeHub;
use fixlane_marketplace::infra::stripe::StripeGateway;
use fixlane_marketplace::router::build_router;
use fixlane_marketplace::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = MarketplaceConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    if config.stripe_webhook_secret.is_none() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET is unset; payment webhooks will be rejected");
    }

    let gateway = StripeGateway::new(
        &config.stripe_api_base,
        &config.stripe_secret_key,
        Duration::from_secs(config.stripe_timeout_secs),
    )
    .expect("failed to build payment gateway client");

    let state = AppState {
        db,
        gateway,
        realtime: RealtimeHub::new(),
        settings: PlatformSettings {
            currency: config.currency,
            platform_fee_percent: config.platform_fee_percent,
            support_email: config.support_email,
        },
        webhook_secret: config.stripe_webhook_secret,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.marketplace_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("marketplace service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}

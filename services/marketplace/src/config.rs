use serde::Deserialize;

use fixlane_core::config::Config;

/// Marketplace service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3120). Env var: `MARKETPLACE_PORT`.
    #[serde(default = "default_port")]
    pub marketplace_port: u16,
    /// Secret API key for the payment gateway.
    pub stripe_secret_key: String,
    /// Webhook signing secret. Webhooks are rejected when unset.
    pub stripe_webhook_secret: Option<String>,
    #[serde(default = "default_stripe_api_base")]
    pub stripe_api_base: String,
    /// Upper bound on one gateway call, in seconds.
    #[serde(default = "default_stripe_timeout_secs")]
    pub stripe_timeout_secs: u64,
    /// ISO currency code sent with every payment intent.
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_platform_fee_percent")]
    pub platform_fee_percent: u8,
    #[serde(default = "default_support_email")]
    pub support_email: String,
}

fn default_port() -> u16 {
    3120
}

fn default_stripe_api_base() -> String {
    "https://api.stripe.com".to_owned()
}

fn default_stripe_timeout_secs() -> u64 {
    10
}

fn default_currency() -> String {
    "usd".to_owned()
}

fn default_platform_fee_percent() -> u8 {
    10
}

fn default_support_email() -> String {
    "support@fixlane.app".to_owned()
}

impl Config for MarketplaceConfig {}

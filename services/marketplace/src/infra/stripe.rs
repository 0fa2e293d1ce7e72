use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Context as _;
use axum::http::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::domain::repository::{PaymentGateway, PaymentIntent, PaymentIntentRequest};
use crate::error::MarketplaceError;

/// Payment intents over the gateway's form-encoded REST API.
#[derive(Clone)]
pub struct StripeGateway {
    pub client: reqwest::Client,
    pub api_base: String,
    pub secret_key: String,
}

impl StripeGateway {
    pub fn new(
        api_base: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build payment gateway client")?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            secret_key: secret_key.into(),
        })
    }
}

#[derive(Serialize)]
struct IntentForm<'a> {
    amount: i64,
    currency: &'a str,
    metadata: BTreeMap<&'a str, &'a str>,
}

#[derive(Deserialize)]
struct IntentResponse {
    id: String,
    client_secret: String,
}

fn intent_form(request: &PaymentIntentRequest) -> anyhow::Result<String> {
    let form = IntentForm {
        amount: request.amount,
        currency: &request.currency,
        metadata: request
            .metadata
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect(),
    };
    serde_qs::to_string(&form).context("encode payment intent form")
}

impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, MarketplaceError> {
        let body = intent_form(request)?;
        let url = format!("{}/v1/payment_intents", self.api_base.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .context("send payment intent request")
            .map_err(MarketplaceError::PaymentGateway)?;
        let response = response
            .error_for_status()
            .context("payment intent rejected")
            .map_err(MarketplaceError::PaymentGateway)?;
        let intent: IntentResponse = response
            .json()
            .await
            .context("decode payment intent")
            .map_err(MarketplaceError::PaymentGateway)?;

        tracing::debug!(intent_id = %intent.id, amount = request.amount, "payment intent created");
        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
        })
    }
}

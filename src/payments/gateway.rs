use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::PaymentConfig;

/// Something that can open a card payment and hand back the client secret.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        methods: &[&str],
    ) -> anyhow::Result<String>;
}

#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct PaymentIntent {
    id: String,
    client_secret: String,
}

impl StripeGateway {
    pub fn new(cfg: &PaymentConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            secret_key: cfg.stripe_secret_key.clone(),
        })
    }
}

fn intent_form(amount: i64, currency: &str, methods: &[&str]) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("amount", amount.to_string()),
        ("currency", currency.to_string()),
    ];
    form.extend(methods.iter().map(|m| ("payment_method_types[]", m.to_string())));
    form
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        methods: &[&str],
    ) -> anyhow::Result<String> {
        let resp = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&intent_form(amount, currency, methods))
            .send()
            .await
            .context("stripe payment_intents request")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("stripe returned {status}: {body}");
        }

        let intent: PaymentIntent = resp.json().await.context("decode payment intent")?;
        debug!(intent_id = %intent.id, amount, currency, "payment intent created");
        Ok(intent.client_secret)
    }
}

#[cfg(test)]
pub mod fake {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct IntentCall {
        pub amount: i64,
        pub currency: String,
        pub methods: Vec<String>,
    }

    /// Records every call; refuses non-positive amounts like the real API.
    #[derive(Default)]
    pub struct RecordingGateway {
        pub calls: Mutex<Vec<IntentCall>>,
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn create_intent(
            &self,
            amount: i64,
            currency: &str,
            methods: &[&str],
        ) -> anyhow::Result<String> {
            self.calls.lock().unwrap().push(IntentCall {
                amount,
                currency: currency.to_string(),
                methods: methods.iter().map(|m| m.to_string()).collect(),
            });
            if amount <= 0 {
                anyhow::bail!("amount must be at least 1");
            }
            Ok(format!("pi_{amount}_secret_test"))
        }
    }
}

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::{ChatTransport, DeliveryReport, OutboundPayload, WhatsAppConfig};

#[derive(Clone)]
/// Reqwest-backed [`ChatTransport`] posting to the Cloud API messages
/// endpoint with a bearer token and a fixed per-request timeout.
pub struct WhatsAppClient {
    http: reqwest::Client,
    config: WhatsAppConfig,
}

impl WhatsAppClient {
    pub fn new(config: WhatsAppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .context("failed to create whatsapp api client")?;
        let config = WhatsAppConfig {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            ..config
        };
        Ok(Self { http, config })
    }

    async fn post_message(&self, recipient: &str, payload: &OutboundPayload) -> Result<()> {
        let url = format!("{}/{}/messages", self.config.api_base, self.config.phone_id);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.access_token)
            .json(&payload.to_request_body(recipient))
            .send()
            .await
            .context("whatsapp message request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "whatsapp message send failed: status={} body={}",
                status.as_u16(),
                body
            );
        }
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for WhatsAppClient {
    async fn send(&self, recipient: &str, payload: &OutboundPayload) -> DeliveryReport {
        match self.post_message(recipient, payload).await {
            Ok(()) => {
                tracing::debug!(recipient, "delivered whatsapp message");
                DeliveryReport { delivered: true }
            }
            Err(error) => {
                tracing::warn!(recipient, %error, "failed to deliver whatsapp message");
                DeliveryReport { delivered: false }
            }
        }
    }
}

//! Outbound chat delivery for the Bellhop dialogue flow.
//!
//! Models the three reply shapes the dialogue produces (plain text, quick
//! reply buttons, selectable list) and delivers them through the WhatsApp
//! Cloud API. Delivery is at-most-once with no confirmation: a failed send is
//! logged and reported, never raised.

use async_trait::async_trait;

mod whatsapp_api_client;
mod whatsapp_payload;

pub use whatsapp_api_client::WhatsAppClient;
pub use whatsapp_payload::{OutboundPayload, ReplyOption, MAX_BUTTONS, MAX_LIST_ROWS};

#[derive(Debug, Clone)]
/// Connection settings for the WhatsApp Cloud API.
pub struct WhatsAppConfig {
    pub api_base: String,
    pub phone_id: String,
    pub access_token: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of one delivery attempt.
pub struct DeliveryReport {
    pub delivered: bool,
}

/// Fire-and-forget outbound delivery seam. Implementations log failures and
/// report them; they never error.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, recipient: &str, payload: &OutboundPayload) -> DeliveryReport;
}

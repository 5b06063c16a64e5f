//! End-to-end tests against a gateway bound on an ephemeral port.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tempfile::tempdir;

use bellhop_dialogue::{DialogueRuntime, DialogueRuntimeConfig};
use bellhop_jenkins::CiClient;
use bellhop_session::{FileSessionStore, SessionStore};
use bellhop_whatsapp::{ChatTransport, DeliveryReport, OutboundPayload};

use super::*;

const VERIFY_TOKEN: &str = "bellhop-secret";

struct StaticCiClient {
    jobs: Vec<String>,
}

#[async_trait]
impl CiClient for StaticCiClient {
    async fn list_jobs(&self) -> Vec<String> {
        self.jobs.clone()
    }

    async fn trigger_build(&self, _job_name: &str) -> bool {
        true
    }

    async fn latest_build_number(&self, _job_name: &str) -> Option<u64> {
        Some(1)
    }

    async fn job_status(&self, _job_name: &str) -> String {
        "SUCCESS".to_string()
    }
}

#[derive(Clone, Default)]
struct CountingChatTransport {
    deliveries: Arc<Mutex<usize>>,
}

impl CountingChatTransport {
    fn delivery_count(&self) -> usize {
        *self.deliveries.lock().expect("deliveries lock")
    }
}

#[async_trait]
impl ChatTransport for CountingChatTransport {
    async fn send(&self, _recipient: &str, _payload: &OutboundPayload) -> DeliveryReport {
        *self.deliveries.lock().expect("deliveries lock") += 1;
        DeliveryReport { delivered: true }
    }
}

struct GatewayHarness {
    base_url: String,
    chat: CountingChatTransport,
    _tempdir: tempfile::TempDir,
}

async fn spawn_gateway() -> GatewayHarness {
    let tempdir = tempdir().expect("tempdir");
    let store =
        Arc::new(FileSessionStore::open(tempdir.path().join("sessions.json")).expect("store"));
    let chat = CountingChatTransport::default();
    let runtime = DialogueRuntime::new(
        DialogueRuntimeConfig {
            poll_retry_max_attempts: 1,
            poll_retry_delay_ms: 0,
            ..DialogueRuntimeConfig::default()
        },
        store as Arc<dyn SessionStore>,
        Arc::new(StaticCiClient {
            jobs: vec!["goognu-deploy".to_string()],
        }),
        Arc::new(chat.clone()),
    );

    let state = Arc::new(GatewayState {
        verify_token: VERIFY_TOKEN.to_string(),
        runtime,
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = build_gateway_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    GatewayHarness {
        base_url: format!("http://{addr}"),
        chat,
        _tempdir: tempdir,
    }
}

#[tokio::test]
async fn verification_round_trips_the_challenge() {
    let harness = spawn_gateway().await;
    let response = reqwest::Client::new()
        .get(format!("{}/webhook", harness.base_url))
        .query(&[
            ("hub.mode", "subscribe"),
            ("hub.verify_token", VERIFY_TOKEN),
            ("hub.challenge", "1158201444"),
        ])
        .send()
        .await
        .expect("request");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.expect("body"), "1158201444");
}

#[tokio::test]
async fn verification_rejects_a_wrong_token() {
    let harness = spawn_gateway().await;
    let response = reqwest::Client::new()
        .get(format!("{}/webhook", harness.base_url))
        .query(&[
            ("hub.mode", "subscribe"),
            ("hub.verify_token", "guessed"),
            ("hub.challenge", "1158201444"),
        ])
        .send()
        .await
        .expect("request");

    assert_eq!(response.status().as_u16(), 403);
    assert_eq!(
        response.text().await.expect("body"),
        "Invalid verification token"
    );
}

#[tokio::test]
async fn webhook_event_answers_with_the_engine_status_tag() {
    let harness = spawn_gateway().await;
    let body = json!({"entry": [{"changes": [{"value": {"messages": [
        {"from": "155512345", "text": {"body": "hi"}}
    ]}}]}]});

    let response = reqwest::Client::new()
        .post(format!("{}/webhook", harness.base_url))
        .json(&body)
        .send()
        .await
        .expect("request");

    assert_eq!(response.status().as_u16(), 200);
    let payload = response.json::<serde_json::Value>().await.expect("json");
    assert_eq!(payload, json!({"status": "waiting for customer"}));
    assert_eq!(harness.chat.delivery_count(), 1);
}

#[tokio::test]
async fn malformed_body_is_acknowledged_as_ok() {
    let harness = spawn_gateway().await;
    let response = reqwest::Client::new()
        .post(format!("{}/webhook", harness.base_url))
        .header("content-type", "application/json")
        .body("not json at all")
        .send()
        .await
        .expect("request");

    assert_eq!(response.status().as_u16(), 200);
    let payload = response.json::<serde_json::Value>().await.expect("json");
    assert_eq!(payload, json!({"status": "ok"}));
    assert_eq!(harness.chat.delivery_count(), 0);
}

#[tokio::test]
async fn event_without_messages_is_acknowledged_as_ok() {
    let harness = spawn_gateway().await;
    let response = reqwest::Client::new()
        .post(format!("{}/webhook", harness.base_url))
        .json(&json!({"entry": []}))
        .send()
        .await
        .expect("request");

    assert_eq!(
        response.json::<serde_json::Value>().await.expect("json"),
        json!({"status": "ok"})
    );
}

#[tokio::test]
async fn root_reports_liveness() {
    let harness = spawn_gateway().await;
    let payload = reqwest::Client::new()
        .get(format!("{}/", harness.base_url))
        .send()
        .await
        .expect("request")
        .json::<serde_json::Value>()
        .await
        .expect("json");
    assert_eq!(payload, json!({"message": "Bellhop is running!"}));
}

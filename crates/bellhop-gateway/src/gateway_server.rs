//! Axum server for webhook verification and event dispatch.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use bellhop_dialogue::DialogueRuntime;

#[cfg(test)]
mod tests;

const WEBHOOK_ENDPOINT: &str = "/webhook";

#[derive(Debug, Clone)]
/// Listener settings for the webhook gateway.
pub struct GatewayConfig {
    pub bind: String,
    /// Static token the chat platform echoes during subscription
    /// verification.
    pub verify_token: String,
}

struct GatewayState {
    verify_token: String,
    runtime: DialogueRuntime,
}

/// Binds the gateway and serves until ctrl-c.
pub async fn run_gateway(config: GatewayConfig, runtime: DialogueRuntime) -> Result<()> {
    let bind_addr = config
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid --bind '{}'", config.bind))?;
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind gateway on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve bound gateway address")?;
    tracing::info!(%local_addr, endpoint = WEBHOOK_ENDPOINT, "bellhop gateway listening");

    let state = Arc::new(GatewayState {
        verify_token: config.verify_token,
        runtime,
    });
    axum::serve(listener, build_gateway_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("gateway server exited unexpectedly")
}

fn build_gateway_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route(
            WEBHOOK_ENDPOINT,
            get(handle_verification).post(handle_webhook_event),
        )
        .with_state(state)
}

async fn handle_root() -> Json<Value> {
    Json(json!({"message": "Bellhop is running!"}))
}

async fn handle_verification(
    State(state): State<Arc<GatewayState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mode = params.get("hub.mode").map(String::as_str);
    let token = params.get("hub.verify_token").map(String::as_str);
    if mode == Some("subscribe") && token == Some(state.verify_token.as_str()) {
        let challenge = params.get("hub.challenge").cloned().unwrap_or_default();
        return (StatusCode::OK, challenge).into_response();
    }
    tracing::warn!("webhook verification rejected");
    (StatusCode::FORBIDDEN, "Invalid verification token").into_response()
}

/// Always answers 200 so the chat platform never re-delivers the event; the
/// engine's status tag carries the real outcome.
async fn handle_webhook_event(
    State(state): State<Arc<GatewayState>>,
    body: Bytes,
) -> Json<Value> {
    let Ok(body) = serde_json::from_slice::<Value>(&body) else {
        tracing::debug!("discarding malformed webhook body");
        return Json(json!({"status": "ok"}));
    };
    let status = state.runtime.evaluate(&body).await;
    Json(json!({"status": status.as_str()}))
}

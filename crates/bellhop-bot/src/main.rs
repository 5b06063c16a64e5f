//! Bellhop process entrypoint: parse flags, wire the adapters, serve the
//! webhook gateway.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use bellhop_dialogue::{DialogueRuntime, DialogueRuntimeConfig};
use bellhop_gateway::{run_gateway, GatewayConfig};
use bellhop_jenkins::{JenkinsClient, JenkinsConfig};
use bellhop_session::open_session_store;
use bellhop_whatsapp::{WhatsAppClient, WhatsAppConfig};

mod bootstrap_helpers;
mod cli_args;

use bootstrap_helpers::init_tracing;
use cli_args::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let store = open_session_store(&cli.session_store)?;

    let ci = Arc::new(JenkinsClient::new(JenkinsConfig {
        base_url: cli.jenkins_url,
        username: cli.jenkins_username,
        api_token: cli.jenkins_token,
        request_timeout_ms: cli.request_timeout_ms,
    })?);

    let chat = Arc::new(WhatsAppClient::new(WhatsAppConfig {
        api_base: cli.whatsapp_api_base,
        phone_id: cli.whatsapp_phone_id,
        access_token: cli.whatsapp_token,
        request_timeout_ms: cli.request_timeout_ms,
    })?);

    let customers = cli
        .customers
        .iter()
        .map(|customer| customer.trim().to_string())
        .filter(|customer| !customer.is_empty())
        .collect::<Vec<_>>();

    let runtime = DialogueRuntime::new(
        DialogueRuntimeConfig {
            customers,
            poll_retry_max_attempts: cli.poll_retry_max_attempts,
            poll_retry_delay_ms: cli.poll_retry_delay_ms,
            ..DialogueRuntimeConfig::default()
        },
        store,
        ci,
        chat,
    );

    run_gateway(
        GatewayConfig {
            bind: cli.bind,
            verify_token: cli.verify_token,
        },
        runtime,
    )
    .await
}

//! Full-stack dialogue walks against mocked Jenkins and WhatsApp servers.

use std::path::Path;
use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::{json, Value};
use tempfile::tempdir;

use bellhop_dialogue::{DialogueRuntime, DialogueRuntimeConfig, DialogueStatus};
use bellhop_jenkins::{JenkinsClient, JenkinsConfig};
use bellhop_session::{open_session_store, DialogueStep, SessionState, SessionStore};
use bellhop_whatsapp::{WhatsAppClient, WhatsAppConfig};

const SENDER: &str = "155512345";
const PHONE_ID: &str = "10001";

fn build_runtime(
    jenkins_base: &str,
    whatsapp_base: &str,
    store_path: &Path,
) -> (DialogueRuntime, Arc<dyn SessionStore>) {
    let store = open_session_store(store_path).expect("session store");
    let ci = JenkinsClient::new(JenkinsConfig {
        base_url: jenkins_base.to_string(),
        username: "bellhop".to_string(),
        api_token: "token".to_string(),
        request_timeout_ms: 2_000,
    })
    .expect("jenkins client");
    let chat = WhatsAppClient::new(WhatsAppConfig {
        api_base: whatsapp_base.to_string(),
        phone_id: PHONE_ID.to_string(),
        access_token: "wa-token".to_string(),
        request_timeout_ms: 2_000,
    })
    .expect("whatsapp client");

    let runtime = DialogueRuntime::new(
        DialogueRuntimeConfig {
            poll_retry_max_attempts: 2,
            poll_retry_delay_ms: 0,
            ..DialogueRuntimeConfig::default()
        },
        Arc::clone(&store),
        Arc::new(ci),
        Arc::new(chat),
    );
    (runtime, store)
}

fn text_event(body: &str) -> Value {
    json!({"entry": [{"changes": [{"value": {"messages": [
        {"from": SENDER, "text": {"body": body}}
    ]}}]}]})
}

fn button_event(id: &str) -> Value {
    json!({"entry": [{"changes": [{"value": {"messages": [
        {"from": SENDER, "interactive": {"button_reply": {"id": id, "title": id}}}
    ]}}]}]})
}

#[tokio::test]
async fn greeting_to_trigger_walk_clears_the_session() {
    let jenkins = MockServer::start();
    jenkins.mock(|when, then| {
        when.method(GET).path("/api/json");
        then.status(200).json_body(json!({"jobs": [
            {"name": "goognu-deploy"},
            {"name": "goognu-test"},
            {"name": "hiringgo-deploy"}
        ]}));
    });
    let trigger = jenkins.mock(|when, then| {
        when.method(POST).path("/job/goognu-deploy/build");
        then.status(201);
    });
    jenkins.mock(|when, then| {
        when.method(GET).path("/job/goognu-deploy/lastBuild/api/json");
        then.status(200).json_body(json!({"number": 101, "result": null}));
    });

    let whatsapp = MockServer::start();
    let deliveries = whatsapp.mock(|when, then| {
        when.method(POST).path(format!("/{PHONE_ID}/messages"));
        then.status(200).json_body(json!({"messages": [{"id": "wamid.1"}]}));
    });

    let tempdir = tempdir().expect("tempdir");
    let (runtime, store) = build_runtime(
        &jenkins.base_url(),
        &whatsapp.base_url(),
        &tempdir.path().join("sessions.json"),
    );

    assert_eq!(
        runtime.evaluate(&text_event("hi")).await,
        DialogueStatus::WaitingForCustomer
    );
    assert_eq!(
        runtime.evaluate(&button_event("goognu")).await,
        DialogueStatus::WaitingForJob
    );
    let session = store.get(SENDER).expect("session");
    assert_eq!(session.step, Some(DialogueStep::SelectJob));
    assert_eq!(session.jobs, vec!["goognu-deploy", "goognu-test"]);

    assert_eq!(
        runtime.evaluate(&button_event("goognu-deploy")).await,
        DialogueStatus::WaitingForAction
    );
    assert_eq!(
        runtime.evaluate(&button_event("trigger")).await,
        DialogueStatus::Triggered
    );

    trigger.assert();
    deliveries.assert_hits(4);
    assert_eq!(
        store.get(SENDER).expect("session"),
        SessionState::empty_for(SENDER)
    );
}

#[tokio::test]
async fn status_then_terminate_walk_on_the_sqlite_backend() {
    let jenkins = MockServer::start();
    jenkins.mock(|when, then| {
        when.method(GET).path("/api/json");
        then.status(200)
            .json_body(json!({"jobs": [{"name": "hiringgo-deploy"}]}));
    });
    let last_build = jenkins.mock(|when, then| {
        when.method(GET).path("/job/hiringgo-deploy/lastBuild/api/json");
        then.status(200)
            .json_body(json!({"number": 12, "result": "SUCCESS"}));
    });

    let whatsapp = MockServer::start();
    whatsapp.mock(|when, then| {
        when.method(POST).path(format!("/{PHONE_ID}/messages"));
        then.status(200).json_body(json!({"messages": [{"id": "wamid.2"}]}));
    });

    let tempdir = tempdir().expect("tempdir");
    let (runtime, store) = build_runtime(
        &jenkins.base_url(),
        &whatsapp.base_url(),
        &tempdir.path().join("sessions.sqlite"),
    );

    runtime.evaluate(&text_event("hi")).await;
    runtime.evaluate(&button_event("hiringgo")).await;
    runtime.evaluate(&button_event("hiringgo-deploy")).await;

    assert_eq!(
        runtime.evaluate(&button_event("status")).await,
        DialogueStatus::Status
    );
    last_build.assert();
    let session = store.get(SENDER).expect("session");
    assert_eq!(session.step, Some(DialogueStep::JobAction));
    assert_eq!(session.job_name.as_deref(), Some("hiringgo-deploy"));

    assert_eq!(
        runtime.evaluate(&button_event("terminate")).await,
        DialogueStatus::Terminated
    );
    assert_eq!(
        store.get(SENDER).expect("session"),
        SessionState::empty_for(SENDER)
    );
}

#[tokio::test]
async fn jenkins_outage_surfaces_no_jobs_and_keeps_the_step() {
    let jenkins = MockServer::start();
    jenkins.mock(|when, then| {
        when.method(GET).path("/api/json");
        then.status(503);
    });

    let whatsapp = MockServer::start();
    whatsapp.mock(|when, then| {
        when.method(POST).path(format!("/{PHONE_ID}/messages"));
        then.status(200).json_body(json!({"messages": [{"id": "wamid.3"}]}));
    });

    let tempdir = tempdir().expect("tempdir");
    let (runtime, store) = build_runtime(
        &jenkins.base_url(),
        &whatsapp.base_url(),
        &tempdir.path().join("sessions.json"),
    );

    runtime.evaluate(&text_event("hi")).await;
    assert_eq!(
        runtime.evaluate(&button_event("goognu")).await,
        DialogueStatus::NoJobs
    );
    assert_eq!(
        store.get(SENDER).expect("session").step,
        Some(DialogueStep::SelectCustomer)
    );
}

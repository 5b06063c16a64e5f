//! Dialogue runtime: the four-step state machine behind the chat webhook.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use bellhop_jenkins::CiClient;
use bellhop_session::{DialogueStep, SessionState, SessionStore, SessionUpdate};
use bellhop_whatsapp::{ChatTransport, OutboundPayload};

mod dialogue_event;
mod dialogue_reply;

pub use dialogue_event::{extract_inbound_message, InboundMessage};
use dialogue_reply::{
    customer_menu, job_action_menu, job_button_menu, job_list_menu, job_status_text, no_jobs_text,
    trigger_failure_text, trigger_success_text, INTERNAL_ERROR_TEXT, INVALID_ACTION_TEXT,
    INVALID_JOB_TEXT, INVALID_SELECTION_TEXT, TERMINATED_TEXT,
};

/// Sentinel customer id meaning "no prefix scope, offer every job".
const CUSTOM_SCOPE: &str = "custom";

const JOB_ACTION_TRIGGER: &str = "trigger";
const JOB_ACTION_STATUS: &str = "status";
const JOB_ACTION_TERMINATE: &str = "terminate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Terminal outcome of one evaluation pass. Every variant is a successful
/// webhook response from the transport's point of view, `Error` included.
pub enum DialogueStatus {
    Ok,
    WaitingForCustomer,
    WaitingForJob,
    WaitingForAction,
    NoJobs,
    InvalidSelection,
    InvalidJob,
    InvalidAction,
    Triggered,
    Status,
    Terminated,
    Handled,
    Error,
}

impl DialogueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::WaitingForCustomer => "waiting for customer",
            Self::WaitingForJob => "waiting for job",
            Self::WaitingForAction => "waiting for action",
            Self::NoJobs => "no jobs",
            Self::InvalidSelection => "invalid selection",
            Self::InvalidJob => "invalid job",
            Self::InvalidAction => "invalid action",
            Self::Triggered => "triggered",
            Self::Status => "status",
            Self::Terminated => "terminated",
            Self::Handled => "handled",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
/// Tunables for the dialogue flow.
pub struct DialogueRuntimeConfig {
    /// Customer scopes offered in the greeting menu, matched as
    /// case-insensitive job-name prefixes.
    pub customers: Vec<String>,
    /// Input that restarts the dialogue from any step.
    pub greeting_keyword: String,
    /// Attempts to read the build number after a successful trigger.
    pub poll_retry_max_attempts: usize,
    /// Fixed delay between build-number poll attempts.
    pub poll_retry_delay_ms: u64,
}

impl Default for DialogueRuntimeConfig {
    fn default() -> Self {
        Self {
            customers: vec!["goognu".to_string(), "hiringgo".to_string()],
            greeting_keyword: "hi".to_string(),
            poll_retry_max_attempts: 5,
            poll_retry_delay_ms: 2_000,
        }
    }
}

/// Evaluates inbound chat events against persisted per-sender dialogue
/// state. Holds no session state of its own; every evaluation reloads the
/// sender's position from the store.
pub struct DialogueRuntime {
    config: DialogueRuntimeConfig,
    store: Arc<dyn SessionStore>,
    ci: Arc<dyn CiClient>,
    chat: Arc<dyn ChatTransport>,
}

impl DialogueRuntime {
    pub fn new(
        config: DialogueRuntimeConfig,
        store: Arc<dyn SessionStore>,
        ci: Arc<dyn CiClient>,
        chat: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            config,
            store,
            ci,
            chat,
        }
    }

    /// Runs one evaluation pass. Never errors: an internal fault is logged,
    /// the sender gets a best-effort notice, and `Error` is returned with the
    /// session left as it was.
    pub async fn evaluate(&self, body: &Value) -> DialogueStatus {
        match self.evaluate_inner(body).await {
            Ok(status) => status,
            Err(error) => {
                tracing::warn!(%error, "dialogue evaluation failed");
                if let Some(sender) = extract_inbound_message(body).sender() {
                    self.chat
                        .send(sender, &OutboundPayload::text(INTERNAL_ERROR_TEXT))
                        .await;
                }
                DialogueStatus::Error
            }
        }
    }

    async fn evaluate_inner(&self, body: &Value) -> Result<DialogueStatus> {
        let message = extract_inbound_message(body);
        let Some(sender) = message.sender() else {
            return Ok(DialogueStatus::Ok);
        };
        let input = message.input();
        let session = self.store.get(sender)?;

        // The greeting restarts from any step; a sender with no recorded
        // step gets the greeting no matter what they typed.
        let step = match session.step {
            Some(step) if input != self.config.greeting_keyword => step,
            _ => return self.begin_customer_selection(sender).await,
        };

        match step {
            DialogueStep::SelectCustomer => self.handle_customer_selection(sender, input).await,
            DialogueStep::SelectJob => self.handle_job_selection(sender, input, &session).await,
            DialogueStep::JobAction => self.handle_job_action(sender, input, &session).await,
            DialogueStep::Unknown => Ok(DialogueStatus::Handled),
        }
    }

    async fn begin_customer_selection(&self, sender: &str) -> Result<DialogueStatus> {
        self.store
            .set(sender, &SessionUpdate::step(DialogueStep::SelectCustomer))?;
        self.chat
            .send(sender, &customer_menu(&self.config.customers))
            .await;
        Ok(DialogueStatus::WaitingForCustomer)
    }

    async fn handle_customer_selection(
        &self,
        sender: &str,
        input: &str,
    ) -> Result<DialogueStatus> {
        let known_customer = self
            .config
            .customers
            .iter()
            .find(|customer| customer.to_lowercase() == input);

        if let Some(customer) = known_customer {
            let jobs = self.ci.list_jobs_by_prefix(customer).await;
            if jobs.is_empty() {
                self.chat
                    .send(sender, &no_jobs_text(Some(customer.as_str())))
                    .await;
                return Ok(DialogueStatus::NoJobs);
            }
            let menu = job_button_menu(&jobs);
            self.store.set(
                sender,
                &SessionUpdate {
                    step: Some(DialogueStep::SelectJob),
                    customer: Some(customer.to_lowercase()),
                    jobs: Some(jobs),
                    job_name: None,
                },
            )?;
            self.chat.send(sender, &menu).await;
            return Ok(DialogueStatus::WaitingForJob);
        }

        if input == CUSTOM_SCOPE {
            let jobs = self.ci.list_jobs().await;
            if jobs.is_empty() {
                self.chat.send(sender, &no_jobs_text(None)).await;
                return Ok(DialogueStatus::NoJobs);
            }
            let menu = job_list_menu(&jobs);
            // The stored candidate set is the full job list even though the
            // list UI can only show the first ten rows.
            self.store.set(
                sender,
                &SessionUpdate {
                    step: Some(DialogueStep::SelectJob),
                    customer: Some(CUSTOM_SCOPE.to_string()),
                    jobs: Some(jobs),
                    job_name: None,
                },
            )?;
            self.chat.send(sender, &menu).await;
            return Ok(DialogueStatus::WaitingForJob);
        }

        self.chat
            .send(sender, &OutboundPayload::text(INVALID_SELECTION_TEXT))
            .await;
        Ok(DialogueStatus::InvalidSelection)
    }

    async fn handle_job_selection(
        &self,
        sender: &str,
        input: &str,
        session: &SessionState,
    ) -> Result<DialogueStatus> {
        // Reply ids arrive lower-cased, so the offered names are matched
        // case-insensitively and the stored spelling is what gets persisted.
        let selected = session
            .jobs
            .iter()
            .find(|job| job.to_lowercase() == input);

        let Some(job_name) = selected else {
            self.chat
                .send(sender, &OutboundPayload::text(INVALID_JOB_TEXT))
                .await;
            return Ok(DialogueStatus::InvalidJob);
        };

        self.store.set(
            sender,
            &SessionUpdate {
                step: Some(DialogueStep::JobAction),
                job_name: Some(job_name.clone()),
                ..SessionUpdate::default()
            },
        )?;
        self.chat.send(sender, &job_action_menu(job_name)).await;
        Ok(DialogueStatus::WaitingForAction)
    }

    async fn handle_job_action(
        &self,
        sender: &str,
        input: &str,
        session: &SessionState,
    ) -> Result<DialogueStatus> {
        let Some(job_name) = session.job_name.as_deref() else {
            self.chat
                .send(sender, &OutboundPayload::text(INVALID_ACTION_TEXT))
                .await;
            return Ok(DialogueStatus::InvalidAction);
        };

        match input {
            JOB_ACTION_TRIGGER => {
                if !self.ci.trigger_build(job_name).await {
                    self.store.clear(sender)?;
                    self.chat
                        .send(sender, &trigger_failure_text(job_name))
                        .await;
                    return Ok(DialogueStatus::Triggered);
                }

                // The trigger already succeeded; a missing build number is
                // cosmetic and must not fail the flow.
                let build_number = self.poll_latest_build_number(job_name).await;
                let status = self.ci.job_status(job_name).await;
                self.store.clear(sender)?;
                self.chat
                    .send(
                        sender,
                        &trigger_success_text(job_name, build_number, &status),
                    )
                    .await;
                Ok(DialogueStatus::Triggered)
            }
            JOB_ACTION_STATUS => {
                let status = self.ci.job_status(job_name).await;
                self.chat
                    .send(sender, &job_status_text(job_name, &status))
                    .await;
                Ok(DialogueStatus::Status)
            }
            JOB_ACTION_TERMINATE => {
                self.store.clear(sender)?;
                self.chat
                    .send(sender, &OutboundPayload::text(TERMINATED_TEXT))
                    .await;
                Ok(DialogueStatus::Terminated)
            }
            _ => {
                self.chat
                    .send(sender, &OutboundPayload::text(INVALID_ACTION_TEXT))
                    .await;
                Ok(DialogueStatus::InvalidAction)
            }
        }
    }

    async fn poll_latest_build_number(&self, job_name: &str) -> Option<u64> {
        let attempts = self.config.poll_retry_max_attempts.max(1);
        for attempt in 1..=attempts {
            if let Some(number) = self.ci.latest_build_number(job_name).await {
                return Some(number);
            }
            if attempt < attempts && self.config.poll_retry_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.poll_retry_delay_ms)).await;
            }
        }
        tracing::debug!(job = job_name, "build number poll exhausted");
        None
    }
}

//! Per-sender conversation state persistence for the Bellhop dialogue flow.
//!
//! A session records where a sender currently is in the dialogue (the step)
//! plus whatever that step needs to validate the next inbound message. Two
//! file backends are provided: a single schema-versioned JSON document and a
//! SQLite table, selected from the store path's extension. Writes are
//! last-writer-wins; no cross-process exclusivity is attempted.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

mod session_file_store;
mod session_sqlite_store;

pub use session_file_store::FileSessionStore;
pub use session_sqlite_store::SqliteSessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
/// Position of a sender inside the dialogue flow.
pub enum DialogueStep {
    SelectCustomer,
    SelectJob,
    JobAction,
    /// A persisted step string this build does not recognize. Kept so a
    /// session written by a newer build deserializes instead of erroring.
    Unknown,
}

impl DialogueStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelectCustomer => "select_customer",
            Self::SelectJob => "select_job",
            Self::JobAction => "job_action",
            Self::Unknown => "unknown",
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "select_customer" => Self::SelectCustomer,
            "select_job" => Self::SelectJob,
            "job_action" => Self::JobAction,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for DialogueStep {
    fn from(value: String) -> Self {
        Self::parse(value.trim())
    }
}

impl From<DialogueStep> for String {
    fn from(value: DialogueStep) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Everything persisted for one sender. `step` decides which of the other
/// fields are meaningful; stale fields from earlier steps may remain and are
/// ignored by the dialogue engine.
pub struct SessionState {
    #[serde(default)]
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<DialogueStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
}

impl SessionState {
    pub fn empty_for(sender: &str) -> Self {
        Self {
            sender: sender.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Partial session write. Only present fields overwrite the stored value;
/// the sender identity is recorded on first creation and never overwritten.
pub struct SessionUpdate {
    pub step: Option<DialogueStep>,
    pub customer: Option<String>,
    pub jobs: Option<Vec<String>>,
    pub job_name: Option<String>,
}

impl SessionUpdate {
    pub fn step(step: DialogueStep) -> Self {
        Self {
            step: Some(step),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, state: &mut SessionState) {
        if let Some(step) = self.step {
            state.step = Some(step);
        }
        if let Some(customer) = &self.customer {
            state.customer = Some(customer.clone());
        }
        if let Some(jobs) = &self.jobs {
            state.jobs = jobs.clone();
        }
        if let Some(job_name) = &self.job_name {
            state.job_name = Some(job_name.clone());
        }
    }
}

/// Storage contract consumed by the dialogue engine. `get` returns an empty
/// state for unknown senders; absence is never an error. Reads go back to the
/// backing file on every call so one evaluation always sees its own writes.
pub trait SessionStore: Send + Sync {
    fn get(&self, sender: &str) -> Result<SessionState>;
    fn set(&self, sender: &str, update: &SessionUpdate) -> Result<()>;
    /// Resets the sender to the start state. The record survives with only
    /// the sender identity, which `set` by itself could never undo given its
    /// merge-only contract.
    fn clear(&self, sender: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported session storage backends.
pub enum SessionBackend {
    Json,
    Sqlite,
}

/// Resolve the storage backend from the store path's extension.
pub fn resolve_session_backend(path: &Path) -> SessionBackend {
    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase());
    match extension.as_deref() {
        Some("sqlite" | "db") => SessionBackend::Sqlite,
        _ => SessionBackend::Json,
    }
}

/// Opens the session store for `path`, picking the backend by extension.
pub fn open_session_store(path: &Path) -> Result<Arc<dyn SessionStore>> {
    match resolve_session_backend(path) {
        SessionBackend::Json => {
            tracing::debug!(path = %path.display(), "opening json session store");
            Ok(Arc::new(FileSessionStore::open(path)?))
        }
        SessionBackend::Sqlite => {
            tracing::debug!(path = %path.display(), "opening sqlite session store");
            Ok(Arc::new(SqliteSessionStore::open(path)?))
        }
    }
}

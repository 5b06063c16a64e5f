use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bellhop_core::write_text_atomic;
use serde::{Deserialize, Serialize};

use crate::{SessionState, SessionStore, SessionUpdate};

const SESSION_DOCUMENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionDocument {
    schema_version: u32,
    #[serde(default)]
    sessions: BTreeMap<String, SessionState>,
}

impl Default for SessionDocument {
    fn default() -> Self {
        Self {
            schema_version: SESSION_DOCUMENT_SCHEMA_VERSION,
            sessions: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
/// Session store backed by one JSON document holding every sender's state.
/// The document is re-read on each call and rewritten atomically on each
/// mutation, so a single evaluation always observes its own writes.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let store = Self { path };
        // Validates schema compatibility up front instead of on first use.
        store.read_document()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<SessionDocument> {
        if !self.path.exists() {
            return Ok(SessionDocument::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read session file {}", self.path.display()))?;
        let document = serde_json::from_str::<SessionDocument>(&raw)
            .with_context(|| format!("failed to parse session file {}", self.path.display()))?;
        if document.schema_version != SESSION_DOCUMENT_SCHEMA_VERSION {
            bail!(
                "unsupported session document schema: expected {}, found {}",
                SESSION_DOCUMENT_SCHEMA_VERSION,
                document.schema_version
            );
        }
        Ok(document)
    }

    fn write_document(&self, document: &SessionDocument) -> Result<()> {
        let mut payload =
            serde_json::to_string_pretty(document).context("failed to serialize sessions")?;
        payload.push('\n');
        write_text_atomic(&self.path, &payload)
            .with_context(|| format!("failed to write session file {}", self.path.display()))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, sender: &str) -> Result<SessionState> {
        let document = self.read_document()?;
        Ok(document
            .sessions
            .get(sender)
            .cloned()
            .unwrap_or_else(|| SessionState::empty_for(sender)))
    }

    fn set(&self, sender: &str, update: &SessionUpdate) -> Result<()> {
        let mut document = self.read_document()?;
        let state = document
            .sessions
            .entry(sender.to_string())
            .or_insert_with(|| SessionState::empty_for(sender));
        update.apply_to(state);
        self.write_document(&document)
    }

    fn clear(&self, sender: &str) -> Result<()> {
        let mut document = self.read_document()?;
        document
            .sessions
            .insert(sender.to_string(), SessionState::empty_for(sender));
        self.write_document(&document)
    }
}

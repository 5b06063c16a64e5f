use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::{SessionState, SessionStore, SessionUpdate};

/// Session store backed by a SQLite table keyed by sender, with the state
/// kept as a JSON column. Same contract as the JSON document backend.
pub struct SqliteSessionStore {
    path: PathBuf,
    connection: Mutex<Connection>,
}

impl SqliteSessionStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let connection = Connection::open(&path)
            .with_context(|| format!("failed to open session database {}", path.display()))?;
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS sessions (
                    sender TEXT PRIMARY KEY,
                    state TEXT NOT NULL
                );",
            )
            .context("failed to initialize session schema")?;
        Ok(Self {
            path,
            connection: Mutex::new(connection),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_connection<T>(&self, operation: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| anyhow!("session database lock poisoned"))?;
        operation(&connection)
    }

    fn read_state(connection: &Connection, sender: &str) -> Result<Option<SessionState>> {
        let raw = connection
            .query_row(
                "SELECT state FROM sessions WHERE sender = ?1",
                params![sender],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("failed to query session row")?;
        match raw {
            Some(raw) => Ok(Some(
                serde_json::from_str(&raw).context("failed to parse stored session state")?,
            )),
            None => Ok(None),
        }
    }

    fn write_state(connection: &Connection, sender: &str, state: &SessionState) -> Result<()> {
        let payload = serde_json::to_string(state).context("failed to serialize session state")?;
        connection
            .execute(
                "INSERT INTO sessions (sender, state) VALUES (?1, ?2)
                 ON CONFLICT(sender) DO UPDATE SET state = excluded.state",
                params![sender, payload],
            )
            .context("failed to upsert session row")?;
        Ok(())
    }
}

impl SessionStore for SqliteSessionStore {
    fn get(&self, sender: &str) -> Result<SessionState> {
        self.with_connection(|connection| {
            Ok(Self::read_state(connection, sender)?
                .unwrap_or_else(|| SessionState::empty_for(sender)))
        })
    }

    fn set(&self, sender: &str, update: &SessionUpdate) -> Result<()> {
        self.with_connection(|connection| {
            let mut state = Self::read_state(connection, sender)?
                .unwrap_or_else(|| SessionState::empty_for(sender));
            update.apply_to(&mut state);
            Self::write_state(connection, sender, &state)
        })
    }

    fn clear(&self, sender: &str) -> Result<()> {
        self.with_connection(|connection| {
            Self::write_state(connection, sender, &SessionState::empty_for(sender))
        })
    }
}

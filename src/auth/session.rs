use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{EstimateError, Result};

/// Signed-in account as returned by the auth backend.
///
/// The profile object is kept verbatim; the backend decides its shape. The
/// accessors read the common fields and render scalar values as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(Map<String, Value>);

impl User {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Placeholder profile for a backend that returned a token but no user.
    pub fn with_email(email: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("email".to_string(), Value::String(email.into()));
        Self(fields)
    }

    /// `id`, falling back to the document key `_id`.
    pub fn id(&self) -> Option<String> {
        self.text("id").or_else(|| self.text("_id"))
    }

    pub fn name(&self) -> Option<String> {
        self.text("name")
    }

    pub fn email(&self) -> Option<String> {
        self.text("email")
    }

    pub fn phone(&self) -> Option<String> {
        self.text("phone")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for User {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Token and user cached after a successful login or signup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Session cache with an explicit lifecycle: `open` on start, `set` on
/// login/signup, `clear` on logout.
///
/// Optionally backed by a JSON file so a session survives restarts.
#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    state: RwLock<Option<Session>>,
}

impl SessionStore {
    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(None),
        }
    }

    /// Load the persisted session at `path`.
    ///
    /// A missing or unreadable file yields a signed-out store rather than an error.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = match load_session(&path).await {
            Ok(session) => session,
            Err(err) => {
                warn!(
                    target: "trip_budget::session",
                    path = %path.display(),
                    error = %err,
                    "ignoring unreadable session file"
                );
                None
            }
        };

        debug!(
            target: "trip_budget::session",
            path = %path.display(),
            signed_in = session.is_some(),
            "session store opened"
        );

        Self {
            path: Some(path),
            state: RwLock::new(session),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn current(&self) -> Option<Session> {
        self.state.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|session| session.token.clone())
    }

    pub async fn is_signed_in(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// Persist and cache a new session, replacing any previous one.
    pub async fn set(&self, session: Session) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(path) = &self.path {
            persist_session(path, &session).await?;
        }
        info!(target: "trip_budget::session", user = ?session.user.email(), "session stored");
        *state = Some(session);
        Ok(())
    }

    /// Forget the cached session and delete its file.
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(path) = &self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(EstimateError::Storage(format!(
                        "failed to remove {}: {}",
                        path.display(),
                        err
                    )))
                }
            }
        }
        *state = None;
        info!(target: "trip_budget::session", "session cleared");
        Ok(())
    }
}

async fn load_session(path: &Path) -> Result<Option<Session>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(EstimateError::Storage(format!(
                "failed to read {}: {}",
                path.display(),
                err
            )))
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| EstimateError::Storage(format!("corrupt session file: {err}")))
}

async fn persist_session(path: &Path, session: &Session) -> Result<()> {
    let storage_err = |err: std::io::Error| {
        EstimateError::Storage(format!("failed to write {}: {}", path.display(), err))
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(storage_err)?;
    }

    let json = serde_json::to_vec_pretty(session)
        .map_err(|err| EstimateError::Storage(format!("failed to encode session: {err}")))?;

    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, json).await.map_err(storage_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(storage_err)?;
    Ok(())
}

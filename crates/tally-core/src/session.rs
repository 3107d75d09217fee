//! Session state and persistence
//!
//! The session is the only shared mutable state in the client. It moves
//! through a small state machine:
//!
//! ```text
//! Anonymous ──begin──▶ Authenticating ──complete──▶ Authenticated
//!     ▲                      │                           │
//!     └────────fail──────────┘                           │
//!     └───────────────────────logout─────────────────────┘
//! ```
//!
//! `SessionStore` is shared behind an `Arc` and injected into the API client
//! (which reads the token) and the auth context (which drives transitions).
//! Authenticated sessions are written through to a `SessionStorage` so they
//! survive restarts.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::User;

/// An authenticated identity and its bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

/// Where the session currently is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(Session),
}

/// Payload-free view of `SessionState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            Self::Anonymous => SessionPhase::Anonymous,
            Self::Authenticating => SessionPhase::Authenticating,
            Self::Authenticated(_) => SessionPhase::Authenticated,
        }
    }
}

/// Persistence for the authenticated session
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// JSON file storage (the CLI's equivalent of browser local storage)
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<Session>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        // Temp files are created 0600, so the token never sits world-readable
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(serde_json::to_string_pretty(session)?.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage, for tests and one-shot use
#[derive(Default)]
pub struct MemoryStorage {
    session: Mutex<Option<Session>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Session>> {
        let guard = self
            .session
            .lock()
            .map_err(|_| Error::Session("Failed to acquire storage lock".into()))?;
        Ok(guard.clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| Error::Session("Failed to acquire storage lock".into()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| Error::Session("Failed to acquire storage lock".into()))?;
        *guard = None;
        Ok(())
    }
}

/// Process-wide session state with write-through persistence
pub struct SessionStore {
    state: RwLock<SessionState>,
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    /// Create a store, restoring any persisted session.
    ///
    /// An unreadable session file is treated as logged out.
    pub fn new(storage: Box<dyn SessionStorage>) -> Self {
        let state = match storage.load() {
            Ok(Some(session)) => {
                debug!(user = %session.user.email, "Restored session");
                SessionState::Authenticated(session)
            }
            Ok(None) => SessionState::Anonymous,
            Err(e) => {
                warn!("Ignoring unreadable session: {}", e);
                SessionState::Anonymous
            }
        };
        Self {
            state: RwLock::new(state),
            storage,
        }
    }

    /// Store backed by a JSON file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FileStorage::new(path)))
    }

    /// Store that forgets everything on exit
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, SessionState>> {
        self.state
            .read()
            .map_err(|_| Error::Session("Failed to acquire session lock".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, SessionState>> {
        self.state
            .write()
            .map_err(|_| Error::Session("Failed to acquire session lock".into()))
    }

    pub fn state(&self) -> SessionState {
        self.read().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.read()
            .map(|s| s.phase())
            .unwrap_or(SessionPhase::Anonymous)
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase() == SessionPhase::Authenticated
    }

    /// Bearer token for the current session, if any
    pub fn token(&self) -> Option<String> {
        match &*self.read().ok()? {
            SessionState::Authenticated(s) => Some(s.token.clone()),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<User> {
        match &*self.read().ok()? {
            SessionState::Authenticated(s) => Some(s.user.clone()),
            _ => None,
        }
    }

    /// Enter `Authenticating`. Fails if an attempt is already in flight.
    pub fn begin(&self) -> Result<()> {
        let mut state = self.write()?;
        if *state == SessionState::Authenticating {
            return Err(Error::Session("Authentication already in progress".into()));
        }
        *state = SessionState::Authenticating;
        Ok(())
    }

    /// `Authenticating` → `Authenticated`, persisting the session
    pub fn complete(&self, session: Session) -> Result<()> {
        let mut state = self.write()?;
        if *state != SessionState::Authenticating {
            return Err(Error::Session("No authentication in progress".into()));
        }
        if let Err(e) = self.storage.save(&session) {
            *state = SessionState::Anonymous;
            return Err(e);
        }
        *state = SessionState::Authenticated(session);
        Ok(())
    }

    /// `Authenticating` → `Anonymous` after a rejected attempt
    pub fn fail(&self) -> Result<()> {
        let mut state = self.write()?;
        *state = SessionState::Anonymous;
        self.storage.clear()
    }

    /// Any state → `Anonymous`, forgetting the persisted session
    pub fn logout(&self) -> Result<()> {
        let mut state = self.write()?;
        *state = SessionState::Anonymous;
        self.storage.clear()
    }
}

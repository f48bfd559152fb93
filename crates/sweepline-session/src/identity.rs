//! The identity a client remembers between connections.
//!
//! When a connection drops, the server keeps the player's entry around
//! (marked disconnected). A client that remembers its old id can ask for
//! that entry back in its JOIN message instead of appearing as a stranger.
//!
//! The record is stored as a small JSON document:
//!
//! ```json
//! {"id":7,"color":{"r":200,"g":40,"b":40},"name":"Bob","teamId":2}
//! ```
//!
//! Anything that comes back from storage is treated as untrusted. A record
//! that fails to parse, has a non-positive id, or has an empty name is
//! discarded and the client joins fresh.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use sweepline_protocol::{Color, PlayerId, TeamId};
use tracing::debug;

use crate::SessionError;

// ---------------------------------------------------------------------------
// RememberedIdentity
// ---------------------------------------------------------------------------

/// Who this client was the last time it saw a full resync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RememberedIdentity {
    pub id: PlayerId,
    pub color: Color,
    pub name: String,
    #[serde(default)]
    pub team_id: Option<TeamId>,
}

impl RememberedIdentity {
    /// Parses a stored record, returning `None` for anything unusable.
    ///
    /// A stored team id of zero or below is read as "no team".
    pub fn parse(json: &str) -> Option<Self> {
        let mut identity: Self = match serde_json::from_str(json) {
            Ok(identity) => identity,
            Err(e) => {
                debug!(error = %e, "discarding malformed remembered identity");
                return None;
            }
        };
        if identity.check().is_err() {
            debug!(id = %identity.id, "discarding unusable remembered identity");
            return None;
        }
        identity.team_id = identity.team_id.filter(|team| team.0 > 0);
        Some(identity)
    }

    /// Serialises the record for storage.
    ///
    /// # Errors
    /// [`SessionError::Unusable`] if [`parse`](Self::parse) would reject
    /// the result.
    pub fn to_json(&self) -> Result<String, SessionError> {
        self.check()?;
        Ok(serde_json::to_string(self)?)
    }

    fn check(&self) -> Result<(), SessionError> {
        if self.id.0 <= 0 {
            return Err(SessionError::Unusable("player id must be positive"));
        }
        if self.name.is_empty() {
            return Err(SessionError::Unusable("name must not be empty"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// IdentityStore
// ---------------------------------------------------------------------------

/// Where a [`RememberedIdentity`] lives between connections.
///
/// Implementations hold raw JSON and go through
/// [`RememberedIdentity::parse`] on the way out, so a corrupted entry
/// reads back as `None` rather than an error.
pub trait IdentityStore: Send + Sync {
    /// The stored identity, or `None` if nothing usable is stored.
    fn load(&self) -> Result<Option<RememberedIdentity>, SessionError>;

    /// Replaces the stored identity.
    fn save(&self, identity: &RememberedIdentity) -> Result<(), SessionError>;

    /// Forgets the stored identity.
    fn clear(&self) -> Result<(), SessionError>;
}

/// An [`IdentityStore`] that keeps the JSON in memory.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    json: Mutex<Option<String>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with raw JSON, which may or may not be valid.
    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: Mutex::new(Some(json.into())),
        }
    }

    /// The raw JSON currently held.
    pub fn raw(&self) -> Option<String> {
        self.slot().clone()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // The slot is a plain value; a panic elsewhere can't leave it torn.
        self.json.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self) -> Result<Option<RememberedIdentity>, SessionError> {
        Ok(self.slot().as_deref().and_then(RememberedIdentity::parse))
    }

    fn save(&self, identity: &RememberedIdentity) -> Result<(), SessionError> {
        let json = identity.to_json()?;
        *self.slot() = Some(json);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot() = None;
        Ok(())
    }
}

/// An [`IdentityStore`] backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl IdentityStore for FileIdentityStore {
    fn load(&self) -> Result<Option<RememberedIdentity>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(RememberedIdentity::parse(&json)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, identity: &RememberedIdentity) -> Result<(), SessionError> {
        let json = identity.to_json()?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

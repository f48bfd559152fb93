//! Connection status as seen by the UI.
//!
//! The client sets this record from transport events; retry timing itself
//! belongs to whoever owns the transport.

use serde::{Deserialize, Serialize};

/// Where the connection is in its lifecycle.
///
/// ```text
///   Loading ──(open)──→ Connected
///      │                    │
///      └───(error)──→ Error ←┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    #[default]
    Loading,
    Connected,
    Error,
}

/// The last failure, kept so a UI can show why it is retrying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffError {
    pub message: String,
    /// Consecutive failures since the last successful open.
    pub attempt: u32,
}

/// Status plus the most recent failure, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    pub error: Option<BackoffError>,
}

impl ConnectionState {
    /// The transport opened. Clears any previous failure.
    pub fn opened(&mut self) {
        self.status = ConnectionStatus::Connected;
        self.error = None;
    }

    /// The transport failed or closed unexpectedly.
    pub fn failed(&mut self, message: impl Into<String>) {
        let attempt = self.error.as_ref().map_or(0, |e| e.attempt) + 1;
        self.status = ConnectionStatus::Error;
        self.error = Some(BackoffError {
            message: message.into(),
            attempt,
        });
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }
}

//! Error types for the session layer.

use std::path::PathBuf;

/// Errors that can occur while persisting a remembered identity.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The identity couldn't be turned into JSON.
    #[error("failed to serialize identity: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Reading or writing the backing file failed.
    #[error("identity file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The identity refused to be stored because it can't be loaded back:
    /// a non-positive id or an empty name.
    #[error("identity is not usable for rejoining: {0}")]
    Unusable(&'static str),
}

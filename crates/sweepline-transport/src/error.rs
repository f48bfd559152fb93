use std::io;

/// Why a frame could not be moved to or from the server.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The handshake with `url` did not complete.
    #[error("cannot connect to {url}: {source}")]
    ConnectFailed {
        url: String,
        #[source]
        source: io::Error,
    },

    /// The peer or the local writer went away.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// The inbound stream reported an error.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] io::Error),
}

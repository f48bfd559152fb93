//! Unified error type for Sweepline clients.

use std::time::Duration;

use sweepline_protocol::ProtocolError;
use sweepline_session::SessionError;
use sweepline_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum SweeplineError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame failed to decode, or an outbound message couldn't be built.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Loading or saving the remembered identity failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// No frame arrived within the configured receive timeout.
    #[error("no frame received for {0:?}")]
    Timeout(Duration),
}

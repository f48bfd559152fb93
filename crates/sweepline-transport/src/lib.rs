//! Transport seam for Sweepline clients.
//!
//! The client core needs exactly two things from a connection:
//!
//! - a [`FrameSource`] that yields inbound frames in server order, and
//! - a [`FrameSink`] that accepts outbound frames without blocking.
//!
//! Anything that can provide those (a WebSocket, an in-memory channel in
//! tests) can drive a client.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket client via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
mod memory;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use memory::{MemorySink, MemorySource};
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketSink, WebSocketSource, connect};

/// One discrete message from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A protocol frame: opcode byte followed by its body.
    Binary(Vec<u8>),
    /// Not part of the protocol. Clients drop these.
    Text(String),
}

/// Ordered, reliable stream of inbound frames.
pub trait FrameSource: Send {
    /// Waits for the next frame.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&mut self) -> Result<Option<Frame>, TransportError>;
}

/// Fire-and-forget outbound frames.
///
/// `send` must not wait on the network. Implementations queue the frame
/// and report an error only if the connection is already gone.
pub trait FrameSink: Send + Sync {
    fn send(&self, frame: Vec<u8>) -> Result<(), TransportError>;
}

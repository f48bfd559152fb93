//! # Sweepline
//!
//! Client core for a multiplayer team minesweeper.
//!
//! The server is authoritative. This crate keeps a consistent local mirror
//! of what it says: frames come in over a [`FrameSource`], are decoded and
//! applied to a copy-on-write document, and every change is published as a
//! snapshot for a UI to render. Player intents go out as encoded frames
//! through a [`FrameSink`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sweepline::prelude::*;
//!
//! # async fn demo() -> Result<(), SweeplineError> {
//! let (mut client, source) = ClientBuilder::new()
//!     .url("ws://127.0.0.1:8080")
//!     .name("Bob")
//!     .connect()
//!     .await?;
//! client.join()?;
//! client.run(source).await
//! # }
//! ```
//!
//! [`FrameSource`]: sweepline_transport::FrameSource
//! [`FrameSink`]: sweepline_transport::FrameSink

mod client;
mod error;
pub mod handlers;
pub mod router;

pub use client::{Client, ClientBuilder, ClientConfig};
pub use error::SweeplineError;

/// Everything a typical embedder needs in one import.
pub mod prelude {
    pub use crate::router::Routed;
    pub use crate::{Client, ClientBuilder, ClientConfig, SweeplineError};
    pub use sweepline_board::{Board, Flag, MINE, UNREVEALED};
    pub use sweepline_protocol::{
        ClientMessage, Color, GameSettings, PlayerId, ServerMessage, SettingsPatch, TeamId,
    };
    pub use sweepline_session::{
        ConnectionStatus, FileIdentityStore, IdentityStore, MemoryIdentityStore,
        RememberedIdentity,
    };
    pub use sweepline_state::{Document, Game, Snapshot, TeamProgress, Viewer};
    pub use sweepline_transport::{
        Frame, FrameSink, FrameSource, MemorySink, MemorySource, TransportError,
    };
}

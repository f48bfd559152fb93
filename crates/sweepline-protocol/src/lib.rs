//! Wire protocol for Sweepline.
//!
//! This crate defines the binary language spoken between a Sweepline
//! client and the authoritative game server:
//!
//! - **Codec** ([`Reader`], [`Writer`], [`Wire`]): big-endian,
//!   fixed-width fields over a raw byte buffer.
//! - **Types** ([`PlayerId`], [`TeamId`], [`GameSettings`], records):
//!   the values that travel inside frames.
//! - **Messages** ([`ServerMessage`], [`ClientMessage`]): one enum per
//!   direction, keyed by a one-byte opcode.
//! - **Errors** ([`ProtocolError`]): what can go wrong while reading or
//!   writing a frame.
//!
//! # Frame layout
//!
//! ```text
//! ┌────────┬──────────────────────────────────────┐
//! │ opcode │ body (layout implied by the opcode)   │
//! │ 1 byte │ no length prefix                      │
//! └────────┴──────────────────────────────────────┘
//! ```

mod client;
mod codec;
mod error;
mod opcode;
mod server;
mod types;

pub use client::{ClientMessage, JoinRequest};
pub use codec::{Reader, Wire, Writer};
pub use error::ProtocolError;
pub use opcode::{ClientOpcode, ServerOpcode};
pub use server::{
    CursorPosition, GameBlock, LobbyState, ProgressBlock, ServerMessage, TileReveal,
};
pub use types::{
    Color, GameSettings, PlayerId, PlayerRecord, SettingChange, SettingsPatch, TeamId,
    TeamRecord,
};

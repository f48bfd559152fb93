//! Client-side session records for Sweepline.
//!
//! Two small pieces of state live outside the game document proper:
//!
//! 1. **Remembered identity** ([`RememberedIdentity`]), the id, colour,
//!    name and team a client last played as. It is stored between
//!    connections through an [`IdentityStore`] and used to ask the server
//!    for the same seat again on JOIN.
//! 2. **Connection state** ([`ConnectionState`]), whether the transport
//!    is still opening, open, or has failed.
//!
//! # How it fits in the stack
//!
//! ```text
//! Client (above)  ← loads identity before JOIN, saves it after each resync
//!     ↕
//! Session Layer (this crate)  ← identity persistence, connection status
//!     ↕
//! Protocol Layer (below)  ← provides PlayerId, TeamId, Color
//! ```

mod connection;
mod error;
mod identity;

pub use connection::{BackoffError, ConnectionState, ConnectionStatus};
pub use error::SessionError;
pub use identity::{FileIdentityStore, IdentityStore, MemoryIdentityStore, RememberedIdentity};

//! Client-side game document for Sweepline.
//!
//! # Key types
//!
//! - [`Document`]: players, teams, settings, the running [`Game`], and
//!   the team activity log
//! - [`StateStore`]: copy-on-write owner of the document that publishes
//!   [`Snapshot`]s over a `watch` channel
//! - [`Viewer`]: which team boards this client may hold
//! - [`elimination`]: player and team liveness rules

pub mod elimination;
mod model;
mod store;
mod visibility;

pub use model::{
    Document, Game, LogEntry, Player, PlayerData, StartPosition, Team, TeamData, TeamProgress,
};
pub use store::{Snapshot, StateStore};
pub use visibility::Viewer;

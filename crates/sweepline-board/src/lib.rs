//! Minesweeper rules for one team's board.
//!
//! A [`Board`] owns the two arrays a team accumulates during a round and
//! knows how to change them:
//!
//! - [`Board::reveal`] flood-fills from a cell using server-sent values.
//! - [`Board::chord`] reveals the unflagged neighbourhood of a cell.
//! - [`Board::set_flag`] places or clears a real or pencil flag.
//!
//! Everything here is synchronous and free of I/O.

mod board;
mod engine;
mod error;

pub use board::{Board, Flag, MINE, UNREVEALED};
pub use engine::{RevealOutcome, TileSource};
pub use error::BoardError;

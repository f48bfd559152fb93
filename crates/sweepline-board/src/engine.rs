//! Reveal, chord and flag rules.
//!
//! The engine never decides where mines are. Every value it paints comes
//! from a [`TileSource`], which in practice is the tile array of the
//! TILE_REVEAL message being applied.

use sweepline_protocol::PlayerId;
use tracing::trace;

use crate::board::{Board, Flag, MINE, UNREVEALED};
use crate::BoardError;

/// Authoritative per-cell values, indexed row-major like [`Board`].
pub trait TileSource {
    /// The true value of cell `index`, or `None` if the source has nothing
    /// for it.
    fn tile(&self, index: usize) -> Option<u8>;
}

impl TileSource for [u8] {
    fn tile(&self, index: usize) -> Option<u8> {
        self.get(index).copied()
    }
}

impl TileSource for Vec<u8> {
    fn tile(&self, index: usize) -> Option<u8> {
        self.as_slice().tile(index)
    }
}

/// What a reveal or chord changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevealOutcome {
    /// Cells that went from unrevealed to a real value.
    pub revealed: usize,
    /// At least one of them was a mine.
    pub hit_mine: bool,
}

impl RevealOutcome {
    pub fn changed(&self) -> bool {
        self.revealed > 0
    }

    fn merge(&mut self, other: RevealOutcome) {
        self.revealed += other.revealed;
        self.hit_mine |= other.hit_mine;
    }
}

impl Board {
    /// Flood-fills from `(x, y)` using values from `source`.
    ///
    /// Already revealed cells are skipped, as are cells the source still
    /// reports as unrevealed. Every newly painted cell loses its flag, and
    /// every newly painted zero pushes its neighbours.
    pub fn reveal<T>(&mut self, x: i32, y: i32, source: &T) -> Result<RevealOutcome, BoardError>
    where
        T: TileSource + ?Sized,
    {
        let start = self.checked_index(x, y)?;
        let mut outcome = RevealOutcome::default();
        let mut stack = vec![start];

        while let Some(index) = stack.pop() {
            if self.values()[index] != UNREVEALED {
                continue;
            }
            let Some(value) = source.tile(index).filter(|v| *v != UNREVEALED) else {
                continue;
            };

            self.values_mut()[index] = value;
            self.flags_mut()[index] = 0;
            outcome.revealed += 1;

            if value == MINE {
                outcome.hit_mine = true;
            } else if value == 0 {
                let (cx, cy) = self.coords(index);
                let pending: Vec<usize> = self
                    .neighbors(cx, cy)
                    .filter_map(|(nx, ny)| self.index(nx, ny))
                    .filter(|i| self.values()[*i] == UNREVEALED)
                    .collect();
                stack.extend(pending);
            }
        }

        trace!(x, y, revealed = outcome.revealed, hit_mine = outcome.hit_mine, "reveal");
        Ok(outcome)
    }

    /// Reveals the clipped 3×3 block around `(x, y)`, leaving flagged cells
    /// alone.
    pub fn chord<T>(&mut self, x: i32, y: i32, source: &T) -> Result<RevealOutcome, BoardError>
    where
        T: TileSource + ?Sized,
    {
        self.checked_index(x, y)?;
        let mut outcome = RevealOutcome::default();

        for dy in -1..=1 {
            for dx in -1..=1 {
                let (cx, cy) = (x + dx, y + dy);
                let Some(index) = self.index(cx, cy) else {
                    continue;
                };
                if self.flags()[index] != 0 {
                    continue;
                }
                outcome.merge(self.reveal(cx, cy, source)?);
            }
        }

        Ok(outcome)
    }

    /// Places or clears a flag on `(x, y)`. Returns `true` if the cell
    /// changed.
    ///
    /// One owner per cell: a new flag replaces whatever was there. Revealed
    /// cells can't be flagged.
    pub fn set_flag(
        &mut self,
        x: i32,
        y: i32,
        player: PlayerId,
        is_added: bool,
        is_pencil: bool,
    ) -> Result<bool, BoardError> {
        let index = self.checked_index(x, y)?;
        let next = match (is_added, is_pencil) {
            (false, _) => Flag::None,
            (true, _) if self.values()[index] != UNREVEALED => return Ok(false),
            (true, false) => Flag::Real(player),
            (true, true) => Flag::Pencil(player),
        }
        .to_raw();

        let slot = &mut self.flags_mut()[index];
        if *slot == next {
            return Ok(false);
        }
        *slot = next;
        Ok(true)
    }
}

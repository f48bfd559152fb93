//! A single team's board arrays.
//!
//! Two parallel row-major arrays hold everything a team has learned:
//!
//! - `values`: `0..=8` revealed neighbour count, [`MINE`], or
//!   [`UNREVEALED`] for a cell nobody on the team has opened.
//! - `flags`: the raw flag-owner encoding, see [`Flag`].
//!
//! A cell is revealed exactly when its value is no longer `UNREVEALED`.
//! There is no separate mask to keep in sync.

use serde::{Deserialize, Serialize};
use sweepline_protocol::PlayerId;

use crate::BoardError;

/// Board value of a revealed mine.
pub const MINE: u8 = 9;

/// Board value of a cell the team hasn't revealed.
pub const UNREVEALED: u8 = 10;

/// Neighbour offsets, clockwise from the top-left.
const DISPLACEMENTS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

// ---------------------------------------------------------------------------
// Flag
// ---------------------------------------------------------------------------

/// Decoded flag-owner value.
///
/// On the wire (and in [`Board::flags`]) a flag is one `i32`: `0` for no
/// flag, `+id` for a real flag by player `id`, `-id` for a pencil flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flag {
    None,
    Real(PlayerId),
    Pencil(PlayerId),
}

impl Flag {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::None,
            id if id > 0 => Self::Real(PlayerId(id)),
            id => Self::Pencil(PlayerId(id.saturating_neg())),
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Real(id) => id.0,
            Self::Pencil(id) => -id.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// One team's view of the minefield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: i32,
    height: i32,
    values: Vec<u8>,
    flags: Vec<i32>,
}

fn area(width: i32, height: i32) -> Result<usize, BoardError> {
    let invalid = BoardError::InvalidDimensions { width, height };
    let w = usize::try_from(width).map_err(|_| invalid.clone())?;
    let h = usize::try_from(height).map_err(|_| invalid.clone())?;
    w.checked_mul(h).ok_or(invalid)
}

impl Board {
    /// A board with every cell unrevealed and unflagged.
    pub fn new(width: i32, height: i32) -> Result<Self, BoardError> {
        let cells = area(width, height)?;
        Ok(Self {
            width,
            height,
            values: vec![UNREVEALED; cells],
            flags: vec![0; cells],
        })
    }

    /// Rebuilds a board from arrays received in a resync.
    ///
    /// # Errors
    /// [`BoardError::LengthMismatch`] if either array isn't `width * height`.
    pub fn from_parts(
        width: i32,
        height: i32,
        values: Vec<u8>,
        flags: Vec<i32>,
    ) -> Result<Self, BoardError> {
        let cells = area(width, height)?;
        for actual in [values.len(), flags.len()] {
            if actual != cells {
                return Err(BoardError::LengthMismatch {
                    expected: cells,
                    actual,
                });
            }
        }
        Ok(Self {
            width,
            height,
            values,
            flags,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn flags(&self) -> &[i32] {
        &self.flags
    }

    /// Returns `true` if `(x, y)` lies on the board.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }

    /// Row-major index of `(x, y)`, or `None` when out of bounds.
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        // Both coordinates are non-negative and in range here.
        self.contains(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    pub(crate) fn checked_index(&self, x: i32, y: i32) -> Result<usize, BoardError> {
        self.index(x, y).ok_or(BoardError::OutOfBounds { x, y })
    }

    pub(crate) fn coords(&self, index: usize) -> (i32, i32) {
        let w = self.width as usize;
        ((index % w) as i32, (index / w) as i32)
    }

    /// Value at `(x, y)`.
    pub fn value(&self, x: i32, y: i32) -> Option<u8> {
        self.index(x, y).map(|i| self.values[i])
    }

    /// Flag at `(x, y)`.
    pub fn flag(&self, x: i32, y: i32) -> Option<Flag> {
        self.index(x, y).map(|i| Flag::from_raw(self.flags[i]))
    }

    pub fn is_revealed(&self, x: i32, y: i32) -> bool {
        self.value(x, y).is_some_and(|v| v != UNREVEALED)
    }

    /// Number of cells no longer holding the placeholder.
    pub fn revealed_count(&self) -> usize {
        self.values.iter().filter(|v| **v != UNREVEALED).count()
    }

    /// Number of cells carrying a flag of either kind.
    pub fn flag_count(&self) -> usize {
        self.flags.iter().filter(|f| **f != 0).count()
    }

    /// In-bounds neighbours of `(x, y)`.
    pub fn neighbors(&self, x: i32, y: i32) -> impl Iterator<Item = (i32, i32)> + '_ {
        DISPLACEMENTS
            .iter()
            .map(move |(dx, dy)| (x + dx, y + dy))
            .filter(|(nx, ny)| self.contains(*nx, *ny))
    }

    pub(crate) fn values_mut(&mut self) -> &mut [u8] {
        &mut self.values
    }

    pub(crate) fn flags_mut(&mut self) -> &mut [i32] {
        &mut self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_all_unrevealed() {
        let board = Board::new(4, 3).unwrap();
        assert_eq!(board.values().len(), 12);
        assert!(board.values().iter().all(|v| *v == UNREVEALED));
        assert_eq!(board.revealed_count(), 0);
        assert_eq!(board.flag_count(), 0);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            Board::new(-1, 3),
            Err(BoardError::InvalidDimensions {
                width: -1,
                height: 3
            })
        );
    }

    #[test]
    fn test_from_parts_checks_lengths() {
        let err = Board::from_parts(2, 2, vec![UNREVEALED; 4], vec![0; 3]).unwrap_err();
        assert_eq!(
            err,
            BoardError::LengthMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_index_is_row_major() {
        let board = Board::new(5, 4).unwrap();
        assert_eq!(board.index(0, 0), Some(0));
        assert_eq!(board.index(4, 0), Some(4));
        assert_eq!(board.index(0, 1), Some(5));
        assert_eq!(board.index(4, 3), Some(19));
        assert_eq!(board.index(5, 0), None);
        assert_eq!(board.index(0, -1), None);
        assert_eq!(board.coords(19), (4, 3));
    }

    #[test]
    fn test_corner_has_three_neighbors() {
        let board = Board::new(3, 3).unwrap();
        assert_eq!(board.neighbors(0, 0).count(), 3);
        assert_eq!(board.neighbors(1, 1).count(), 8);
        assert_eq!(board.neighbors(2, 1).count(), 5);
    }

    #[test]
    fn test_flag_raw_encoding() {
        assert_eq!(Flag::from_raw(0), Flag::None);
        assert_eq!(Flag::from_raw(7), Flag::Real(PlayerId(7)));
        assert_eq!(Flag::from_raw(-7), Flag::Pencil(PlayerId(7)));
        assert_eq!(Flag::Pencil(PlayerId(3)).to_raw(), -3);
    }
}

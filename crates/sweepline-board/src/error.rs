//! Error types for the board layer.

/// Errors that can occur while operating on a team board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The coordinates don't name a cell on this board.
    #[error("cell ({x}, {y}) is outside the board")]
    OutOfBounds { x: i32, y: i32 },

    /// Width or height was negative, or their product overflowed.
    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// A value or flag array didn't hold exactly `width * height` entries.
    #[error("expected {expected} cells, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

//! Error types shared across the crate.

use thiserror::Error;

/// A rule-violating stone placement or erasure.
///
/// The attempted action is discarded; the source position is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("illegal move: point is off the board")]
    OffBoard,
    #[error("illegal move: point not empty")]
    Occupied,
    #[error("illegal move: retakes ko")]
    Ko,
    #[error("illegal move: suicide")]
    Suicide,
    #[error("nothing to erase: point is empty")]
    Empty,
}

/// Invalid board construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("board dimensions {rows}x{cols} outside 1..={max}")]
    InvalidSize { rows: usize, cols: usize, max: usize },
    #[error("row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unexpected character {0:?} in board diagram")]
    BadChar(char),
}

/// Failures of session-level actions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("komi {0} outside the accepted range")]
    InvalidKomi(f64),
}

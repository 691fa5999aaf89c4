//! Board symmetries: row reflection, column reflection, axis swap, and
//! color inversion.
//!
//! A symmetry is applied as reflections first, then the optional transpose.
//! Transposition is only offered for square boards. Color inversion swaps
//! Black and White; a position searched for one player is equivalent to the
//! inverted position searched for the other.

use crate::grid::{Color, Point};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Symmetry {
    pub flip_rows: bool,
    pub flip_cols: bool,
    pub transpose: bool,
    pub invert: bool,
}

impl Symmetry {
    pub const IDENTITY: Symmetry = Symmetry {
        flip_rows: false,
        flip_cols: false,
        transpose: false,
        invert: false,
    };

    /// All geometric symmetries of a `rows x cols` board (8 for squares, 4
    /// otherwise), each with and without color inversion. The identity
    /// comes first.
    pub fn all(rows: usize, cols: usize) -> Vec<Symmetry> {
        let transposes: &[bool] = if rows == cols { &[false, true] } else { &[false] };
        let mut out = Vec::with_capacity(16);
        for invert in [false, true] {
            for &transpose in transposes {
                for flip_rows in [false, true] {
                    for flip_cols in [false, true] {
                        out.push(Symmetry {
                            flip_rows,
                            flip_cols,
                            transpose,
                            invert,
                        });
                    }
                }
            }
        }
        out
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Symmetry::IDENTITY
    }

    /// Dimensions of the image of a `rows x cols` board.
    #[inline]
    pub fn dimensions(&self, rows: usize, cols: usize) -> (usize, usize) {
        if self.transpose { (cols, rows) } else { (rows, cols) }
    }

    /// Map a point of a `rows x cols` board to its image.
    #[inline]
    pub fn apply(&self, (r, c): Point, rows: usize, cols: usize) -> Point {
        let r = if self.flip_rows { rows - 1 - r } else { r };
        let c = if self.flip_cols { cols - 1 - c } else { c };
        if self.transpose { (c, r) } else { (r, c) }
    }

    #[inline]
    pub fn color(&self, color: Color) -> Color {
        if self.invert { color.opponent() } else { color }
    }

    /// The symmetry undoing this one, acting on the image board.
    pub fn inverse(&self) -> Symmetry {
        if self.transpose {
            Symmetry {
                flip_rows: self.flip_cols,
                flip_cols: self.flip_rows,
                ..*self
            }
        } else {
            *self
        }
    }
}

//! Fixed-size intersection grid.
//!
//! Cells are stored row-major in a flat vector. Neighbor lists are computed
//! once per board size and shared (via `Arc`) by every copy of the grid, so
//! cloning a grid only copies the stone layout.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::connectivity::{GoString, find_group};
use crate::constants::MAX_LENGTH;
use crate::error::{GridError, PlacementError};
use crate::symmetry::Symmetry;

/// Stone color, also used to name the players.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Index into per-player arrays: Black is 0, White is 1.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    /// +1 for Black, -1 for White. Converts Black-minus-White values to the
    /// perspective of this player.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Color::Black => 1.0,
            Color::White => -1.0,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// A board coordinate as `(row, column)`, row 0 at the top.
pub type Point = (usize, usize);

/// Summary of a stone played with [`Grid::play`].
#[derive(Debug, Clone)]
pub struct Played {
    /// Number of opponent stones removed.
    pub captured: u32,
    /// The last point where exactly one stone was captured.
    pub ko_candidate: Option<usize>,
    /// Distinct own strings the new stone touched before it was placed.
    pub joined: usize,
    /// The string containing the new stone, after captures.
    pub string: GoString,
}

/// Flat `rows x cols` board of cells, row-major, with neighbor lists
/// shared between clones of the same size.
#[derive(Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Color>>,
    adjacency: Arc<Vec<Vec<usize>>>,
}

impl Grid {
    /// Empty board. Each side must be between 1 and [`MAX_LENGTH`].
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 || rows > MAX_LENGTH || cols > MAX_LENGTH {
            return Err(GridError::InvalidSize {
                rows,
                cols,
                max: MAX_LENGTH,
            });
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
            adjacency: Arc::new(build_adjacency(rows, cols)),
        })
    }

    /// Parse a diagram with one line per row: `X` black, `O` white, `.` empty.
    /// Blank lines and spaces are ignored.
    pub fn parse(diagram: &str) -> Result<Self, GridError> {
        let mut rows: Vec<Vec<Option<Color>>> = Vec::new();
        for line in diagram.lines() {
            let mut row = Vec::new();
            for ch in line.chars().filter(|c| !c.is_whitespace()) {
                row.push(match ch {
                    'X' | 'x' | 'B' => Some(Color::Black),
                    'O' | 'o' | 'W' => Some(Color::White),
                    '.' | '+' => None,
                    other => return Err(GridError::BadChar(other)),
                });
            }
            if !row.is_empty() {
                rows.push(row);
            }
        }
        let expected = rows.first().map_or(0, Vec::len);
        let mut grid = Grid::new(rows.len(), expected)?;
        for (r, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(GridError::Ragged {
                    row: r,
                    found: row.len(),
                    expected,
                });
            }
            for (c, &cell) in row.iter().enumerate() {
                grid.cells[r * expected + c] = cell;
            }
        }
        Ok(grid)
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of points.
    #[inline]
    pub fn area(&self) -> usize {
        self.rows * self.cols
    }

    /// Whether `(r, c)` lies on the board.
    #[inline]
    pub fn contains(&self, (r, c): Point) -> bool {
        r < self.rows && c < self.cols
    }

    /// Cell index of an on-board coordinate.
    #[inline]
    pub fn index(&self, (r, c): Point) -> usize {
        r * self.cols + c
    }

    /// Coordinate of a cell index; inverse of [`Grid::index`].
    #[inline]
    pub fn point(&self, idx: usize) -> Point {
        (idx / self.cols, idx % self.cols)
    }

    /// Color at a cell index.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<Color> {
        self.cells[idx]
    }

    /// Color at a coordinate; `None` for empty or off-board points.
    pub fn at(&self, p: Point) -> Option<Color> {
        if !self.contains(p) {
            return None;
        }
        self.cells[self.index(p)]
    }

    #[inline]
    pub(crate) fn set(&mut self, idx: usize, color: Option<Color>) {
        self.cells[idx] = color;
    }

    /// Indices of the up to four orthogonal neighbors of a cell.
    #[inline]
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        &self.adjacency[idx]
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Option<Color>] {
        &self.cells
    }

    /// True for points on the first line.
    pub fn is_edge(&self, idx: usize) -> bool {
        self.adjacency[idx].len() < 4
    }

    /// True for points with at most two neighbors, such as corners.
    pub fn is_corner(&self, idx: usize) -> bool {
        self.adjacency[idx].len() < 3
    }

    /// Indices of the empty cells, in order.
    pub fn empty_points(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.area()).filter(|&i| self.cells[i].is_none())
    }

    /// Stones of `color` on the board.
    pub fn count(&self, color: Color) -> usize {
        self.cells.iter().filter(|&&c| c == Some(color)).count()
    }

    /// Place a stone, remove captured opponent strings and reject suicide.
    ///
    /// Intended for scratch copies: on error the grid may hold a partially
    /// applied move and should be discarded.
    pub(crate) fn play(&mut self, idx: usize, color: Color) -> Result<Played, PlacementError> {
        if self.cells[idx].is_some() {
            return Err(PlacementError::Occupied);
        }
        let adjacency = Arc::clone(&self.adjacency);

        let mut joined = 0;
        let mut seen: Vec<usize> = Vec::new();
        for &n in &adjacency[idx] {
            if self.cells[n] == Some(color) && !seen.contains(&n) {
                joined += 1;
                seen.extend(find_group(self, n).points);
            }
        }

        self.cells[idx] = Some(color);
        let opp = color.opponent();
        let mut captured = 0u32;
        let mut ko_candidate = None;
        for &n in &adjacency[idx] {
            if self.cells[n] != Some(opp) {
                continue;
            }
            let group = find_group(self, n);
            if group.liberties.is_empty() {
                captured += group.points.len() as u32;
                if group.points.len() == 1 {
                    ko_candidate = Some(n);
                }
                for &p in &group.points {
                    self.cells[p] = None;
                }
            }
        }

        let string = find_group(self, idx);
        if string.liberties.is_empty() {
            self.cells[idx] = None;
            return Err(PlacementError::Suicide);
        }
        Ok(Played {
            captured,
            ko_candidate,
            joined,
            string,
        })
    }

    /// Apply a symmetry (and optional color inversion) to the layout.
    pub fn transformed(&self, sym: Symmetry) -> Grid {
        let (rows, cols) = sym.dimensions(self.rows, self.cols);
        let adjacency = if (rows, cols) == (self.rows, self.cols) {
            Arc::clone(&self.adjacency)
        } else {
            Arc::new(build_adjacency(rows, cols))
        };
        let mut out = Grid {
            rows,
            cols,
            cells: vec![None; self.area()],
            adjacency,
        };
        for idx in 0..self.area() {
            let (r, c) = sym.apply(self.point(idx), self.rows, self.cols);
            out.cells[r * cols + c] = self.cells[idx].map(|color| sym.color(color));
        }
        out
    }
}

fn build_adjacency(rows: usize, cols: usize) -> Vec<Vec<usize>> {
    let mut adjacency = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let mut v = Vec::with_capacity(4);
            if r > 0 {
                v.push((r - 1) * cols + c);
            }
            if c > 0 {
                v.push(r * cols + c - 1);
            }
            if r + 1 < rows {
                v.push((r + 1) * cols + c);
            }
            if c + 1 < cols {
                v.push(r * cols + c + 1);
            }
            adjacency.push(v);
        }
    }
    adjacency
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.cells == other.cells
    }
}

impl Eq for Grid {}

impl Hash for Grid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rows.hash(state);
        self.cols.hash(state);
        self.cells.hash(state);
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {}x{}", self.rows, self.cols)?;
        write!(f, "{self}")
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            for c in 0..self.cols {
                let ch = match self.cells[r * self.cols + c] {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

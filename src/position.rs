//! Immutable board states and the moves between them.
//!
//! A [`Position`] is never modified after construction: `place`, `erase`
//! and `pass` return new positions. Derived data (grading, child positions,
//! canonical key) is filled in lazily through `OnceLock`s, so a position can
//! be shared as `Arc<Position>` between the session history, the search
//! tree and the transposition tables.
//!
//! Coordinates use `(row, col)` with row 0 at the top. GTP vertices such as
//! `"C3"` count rows from the bottom and skip the letter `I`.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::constants::{COLUMN_LETTERS, MIN_CYCLE};
use crate::error::{GridError, PlacementError};
use crate::grid::{Color, Grid, Played, Point};
use crate::score::{Grading, Score, grade_grid};
use crate::symmetry::Symmetry;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Pass,
    Play(Point),
}

impl Move {
    pub fn transformed(self, sym: Symmetry, rows: usize, cols: usize) -> Move {
        match self {
            Move::Pass => Move::Pass,
            Move::Play(p) => Move::Play(sym.apply(p, rows, cols)),
        }
    }
}

/// A legal continuation of a position.
#[derive(Debug)]
pub struct Child {
    pub mv: Move,
    pub position: Arc<Position>,
    /// The move captured nothing and touched exactly one friendly string,
    /// so life can be carried over from the parent instead of recomputed.
    pub quiet: bool,
}

/// Transposition key: layout plus everything that affects the outcome.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PositionKey {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<u8>,
    pub ko: Option<usize>,
    /// Black prisoners minus White prisoners.
    pub prisoner_diff: i64,
    pub passes: u8,
}

/// Outcome of a long cycle, decided by prisoners gained during the cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Repetition {
    BlackFavored,
    WhiteFavored,
    Neutral,
}

impl Repetition {
    /// Value of the cycle for `player`: unbounded for the favored side.
    pub fn value_for(self, player: Color) -> f64 {
        let black = match self {
            Repetition::BlackFavored => f64::INFINITY,
            Repetition::WhiteFavored => f64::NEG_INFINITY,
            Repetition::Neutral => 0.0,
        };
        black * player.sign()
    }

    pub fn description(self) -> &'static str {
        match self {
            Repetition::BlackFavored => "Black wins by prisoner difference",
            Repetition::WhiteFavored => "White wins by prisoner difference",
            Repetition::Neutral => "No result by prisoner difference",
        }
    }
}

/// A board state: layout, ko point, prisoners and consecutive passes.
///
/// Two positions compare equal when their layouts match; use [`key`]
/// to also distinguish ko, prisoners and passes.
///
/// [`key`]: Position::key
pub struct Position {
    grid: Grid,
    ko: Option<usize>,
    prisoners: [u32; 2],
    passes: u8,
    /// Full grading of the layout (Benson plus miai).
    grading: OnceLock<Arc<Grading>>,
    /// Grading carried over from the parent during a search.
    carried: OnceLock<Arc<Grading>>,
    children: [OnceLock<Vec<Child>>; 2],
    key: OnceLock<PositionKey>,
}

impl Position {
    /// Empty board of the given size.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        Ok(Self::from_grid(Grid::new(rows, cols)?))
    }

    /// Position with the given layout, no ko, no prisoners and no passes.
    pub fn from_grid(grid: Grid) -> Self {
        Self::build(grid, None, [0, 0], 0)
    }

    /// Position from a text diagram, see [`Grid::parse`].
    pub fn parse(diagram: &str) -> Result<Self, GridError> {
        Ok(Self::from_grid(Grid::parse(diagram)?))
    }

    fn build(grid: Grid, ko: Option<usize>, prisoners: [u32; 2], passes: u8) -> Self {
        Self {
            grid,
            ko,
            prisoners,
            passes,
            grading: OnceLock::new(),
            carried: OnceLock::new(),
            children: [OnceLock::new(), OnceLock::new()],
            key: OnceLock::new(),
        }
    }

    /// The stone layout.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The point the next player may not retake, if any.
    #[inline]
    pub fn ko(&self) -> Option<Point> {
        self.ko.map(|k| self.grid.point(k))
    }

    /// Stones captured so far, indexed by [`Color::index`].
    #[inline]
    pub fn prisoners(&self) -> [u32; 2] {
        self.prisoners
    }

    /// Consecutive passes leading to this position, capped at 2.
    #[inline]
    pub fn passes(&self) -> u8 {
        self.passes
    }

    /// Two consecutive passes end the playing sequence.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.passes >= 2
    }

    /// Same layout, ko and prisoners with the given pass counter.
    fn with_passes(&self, passes: u8) -> Position {
        Position::build(self.grid.clone(), self.ko, self.prisoners, passes)
    }

    /// Place a stone for `player`.
    pub fn place(&self, player: Color, p: Point, ignore_ko: bool) -> Result<Position, PlacementError> {
        self.play(player, p, ignore_ko).map(|(position, _)| position)
    }

    fn play(&self, player: Color, p: Point, ignore_ko: bool) -> Result<(Position, Played), PlacementError> {
        if !self.grid.contains(p) {
            return Err(PlacementError::OffBoard);
        }
        let idx = self.grid.index(p);
        if self.grid.get(idx).is_some() {
            return Err(PlacementError::Occupied);
        }
        if !ignore_ko && self.ko == Some(idx) {
            return Err(PlacementError::Ko);
        }
        let mut grid = self.grid.clone();
        let played = grid.play(idx, player)?;
        let mut prisoners = self.prisoners;
        prisoners[player.index()] += played.captured;
        let ko = played
            .ko_candidate
            .filter(|_| played.string.len() == 1 && played.string.liberties.len() == 1);
        Ok((Position::build(grid, ko, prisoners, 0), played))
    }

    /// Remove the stone at `p`, optionally crediting its capture to the
    /// opponent of its color.
    pub fn erase(&self, p: Point, take_prisoner: bool) -> Result<Position, PlacementError> {
        if !self.grid.contains(p) {
            return Err(PlacementError::OffBoard);
        }
        let idx = self.grid.index(p);
        let Some(color) = self.grid.get(idx) else {
            return Err(PlacementError::Empty);
        };
        let mut grid = self.grid.clone();
        grid.set(idx, None);
        let mut prisoners = self.prisoners;
        if take_prisoner {
            prisoners[color.opponent().index()] += 1;
        }
        Ok(Position::build(grid, None, prisoners, 0))
    }

    /// Pass for the player to move. The ko point is cleared.
    pub fn pass(&self) -> Position {
        Position::build(self.grid.clone(), None, self.prisoners, (self.passes + 1).min(2))
    }

    /// Start a new playing sequence from this layout.
    pub fn restart(&self) -> Position {
        self.with_passes(0)
    }

    /// Same state with both prisoner counts set to zero.
    pub fn reset_prisoners(&self) -> Position {
        Position::build(self.grid.clone(), self.ko, [0, 0], self.passes)
    }

    /// Same state with the given `[black, white]` prisoner counts.
    pub fn with_prisoners(&self, prisoners: [u32; 2]) -> Position {
        Position::build(self.grid.clone(), self.ko, prisoners, self.passes)
    }

    /// Image of this position under `sym`. Color inversion also swaps the
    /// prisoner counts.
    pub fn transformed(&self, sym: Symmetry) -> Position {
        let grid = self.grid.transformed(sym);
        let ko = self.ko.map(|k| {
            let p = sym.apply(self.grid.point(k), self.grid.rows(), self.grid.cols());
            grid.index(p)
        });
        let prisoners = if sym.invert {
            [self.prisoners[1], self.prisoners[0]]
        } else {
            self.prisoners
        };
        Position::build(grid, ko, prisoners, self.passes)
    }

    /// Table key: layout, ko, prisoner difference and passes.
    pub fn key(&self) -> &PositionKey {
        self.key.get_or_init(|| self.key_under(Symmetry::IDENTITY))
    }

    /// Key of the image of this position under `sym`.
    pub fn key_under(&self, sym: Symmetry) -> PositionKey {
        let (rows, cols) = sym.dimensions(self.grid.rows(), self.grid.cols());
        let mut cells = vec![0u8; self.grid.area()];
        for (idx, cell) in self.grid.cells().iter().enumerate() {
            let (r, c) = sym.apply(self.grid.point(idx), self.grid.rows(), self.grid.cols());
            cells[r * cols + c] = match cell.map(|color| sym.color(color)) {
                None => 0,
                Some(Color::Black) => 1,
                Some(Color::White) => 2,
            };
        }
        let ko = self.ko.map(|k| {
            let (r, c) = sym.apply(self.grid.point(k), self.grid.rows(), self.grid.cols());
            r * cols + c
        });
        let diff = i64::from(self.prisoners[0]) - i64::from(self.prisoners[1]);
        PositionKey {
            rows,
            cols,
            cells,
            ko,
            prisoner_diff: if sym.invert { -diff } else { diff },
            passes: self.passes,
        }
    }

    /// Grading of the layout.
    ///
    /// With `fast` set only unconditional life counts and the result is
    /// computed afresh every call. Otherwise miai is resolved as well and
    /// the result is kept on the position.
    pub fn grade(&self, fast: bool) -> Arc<Grading> {
        if fast {
            return Arc::new(grade_grid(&self.grid, true));
        }
        Arc::clone(self.grading.get_or_init(|| Arc::new(grade_grid(&self.grid, false))))
    }

    /// The full grading, if one has been computed or attached.
    pub fn grading(&self) -> Option<&Arc<Grading>> {
        self.grading.get()
    }

    /// Attach a full grading computed elsewhere; an existing one wins.
    pub(crate) fn attach_grading(&self, grading: Arc<Grading>) -> Arc<Grading> {
        Arc::clone(self.grading.get_or_init(|| grading))
    }

    /// Attach a grading carried over from the parent. It is used by the
    /// search only and never answers [`grade`](Position::grade).
    pub(crate) fn attach_carried(&self, grading: Arc<Grading>) -> Arc<Grading> {
        Arc::clone(self.carried.get_or_init(|| grading))
    }

    /// Grading the search works with: the full one if present, else the
    /// carried one.
    pub(crate) fn working_grading(&self) -> Option<&Arc<Grading>> {
        self.grading.get().or_else(|| self.carried.get())
    }

    /// Territory score from the full grading and the prisoner counts.
    pub fn score(&self) -> Score {
        self.grade(false).score(self.prisoners)
    }

    /// Legal continuations for `player`: a pass, then a stone on each
    /// undecided point. A finished position has none.
    ///
    /// The list is built once per player from the grading available at the
    /// first call (the working grading, else the full one) and kept.
    pub fn children(&self, player: Color) -> &[Child] {
        self.children[player.index()].get_or_init(|| {
            if self.is_finished() {
                return Vec::new();
            }
            let grading = match self.working_grading() {
                Some(g) => Arc::clone(g),
                None => self.grade(false),
            };
            let undecided = &grading.undecided;
            let mut out = Vec::with_capacity(undecided.len() + 1);
            out.push(Child {
                mv: Move::Pass,
                position: Arc::new(self.pass()),
                quiet: true,
            });
            for &idx in undecided.iter() {
                let p = self.grid.point(idx);
                if let Ok((position, played)) = self.play(player, p, false) {
                    out.push(Child {
                        mv: Move::Play(p),
                        position: Arc::new(position),
                        quiet: played.captured == 0 && played.joined == 1,
                    });
                }
            }
            out
        })
    }
}

/// Check whether the last position of `history` repeats an earlier layout
/// at least [`MIN_CYCLE`] plies back, and who gained more prisoners since.
pub fn repetition_check(history: &[Arc<Position>]) -> Option<Repetition> {
    let (current, earlier) = history.split_last()?;
    let limit = earlier.len().checked_sub(MIN_CYCLE - 1)?;
    let previous = earlier[..limit].iter().rev().find(|old| old.grid == current.grid)?;
    let black = i64::from(current.prisoners[0]) - i64::from(previous.prisoners[0]);
    let white = i64::from(current.prisoners[1]) - i64::from(previous.prisoners[1]);
    Some(match black.cmp(&white) {
        std::cmp::Ordering::Greater => Repetition::BlackFavored,
        std::cmp::Ordering::Less => Repetition::WhiteFavored,
        std::cmp::Ordering::Equal => Repetition::Neutral,
    })
}

impl PartialEq for Position {
    /// Positions are equal when their layouts match cell for cell.
    fn eq(&self, other: &Self) -> bool {
        self.grid == other.grid
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("grid", &self.grid)
            .field("ko", &self.ko)
            .field("prisoners", &self.prisoners)
            .field("passes", &self.passes)
            .finish()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.grid.rows();
        let cols = self.grid.cols();
        for r in 0..rows {
            write!(f, "{:>2} ", rows - r)?;
            for c in 0..cols {
                let idx = r * cols + c;
                let ch = match self.grid.get(idx) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None if self.ko == Some(idx) => '*',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "   ")?;
        for &letter in &COLUMN_LETTERS[..cols] {
            write!(f, "{} ", letter as char)?;
        }
        writeln!(f)?;
        write!(
            f,
            "Prisoners: black {} white {}",
            self.prisoners[0], self.prisoners[1]
        )
    }
}

/// Parse a GTP vertex such as `"C3"` on a board with `rows` rows and
/// `cols` columns. Does not accept `"pass"`.
pub fn parse_vertex(s: &str, rows: usize, cols: usize) -> Option<Point> {
    let mut chars = s.trim().chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let col = COLUMN_LETTERS.iter().position(|&b| b as char == letter)?;
    let number: usize = chars.as_str().parse().ok()?;
    if col >= cols || number == 0 || number > rows {
        return None;
    }
    Some((rows - number, col))
}

pub fn vertex_name((r, c): Point, rows: usize) -> String {
    format!("{}{}", COLUMN_LETTERS[c] as char, rows - r)
}

pub fn move_name(mv: Move, rows: usize) -> String {
    match mv {
        Move::Pass => "pass".to_string(),
        Move::Play(p) => vertex_name(p, rows),
    }
}

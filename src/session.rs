//! Playing sessions: history of positions with undo and redo.
//!
//! The session owns the grade cache and the search settings and forwards
//! user actions to [`Position`]. Every action pushes a new position; undone
//! positions are kept until the next new action. Prisoner resets and the
//! start of a new playing sequence collapse the history and cannot be
//! undone.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::GradeCache;
use crate::constants::MAX_KOMI;
use crate::error::SessionError;
use crate::grid::{Color, Point};
use crate::position::{Position, Repetition, repetition_check};
use crate::score::Grading;
use crate::search::{SearchConfig, SolveOutcome, solve};

/// What happened besides the action itself.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    None,
    /// A long cycle occurred; a new playing sequence was started.
    Repetition(Repetition),
    /// Two consecutive passes ended the playing sequence.
    Finished(ScoreReport),
}

/// Final count of a position, komi included.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScoreReport {
    pub black: f64,
    /// White's points with komi added.
    pub white: f64,
}

impl ScoreReport {
    /// Black minus White.
    pub fn margin(&self) -> f64 {
        self.black - self.white
    }

    /// Result in GTP notation, e.g. `B+2.5`, `W+1` or `0`.
    pub fn gtp(&self) -> String {
        let margin = self.margin();
        if margin > 0.0 {
            format!("B+{margin}")
        } else if margin < 0.0 {
            format!("W+{}", -margin)
        } else {
            "0".to_string()
        }
    }
}

impl fmt::Display for ScoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let margin = self.margin();
        if margin > 0.0 {
            write!(f, "Black wins by {margin} points")?;
        } else if margin < 0.0 {
            write!(f, "White wins by {} points", -margin)?;
        } else {
            write!(f, "Tie")?;
        }
        write!(f, " (Black: {}, White: {})", self.black, self.white)
    }
}

/// An editing session: the playing sequence with undo and redo, komi,
/// search limits and the grading cache shared by every solve.
pub struct Session {
    history: Vec<Arc<Position>>,
    undone: Vec<Arc<Position>>,
    cache: GradeCache,
    config: SearchConfig,
    /// Placements ignore ko, and neither repetitions nor double passes end
    /// the playing sequence.
    pub sandbox: bool,
    /// Erased stones are credited as prisoners to the opponent.
    pub take_prisoners: bool,
    /// Placements that repeat an earlier layout restart the sequence.
    pub test_repetition: bool,
}

impl Session {
    /// Session on an empty `rows x cols` board with default search limits.
    pub fn new(rows: usize, cols: usize) -> Result<Self, SessionError> {
        Self::with_config(rows, cols, SearchConfig::default())
    }

    /// Like [`Session::new`] with the given search limits and komi.
    pub fn with_config(rows: usize, cols: usize, config: SearchConfig) -> Result<Self, SessionError> {
        let mut session = Self {
            history: Vec::new(),
            undone: Vec::new(),
            cache: GradeCache::new(),
            config,
            sandbox: false,
            take_prisoners: false,
            test_repetition: true,
        };
        session.new_board(rows, cols)?;
        Ok(session)
    }

    /// Start over on an empty board. Cannot be undone.
    pub fn new_board(&mut self, rows: usize, cols: usize) -> Result<(), SessionError> {
        let position = Position::new(rows, cols)?;
        self.cache.resize(rows, cols);
        self.history = vec![Arc::new(position)];
        self.undone.clear();
        debug!(rows, cols, "new board");
        Ok(())
    }

    /// Replace the current board by `position`, e.g. one parsed from a
    /// diagram. Cannot be undone.
    pub fn load(&mut self, position: Position) {
        let grid = position.grid();
        self.cache.resize(grid.rows(), grid.cols());
        self.history = vec![Arc::new(position)];
        self.undone.clear();
    }

    /// The current position. The history is never empty.
    pub fn current(&self) -> &Arc<Position> {
        &self.history[self.history.len() - 1]
    }

    /// Positions of the current playing sequence, oldest first.
    pub fn history(&self) -> &[Arc<Position>] {
        &self.history
    }

    /// Komi added to White's score.
    pub fn komi(&self) -> f64 {
        self.config.komi
    }

    /// Komi must be a whole or half point within ±[`MAX_KOMI`].
    pub fn set_komi(&mut self, komi: f64) -> Result<(), SessionError> {
        if !komi.is_finite() || komi.abs() > MAX_KOMI || (komi * 2.0).fract() != 0.0 {
            return Err(SessionError::InvalidKomi(komi));
        }
        self.config.komi = komi;
        Ok(())
    }

    /// Search limits used by [`Session::solve`].
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Mutable search limits, e.g. to set a deadline or a cancel flag.
    pub fn config_mut(&mut self) -> &mut SearchConfig {
        &mut self.config
    }

    fn push(&mut self, position: Position) {
        self.history.push(Arc::new(position));
        self.undone.clear();
    }

    /// Place a stone for `player` and append the result. A long cycle
    /// restarts the sequence from the new layout.
    pub fn place(&mut self, player: Color, p: Point) -> Result<Event, SessionError> {
        let next = self.current().place(player, p, self.sandbox)?;
        self.push(next);
        if self.sandbox || !self.test_repetition {
            return Ok(Event::None);
        }
        match repetition_check(&self.history) {
            Some(repetition) => {
                info!(?repetition, "long cycle");
                self.set_start();
                Ok(Event::Repetition(repetition))
            }
            None => Ok(Event::None),
        }
    }

    /// Remove the stone at `p`, crediting it when `take_prisoners` is set.
    pub fn erase(&mut self, p: Point) -> Result<(), SessionError> {
        let next = self.current().erase(p, self.take_prisoners)?;
        self.push(next);
        Ok(())
    }

    /// Pass. Outside the sandbox a second pass scores the position and
    /// starts a new sequence.
    pub fn pass(&mut self) -> Event {
        let next = self.current().pass();
        self.push(next);
        if !self.sandbox && self.current().is_finished() {
            let report = self.score();
            self.set_start();
            return Event::Finished(report);
        }
        Event::None
    }

    /// Step back one position. The first position of the sequence stays.
    pub fn undo(&mut self) -> Result<(), SessionError> {
        if self.history.len() < 2 {
            return Err(SessionError::NothingToUndo);
        }
        if let Some(position) = self.history.pop() {
            self.undone.push(position);
        }
        Ok(())
    }

    /// Replay the last undone position. Any new action clears the redo list.
    pub fn redo(&mut self) -> Result<(), SessionError> {
        let position = self.undone.pop().ok_or(SessionError::NothingToRedo)?;
        self.history.push(position);
        Ok(())
    }

    /// Zero both prisoner counts. Cannot be undone.
    pub fn reset_prisoners(&mut self) {
        let position = self.current().reset_prisoners();
        self.history = vec![Arc::new(position)];
        self.undone.clear();
    }

    /// Start a new playing sequence from the current layout.
    pub fn set_start(&mut self) {
        let position = self.current().restart();
        self.history = vec![Arc::new(position)];
        self.undone.clear();
    }

    /// Full grading of the current position.
    pub fn grade(&mut self) -> Arc<Grading> {
        let position = Arc::clone(self.current());
        self.cache.grade(&position)
    }

    /// Territory count of the current position with komi.
    pub fn score(&mut self) -> ScoreReport {
        let position = Arc::clone(self.current());
        let score = self.cache.grade(&position).score(position.prisoners());
        ScoreReport {
            black: f64::from(score.black),
            white: f64::from(score.white) + self.config.komi,
        }
    }

    /// Best moves for `player` in the current position. Cycles through
    /// earlier positions of the sequence count as repetitions.
    pub fn solve(&mut self, player: Color) -> SolveOutcome {
        let (current, earlier) = match self.history.split_last() {
            Some(split) => split,
            None => return SolveOutcome::TooComplex,
        };
        solve(current, player, earlier, &mut self.cache, &self.config)
    }
}

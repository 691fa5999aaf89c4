//! Random legal play.
//!
//! Used to generate varied positions for the benchmark command and for the
//! randomized checks in the test suite. All randomness comes from a caller
//! supplied `fastrand::Rng`, so a fixed seed reproduces the same games.

use std::sync::Arc;

use fastrand::Rng;

use crate::error::GridError;
use crate::grid::{Color, Grid, Point};
use crate::position::{Move, Position};

/// Play `plies` random moves alternately from `start`, `first` moving
/// first. Returns every position reached, `start` excluded.
///
/// A side without a legal move passes; the line stops early once both
/// sides pass in a row.
pub fn random_line(start: &Arc<Position>, first: Color, plies: usize, rng: &mut Rng) -> Vec<(Move, Arc<Position>)> {
    let mut line = Vec::with_capacity(plies);
    let mut current = Arc::clone(start);
    let mut player = first;
    for _ in 0..plies {
        if current.is_finished() {
            break;
        }
        let (mv, next) = match choose_random_move(&current, player, rng) {
            Some((p, next)) => (Move::Play(p), next),
            None => (Move::Pass, current.pass()),
        };
        current = Arc::new(next);
        line.push((mv, Arc::clone(&current)));
        player = player.opponent();
    }
    line
}

/// A position reached by `plies` random moves on an empty board, Black
/// first. Pass counters are reset, so the result is ready for solving.
pub fn random_position(rows: usize, cols: usize, plies: usize, rng: &mut Rng) -> Result<Position, GridError> {
    let start = Arc::new(Position::new(rows, cols)?);
    let line = random_line(&start, Color::Black, plies, rng);
    Ok(match line.last() {
        Some((_, last)) => last.restart(),
        None => start.restart(),
    })
}

/// Pick a random legal move that does not fill one of the player's own
/// single-point eyes.
fn choose_random_move(pos: &Position, player: Color, rng: &mut Rng) -> Option<(Point, Position)> {
    let grid = pos.grid();
    let mut candidates: Vec<usize> = grid
        .empty_points()
        .filter(|&idx| !is_own_eye(grid, idx, player))
        .collect();
    rng.shuffle(&mut candidates);
    candidates.into_iter().find_map(|idx| {
        let p = grid.point(idx);
        pos.place(player, p, false).ok().map(|next| (p, next))
    })
}

fn is_own_eye(grid: &Grid, idx: usize, player: Color) -> bool {
    grid.neighbors(idx).iter().all(|&n| grid.get(n) == Some(player))
}

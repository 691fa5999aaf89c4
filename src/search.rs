//! Exact solver for the undecided points of a position.
//!
//! Iterative-deepening negamax with alpha-beta pruning. Each node is a
//! position plus the player to move; its children are a pass and a stone on
//! every undecided point. A line ends when both players have passed (the
//! final score is exact) or when a layout repeats at least four plies back
//! (valued by the prisoner balance of the cycle). At the depth limit a static
//! evaluation is used and the node is marked truncated; deepening stops at
//! the first iteration whose root is not truncated.
//!
//! A result backed by a finished line is exact; one resting on a repetition
//! or a static evaluation is heuristic. Every player prefers an exact result
//! to a heuristic one, whatever the values, and only exact results move the
//! alpha-beta window. Subtrees that met a repetition depend on the path that
//! led to them and are not stored in the table.
//!
//! Values are Black-minus-White point differences seen from the player to
//! move, without komi. Komi is subtracted only when reporting the score, so
//! a position and its color-inverted image have the same value for their
//! respective movers, which makes symmetric table lookups sound.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, info};

use crate::cache::GradeCache;
use crate::connectivity::all_groups;
use crate::constants::{
    CORNER_PENALTY, DEFAULT_KOMI, EDGE_PENALTY, KILLER_SLOTS, MAX_COMPLEXITY, MAX_DEPTH,
    MAX_UNDECIDED, MOBILITY_BONUS, SYMMETRY_MAX_AREA, TIE_MARGIN,
};
use crate::grid::Color;
use crate::position::{Child, Move, Position, PositionKey, repetition_check};
use crate::score::Grading;
use crate::symmetry::Symmetry;
use crate::table::{Bound, Entry, TranspositionTable};

#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub komi: f64,
    /// Positions with more undecided points are not searched.
    pub max_undecided: usize,
    pub max_depth: u32,
    /// Ceiling on table entries times board area.
    pub max_complexity: usize,
    /// Largest board area for which symmetric table lookups are tried.
    pub symmetry_max_area: usize,
    pub deadline: Option<Instant>,
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            komi: DEFAULT_KOMI,
            max_undecided: MAX_UNDECIDED,
            max_depth: MAX_DEPTH,
            max_complexity: MAX_COMPLEXITY,
            symmetry_max_area: SYMMETRY_MAX_AREA,
            deadline: None,
            cancel: None,
        }
    }
}

/// Value of a searched position for the player to move.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub value: f64,
    /// False when the value rests on a repetition verdict.
    pub exact: bool,
    /// Depth of the iteration that produced the result.
    pub depth: u32,
    /// Every move achieving `value`.
    pub moves: Vec<Move>,
}

impl SearchResult {
    /// The same result for the image of the position under `sym`, where
    /// the position has `rows x cols` points.
    pub fn transformed(&self, sym: Symmetry, rows: usize, cols: usize) -> SearchResult {
        SearchResult {
            moves: self
                .moves
                .iter()
                .map(|m| m.transformed(sym, rows, cols))
                .collect(),
            ..self.clone()
        }
    }

    pub fn contains_pass(&self) -> bool {
        self.moves.contains(&Move::Pass)
    }

    /// Exact results beat heuristic ones; otherwise the higher value wins.
    pub fn dominates(&self, other: &SearchResult) -> bool {
        dominates(self.exact, self.value, other.exact, other.value)
    }
}

/// Preference between two results for the same player.
fn dominates(exact: bool, value: f64, other_exact: bool, other_value: f64) -> bool {
    match (exact, other_exact) {
        (true, false) => true,
        (false, true) => false,
        _ => value > other_value,
    }
}

#[derive(Clone, Debug)]
pub struct Solution {
    pub player: Color,
    pub result: SearchResult,
    /// Black minus White after komi, assuming optimal play.
    pub score: f64,
    pub nodes: u64,
    pub iterations: u32,
}

#[derive(Clone, Debug)]
pub enum SolveOutcome {
    Solved(Solution),
    /// Too many undecided points, too many positions, or too deep.
    TooComplex,
    Cancelled,
}

/// Find the best moves for `player` in `position`.
///
/// `history` holds the earlier positions of the current playing sequence,
/// oldest first and without `position` itself; it is used to detect cycles.
pub fn solve(
    position: &Arc<Position>,
    player: Color,
    history: &[Arc<Position>],
    cache: &mut GradeCache,
    config: &SearchConfig,
) -> SolveOutcome {
    let grading = cache.grade_for_search(position);
    if grading.undecided.len() > config.max_undecided {
        info!(
            undecided = grading.undecided.len(),
            limit = config.max_undecided,
            "too many undecided points"
        );
        return SolveOutcome::TooComplex;
    }

    let mut searcher = Searcher::new(position, cache, config);
    searcher.path.extend(history.iter().cloned());
    searcher.path.push(Arc::clone(position));

    for depth in 1..=config.max_depth {
        let node = match searcher.negamax(position, player, depth, f64::NEG_INFINITY, f64::INFINITY, true) {
            Ok(node) => node,
            Err(Abort::TooComplex) => {
                info!(depth, nodes = searcher.nodes, "search too complex");
                return SolveOutcome::TooComplex;
            }
            Err(Abort::Cancelled) => {
                info!(depth, nodes = searcher.nodes, "search cancelled");
                return SolveOutcome::Cancelled;
            }
        };
        debug!(
            depth,
            value = node.value,
            nodes = searcher.nodes,
            table = searcher.table.len(),
            truncated = node.truncated,
            "iteration finished"
        );
        if !node.truncated {
            let black_value = node.value * player.sign();
            let solution = Solution {
                player,
                score: black_value - config.komi,
                result: SearchResult {
                    value: node.value,
                    exact: node.exact,
                    depth,
                    moves: node.moves,
                },
                nodes: searcher.nodes,
                iterations: depth,
            };
            info!(
                %player,
                score = solution.score,
                exact = solution.result.exact,
                nodes = solution.nodes,
                "solved"
            );
            return SolveOutcome::Solved(solution);
        }
    }
    info!(max_depth = config.max_depth, "depth ceiling reached");
    SolveOutcome::TooComplex
}

enum Abort {
    TooComplex,
    Cancelled,
}

struct Node {
    value: f64,
    exact: bool,
    truncated: bool,
    /// Some line below the node ended in a repetition.
    cyclic: bool,
    moves: Vec<Move>,
}

impl Node {
    fn leaf(value: f64, exact: bool, truncated: bool) -> Node {
        Node {
            value,
            exact,
            truncated,
            cyclic: false,
            moves: Vec::new(),
        }
    }
}

struct Searcher<'a> {
    cache: &'a mut GradeCache,
    config: &'a SearchConfig,
    table: TranspositionTable,
    killers: Vec<[Option<Move>; KILLER_SLOTS]>,
    history: [Vec<u64>; 2],
    symmetries: Vec<Symmetry>,
    /// Positions from the start of the playing sequence to the current node.
    path: Vec<Arc<Position>>,
    rows: usize,
    cols: usize,
    nodes: u64,
}

impl<'a> Searcher<'a> {
    fn new(root: &Position, cache: &'a mut GradeCache, config: &'a SearchConfig) -> Self {
        let rows = root.grid().rows();
        let cols = root.grid().cols();
        let symmetries = if rows * cols <= config.symmetry_max_area {
            Symmetry::all(rows, cols)
        } else {
            Vec::new()
        };
        Self {
            cache,
            config,
            table: TranspositionTable::new(),
            killers: vec![[None; KILLER_SLOTS]; config.max_depth as usize + 1],
            history: [vec![0; rows * cols], vec![0; rows * cols]],
            symmetries,
            path: Vec::new(),
            rows,
            cols,
            nodes: 0,
        }
    }

    fn check_limits(&self) -> Result<(), Abort> {
        if let Some(flag) = &self.config.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(Abort::Cancelled);
            }
        }
        if let Some(deadline) = self.config.deadline {
            if Instant::now() >= deadline {
                return Err(Abort::Cancelled);
            }
        }
        if self.table.len() * self.rows * self.cols > self.config.max_complexity {
            return Err(Abort::TooComplex);
        }
        Ok(())
    }

    fn negamax(
        &mut self,
        position: &Arc<Position>,
        player: Color,
        depth: u32,
        mut alpha: f64,
        beta: f64,
        root: bool,
    ) -> Result<Node, Abort> {
        self.nodes += 1;
        self.check_limits()?;

        let grading = self.cache.grade_for_search(position);
        if position.is_finished() {
            let diff = grading.score(position.prisoners()).difference() as f64;
            return Ok(Node::leaf(diff * player.sign(), true, false));
        }
        if !root {
            if let Some(repetition) = repetition_check(&self.path) {
                return Ok(Node {
                    cyclic: true,
                    ..Node::leaf(repetition.value_for(player), false, false)
                });
            }
        }
        if depth == 0 {
            let value = self.evaluate(position, &grading, player);
            return Ok(Node::leaf(value, false, true));
        }

        if !root {
            if let Some(node) = self.lookup(position, player, depth, alpha, beta) {
                return Ok(node);
            }
        }
        let hint = self
            .table
            .get(player, position.key())
            .map(|e| e.moves.clone())
            .unwrap_or_default();

        let children = position.children(player);
        let order = self.order(children, &hint, depth, player);

        let alpha_orig = alpha;
        let mut best = f64::NEG_INFINITY;
        let mut moves = Vec::new();
        let mut exact = false;
        let mut truncated = false;
        let mut cyclic = false;
        let mut cutoff = false;
        for i in order {
            let child = &children[i];
            // At the root the window stays open just below the best exact
            // value so that every equally good move is found.
            let floor = if root && exact { alpha.max(best - TIE_MARGIN) } else { alpha };
            if floor >= beta {
                break;
            }
            self.cache.grade_child(position, child);
            self.path.push(Arc::clone(&child.position));
            let searched = self.negamax(&child.position, player.opponent(), depth - 1, -beta, -floor, false);
            self.path.pop();
            let reply = searched?;

            let value = -reply.value;
            truncated |= reply.truncated;
            cyclic |= reply.cyclic;
            if moves.is_empty() || dominates(reply.exact, value, exact, best) {
                best = value;
                moves = vec![child.mv];
                exact = reply.exact;
            } else if reply.exact == exact && value == best {
                moves.push(child.mv);
            }
            if !reply.exact {
                continue;
            }
            if !root && value > alpha {
                alpha = value;
            }
            if value >= beta {
                cutoff = true;
                self.record_cutoff(child.mv, depth, player);
                break;
            }
        }

        // Heuristic results never narrow the window, so their value does
        // not depend on it.
        let bound = if !exact {
            Bound::Exact
        } else if cutoff {
            Bound::Lower
        } else if best <= alpha_orig {
            Bound::Upper
        } else {
            Bound::Exact
        };
        if !cyclic {
            self.table.store(
                player,
                position.key().clone(),
                Entry {
                    value: best,
                    bound,
                    depth,
                    exact,
                    truncated,
                    moves: moves.clone(),
                },
            );
        }
        Ok(Node {
            value: best,
            exact,
            truncated,
            cyclic,
            moves,
        })
    }

    /// Table answer for this node, tried under every symmetry on small
    /// boards. Moves found on a transformed board are mapped back.
    ///
    /// A node that is an image of a position on the current path gets no
    /// answer: the entry there belongs to an unfinished search of that
    /// ancestor.
    fn lookup(&self, position: &Position, player: Color, depth: u32, alpha: f64, beta: f64) -> Option<Node> {
        let (sym, entry) = self.table.find(player, position, &self.symmetries, depth)?;
        let usable = match entry.bound {
            Bound::Exact => true,
            Bound::Lower => entry.value >= beta,
            Bound::Upper => entry.value <= alpha,
        };
        if !usable || self.images_ancestor(position) {
            return None;
        }
        let (rows, cols) = sym.dimensions(self.rows, self.cols);
        let back = sym.inverse();
        Some(Node {
            value: entry.value,
            exact: entry.exact,
            truncated: entry.truncated,
            cyclic: false,
            moves: entry.moves.iter().map(|m| m.transformed(back, rows, cols)).collect(),
        })
    }

    /// Whether the layout of `position`, or its image under one of the
    /// symmetries, matches a position earlier on the path.
    fn images_ancestor(&self, position: &Position) -> bool {
        let Some((_, ancestors)) = self.path.split_last() else {
            return false;
        };
        let same_layout = |key: &PositionKey| {
            ancestors.iter().any(|old| {
                let old = old.key();
                old.rows == key.rows && old.cols == key.cols && old.cells == key.cells
            })
        };
        if same_layout(position.key()) {
            return true;
        }
        self.symmetries
            .iter()
            .filter(|sym| !sym.is_identity())
            .any(|&sym| same_layout(&position.key_under(sym)))
    }

    /// Table moves first, then killers for this depth, then the pass, then
    /// the rest by history score.
    fn order(&self, children: &[Child], hint: &[Move], depth: u32, player: Color) -> Vec<usize> {
        let killers = self.killers.get(depth as usize);
        let mut keyed: Vec<((u8, u64), usize)> = children
            .iter()
            .enumerate()
            .map(|(i, child)| {
                let mv = child.mv;
                let key = if let Some(k) = hint.iter().position(|&m| m == mv) {
                    (0, k as u64)
                } else if let Some(k) = killers.and_then(|slots| slots.iter().position(|&s| s == Some(mv))) {
                    (1, k as u64)
                } else if mv == Move::Pass {
                    (2, 0)
                } else {
                    (3, u64::MAX - self.history_score(player, mv))
                };
                (key, i)
            })
            .collect();
        keyed.sort_unstable();
        keyed.into_iter().map(|(_, i)| i).collect()
    }

    fn history_score(&self, player: Color, mv: Move) -> u64 {
        match mv {
            Move::Pass => 0,
            Move::Play((r, c)) => self.history[player.index()][r * self.cols + c],
        }
    }

    fn record_cutoff(&mut self, mv: Move, depth: u32, player: Color) {
        let Move::Play((r, c)) = mv else {
            return;
        };
        if let Some(slots) = self.killers.get_mut(depth as usize) {
            if slots[0] != Some(mv) {
                slots.rotate_right(1);
                slots[0] = Some(mv);
            }
        }
        self.history[player.index()][r * self.cols + c] += u64::from(depth) * u64::from(depth);
    }

    /// Score difference plus a small shape term for strings that are not
    /// settled: liberties help, stones on the edge and in the corner hurt.
    fn evaluate(&self, position: &Position, grading: &Grading, player: Color) -> f64 {
        let grid = position.grid();
        let mut value = grading.score(position.prisoners()).difference() as f64;
        for color in [Color::Black, Color::White] {
            let mut shape = 0.0;
            for string in all_groups(grid, Some(color)) {
                if grading.alive[string.points[0]] {
                    continue;
                }
                shape += MOBILITY_BONUS * string.liberties.len() as f64;
                for &p in &string.points {
                    if grid.is_corner(p) {
                        shape -= EDGE_PENALTY + CORNER_PENALTY;
                    } else if grid.is_edge(p) {
                        shape -= EDGE_PENALTY;
                    }
                }
            }
            value += shape * color.sign();
        }
        value * player.sign()
    }
}

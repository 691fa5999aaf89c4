//! Territory, dame and the undecided frontier.
//!
//! A [`Grading`] is derived from both players' life maps. Territory of a
//! player is a maximal area of empty points and opponent non-alive stones
//! whose border consists only of that player's alive stones; the enclosed
//! opponent stones count again as prisoners.

use crate::grid::{Color, Grid, Point};
use crate::life::{LifeMap, benson, carry_over, resolve_miai};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grading {
    /// Per point: holds a stone (of either color) classified alive.
    pub alive: Vec<bool>,
    /// Territory points per player, indexed by [`Color::index`].
    pub territory: [Vec<usize>; 2],
    pub dame: Vec<usize>,
    /// Empty points that are neither territory nor dame.
    pub undecided: Vec<usize>,
    /// Opponent stones lying inside each player's territory.
    pub placed_prisoners: [u32; 2],
}

/// Points per player under area-plus-prisoner counting.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Score {
    pub black: u32,
    pub white: u32,
}

impl Score {
    /// Black minus White, before komi.
    pub fn difference(&self) -> i64 {
        i64::from(self.black) - i64::from(self.white)
    }

    /// Black minus White after giving White `komi`.
    pub fn margin(&self, komi: f64) -> f64 {
        self.difference() as f64 - komi
    }
}

impl Grading {
    pub fn score(&self, prisoners: [u32; 2]) -> Score {
        let points = |c: Color| {
            let i = c.index();
            self.territory[i].len() as u32 + self.placed_prisoners[i] + prisoners[i]
        };
        Score {
            black: points(Color::Black),
            white: points(Color::White),
        }
    }

    pub fn owner(&self, idx: usize) -> Option<Color> {
        [Color::Black, Color::White]
            .into_iter()
            .find(|c| self.territory[c.index()].binary_search(&idx).is_ok())
    }

    pub fn is_settled(&self) -> bool {
        self.undecided.is_empty()
    }

    pub fn undecided_points(&self, grid: &Grid) -> Vec<Point> {
        self.undecided.iter().map(|&i| grid.point(i)).collect()
    }
}

/// Grade a layout from scratch.
///
/// With `fast` only unconditional life is used; undetermined strings are
/// treated as not alive. Otherwise they are settled by the miai pass, with
/// dame points excluded from the candidate moves.
pub fn grade_grid(grid: &Grid, fast: bool) -> Grading {
    let black = benson(grid, Color::Black);
    let white = benson(grid, Color::White);
    if fast {
        return from_lives(grid, &black, &white);
    }
    let alive = alive_mask(grid.area(), &black, &white);
    let mut excluded = vec![false; grid.area()];
    for idx in dame_points(grid, &alive) {
        excluded[idx] = true;
    }
    let black = resolve_miai(grid, &black, &excluded);
    let white = resolve_miai(grid, &white, &excluded);
    from_lives(grid, &black, &white)
}

/// Regrade after a move that joined no strings and captured nothing.
///
/// Strings that are not unconditionally alive keep the status their stones
/// had in `previous` instead of running the miai pass again.
pub fn grade_incremental(grid: &Grid, previous: &Grading) -> Grading {
    let black = carry_over(&benson(grid, Color::Black), &previous.alive);
    let white = carry_over(&benson(grid, Color::White), &previous.alive);
    from_lives(grid, &black, &white)
}

fn alive_mask(area: usize, black: &LifeMap, white: &LifeMap) -> Vec<bool> {
    let mut alive = vec![false; area];
    for string in black.alive_strings().chain(white.alive_strings()) {
        for &p in &string.points {
            alive[p] = true;
        }
    }
    alive
}

/// Empty points surrounded entirely by alive stones of both colors.
fn dame_points(grid: &Grid, alive: &[bool]) -> Vec<usize> {
    grid.empty_points()
        .filter(|&idx| {
            let around = grid.neighbors(idx);
            around.iter().all(|&n| alive[n])
                && around.iter().any(|&n| grid.get(n) == Some(Color::Black))
                && around.iter().any(|&n| grid.get(n) == Some(Color::White))
        })
        .collect()
}

fn from_lives(grid: &Grid, black: &LifeMap, white: &LifeMap) -> Grading {
    let alive = alive_mask(grid.area(), black, white);
    let mut territory = [Vec::new(), Vec::new()];
    let mut placed_prisoners = [0u32; 2];
    for player in [Color::Black, Color::White] {
        let (points, stones) = territory_of(grid, &alive, player);
        territory[player.index()] = points;
        placed_prisoners[player.index()] = stones;
    }

    let mut claimed = vec![false; grid.area()];
    for &p in territory.iter().flatten() {
        claimed[p] = true;
    }
    let dame: Vec<usize> = dame_points(grid, &alive)
        .into_iter()
        .filter(|&idx| !claimed[idx])
        .collect();
    for &p in &dame {
        claimed[p] = true;
    }
    let undecided = grid.empty_points().filter(|&idx| !claimed[idx]).collect();

    Grading {
        alive,
        territory,
        dame,
        undecided,
        placed_prisoners,
    }
}

/// Territory of `player`, sorted, and the number of opponent stones in it.
fn territory_of(grid: &Grid, alive: &[bool], player: Color) -> (Vec<usize>, u32) {
    let opponent = player.opponent();
    // Points an area may spread over: empty, or an opponent stone that is
    // not alive.
    let open = |idx: usize| match grid.get(idx) {
        None => true,
        Some(c) => c == opponent && !alive[idx],
    };

    let mut visited = vec![false; grid.area()];
    let mut points = Vec::new();
    let mut stones = 0u32;
    for start in grid.empty_points().collect::<Vec<_>>() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut stack = vec![start];
        let mut area = Vec::new();
        let mut bordered = false;
        let mut clean = true;
        while let Some(pt) = stack.pop() {
            area.push(pt);
            for &n in grid.neighbors(pt) {
                if open(n) {
                    if !visited[n] {
                        visited[n] = true;
                        stack.push(n);
                    }
                } else if grid.get(n) == Some(player) && alive[n] {
                    bordered = true;
                } else {
                    clean = false;
                }
            }
        }
        if bordered && clean {
            stones += area.iter().filter(|&&p| grid.get(p).is_some()).count() as u32;
            points.extend(area);
        }
    }
    points.sort_unstable();
    (points, stones)
}

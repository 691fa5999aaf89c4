//! Flood fills over the grid: same-color strings and player-enclosed regions.
//!
//! Both fills use an explicit worklist and a per-call visited mask, so they
//! never touch the grid and are idempotent for fixed contents.

use crate::grid::{Color, Grid};

/// A maximal connected set of same-colored points.
///
/// `liberties` holds each adjacent empty point once. Point lists are sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoString {
    pub color: Option<Color>,
    pub points: Vec<usize>,
    pub liberties: Vec<usize>,
}

impl GoString {
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.points.binary_search(&idx).is_ok()
    }
}

/// A maximal connected set of points not occupied by `owner`'s stones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub owner: Color,
    /// Every point of the region: empty points and opponent stones.
    pub points: Vec<usize>,
    /// The empty points of the region.
    pub empties: Vec<usize>,
    /// True when every empty point touches one of `owner`'s stones.
    pub small: bool,
}

impl Region {
    pub fn contains(&self, idx: usize) -> bool {
        self.points.binary_search(&idx).is_ok()
    }
}

/// Flood fill from `idx` over points of the same color (empty included).
pub fn find_group(grid: &Grid, idx: usize) -> GoString {
    let color = grid.get(idx);
    let mut visited = vec![false; grid.area()];
    let mut liberty_seen = vec![false; grid.area()];
    let mut stack = vec![idx];
    let mut points = Vec::new();
    let mut liberties = Vec::new();
    visited[idx] = true;

    while let Some(pt) = stack.pop() {
        points.push(pt);
        for &n in grid.neighbors(pt) {
            match grid.get(n) {
                c if c == color => {
                    if !visited[n] {
                        visited[n] = true;
                        stack.push(n);
                    }
                }
                None => {
                    if !liberty_seen[n] {
                        liberty_seen[n] = true;
                        liberties.push(n);
                    }
                }
                _ => {}
            }
        }
    }
    points.sort_unstable();
    liberties.sort_unstable();
    GoString {
        color,
        points,
        liberties,
    }
}

/// Flood fill from `idx` over points not holding `player`'s stones.
///
/// Returns `None` when `idx` is itself one of `player`'s stones.
pub fn find_region(grid: &Grid, idx: usize, player: Color) -> Option<Region> {
    if grid.get(idx) == Some(player) {
        return None;
    }
    let mut visited = vec![false; grid.area()];
    let mut stack = vec![idx];
    let mut points = Vec::new();
    visited[idx] = true;

    while let Some(pt) = stack.pop() {
        points.push(pt);
        for &n in grid.neighbors(pt) {
            if !visited[n] && grid.get(n) != Some(player) {
                visited[n] = true;
                stack.push(n);
            }
        }
    }
    points.sort_unstable();
    let empties: Vec<usize> = points
        .iter()
        .copied()
        .filter(|&p| grid.get(p).is_none())
        .collect();
    let small = empties
        .iter()
        .all(|&e| grid.neighbors(e).iter().any(|&n| grid.get(n) == Some(player)));
    Some(Region {
        owner: player,
        points,
        empties,
        small,
    })
}

/// Every string of `color` on the board, in order of their lowest point.
pub fn all_groups(grid: &Grid, color: Option<Color>) -> Vec<GoString> {
    let mut done = vec![false; grid.area()];
    let mut out = Vec::new();
    for idx in 0..grid.area() {
        if done[idx] || grid.get(idx) != color {
            continue;
        }
        let group = find_group(grid, idx);
        for &p in &group.points {
            done[p] = true;
        }
        out.push(group);
    }
    out
}

/// Every region enclosed by `player` that contains at least one empty point.
pub fn all_regions(grid: &Grid, player: Color) -> Vec<Region> {
    let mut done = vec![false; grid.area()];
    let mut out = Vec::new();
    for idx in grid.empty_points().collect::<Vec<_>>() {
        if done[idx] {
            continue;
        }
        if let Some(region) = find_region(grid, idx, player) {
            for &p in &region.points {
                done[p] = true;
            }
            out.push(region);
        }
    }
    out
}

/// Map each point to the index of the item covering it.
pub fn index_map<'a, I>(area: usize, items: I) -> Vec<Option<usize>>
where
    I: IntoIterator<Item = &'a [usize]>,
{
    let mut map = vec![None; area];
    for (i, points) in items.into_iter().enumerate() {
        for &p in points {
            map[p] = Some(i);
        }
    }
    map
}

//! Life classification: Benson's unconditional life plus a miai pass.
//!
//! [`benson`] marks strings that can never be captured, even if the opponent
//! moves repeatedly; everything else stays [`Life::Unknown`]. [`resolve_miai`]
//! then settles the unknown strings: a string is alive when at least two
//! distinct moves each make it unconditionally alive, dead otherwise.
//! Every pass returns a fresh [`LifeMap`] rather than updating one in place.

use crate::connectivity::{GoString, Region, all_groups, all_regions, index_map};
use crate::grid::{Color, Grid};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Life {
    Alive,
    Dead,
    Unknown,
}

/// Classification of one player's strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifeMap {
    pub player: Color,
    pub strings: Vec<GoString>,
    pub status: Vec<Life>,
    /// Regions serving as eyes of unconditionally alive strings.
    pub eyes: Vec<Region>,
    string_at: Vec<Option<usize>>,
}

impl LifeMap {
    /// Status of the string covering `idx`, if `idx` holds one of the
    /// player's stones.
    pub fn status_at(&self, idx: usize) -> Option<Life> {
        self.string_at[idx].map(|s| self.status[s])
    }

    pub fn is_alive_at(&self, idx: usize) -> bool {
        self.status_at(idx) == Some(Life::Alive)
    }

    pub fn string_at(&self, idx: usize) -> Option<&GoString> {
        self.string_at[idx].map(|s| &self.strings[s])
    }

    pub fn alive_strings(&self) -> impl Iterator<Item = &GoString> {
        self.strings
            .iter()
            .zip(&self.status)
            .filter(|&(_, &life)| life == Life::Alive)
            .map(|(s, _)| s)
    }

    pub fn has_unknown(&self) -> bool {
        self.status.contains(&Life::Unknown)
    }

    /// Per-point mask of eye points.
    pub fn eye_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.string_at.len()];
        for eye in &self.eyes {
            for &p in &eye.points {
                mask[p] = true;
            }
        }
        mask
    }

    fn with_status(&self, status: Vec<Life>) -> LifeMap {
        LifeMap {
            status,
            ..self.clone()
        }
    }
}

/// Benson's algorithm for `player`.
///
/// A region is vital to a string when each of its empty points is a liberty
/// of that string. Strings with fewer than two healthy vital regions are
/// removed, regions bordering a removed string stop being healthy, and the
/// process repeats until nothing changes.
pub fn benson(grid: &Grid, player: Color) -> LifeMap {
    let strings = all_groups(grid, Some(player));
    let regions = all_regions(grid, player);
    let string_at = index_map(grid.area(), strings.iter().map(|s| s.points.as_slice()));

    // Strings bordering each region, and the subset the region is vital to.
    let mut borders: Vec<Vec<usize>> = Vec::with_capacity(regions.len());
    let mut vital: Vec<Vec<usize>> = Vec::with_capacity(regions.len());
    for region in &regions {
        let mut around = Vec::new();
        for &p in &region.points {
            for &n in grid.neighbors(p) {
                if let Some(s) = string_at[n] {
                    if !around.contains(&s) {
                        around.push(s);
                    }
                }
            }
        }
        let vital_to = around
            .iter()
            .copied()
            .filter(|&s| {
                region
                    .empties
                    .iter()
                    .all(|&e| grid.neighbors(e).iter().any(|&n| string_at[n] == Some(s)))
            })
            .collect();
        borders.push(around);
        vital.push(vital_to);
    }

    let mut alive = vec![true; strings.len()];
    let mut healthy = vec![true; regions.len()];
    loop {
        let mut removed = false;
        for s in 0..strings.len() {
            if !alive[s] {
                continue;
            }
            let eyes = (0..regions.len())
                .filter(|&r| healthy[r] && vital[r].contains(&s))
                .count();
            if eyes < 2 {
                alive[s] = false;
                removed = true;
            }
        }
        if !removed {
            break;
        }
        for r in 0..regions.len() {
            if healthy[r] && borders[r].iter().any(|&s| !alive[s]) {
                healthy[r] = false;
            }
        }
    }

    let eyes = regions
        .into_iter()
        .enumerate()
        .filter(|(r, _)| healthy[*r] && vital[*r].iter().any(|&s| alive[s]))
        .map(|(_, region)| region)
        .collect();
    let status = alive
        .iter()
        .map(|&a| if a { Life::Alive } else { Life::Unknown })
        .collect();
    LifeMap {
        player,
        strings,
        status,
        eyes,
        string_at,
    }
}

/// Settle every unknown string of `base` by looking for miai.
///
/// Candidate moves are empty points that are neither eyes of `base` nor
/// marked in `excluded`. A candidate only counts for strings it is not
/// isolated from: it must lie in a region that the string borders.
pub fn resolve_miai(grid: &Grid, base: &LifeMap, excluded: &[bool]) -> LifeMap {
    if !base.has_unknown() {
        return base.clone();
    }
    let player = base.player;
    let regions = all_regions(grid, player);
    let region_at = index_map(grid.area(), regions.iter().map(|r| r.points.as_slice()));

    // Regions each unknown string borders, through its liberties.
    let touching: Vec<Vec<usize>> = base
        .strings
        .iter()
        .zip(&base.status)
        .map(|(string, &life)| {
            if life != Life::Unknown {
                return Vec::new();
            }
            let mut ids: Vec<usize> = string.liberties.iter().filter_map(|&l| region_at[l]).collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        })
        .collect();

    let eye_mask = base.eye_mask();
    let mut confirmations = vec![0usize; base.strings.len()];
    for idx in grid.empty_points() {
        if eye_mask[idx] || excluded.get(idx).copied().unwrap_or(false) {
            continue;
        }
        let Some(region) = region_at[idx] else {
            continue;
        };
        let relevant: Vec<usize> = (0..base.strings.len())
            .filter(|&s| confirmations[s] < 2 && touching[s].binary_search(&region).is_ok())
            .collect();
        if relevant.is_empty() {
            continue;
        }
        let mut trial = grid.clone();
        if trial.play(idx, player).is_err() {
            continue;
        }
        let after = benson(&trial, player);
        for s in relevant {
            if after.is_alive_at(base.strings[s].points[0]) {
                confirmations[s] += 1;
            }
        }
    }

    let status = base
        .status
        .iter()
        .zip(&confirmations)
        .map(|(&life, &count)| match life {
            Life::Unknown if count >= 2 => Life::Alive,
            Life::Unknown => Life::Dead,
            settled => settled,
        })
        .collect();
    base.with_status(status)
}

/// Settle unknown strings from a previous full classification instead of
/// searching for miai: a string stays alive if any of its stones was alive.
pub fn carry_over(base: &LifeMap, previously_alive: &[bool]) -> LifeMap {
    let status = base
        .strings
        .iter()
        .zip(&base.status)
        .map(|(string, &life)| match life {
            Life::Unknown if string.points.iter().any(|&p| previously_alive[p]) => Life::Alive,
            Life::Unknown => Life::Dead,
            settled => settled,
        })
        .collect();
    base.with_status(status)
}

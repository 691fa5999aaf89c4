//! Transposition tables, one per player to move.
//!
//! Values are stored from the point of view of the player to move and do
//! not include komi, so an entry found under a color-inverting symmetry can
//! be used unchanged for the opponent's table.

use std::collections::HashMap;

use crate::grid::Color;
use crate::position::{Move, Position, PositionKey};
use crate::symmetry::Symmetry;

/// How `value` relates to the true value of the node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// The node is worth at least `value` (a cutoff happened).
    Lower,
    /// The node is worth at most `value` (no move reached alpha).
    Upper,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub value: f64,
    pub bound: Bound,
    /// Remaining depth the node was searched with.
    pub depth: u32,
    /// The value comes from finished sequences only, not from a static
    /// evaluation or a repetition.
    pub exact: bool,
    /// Some line below the node hit the depth limit.
    pub truncated: bool,
    /// Moves achieving `value`, best first.
    pub moves: Vec<Move>,
}

impl Entry {
    /// Whether the entry answers a search of `depth` remaining plies.
    /// Untruncated entries hold at any depth.
    #[inline]
    pub fn covers(&self, depth: u32) -> bool {
        !self.truncated || self.depth >= depth
    }

    fn rank(&self) -> (bool, bool, u32) {
        (!self.truncated, self.bound == Bound::Exact, self.depth)
    }
}

#[derive(Debug, Default)]
pub struct TranspositionTable {
    tables: [HashMap<PositionKey, Entry>; 2],
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables[0].len() + self.tables[1].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, player: Color, key: &PositionKey) -> Option<&Entry> {
        self.tables[player.index()].get(key)
    }

    /// Store `entry`, unless the existing one is more reliable: untruncated
    /// beats truncated, an exact bound beats a one-sided one, deeper beats
    /// shallower.
    pub fn store(&mut self, player: Color, key: PositionKey, entry: Entry) {
        let table = &mut self.tables[player.index()];
        match table.get(&key) {
            Some(old) if old.rank() > entry.rank() => {}
            _ => {
                table.insert(key, entry);
            }
        }
    }

    /// Look up `position` for `player`, first directly and then under each
    /// of `symmetries`. Returns the first entry that covers `depth`, with
    /// the symmetry under which it was found; its moves are expressed on
    /// the transformed board.
    pub fn find(
        &self,
        player: Color,
        position: &Position,
        symmetries: &[Symmetry],
        depth: u32,
    ) -> Option<(Symmetry, &Entry)> {
        if let Some(entry) = self.get(player, position.key()) {
            if entry.covers(depth) {
                return Some((Symmetry::IDENTITY, entry));
            }
        }
        symmetries
            .iter()
            .filter(|sym| !sym.is_identity())
            .find_map(|&sym| {
                self.get(sym.color(player), &position.key_under(sym))
                    .filter(|entry| entry.covers(depth))
                    .map(|entry| (sym, entry))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(value: f64, bound: Bound, depth: u32, truncated: bool) -> Entry {
        Entry {
            value,
            bound,
            depth,
            exact: !truncated,
            truncated,
            moves: vec![Move::Pass],
        }
    }

    #[test]
    fn test_replacement_prefers_reliable_entries() {
        let pos = Position::new(2, 2).unwrap();
        let key = pos.key().clone();
        let mut table = TranspositionTable::new();

        table.store(Color::Black, key.clone(), entry(1.0, Bound::Exact, 2, true));
        table.store(Color::Black, key.clone(), entry(2.0, Bound::Exact, 1, true));
        assert_eq!(table.get(Color::Black, &key).unwrap().value, 1.0);

        table.store(Color::Black, key.clone(), entry(3.0, Bound::Lower, 1, false));
        assert_eq!(table.get(Color::Black, &key).unwrap().value, 3.0);
        table.store(Color::Black, key.clone(), entry(4.0, Bound::Exact, 9, true));
        assert_eq!(table.get(Color::Black, &key).unwrap().value, 3.0);

        assert!(table.get(Color::White, &key).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_covers() {
        assert!(entry(0.0, Bound::Exact, 1, false).covers(10));
        assert!(entry(0.0, Bound::Exact, 3, true).covers(3));
        assert!(!entry(0.0, Bound::Exact, 3, true).covers(4));
    }

    #[test]
    fn test_find_under_inverted_mirror() {
        let pos = Position::parse("X..\n...").unwrap();
        let mirror = Symmetry {
            flip_cols: true,
            invert: true,
            ..Symmetry::IDENTITY
        };
        let image = pos.transformed(mirror);
        assert_eq!(image.grid().at((0, 2)), Some(Color::White));

        let mut table = TranspositionTable::new();
        table.store(Color::White, image.key().clone(), entry(5.0, Bound::Exact, 1, false));

        let symmetries = Symmetry::all(2, 3);
        let (sym, found) = table.find(Color::Black, &pos, &symmetries, 4).unwrap();
        assert_eq!(sym, mirror);
        assert_eq!(found.value, 5.0);
        assert!(table.find(Color::White, &pos, &symmetries, 4).is_none());
    }
}

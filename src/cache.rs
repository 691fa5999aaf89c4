//! Long-lived cache of graded layouts.
//!
//! Grading a layout runs Benson's algorithm for both players plus the miai
//! pass, which dominates the cost of expanding a search node. The cache is
//! keyed by layout only, since ko, prisoners and passes do not affect
//! territory. It is owned by the session and cleared whenever the board
//! size changes.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::grid::Grid;
use crate::position::{Child, Position};
use crate::score::{Grading, grade_grid, grade_incremental};

/// Full gradings keyed by layout, for one board size at a time.
#[derive(Debug, Default)]
pub struct GradeCache {
    dims: Option<(usize, usize)>,
    graded: HashMap<Grid, Arc<Grading>>,
    hits: u64,
    misses: u64,
}

impl GradeCache {
    /// An empty cache with no board size fixed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything if the board size differs from the cached one.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        if self.dims != Some((rows, cols)) {
            if !self.graded.is_empty() {
                trace!(rows, cols, dropped = self.graded.len(), "grade cache cleared");
            }
            self.clear();
            self.dims = Some((rows, cols));
        }
    }

    /// Drop every grading and reset the counters.
    pub fn clear(&mut self) {
        self.graded.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Number of distinct layouts graded.
    pub fn len(&self) -> usize {
        self.graded.len()
    }

    /// True when no layout has been graded since the last clear.
    pub fn is_empty(&self) -> bool {
        self.graded.is_empty()
    }

    /// (hits, misses) since the last clear.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Full grading of `position`, shared with every equal layout.
    pub fn grade(&mut self, position: &Position) -> Arc<Grading> {
        if let Some(g) = position.grading() {
            return Arc::clone(g);
        }
        let grid = position.grid();
        self.resize(grid.rows(), grid.cols());
        let grading = match self.graded.get(grid) {
            Some(g) => {
                self.hits += 1;
                trace!("grade cache hit");
                Arc::clone(g)
            }
            None => {
                self.misses += 1;
                let g = Arc::new(grade_grid(grid, false));
                self.graded.insert(grid.clone(), Arc::clone(&g));
                g
            }
        };
        position.attach_grading(grading)
    }

    /// Grading a search node works with: whatever the position already
    /// carries, else the full grading.
    pub fn grade_for_search(&mut self, position: &Position) -> Arc<Grading> {
        match position.working_grading() {
            Some(g) => Arc::clone(g),
            None => self.grade(position),
        }
    }

    /// Grading of a child reached from `parent`.
    ///
    /// Pass children share the parent's grading. Quiet moves carry life
    /// over from the parent unless the layout is already cached. Carried
    /// gradings stay on the child as search-only data: they never enter
    /// the cache and never answer [`Position::grade`].
    pub fn grade_child(&mut self, parent: &Position, child: &Child) -> Arc<Grading> {
        if let Some(g) = child.position.working_grading() {
            return Arc::clone(g);
        }
        let previous = self.grade_for_search(parent);
        if child.position.grid() == parent.grid() {
            return match parent.grading() {
                Some(full) => child.position.attach_grading(Arc::clone(full)),
                None => child.position.attach_carried(previous),
            };
        }
        if child.quiet {
            if let Some(g) = self.graded.get(child.position.grid()) {
                self.hits += 1;
                return child.position.attach_grading(Arc::clone(g));
            }
            let g = grade_incremental(child.position.grid(), &previous);
            return child.position.attach_carried(Arc::new(g));
        }
        self.grade(&child.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Color;
    use crate::position::Move;

    #[test]
    fn test_equal_layouts_share_grading() {
        let mut cache = GradeCache::new();
        let a = Position::parse("X..\n...\n..O").unwrap();
        let b = a.with_prisoners([4, 1]);
        let ga = cache.grade(&a);
        let gb = cache.grade(&b);
        assert!(Arc::ptr_eq(&ga, &gb));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_resize_clears() {
        let mut cache = GradeCache::new();
        cache.grade(&Position::new(3, 3).unwrap());
        assert_eq!(cache.len(), 1);
        cache.resize(3, 3);
        assert_eq!(cache.len(), 1);
        cache.grade(&Position::new(4, 3).unwrap());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats(), (0, 1));
    }

    #[test]
    fn test_pass_child_reuses_parent_grading() {
        let mut cache = GradeCache::new();
        let pos = Position::new(3, 3).unwrap();
        let grading = cache.grade(&pos);
        let children = pos.children(Color::Black);
        let pass = &children[0];
        assert_eq!(pass.mv, Move::Pass);
        assert!(Arc::ptr_eq(&cache.grade_child(&pos, pass), &grading));
        assert!(pass.position.grading().is_some());
    }

    #[test]
    fn test_quiet_child_matches_full_grading() {
        let mut cache = GradeCache::new();
        let pos = Position::parse(
            ".X.X.
             XXXXX
             .....",
        )
        .unwrap();
        let grading = cache.grade(&pos);
        assert!(grading.undecided.is_empty());
        let next = Arc::new(pos.place(Color::Black, (2, 0), false).unwrap());
        let child = Child {
            mv: Move::Play((2, 0)),
            position: Arc::clone(&next),
            quiet: true,
        };
        let quick = cache.grade_child(&pos, &child);
        assert_eq!(*quick, grade_grid(next.grid(), false));
        assert!(next.grading().is_none());
        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&cache.grade_for_search(&next), &quick));
        let full = cache.grade(&next);
        assert!(!Arc::ptr_eq(&full, &quick));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_carried_grading_stays_out_of_fast_and_full() {
        let mut cache = GradeCache::new();
        let pos = Position::parse(
            "XXX....
             X.X...X
             XXXXXXX",
        )
        .unwrap();
        cache.grade(&pos);
        let next = Arc::new(pos.place(Color::Black, (0, 6), false).unwrap());
        let child = Child {
            mv: Move::Play((0, 6)),
            position: Arc::clone(&next),
            quiet: true,
        };
        cache.grade_child(&pos, &child);
        assert!(next.grading().is_none());
        assert_eq!(next.grade(true).undecided.len(), 7);
        assert!(next.grading().is_none());
        assert!(next.grade(false).undecided.is_empty());
        assert_eq!(next.grade(true).undecided.len(), 7);
    }
}

//! goscore: scoring and exact endgame search for small Go positions.
//!
//! The crate decides which stones are settled, scores a position and
//! searches the remaining contested points for provably optimal play.
//!
//! ## Modules
//!
//! - [`constants`] - Board limits, search ceilings and evaluation weights
//! - [`grid`] - Board layout with precomputed neighbor lists
//! - [`symmetry`] - Reflections, transposition and color inversion
//! - [`connectivity`] - Strings, liberties and enclosed regions
//! - [`life`] - Benson's unconditional life and the miai extension
//! - [`score`] - Territory, dame, undecided points and scores
//! - [`position`] - Immutable board states and repetition detection
//! - [`cache`] - Graded layouts shared across searches
//! - [`table`] - Transposition tables
//! - [`search`] - Iterative-deepening negamax solver
//! - [`playout`] - Random legal play for generating positions
//! - [`session`] - Undo/redo history and scoring with komi
//! - [`gtp`] - Go Text Protocol front end
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use goscore::cache::GradeCache;
//! use goscore::grid::Color;
//! use goscore::position::{Move, Position};
//! use goscore::search::{SearchConfig, SolveOutcome, solve};
//!
//! let pos = Arc::new(Position::parse(".X.X.\nXXXXX\n..O..").unwrap());
//! let mut cache = GradeCache::new();
//! match solve(&pos, Color::Black, &[], &mut cache, &SearchConfig::default()) {
//!     SolveOutcome::Solved(solution) => {
//!         assert_eq!(solution.result.moves, vec![Move::Pass]);
//!         assert_eq!(solution.score, 2.5);
//!     }
//!     _ => unreachable!(),
//! }
//! ```

pub mod cache;
pub mod connectivity;
pub mod constants;
pub mod error;
pub mod grid;
pub mod gtp;
pub mod life;
pub mod playout;
pub mod position;
pub mod score;
pub mod search;
pub mod session;
pub mod symmetry;
pub mod table;

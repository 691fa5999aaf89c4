//! Board limits, search ceilings, and evaluation weights.
//!
//! Everything here is a default. [`SearchConfig`](crate::search::SearchConfig)
//! copies the search-related values and lets callers override them.

// =============================================================================
// Board Geometry
// =============================================================================

/// Largest supported board dimension (rows or columns).
pub const MAX_LENGTH: usize = 25;

/// Column letters used for GTP vertices ('I' is skipped by convention).
pub const COLUMN_LETTERS: &[u8; 25] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

// =============================================================================
// Scoring
// =============================================================================

/// Default komi (compensation points for White).
pub const DEFAULT_KOMI: f64 = 6.5;

/// Largest accepted absolute komi.
pub const MAX_KOMI: f64 = 99.5;

/// Positions closer than this many plies are never reported as a repetition.
pub const MIN_CYCLE: usize = 4;

// =============================================================================
// Search Ceilings
// =============================================================================

/// Maximum number of undecided points a position may have to be solved.
pub const MAX_UNDECIDED: usize = 7;

/// Deepest iteration attempted before giving up.
pub const MAX_DEPTH: u32 = 80;

/// Ceiling on cached positions times board area.
pub const MAX_COMPLEXITY: usize = 40_000_000;

/// Boards up to this area also look up the transposition table under symmetry.
pub const SYMMETRY_MAX_AREA: usize = 49;

/// Killer moves remembered per depth.
pub const KILLER_SLOTS: usize = 2;

/// Root siblings are searched with alpha lowered by this margin so that
/// equally good moves are all reported.
pub const TIE_MARGIN: f64 = 0.5;

// =============================================================================
// Static Evaluation Weights
// =============================================================================

/// Bonus per liberty of an unsettled string.
pub const MOBILITY_BONUS: f64 = 0.05;

/// Penalty per unsettled stone on the first line.
pub const EDGE_PENALTY: f64 = 0.1;

/// Extra penalty per unsettled stone in a corner.
pub const CORNER_PENALTY: f64 = 0.15;

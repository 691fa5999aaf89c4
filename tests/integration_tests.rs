//! Integration tests for goscore.
//!
//! Rule checks on hand-made positions, randomized checks on positions
//! produced by seeded random play, and end-to-end solves through the
//! public API.

use std::collections::BTreeSet;
use std::sync::Arc;

use fastrand::Rng;

use goscore::cache::GradeCache;
use goscore::connectivity::{all_groups, all_regions};
use goscore::error::PlacementError;
use goscore::grid::{Color, Grid};
use goscore::life::{Life, benson, resolve_miai};
use goscore::playout::{random_line, random_position};
use goscore::position::{Move, Position, Repetition, repetition_check};
use goscore::score::grade_grid;
use goscore::search::{SearchConfig, SolveOutcome, Solution, solve};
use goscore::session::{Event, Session};
use goscore::symmetry::Symmetry;

// =============================================================================
// Helper functions
// =============================================================================

/// Positions from seeded random play on a few board shapes.
fn random_positions(seed: u64, count: usize) -> Vec<Position> {
    let mut rng = Rng::with_seed(seed);
    let shapes = [(5, 5), (4, 6), (7, 7), (3, 3)];
    (0..count)
        .map(|i| {
            let (rows, cols) = shapes[i % shapes.len()];
            let plies = rng.usize(0..rows * cols * 2);
            random_position(rows, cols, plies, &mut rng).unwrap()
        })
        .collect()
}

fn solved(outcome: SolveOutcome) -> Solution {
    match outcome {
        SolveOutcome::Solved(solution) => solution,
        other => panic!("expected a solution, got {other:?}"),
    }
}

fn solve_fresh(position: Position, player: Color, config: &SearchConfig) -> Solution {
    let mut cache = GradeCache::new();
    solved(solve(&Arc::new(position), player, &[], &mut cache, config))
}

/// The miai example: one real eye and a wide area where either of two
/// points makes a second one.
const MIAI: &str = "XXX...X
                    X.X...X
                    XXXXXXX";

/// An alive black group with a lone white stone inside its area.
const DEAD_STONE: &str = ".X.X.
                          XXXXX
                          ..O..";

// =============================================================================
// Connectivity
// =============================================================================

#[test]
fn test_liberties_match_brute_force() {
    for pos in random_positions(11, 40) {
        let grid = pos.grid();
        for color in [Color::Black, Color::White] {
            for string in all_groups(grid, Some(color)) {
                let expected: BTreeSet<usize> = string
                    .points
                    .iter()
                    .flat_map(|&p| grid.neighbors(p).iter().copied())
                    .filter(|&n| grid.get(n).is_none())
                    .collect();
                let reported: Vec<usize> = string.liberties.clone();
                assert_eq!(reported, expected.into_iter().collect::<Vec<_>>(), "\n{grid}");
                // A position reached by legal play has no string without liberties.
                assert!(!string.liberties.is_empty(), "\n{grid}");
            }
        }
    }
}

#[test]
fn test_strings_partition_the_stones() {
    for pos in random_positions(12, 20) {
        let grid = pos.grid();
        let mut covered = vec![0u8; grid.area()];
        for string in all_groups(grid, Some(Color::Black))
            .into_iter()
            .chain(all_groups(grid, Some(Color::White)))
        {
            for &p in &string.points {
                covered[p] += 1;
            }
        }
        for idx in 0..grid.area() {
            let expected = u8::from(grid.get(idx).is_some());
            assert_eq!(covered[idx], expected);
        }
    }
}

#[test]
fn test_regions_never_contain_own_stones() {
    for pos in random_positions(13, 20) {
        let grid = pos.grid();
        for player in [Color::Black, Color::White] {
            for region in all_regions(grid, player) {
                assert!(region.points.iter().all(|&p| grid.get(p) != Some(player)));
                assert!(!region.empties.is_empty());
            }
        }
    }
}

// =============================================================================
// Placement rules
// =============================================================================

#[test]
fn test_captures_credit_prisoners() {
    let start = Arc::new(Position::new(5, 5).unwrap());
    let mut rng = Rng::with_seed(5);
    for _ in 0..10 {
        let line = random_line(&start, Color::Black, 60, &mut rng);
        let mut previous = Arc::clone(&start);
        let mut player = Color::Black;
        for (mv, next) in &line {
            if let Move::Play(_) = mv {
                let opp = player.opponent();
                let removed = previous.grid().count(opp) - next.grid().count(opp);
                let gained = next.prisoners()[player.index()] - previous.prisoners()[player.index()];
                assert_eq!(gained as usize, removed);
                assert_eq!(next.grid().count(player), previous.grid().count(player) + 1);
            }
            previous = Arc::clone(next);
            player = player.opponent();
        }
    }
}

#[test]
fn test_capture_removes_whole_string() {
    let pos = Position::parse(
        ".XX.
         XOO.
         .XX.",
    )
    .unwrap();
    let next = pos.place(Color::Black, (1, 3), false).unwrap();
    assert_eq!(next.grid().count(Color::White), 0);
    assert_eq!(next.prisoners(), [2, 0]);
    assert_eq!(next.ko(), None);
    assert_eq!(next.place(Color::White, (1, 3), false).unwrap_err(), PlacementError::Occupied);
}

#[test]
fn test_suicide_rejected() {
    let pos = Position::parse(".X\nX.").unwrap();
    assert_eq!(
        pos.place(Color::White, (0, 0), false).unwrap_err(),
        PlacementError::Suicide
    );
    assert!(pos.place(Color::Black, (0, 0), false).is_ok());
}

#[test]
fn test_capture_before_suicide() {
    // The corner stone has no liberty of its own but takes the black stone.
    let pos = Position::parse(".XO\nXO.\n...").unwrap();
    let next = pos.place(Color::White, (0, 0), false).unwrap();
    assert_eq!(next.grid().at((0, 1)), None);
    assert_eq!(next.prisoners(), [0, 1]);
}

#[test]
fn test_ko_cycle() {
    let pos = Position::parse(
        ".XO..
         XO.O.
         .XO..",
    )
    .unwrap();
    let taken = pos.place(Color::Black, (1, 2), false).unwrap();
    assert_eq!(taken.ko(), Some((1, 1)));
    assert_eq!(
        taken.place(Color::White, (1, 1), false).unwrap_err(),
        PlacementError::Ko
    );

    // A ko threat elsewhere and its answer lift the ban.
    let threat = taken.place(Color::White, (0, 4), false).unwrap();
    let answer = threat.place(Color::Black, (2, 4), false).unwrap();
    let retaken = answer.place(Color::White, (1, 1), false).unwrap();
    assert_eq!(retaken.ko(), Some((1, 2)));
    assert_eq!(retaken.prisoners(), [1, 1]);
}

#[test]
fn test_erase_and_take_prisoner() {
    let pos = Position::parse("XO\n..").unwrap();
    let erased = pos.erase((0, 1), true).unwrap();
    assert_eq!(erased.prisoners(), [1, 0]);
    assert_eq!(erased.erase((0, 1), true).unwrap_err(), PlacementError::Empty);
}

// =============================================================================
// Life and scoring
// =============================================================================

#[test]
fn test_two_separate_eyes_live() {
    let grid = Grid::parse(
        ".X.X
         XXXX",
    )
    .unwrap();
    let map = benson(&grid, Color::Black);
    assert_eq!(map.status, vec![Life::Alive]);

    // With one eye filled by an opponent stone only one vital region is left.
    let filled = Grid::parse(
        ".XOX
         XXXX",
    )
    .unwrap();
    let map = benson(&filled, Color::Black);
    assert_eq!(map.status, vec![Life::Unknown]);
}

#[test]
fn test_alive_strings_have_two_vital_eyes() {
    for pos in random_positions(21, 60) {
        let grid = pos.grid();
        for player in [Color::Black, Color::White] {
            let map = benson(grid, player);
            for string in map.alive_strings() {
                let vital = map
                    .eyes
                    .iter()
                    .filter(|eye| {
                        eye.empties.iter().all(|&e| {
                            grid.neighbors(e).iter().any(|&n| string.contains(n))
                        })
                    })
                    .count();
                assert!(vital >= 2, "\n{grid}");
            }
        }
    }
}

#[test]
fn test_miai_settles_unknown_strings() {
    let grid = Grid::parse(MIAI).unwrap();
    let base = benson(&grid, Color::Black);
    let settled = resolve_miai(&grid, &base, &vec![false; grid.area()]);
    assert_eq!(settled.status, vec![Life::Alive]);
    for pos in random_positions(22, 20) {
        let grid = pos.grid();
        let base = benson(grid, Color::White);
        let settled = resolve_miai(grid, &base, &vec![false; grid.area()]);
        assert!(!settled.has_unknown());
        for (before, after) in base.status.iter().zip(&settled.status) {
            if *before == Life::Alive {
                assert_eq!(*after, Life::Alive);
            }
        }
    }
}

#[test]
fn test_grading_is_idempotent() {
    for pos in random_positions(31, 30) {
        let first = grade_grid(pos.grid(), false);
        let second = grade_grid(pos.grid(), false);
        assert_eq!(first, second);
        assert_eq!(*pos.grade(false), first);
        assert_eq!(pos.score(), first.score(pos.prisoners()));
    }
}

#[test]
fn test_grading_partitions_empty_points() {
    for pos in random_positions(32, 30) {
        let grid = pos.grid();
        let grading = pos.grade(false);
        for idx in grid.empty_points() {
            let owners = grading.territory[0].binary_search(&idx).is_ok() as u8
                + grading.territory[1].binary_search(&idx).is_ok() as u8
                + grading.dame.contains(&idx) as u8
                + grading.undecided.contains(&idx) as u8;
            assert_eq!(owners, 1, "point {idx}\n{grid}");
        }
    }
}

#[test]
fn test_hand_counted_score() {
    let pos = Position::parse(DEAD_STONE).unwrap().with_prisoners([1, 3]);
    let score = pos.score();
    // Eight points of area, the white stone inside as a prisoner, one
    // earlier capture.
    assert_eq!(score.black, 10);
    assert_eq!(score.white, 3);
    assert_eq!(score.margin(6.5), 0.5);
}

// =============================================================================
// Repetition
// =============================================================================

#[test]
fn test_repetition_favors_prisoner_gain() {
    let a = Position::new(2, 3).unwrap();
    let b = a.place(Color::White, (0, 0), false).unwrap();
    let c = b.erase((0, 0), true).unwrap();
    let d = c.place(Color::Black, (1, 2), false).unwrap();
    let e = d.erase((1, 2), false).unwrap();
    let line: Vec<Arc<Position>> = vec![a, b, c, d, e].into_iter().map(Arc::new).collect();
    assert_eq!(repetition_check(&line), Some(Repetition::BlackFavored));
    // The empty boards at c and e are only two plies apart.
    assert_eq!(repetition_check(&line[2..]), None);
}

// =============================================================================
// Symmetry
// =============================================================================

#[test]
fn test_transform_round_trip() {
    for pos in random_positions(41, 16) {
        let grid = pos.grid();
        for sym in Symmetry::all(grid.rows(), grid.cols()) {
            let image = pos.transformed(sym);
            assert_eq!(image.grid().count(sym.color(Color::Black)), grid.count(Color::Black));
            let back = image.transformed(sym.inverse());
            assert_eq!(back.grid(), grid);
            assert_eq!(back.key(), pos.key());
            assert_eq!(back.prisoners(), pos.prisoners());
        }
    }
}

#[test]
fn test_grading_commutes_with_symmetry() {
    for pos in random_positions(42, 12) {
        let grid = pos.grid();
        let grading = pos.grade(false);
        for sym in Symmetry::all(grid.rows(), grid.cols()) {
            let image = pos.transformed(sym);
            let image_grading = image.grade(false);
            assert_eq!(image_grading.undecided.len(), grading.undecided.len());
            assert_eq!(image_grading.dame.len(), grading.dame.len());
            for player in [Color::Black, Color::White] {
                assert_eq!(
                    image_grading.territory[sym.color(player).index()].len(),
                    grading.territory[player.index()].len()
                );
            }
        }
    }
}

#[test]
fn test_solve_value_is_symmetric() {
    let config = SearchConfig::default();
    for diagram in [DEAD_STONE, ".X.\nXX.\n..."] {
        let pos = Position::parse(diagram).unwrap();
        let (rows, cols) = (pos.grid().rows(), pos.grid().cols());
        let direct = solve_fresh(Position::parse(diagram).unwrap(), Color::Black, &config);
        for sym in Symmetry::all(rows, cols) {
            let image = solve_fresh(pos.transformed(sym), sym.color(Color::Black), &config);
            assert_eq!(image.result.value, direct.result.value, "{sym:?}");
            let (ir, ic) = sym.dimensions(rows, cols);
            let mapped = image.result.transformed(sym.inverse(), ir, ic);
            assert_eq!(mapped.moves, direct.result.moves, "{sym:?}");
        }
    }
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_dead_stone_position() {
    let config = SearchConfig::default();
    let solution = solve_fresh(Position::parse(DEAD_STONE).unwrap(), Color::Black, &config);
    assert!(solution.result.exact);
    assert!(solution.result.contains_pass());
    assert_eq!(solution.score, 9.0 - 6.5);

    let half = SearchConfig {
        komi: 0.5,
        ..SearchConfig::default()
    };
    let solution = solve_fresh(Position::parse(DEAD_STONE).unwrap(), Color::White, &half);
    assert_eq!(solution.score, 8.5);
    assert_eq!(solution.result.value, -9.0);
}

#[test]
fn test_miai_group_is_settled() {
    let solution = solve_fresh(Position::parse(MIAI).unwrap(), Color::White, &SearchConfig::default());
    let pos = Position::parse(MIAI).unwrap();
    assert_eq!(pos.grade(false).undecided.len(), 0);
    assert_eq!(solution.result.moves, vec![Move::Pass]);
    assert_eq!(solution.score, f64::from(pos.score().black) - 6.5);
}

#[test]
fn test_empty_two_by_two() {
    let solution = solve_fresh(Position::new(2, 2).unwrap(), Color::Black, &SearchConfig::default());
    assert_eq!(solution.result.value, 0.0);
    assert!(solution.result.exact);
    assert_eq!(solution.score, -6.5);
    assert!(!solution.result.moves.is_empty());
}

#[test]
fn test_corner_fight_is_solved_for_both_players() {
    let diagram = "..X\n.XO\nXO.";
    for player in [Color::White, Color::Black] {
        let solution = solve_fresh(Position::parse(diagram).unwrap(), player, &SearchConfig::default());
        assert!(solution.result.exact);
        assert!(solution.result.value.is_finite());
        assert_eq!(solution.score, solution.result.value * player.sign() - 6.5);
    }
}

#[test]
fn test_fast_grading_is_unconditional_only() {
    let pos = Position::parse(MIAI).unwrap();
    let before = pos.grade(true);
    let full = pos.grade(false);
    let after = pos.grade(true);
    assert_eq!(before, after);
    assert_eq!(after.undecided.len(), 7);
    assert!(after.territory[0].is_empty());
    assert!(full.undecided.is_empty());
    assert!(!full.territory[0].is_empty());
}

#[test]
fn test_too_complex_is_not_an_error() {
    let mut cache = GradeCache::new();
    let pos = Arc::new(Position::new(5, 5).unwrap());
    let outcome = solve(&pos, Color::Black, &[], &mut cache, &SearchConfig::default());
    assert!(matches!(outcome, SolveOutcome::TooComplex));
}

// =============================================================================
// Session
// =============================================================================

#[test]
fn test_session_game() {
    let mut session = Session::new(3, 5).unwrap();
    session.set_komi(0.5).unwrap();
    session.load(Position::parse(DEAD_STONE).unwrap());
    match session.solve(Color::Black) {
        SolveOutcome::Solved(solution) => assert_eq!(solution.score, 8.5),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(session.pass(), Event::None);
    match session.pass() {
        Event::Finished(report) => assert_eq!(report.gtp(), "B+8.5"),
        other => panic!("unexpected {other:?}"),
    }
}

//! goscore: settle and solve small Go positions.
//!
//! ## Usage
//!
//! - `goscore` - Show a demo
//! - `goscore gtp` - Start a GTP session on stdin/stdout
//! - `goscore demo` - Grade and solve a few sample positions
//! - `goscore bench` - Solve random positions and report timings

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use goscore::cache::GradeCache;
use goscore::constants::{DEFAULT_KOMI, MAX_DEPTH, MAX_UNDECIDED};
use goscore::grid::Color;
use goscore::gtp::GtpEngine;
use goscore::playout::random_position;
use goscore::position::{Position, move_name, vertex_name};
use goscore::search::{SearchConfig, SolveOutcome, solve};
use goscore::session::Session;

/// goscore: territory scoring and exact endgame search for Go
#[derive(Parser)]
#[command(name = "goscore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log search progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Komi given to White
    #[arg(long, global = true, default_value_t = DEFAULT_KOMI, allow_hyphen_values = true)]
    komi: f64,

    /// Most undecided points a position may have to be solved
    #[arg(long, global = true, default_value_t = MAX_UNDECIDED)]
    max_undecided: usize,

    /// Deepest search iteration
    #[arg(long, global = true, default_value_t = MAX_DEPTH)]
    max_depth: u32,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a GTP (Go Text Protocol) session
    Gtp {
        /// Initial board size
        #[arg(long, default_value_t = 9)]
        size: usize,
    },
    /// Grade and solve a few sample positions
    Demo,
    /// Solve random positions and report timings
    Bench {
        #[arg(long, default_value_t = 4)]
        size: usize,
        /// Number of positions to generate
        #[arg(long, default_value_t = 20)]
        positions: usize,
        /// Random plies per position
        #[arg(long, default_value_t = 10)]
        plies: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = SearchConfig {
        max_undecided: cli.max_undecided,
        max_depth: cli.max_depth,
        ..SearchConfig::default()
    };

    match cli.command {
        Some(Commands::Gtp { size }) => {
            let mut session = Session::with_config(size, size, config).context("invalid board size")?;
            session.set_komi(cli.komi).context("invalid komi")?;
            GtpEngine::new(session).run().context("GTP session failed")?;
        }
        Some(Commands::Bench {
            size,
            positions,
            plies,
            seed,
        }) => run_bench(size, positions, plies, seed, cli.komi, config)?,
        Some(Commands::Demo) | None => run_demo(cli.komi, config)?,
    }
    Ok(())
}

fn run_demo(komi: f64, config: SearchConfig) -> Result<()> {
    println!("goscore: territory scoring and exact endgame search\n");

    let samples = [
        ("Dead stone inside an alive group", ".X.X.\nXXXXX\n..O..", Color::Black),
        ("Empty 2x2 board", "..\n..", Color::Black),
        ("Corner fight", "..X\n.XO\nXO.", Color::White),
    ];

    for (title, diagram, player) in samples {
        println!("=== {title} ===");
        let mut session = Session::with_config(1, 1, config.clone())?;
        session.set_komi(komi)?;
        session.load(Position::parse(diagram).context("bad sample diagram")?);
        println!("{}", session.current());

        let grading = session.grade();
        let rows = session.current().grid().rows();
        let undecided: Vec<String> = grading
            .undecided_points(session.current().grid())
            .into_iter()
            .map(|p| vertex_name(p, rows))
            .collect();
        println!("Undecided: {}", if undecided.is_empty() { "none".to_string() } else { undecided.join(" ") });
        println!("Current count: {}", session.score());

        let start = Instant::now();
        match session.solve(player) {
            SolveOutcome::Solved(solution) => {
                let moves: Vec<String> = solution.result.moves.iter().map(|&m| move_name(m, rows)).collect();
                println!(
                    "{player} to play: {} (score {:+}, {} nodes, {:.1?})",
                    moves.join(" "),
                    solution.score,
                    solution.nodes,
                    start.elapsed()
                );
            }
            SolveOutcome::TooComplex => println!("{player} to play: too complex"),
            SolveOutcome::Cancelled => println!("{player} to play: cancelled"),
        }
        println!();
    }
    Ok(())
}

fn run_bench(size: usize, positions: usize, plies: usize, seed: u64, komi: f64, config: SearchConfig) -> Result<()> {
    if positions == 0 {
        bail!("nothing to do: --positions must be at least 1");
    }
    let config = SearchConfig { komi, ..config };
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut cache = GradeCache::new();
    let (mut solved, mut too_complex, mut nodes) = (0usize, 0usize, 0u64);
    let start = Instant::now();

    for i in 0..positions {
        let position = Arc::new(random_position(size, size, plies, &mut rng).context("invalid board size")?);
        let player = if i % 2 == 0 { Color::Black } else { Color::White };
        match solve(&position, player, &[], &mut cache, &config) {
            SolveOutcome::Solved(solution) => {
                solved += 1;
                nodes += solution.nodes;
                info!(i, score = solution.score, nodes = solution.nodes, "bench position solved");
            }
            SolveOutcome::TooComplex | SolveOutcome::Cancelled => too_complex += 1,
        }
    }

    let elapsed = start.elapsed();
    println!("Positions: {positions} ({solved} solved, {too_complex} too complex)");
    println!("Nodes: {nodes}");
    println!("Graded layouts cached: {}", cache.len());
    println!("Time: {elapsed:.2?}");
    Ok(())
}

//! Go Text Protocol (GTP) front end.
//!
//! Implements the GTP version 2 board commands over a [`Session`], plus a
//! few extensions for analysis:
//!
//! - `rectangular_boardsize <rows> <cols>` - Non-square boards
//! - `erase <vertex>` - Remove a stone
//! - `undo` / `redo` - Step through the history
//! - `reset_prisoners` - Zero both prisoner counts
//! - `undecided` - List the points still open after grading
//! - `solve <color>` - Best moves for `color` and the score with komi
//!
//! Standard commands: `name`, `version`, `protocol_version`,
//! `list_commands`, `known_command`, `quit`, `boardsize`, `clear_board`,
//! `komi`, `play`, `showboard`, `final_score`.

use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::grid::Color;
use crate::position::{move_name, parse_vertex, vertex_name};
use crate::search::SolveOutcome;
use crate::session::{Event, Session};

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "erase",
    "final_score",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "rectangular_boardsize",
    "redo",
    "reset_prisoners",
    "showboard",
    "solve",
    "undecided",
    "undo",
    "version",
];

pub struct GtpEngine {
    session: Session,
}

impl GtpEngine {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((first, args)) = parts.split_first() else {
                continue;
            };
            let command = first.to_lowercase();

            let (success, message) = self.execute(&command, args);
            if !success {
                warn!(%command, %message, "command rejected");
            }
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            write!(stdout, "{prefix}{id_str} {message}\n\n")?;
            stdout.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    fn parse_color(arg: &str) -> Option<Color> {
        match arg.to_lowercase().as_str() {
            "b" | "black" => Some(Color::Black),
            "w" | "white" => Some(Color::White),
            _ => None,
        }
    }

    fn parse_size(arg: &str) -> Option<usize> {
        arg.parse::<usize>().ok()
    }

    fn new_board(&mut self, rows: usize, cols: usize) -> (bool, String) {
        match self.session.new_board(rows, cols) {
            Ok(()) => (true, String::new()),
            Err(e) => (false, format!("unacceptable size: {e}")),
        }
    }

    fn vertex(&self, arg: &str) -> Option<(usize, usize)> {
        let grid = self.session.current().grid();
        parse_vertex(arg, grid.rows(), grid.cols())
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(name) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => match args.first().and_then(|a| Self::parse_size(a)) {
                Some(size) => self.new_board(size, size),
                None => (false, "boardsize not an integer".to_string()),
            },

            "rectangular_boardsize" => {
                let rows = args.first().and_then(|a| Self::parse_size(a));
                let cols = args.get(1).and_then(|a| Self::parse_size(a));
                match (rows, cols) {
                    (Some(rows), Some(cols)) => self.new_board(rows, cols),
                    _ => (false, "expected two integers".to_string()),
                }
            }

            "clear_board" => {
                let grid = self.session.current().grid();
                let (rows, cols) = (grid.rows(), grid.cols());
                self.new_board(rows, cols)
            }

            "komi" => match args.first().map(|a| a.parse::<f64>()) {
                Some(Ok(komi)) => match self.session.set_komi(komi) {
                    Ok(()) => (true, String::new()),
                    Err(e) => (false, e.to_string()),
                },
                _ => (false, "komi not a float".to_string()),
            },

            "play" => {
                if args.len() < 2 {
                    return (false, "missing arguments".to_string());
                }
                let Some(color) = Self::parse_color(args[0]) else {
                    return (false, "invalid color".to_string());
                };
                let event = if args[1].eq_ignore_ascii_case("pass") {
                    self.session.pass()
                } else {
                    let Some(p) = self.vertex(args[1]) else {
                        return (false, "invalid vertex".to_string());
                    };
                    match self.session.place(color, p) {
                        Ok(event) => event,
                        Err(e) => return (false, e.to_string()),
                    }
                };
                match event {
                    Event::None => (true, String::new()),
                    Event::Repetition(repetition) => (true, format!("long cycle: {}", repetition.description())),
                    Event::Finished(report) => (true, format!("game end: {report}")),
                }
            }

            "erase" => {
                let Some(p) = args.first().and_then(|a| self.vertex(a)) else {
                    return (false, "invalid vertex".to_string());
                };
                match self.session.erase(p) {
                    Ok(()) => (true, String::new()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "undo" => match self.session.undo() {
                Ok(()) => (true, String::new()),
                Err(e) => (false, format!("cannot undo: {e}")),
            },

            "redo" => match self.session.redo() {
                Ok(()) => (true, String::new()),
                Err(e) => (false, format!("cannot redo: {e}")),
            },

            "reset_prisoners" => {
                self.session.reset_prisoners();
                (true, String::new())
            }

            "showboard" => (true, format!("\n{}", self.session.current())),

            "final_score" => (true, self.session.score().gtp()),

            "undecided" => {
                let grading = self.session.grade();
                let grid = self.session.current().grid();
                let names: Vec<String> = grading
                    .undecided_points(grid)
                    .into_iter()
                    .map(|p| vertex_name(p, grid.rows()))
                    .collect();
                (true, names.join(" "))
            }

            "solve" => {
                let Some(color) = args.first().and_then(|a| Self::parse_color(a)) else {
                    return (false, "invalid color".to_string());
                };
                let rows = self.session.current().grid().rows();
                match self.session.solve(color) {
                    SolveOutcome::Solved(solution) => {
                        let mut words: Vec<String> = solution
                            .result
                            .moves
                            .iter()
                            .map(|&m| move_name(m, rows))
                            .collect();
                        words.push(format!("{:+}", solution.score));
                        if !solution.result.exact {
                            words.push("heuristic".to_string());
                        }
                        (true, words.join(" "))
                    }
                    SolveOutcome::TooComplex => (false, "too complex".to_string()),
                    SolveOutcome::Cancelled => (false, "cancelled".to_string()),
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

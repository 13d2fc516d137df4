//! CLI entry point for the puzzle core.
//!
//! Usage:
//!   pour-core generate --tier <tier> --seed <n> [--start <n>] [--count <n>]
//!   pour-core solve <level.json> [options]
//!   pour-core solve --stdin [options]
//!   pour-core hint <level.json> | --stdin [options]
//!   pour-core validate <level.json> | --stdin [--tier <tier>]
//!
//! Inputs may be a full level record or a bare puzzle state; outputs are
//! JSON on stdout, diagnostics on stderr. Exit code 1 means "not found" or
//! "rejected" so the commands compose in scripts.

mod error;
mod generator;
mod heuristics;
mod level;
mod rules;
mod solver;
mod state;
mod validator;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use generator::Tier;
use level::{generate_level, Level, PipelineConfig};
use solver::{hint, solve, HintResult, SolutionResult, SolverConfig};
use state::{Move, PuzzleState};
use validator::{validate, ValidatorConfig};

#[derive(Parser)]
#[command(name = "pour-core")]
#[command(about = "Solver and level generator for a color-sorting puzzle")]
#[command(version)]
struct Cli {
    /// Enable debug-level diagnostics on stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate validated levels as a JSON array
    Generate {
        /// Difficulty tier
        #[arg(long, value_enum)]
        tier: Tier,

        /// Base seed shared by the whole batch
        #[arg(long, default_value = "0")]
        seed: u64,

        /// First level number
        #[arg(long, default_value = "1")]
        start: u32,

        /// How many levels to generate
        #[arg(long, default_value = "1")]
        count: u32,
    },

    /// Find a shortest solution for a level or state
    Solve {
        /// Path to level/state JSON (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read JSON from stdin instead of a file
        #[arg(long)]
        stdin: bool,

        /// Maximum solution length
        #[arg(long, default_value = "50")]
        max_depth: usize,

        /// Maximum states expanded
        #[arg(long, default_value = "5000")]
        max_states: usize,
    },

    /// Suggest the next move for a level or state
    Hint {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        #[arg(long)]
        stdin: bool,

        #[arg(long, default_value = "50")]
        max_depth: usize,

        #[arg(long, default_value = "5000")]
        max_states: usize,
    },

    /// Check solvability and compute scoring metadata
    Validate {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        #[arg(long)]
        stdin: bool,

        /// Tier whose scoring policy to apply (defaults are tier-neutral)
        #[arg(long, value_enum)]
        tier: Option<Tier>,
    },
}

/// JSON shape of a solve result.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<Vec<Move>>,
    optimal_moves: usize,
    search_exhausted: bool,
    states_explored: usize,
    search_time_ms: u64,
}

/// JSON shape of a hint result.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HintOutput {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_move: Option<Move>,
    search_exhausted: bool,
    states_explored: usize,
    search_time_ms: u64,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(io::stderr)
        .init();
}

/// Read the input JSON from a file or stdin.
fn read_input(file: Option<PathBuf>, use_stdin: bool) -> String {
    if use_stdin {
        let mut buffer = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buffer) {
            eprintln!("Error reading stdin: {}", e);
            std::process::exit(1);
        }
        buffer
    } else if let Some(path) = file {
        match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file {:?}: {}", path, e);
                std::process::exit(1);
            }
        }
    } else {
        eprintln!("Error: provide a file path or --stdin");
        std::process::exit(1);
    }
}

/// Accept either a full level record or a bare puzzle state.
fn parse_state(json: &str) -> PuzzleState {
    if let Ok(level) = serde_json::from_str::<Level>(json) {
        return level.initial;
    }
    match serde_json::from_str::<PuzzleState>(json) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Error parsing puzzle JSON: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}

fn solve_output(result: &SolutionResult) -> SolveOutput {
    SolveOutput {
        found: result.found,
        path: if result.found {
            Some(result.path.clone())
        } else {
            None
        },
        optimal_moves: result.path.len(),
        search_exhausted: result.search_exhausted,
        states_explored: result.states_explored,
        search_time_ms: result.search_time_ms,
    }
}

fn hint_output(result: &HintResult) -> HintOutput {
    HintOutput {
        found: result.found,
        next_move: result.next_move,
        search_exhausted: result.search_exhausted,
        states_explored: result.states_explored,
        search_time_ms: result.search_time_ms,
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            tier,
            seed,
            start,
            count,
        } => {
            let config = PipelineConfig::for_tier(tier);
            let mut levels: Vec<Level> = Vec::with_capacity(count as usize);
            for number in start..start.saturating_add(count) {
                match generate_level(tier, number, seed, &config) {
                    Ok(level) => levels.push(level),
                    Err(e) => {
                        eprintln!("Error generating level {}: {}", number, e);
                        std::process::exit(1);
                    }
                }
            }
            print_json(&levels);
        }

        Commands::Solve {
            file,
            stdin,
            max_depth,
            max_states,
        } => {
            let state = parse_state(&read_input(file, stdin));
            let config = SolverConfig {
                max_depth,
                max_states,
            };
            let result = solve(&state, &config);
            print_json(&solve_output(&result));
            if !result.found {
                std::process::exit(1);
            }
        }

        Commands::Hint {
            file,
            stdin,
            max_depth,
            max_states,
        } => {
            let state = parse_state(&read_input(file, stdin));
            let config = SolverConfig {
                max_depth,
                max_states,
            };
            let result = hint(&state, &config);
            print_json(&hint_output(&result));
            if !result.found {
                std::process::exit(1);
            }
        }

        Commands::Validate { file, stdin, tier } => {
            let state = parse_state(&read_input(file, stdin));
            let config = match tier {
                Some(tier) => ValidatorConfig::for_tier(tier),
                None => ValidatorConfig::default(),
            };
            match validate(&state, &config) {
                Ok(report) => print_json(&report),
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

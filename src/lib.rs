//! Logic core of a color-sorting puzzle.
//!
//! This crate owns the immutable state model and move rules, a breadth-first
//! solver for optimal solutions and single-step hints, and a deterministic
//! generator/validator pipeline that manufactures guaranteed-solvable levels.
//! Rendering, input, and persistence live in the host application; it calls
//! in through the re-exports below and treats every returned value as
//! immutable data.

pub mod error;
pub mod generator;
pub mod heuristics;
pub mod level;
pub mod rules;
pub mod solver;
pub mod state;
pub mod validator;

// Re-export main types
pub use error::{LevelError, RejectReason, StateError};
pub use generator::{generate, Tier, TierParams};
pub use heuristics::{estimate_difficulty, quick_check, DifficultyEstimate};
pub use level::{generate_level, Level, PipelineConfig};
pub use rules::{apply_move, can_move, is_solved, legal_moves, pour_quantity, undo};
pub use solver::{hint, solve, HintResult, SolutionResult, SolverConfig};
pub use state::{ColorToken, Move, PuzzleState, Vessel, VesselId};
pub use validator::{validate, ScoringPolicy, ValidationReport, ValidatorConfig};

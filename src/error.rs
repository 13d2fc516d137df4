//! Error taxonomy for the puzzle core.
//!
//! Every condition here is local and recoverable: a failed move or a rejected
//! level surfaces as a typed error value, never as a panic. Exceeding solver
//! bounds is deliberately *not* an error; it is reported through the result
//! flags in [`crate::solver`].

use std::fmt;

use thiserror::Error;

use crate::state::VesselId;

/// Failures of state-level operations (moves, undo, vessel construction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    /// The requested transfer violates the move rules.
    #[error("illegal move from vessel {from} to vessel {to}")]
    IllegalMove { from: VesselId, to: VesselId },

    /// Undo was requested on a state with an empty history.
    #[error("nothing to undo")]
    NothingToUndo,

    /// A vessel operation was called with a malformed count or capacity.
    #[error("invalid count: requested {requested}, available {available}")]
    InvalidCount { requested: usize, available: usize },

    /// A move referenced a vessel id not present in the state.
    #[error("unknown vessel id {id}")]
    UnknownVessel { id: VesselId },

    /// A state was constructed with two vessels sharing an id.
    #[error("duplicate vessel id {id}")]
    DuplicateVesselId { id: VesselId },
}

/// Why the validator refused a candidate level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The solver hit its depth or state bounds before finding a solution.
    NotSolvableWithinBounds,
    /// The solver exhausted the reachable state space without a solution.
    ProvablyUnsolvable,
    /// The candidate failed structural screening before any search ran.
    FailedQuickCheck,
    /// The scramble produced a trivial or stalled state.
    Degenerate,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::NotSolvableWithinBounds => "not solvable within bounds",
            RejectReason::ProvablyUnsolvable => "provably unsolvable",
            RejectReason::FailedQuickCheck => "failed quick check",
            RejectReason::Degenerate => "degenerate scramble",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures of the generator/validator pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LevelError {
    /// No accepted level could be produced within the retry budget.
    #[error("generation failed after {attempts} candidate attempts")]
    GenerationFailed { attempts: usize },

    /// The validator refused the candidate.
    #[error("level rejected: {reason}")]
    Rejected { reason: RejectReason },

    /// An internal state operation failed while assembling a candidate.
    #[error(transparent)]
    State(#[from] StateError),
}

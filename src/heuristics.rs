//! Cheap screening ahead of the full solver.
//!
//! Bulk generation runs hundreds of candidates; these checks reject the
//! obviously broken or trivial ones before any real search is spent on them.

use std::collections::HashMap;

use crate::rules::{is_solved, legal_moves};
use crate::solver::{solve, SolverConfig};
use crate::state::{ColorToken, PuzzleState};

/// Bounds for the shallow probe used by [`estimate_difficulty`].
const PROBE_DEPTH: usize = 6;
const PROBE_STATES: usize = 250;

/// Structural screening: is this state worth a full solve?
///
/// Rejects states that are already solved, have no legal move, or whose
/// color distribution cannot resolve at all. With uniform capacities every
/// color's unit count must be a whole number of vessels, since a resolved
/// vessel is full of one color.
pub fn quick_check(state: &PuzzleState) -> bool {
    if state.vessels().is_empty() || is_solved(state) {
        return false;
    }
    if legal_moves(state).is_empty() {
        return false;
    }

    let capacities: Vec<usize> = state.vessels().iter().map(|v| v.capacity()).collect();
    let uniform = capacities.windows(2).all(|w| w[0] == w[1]);
    if uniform {
        let capacity = capacities[0];
        let mut counts: HashMap<ColorToken, usize> = HashMap::new();
        for vessel in state.vessels() {
            for &token in vessel.units() {
                *counts.entry(token).or_insert(0) += 1;
            }
        }
        if counts.values().any(|&count| count % capacity != 0) {
            return false;
        }
    }
    true
}

/// Rough difficulty signals for a candidate level.
#[derive(Debug, Clone)]
pub struct DifficultyEstimate {
    pub vessel_count: usize,
    pub color_count: usize,
    /// Number of legal moves available from the initial position.
    pub branching: usize,
    /// Aggregate difficulty score; higher means harder.
    pub score: f64,
}

/// Estimate difficulty from structure plus a shallow bounded probe.
///
/// The probe is a small-bounds [`solve`]: when it already finds a solution
/// the level is easy regardless of its size, otherwise the states it burned
/// through indicate how wide the position is.
pub fn estimate_difficulty(state: &PuzzleState) -> DifficultyEstimate {
    let vessel_count = state.vessels().len();
    let mut colors: Vec<ColorToken> = state
        .vessels()
        .iter()
        .flat_map(|v| v.units().iter().copied())
        .collect();
    colors.sort_unstable();
    colors.dedup();
    let color_count = colors.len();
    let branching = legal_moves(state).len();

    let probe = solve(
        state,
        &SolverConfig {
            max_depth: PROBE_DEPTH,
            max_states: PROBE_STATES,
        },
    );
    let probe_score = if probe.found {
        probe.path.len() as f64
    } else {
        PROBE_DEPTH as f64 + (probe.states_explored as f64).sqrt()
    };

    let score = color_count as f64 * 2.0 + vessel_count as f64 + branching as f64 * 0.5 + probe_score;

    DifficultyEstimate {
        vessel_count,
        color_count,
        branching,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::apply_move;
    use crate::state::ColorToken::{Blue, Green, Red};
    use crate::state::{Vessel, VesselId};

    fn vessel(id: VesselId, units: &[ColorToken], capacity: usize) -> Vessel {
        Vessel::with_units(id, units, capacity).unwrap()
    }

    fn state(vessels: Vec<Vessel>) -> PuzzleState {
        PuzzleState::from_vessels(vessels).unwrap()
    }

    #[test]
    fn test_quick_check_accepts_playable_state() {
        let s = state(vec![
            vessel(0, &[Red, Blue], 2),
            vessel(1, &[Blue, Red], 2),
            Vessel::empty(2, 2).unwrap(),
        ]);
        assert!(quick_check(&s));
    }

    #[test]
    fn test_quick_check_rejects_solved() {
        let s = state(vec![vessel(0, &[Red, Red], 2), Vessel::empty(1, 2).unwrap()]);
        let solved = apply_move(&s, 0, 1).unwrap();
        assert!(!quick_check(&solved));
    }

    #[test]
    fn test_quick_check_rejects_deadlock() {
        let s = state(vec![
            vessel(0, &[Red, Blue], 2),
            vessel(1, &[Blue, Red], 2),
        ]);
        assert!(!quick_check(&s));
    }

    #[test]
    fn test_quick_check_rejects_bad_color_distribution() {
        // Three reds cannot resolve into capacity-2 vessels.
        let s = state(vec![
            vessel(0, &[Red, Red], 2),
            vessel(1, &[Red, Blue], 2),
            Vessel::empty(2, 2).unwrap(),
        ]);
        assert!(!quick_check(&s));
    }

    #[test]
    fn test_estimate_difficulty_fields() {
        let s = state(vec![
            vessel(0, &[Red, Blue], 2),
            vessel(1, &[Blue, Red], 2),
            Vessel::empty(2, 2).unwrap(),
        ]);
        let estimate = estimate_difficulty(&s);
        assert_eq!(estimate.vessel_count, 3);
        assert_eq!(estimate.color_count, 2);
        assert_eq!(estimate.branching, legal_moves(&s).len());
        assert!(estimate.score > 0.0);
    }

    #[test]
    fn test_estimate_orders_small_before_large() {
        let small = state(vec![
            vessel(0, &[Red, Blue], 2),
            vessel(1, &[Blue, Red], 2),
            Vessel::empty(2, 2).unwrap(),
        ]);
        let large = state(vec![
            vessel(0, &[Red, Blue, Green, Red], 4),
            vessel(1, &[Green, Red, Blue, Green], 4),
            vessel(2, &[Blue, Green, Red, Blue], 4),
            Vessel::empty(3, 4).unwrap(),
            Vessel::empty(4, 4).unwrap(),
        ]);
        assert!(estimate_difficulty(&small).score < estimate_difficulty(&large).score);
    }
}

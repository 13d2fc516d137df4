//! Breadth-first solver over the puzzle's state graph.
//!
//! Nodes are canonicalized states, edges are single legal pours. BFS is used
//! because the first solved state dequeued is guaranteed to sit at minimum
//! depth; there is no heuristic ordering and no pruning beyond the visited
//! set and the configured bounds. A search that runs out of bounds is
//! reported as "not found within bounds", which is distinct from a search
//! that drains the frontier and thereby proves unsolvability.

use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use tracing::debug;

use crate::rules::{apply_move, is_solved, legal_moves};
use crate::state::{Move, PuzzleState};

/// Search bounds for the solver.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Maximum solution length considered.
    pub max_depth: usize,
    /// Maximum number of states expanded before giving up.
    pub max_states: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 50,
            max_states: 5000,
        }
    }
}

/// Result of a full solve.
#[derive(Debug, Clone)]
pub struct SolutionResult {
    /// Whether a solution was found.
    pub found: bool,
    /// Shortest move sequence to a solved state (empty when not found, or
    /// when the input was already solved).
    pub path: Vec<Move>,
    /// Whether the reachable state space was fully drained. `true` with
    /// `found == false` means the puzzle is provably unsolvable; `false`
    /// means the search stopped at its bounds.
    pub search_exhausted: bool,
    /// Number of states expanded.
    pub states_explored: usize,
    /// Wall-clock search time in milliseconds.
    pub search_time_ms: u64,
}

/// Result of a hint request: the first move of a shortest solution.
#[derive(Debug, Clone)]
pub struct HintResult {
    pub found: bool,
    pub next_move: Option<Move>,
    pub search_exhausted: bool,
    pub states_explored: usize,
    pub search_time_ms: u64,
}

/// Find a shortest solution from `state`, within `config`'s bounds.
pub fn solve(state: &PuzzleState, config: &SolverConfig) -> SolutionResult {
    let start_time = Instant::now();
    let base_len = state.history().len();

    if is_solved(state) {
        return SolutionResult {
            found: true,
            path: Vec::new(),
            search_exhausted: false,
            states_explored: 0,
            search_time_ms: start_time.elapsed().as_millis() as u64,
        };
    }

    let mut visited: HashSet<Vec<u8>> = HashSet::new();
    visited.insert(state.canonical_key());

    // FIFO frontier of (state, depth); depth is the path length from the root.
    let mut frontier: VecDeque<(PuzzleState, usize)> = VecDeque::new();
    frontier.push_back((state.clone(), 0));

    let mut states_explored: usize = 0;
    let mut truncated = false;

    while let Some((current, depth)) = frontier.pop_front() {
        if states_explored >= config.max_states {
            truncated = true;
            break;
        }
        states_explored += 1;

        if depth >= config.max_depth {
            truncated = true;
            continue;
        }

        for (from_id, to_id) in legal_moves(&current) {
            let next = match apply_move(&current, from_id, to_id) {
                Ok(next) => next,
                Err(_) => continue,
            };
            if !visited.insert(next.canonical_key()) {
                continue;
            }
            if is_solved(&next) {
                let path = next.history()[base_len..].to_vec();
                let search_time_ms = start_time.elapsed().as_millis() as u64;
                debug!(
                    depth = path.len(),
                    states_explored, search_time_ms, "solution found"
                );
                return SolutionResult {
                    found: true,
                    path,
                    search_exhausted: false,
                    states_explored,
                    search_time_ms,
                };
            }
            if depth + 1 >= config.max_depth {
                truncated = true;
                continue;
            }
            frontier.push_back((next, depth + 1));
        }
    }

    let search_exhausted = !truncated && frontier.is_empty();
    let search_time_ms = start_time.elapsed().as_millis() as u64;
    debug!(
        states_explored,
        search_exhausted, search_time_ms, "search ended without solution"
    );
    SolutionResult {
        found: false,
        path: Vec::new(),
        search_exhausted,
        states_explored,
        search_time_ms,
    }
}

/// Suggest the next move: the first step of a shortest solution.
///
/// This reuses the full solve rather than a separate algorithm, so a hint is
/// always consistent with an optimal line of play.
pub fn hint(state: &PuzzleState, config: &SolverConfig) -> HintResult {
    let result = solve(state, config);
    HintResult {
        found: result.found,
        next_move: result.path.first().copied(),
        search_exhausted: result.search_exhausted,
        states_explored: result.states_explored,
        search_time_ms: result.search_time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ColorToken::{Blue, Red};
    use crate::state::{ColorToken, Vessel, VesselId};

    fn vessel(id: VesselId, units: &[ColorToken], capacity: usize) -> Vessel {
        Vessel::with_units(id, units, capacity).unwrap()
    }

    fn state(vessels: Vec<Vessel>) -> PuzzleState {
        PuzzleState::from_vessels(vessels).unwrap()
    }

    /// Exhaustive graph distance to a solved state, for optimality checks on
    /// tiny puzzles.
    fn true_distance(state: &PuzzleState, limit: usize) -> Option<usize> {
        let mut visited = HashSet::new();
        visited.insert(state.canonical_key());
        let mut frontier = VecDeque::new();
        frontier.push_back((state.clone(), 0));
        while let Some((current, depth)) = frontier.pop_front() {
            if is_solved(&current) {
                return Some(depth);
            }
            if depth >= limit {
                continue;
            }
            for (from, to) in legal_moves(&current) {
                let next = apply_move(&current, from, to).unwrap();
                if visited.insert(next.canonical_key()) {
                    frontier.push_back((next, depth + 1));
                }
            }
        }
        None
    }

    #[test]
    fn test_single_pour_puzzle() {
        let s = state(vec![vessel(0, &[Red, Red], 2), Vessel::empty(1, 2).unwrap()]);
        let result = solve(&s, &SolverConfig::default());
        assert!(result.found);
        assert_eq!(result.path.len(), 1);
        assert_eq!(result.path[0].from, 0);
        assert_eq!(result.path[0].to, 1);
        assert_eq!(result.path[0].count, 2);
    }

    #[test]
    fn test_three_vessel_minimal_case() {
        // [A:[red,blue], B:[blue,red], C:[]], capacity 2. The shortest line
        // is blue A->C, red B->A, blue B->C.
        let s = state(vec![
            vessel(0, &[Red, Blue], 2),
            vessel(1, &[Blue, Red], 2),
            Vessel::empty(2, 2).unwrap(),
        ]);
        let result = solve(&s, &SolverConfig::default());
        assert!(result.found);
        assert_eq!(result.path.len(), 3);
        assert_eq!(result.path.len(), true_distance(&s, 20).unwrap());

        // Replaying the path reaches a solved state.
        let mut current = s.clone();
        for mv in &result.path {
            current = apply_move(&current, mv.from, mv.to).unwrap();
        }
        assert!(is_solved(&current));
    }

    #[test]
    fn test_bfs_matches_exhaustive_distance() {
        let puzzles = vec![
            state(vec![
                vessel(0, &[Red, Blue, Blue], 3),
                vessel(1, &[Blue, Red, Red], 3),
                Vessel::empty(2, 3).unwrap(),
            ]),
            state(vec![
                vessel(0, &[Red, Blue, Red], 3),
                vessel(1, &[Blue, Red, Blue], 3),
                Vessel::empty(2, 3).unwrap(),
            ]),
            state(vec![
                vessel(0, &[Red, Red], 2),
                vessel(1, &[Blue, Blue], 2),
                Vessel::empty(2, 2).unwrap(),
            ]),
        ];
        for s in puzzles {
            let result = solve(&s, &SolverConfig::default());
            assert!(result.found);
            assert_eq!(result.path.len(), true_distance(&s, 30).unwrap());
        }
    }

    #[test]
    fn test_deadlocked_start() {
        // Both vessels full and mixed: no legal move exists and the puzzle
        // is provably unsolvable.
        let s = state(vec![
            vessel(0, &[Red, Blue], 2),
            vessel(1, &[Blue, Red], 2),
        ]);
        let result = solve(&s, &SolverConfig::default());
        assert!(!result.found);
        assert_eq!(result.states_explored, 1);
        assert!(result.search_exhausted);
        assert!(result.path.is_empty());
    }

    #[test]
    fn test_bounds_are_not_unsolvability() {
        let s = state(vec![
            vessel(0, &[Red, Blue], 2),
            vessel(1, &[Blue, Red], 2),
            Vessel::empty(2, 2).unwrap(),
        ]);
        // Solvable, but the state budget is too small to find out.
        let result = solve(
            &s,
            &SolverConfig {
                max_depth: 50,
                max_states: 1,
            },
        );
        assert!(!result.found);
        assert!(!result.search_exhausted);

        // Depth budget too small for any pour.
        let result = solve(
            &s,
            &SolverConfig {
                max_depth: 0,
                max_states: 5000,
            },
        );
        assert!(!result.found);
        assert!(!result.search_exhausted);
    }

    #[test]
    fn test_already_solved_state() {
        let s = state(vec![vessel(0, &[Red, Red], 2), Vessel::empty(1, 2).unwrap()]);
        let done = apply_move(&s, 0, 1).unwrap();
        assert!(is_solved(&done));

        let result = solve(&done, &SolverConfig::default());
        assert!(result.found);
        assert!(result.path.is_empty());
        assert_eq!(result.states_explored, 0);
    }

    #[test]
    fn test_path_excludes_prior_history() {
        // Solving from a mid-game state must not replay the moves that led
        // there.
        let s = state(vec![
            vessel(0, &[Blue, Red], 2),
            vessel(1, &[Red], 2),
            vessel(2, &[Blue], 2),
        ]);
        let mid = apply_move(&s, 0, 1).unwrap();
        let result = solve(&mid, &SolverConfig::default());
        assert!(result.found);
        assert!(!result.path.is_empty());

        let mut current = mid.clone();
        for mv in &result.path {
            current = apply_move(&current, mv.from, mv.to).unwrap();
        }
        assert!(is_solved(&current));
        assert_eq!(
            current.history().len(),
            mid.history().len() + result.path.len()
        );
    }

    #[test]
    fn test_hint_is_first_move_of_solution() {
        let s = state(vec![
            vessel(0, &[Red, Blue], 2),
            vessel(1, &[Blue, Red], 2),
            Vessel::empty(2, 2).unwrap(),
        ]);
        let solution = solve(&s, &SolverConfig::default());
        let suggestion = hint(&s, &SolverConfig::default());
        assert!(suggestion.found);
        assert_eq!(suggestion.next_move, solution.path.first().copied());

        // A hint on an unsolvable state reports no move without failing.
        let dead = state(vec![
            vessel(0, &[Red, Blue], 2),
            vessel(1, &[Blue, Red], 2),
        ]);
        let suggestion = hint(&dead, &SolverConfig::default());
        assert!(!suggestion.found);
        assert_eq!(suggestion.next_move, None);
    }
}

//! Level acceptance and scoring metadata.
//!
//! The validator is the gatekeeper between the generator and the host: a
//! candidate is accepted only when a full solve proves it solvable within
//! bounds, and the solve's optimal move count seeds the level's budget and
//! star thresholds. All ratios live in [`ScoringPolicy`]; they are product
//! calibration, not algorithm.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LevelError, RejectReason};
use crate::generator::Tier;
use crate::solver::{solve, SolverConfig};
use crate::state::PuzzleState;

/// Tunable ratios applied to the optimal move count.
#[derive(Debug, Clone)]
pub struct ScoringPolicy {
    /// Budget = optimal count times this, rounded up.
    pub budget_multiplier: f64,
    /// Ascending multipliers for the 3/2/1-star ceilings.
    pub star_multipliers: [f64; 3],
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            budget_multiplier: 1.5,
            star_multipliers: [1.0, 1.2, 1.4],
        }
    }
}

impl ScoringPolicy {
    /// Per-tier defaults: generous budgets for easy play, tight for expert.
    pub fn for_tier(tier: Tier) -> ScoringPolicy {
        let budget_multiplier = match tier {
            Tier::Easy => 2.0,
            Tier::Medium => 1.75,
            Tier::Hard => 1.5,
            Tier::Expert => 1.25,
        };
        ScoringPolicy {
            budget_multiplier,
            ..ScoringPolicy::default()
        }
    }
}

/// Solver bounds plus scoring ratios for one validation run.
#[derive(Debug, Clone, Default)]
pub struct ValidatorConfig {
    pub solver: SolverConfig,
    pub policy: ScoringPolicy,
}

impl ValidatorConfig {
    pub fn for_tier(tier: Tier) -> ValidatorConfig {
        ValidatorConfig {
            solver: SolverConfig::default(),
            policy: ScoringPolicy::for_tier(tier),
        }
    }
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub solvable: bool,
    /// Length of a shortest solution.
    pub optimal_moves: usize,
    /// Move allowance granted to the player.
    pub move_budget: usize,
    /// Ascending ceilings for 3, 2, and 1 stars.
    pub star_thresholds: [usize; 3],
    pub states_explored: usize,
    pub search_time_ms: u64,
}

fn scaled(optimal: usize, multiplier: f64) -> usize {
    (optimal as f64 * multiplier).ceil() as usize
}

/// Verify `state` is solvable within bounds and derive its scoring metadata.
///
/// Rejections distinguish a search that proved unsolvability from one that
/// merely ran out of bounds; the latter may still be solvable under a larger
/// budget.
pub fn validate(
    state: &PuzzleState,
    config: &ValidatorConfig,
) -> Result<ValidationReport, LevelError> {
    let result = solve(state, &config.solver);
    if !result.found {
        let reason = if result.search_exhausted {
            RejectReason::ProvablyUnsolvable
        } else {
            RejectReason::NotSolvableWithinBounds
        };
        debug!(
            states_explored = result.states_explored,
            reason = reason.as_str(),
            "candidate rejected"
        );
        return Err(LevelError::Rejected { reason });
    }

    let optimal = result.path.len();
    let [three, two, one] = config.policy.star_multipliers;
    let three_star = scaled(optimal, three);
    let two_star = scaled(optimal, two).max(three_star + 1);
    let one_star = scaled(optimal, one).max(two_star + 1);
    let move_budget = scaled(optimal, config.policy.budget_multiplier).max(optimal);

    Ok(ValidationReport {
        solvable: true,
        optimal_moves: optimal,
        move_budget,
        star_thresholds: [three_star, two_star, one_star],
        states_explored: result.states_explored,
        search_time_ms: result.search_time_ms,
    })
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

    fn three_vessel_case() -> PuzzleState {
        state(vec![
            vessel(0, &[Red, Blue], 2),
            vessel(1, &[Blue, Red], 2),
            Vessel::empty(2, 2).unwrap(),
        ])
    }

    #[test]
    fn test_validate_accepts_solvable() {
        let report = validate(&three_vessel_case(), &ValidatorConfig::default()).unwrap();
        assert!(report.solvable);
        assert_eq!(report.optimal_moves, 3);
        assert!(report.move_budget >= report.optimal_moves);
        let [three, two, one] = report.star_thresholds;
        assert!(three >= report.optimal_moves);
        assert!(three < two && two < one);
    }

    #[test]
    fn test_validate_rejects_unsolvable() {
        let dead = state(vec![
            vessel(0, &[Red, Blue], 2),
            vessel(1, &[Blue, Red], 2),
        ]);
        let err = validate(&dead, &ValidatorConfig::default()).unwrap_err();
        assert_eq!(
            err,
            LevelError::Rejected {
                reason: RejectReason::ProvablyUnsolvable,
            }
        );
    }

    #[test]
    fn test_validate_distinguishes_bounds_from_unsolvable() {
        let config = ValidatorConfig {
            solver: SolverConfig {
                max_depth: 50,
                max_states: 1,
            },
            policy: ScoringPolicy::default(),
        };
        let err = validate(&three_vessel_case(), &config).unwrap_err();
        assert_eq!(
            err,
            LevelError::Rejected {
                reason: RejectReason::NotSolvableWithinBounds,
            }
        );
    }

    #[test]
    fn test_policy_budgets_by_tier() {
        let easy = ScoringPolicy::for_tier(Tier::Easy);
        let expert = ScoringPolicy::for_tier(Tier::Expert);
        assert!(easy.budget_multiplier > expert.budget_multiplier);
    }

    #[test]
    fn test_thresholds_strictly_ascend_for_tiny_optimum() {
        // With optimal == 1 every multiplier rounds to 1; the ceilings must
        // still ascend.
        let s = state(vec![vessel(0, &[Red, Red], 2), Vessel::empty(1, 2).unwrap()]);
        let report = validate(&s, &ValidatorConfig::default()).unwrap();
        assert_eq!(report.optimal_moves, 1);
        let [three, two, one] = report.star_thresholds;
        assert!(three < two && two < one);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = validate(&three_vessel_case(), &ValidatorConfig::default()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("optimalMoves"));
        assert!(json.contains("starThresholds"));
        assert!(json.contains("moveBudget"));
    }
}

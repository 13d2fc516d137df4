//! Level records and the generate-screen-validate pipeline.
//!
//! A [`Level`] is the static artifact handed to the host application: the
//! initial state plus everything the UI needs to grade a play-through. The
//! pipeline retries deterministically: each candidate folds its attempt
//! index into the RNG derivation, so a rejected scramble is replaced by the
//! same next candidate on every run.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LevelError, RejectReason};
use crate::generator::{generate_candidate, Tier};
use crate::heuristics::quick_check;
use crate::solver::SolverConfig;
use crate::state::PuzzleState;
use crate::validator::{validate, ValidatorConfig};

/// A generated, validated, immutable level.
///
/// The JSON form preserves vessel order, token order, and capacities
/// exactly; hosts may persist it as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub number: u32,
    pub tier: Tier,
    pub seed: u64,
    pub vessel_count: usize,
    pub color_count: usize,
    pub optimal_moves: usize,
    pub move_budget: usize,
    pub star_thresholds: [usize; 3],
    pub initial: PuzzleState,
}

/// Knobs for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Candidates tried before the pipeline reports failure.
    pub max_candidates: usize,
    pub validator: ValidatorConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_candidates: 16,
            validator: ValidatorConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Tier defaults: harder tiers search wider, so their validation gets a
    /// larger state budget while the depth cap stays put.
    pub fn for_tier(tier: Tier) -> PipelineConfig {
        let max_states = match tier {
            Tier::Easy => 20_000,
            Tier::Medium => 50_000,
            Tier::Hard => 120_000,
            Tier::Expert => 250_000,
        };
        let mut validator = ValidatorConfig::for_tier(tier);
        validator.solver = SolverConfig {
            max_states,
            ..SolverConfig::default()
        };
        PipelineConfig {
            max_candidates: 16,
            validator,
        }
    }
}

/// Produce an accepted [`Level`] for `(tier, level_number, seed)`.
///
/// Candidates flow generate -> quick_check -> validate; the first accepted
/// one becomes the level. Determinism carries through rejections because the
/// attempt index is part of each candidate's seed derivation.
pub fn generate_level(
    tier: Tier,
    level_number: u32,
    seed: u64,
    config: &PipelineConfig,
) -> Result<Level, LevelError> {
    for attempt in 0..config.max_candidates {
        let state = match generate_candidate(tier, level_number, seed, attempt as u64) {
            Ok(state) => state,
            Err(LevelError::GenerationFailed { .. }) => continue,
            Err(err) => return Err(err),
        };
        if !quick_check(&state) {
            debug!(
                ?tier,
                level_number,
                attempt,
                reason = RejectReason::FailedQuickCheck.as_str(),
                "candidate discarded"
            );
            continue;
        }
        match validate(&state, &config.validator) {
            Ok(report) => {
                let params = tier.params();
                debug!(
                    ?tier,
                    level_number,
                    attempt,
                    optimal_moves = report.optimal_moves,
                    "level accepted"
                );
                return Ok(Level {
                    number: level_number,
                    tier,
                    seed,
                    vessel_count: state.vessels().len(),
                    color_count: params.colors,
                    optimal_moves: report.optimal_moves,
                    move_budget: report.move_budget,
                    star_thresholds: report.star_thresholds,
                    initial: state,
                });
            }
            Err(LevelError::Rejected { reason }) => {
                debug!(
                    ?tier,
                    level_number,
                    attempt,
                    reason = reason.as_str(),
                    "candidate discarded"
                );
                continue;
            }
            Err(err) => return Err(err),
        }
    }
    Err(LevelError::GenerationFailed {
        attempts: config.max_candidates,
    })
}

//! Deterministic level generation by reverse scrambling.
//!
//! A level starts life as a solved state (one full vessel per color plus the
//! tier's empty vessels) and is walked backward through the move graph:
//! every scramble step is the reverse of a forward move that remains legal,
//! and transfers exactly the reversed count, in the scrambled state. Undoing
//! the scramble in order is therefore a legal forward solution, so every
//! emitted state is solvable by construction.
//!
//! The only randomness is a `SmallRng` seeded from `(seed, tier,
//! level_number)`; identical inputs yield identical levels on every run.

use clap::ValueEnum;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LevelError, StateError};
use crate::state::{ColorToken, Move, PuzzleState, Vessel, VesselId};

/// Scramble attempts per candidate before generation gives up.
const MAX_SCRAMBLE_RETRIES: usize = 8;

/// Difficulty bucket controlling generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Easy,
    Medium,
    Hard,
    Expert,
}

/// Structural parameters for one tier.
#[derive(Debug, Clone, Copy)]
pub struct TierParams {
    /// Number of distinct colors, each filling exactly one vessel.
    pub colors: usize,
    /// Uniform vessel capacity.
    pub capacity: usize,
    /// Empty vessels added beyond the color vessels.
    pub extra_vessels: usize,
    /// Reverse moves applied to the solved state.
    pub scramble_moves: usize,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Easy, Tier::Medium, Tier::Hard, Tier::Expert];

    /// The generation parameter table. Tunable data, one row per tier.
    pub fn params(self) -> TierParams {
        match self {
            Tier::Easy => TierParams {
                colors: 3,
                capacity: 4,
                extra_vessels: 2,
                scramble_moves: 8,
            },
            Tier::Medium => TierParams {
                colors: 4,
                capacity: 4,
                extra_vessels: 2,
                scramble_moves: 14,
            },
            Tier::Hard => TierParams {
                colors: 5,
                capacity: 4,
                extra_vessels: 2,
                scramble_moves: 22,
            },
            Tier::Expert => TierParams {
                colors: 6,
                capacity: 4,
                extra_vessels: 2,
                scramble_moves: 26,
            },
        }
    }

    fn index(self) -> u64 {
        match self {
            Tier::Easy => 0,
            Tier::Medium => 1,
            Tier::Hard => 2,
            Tier::Expert => 3,
        }
    }
}

/// Stable 64-bit mix of the generation inputs into one RNG seed.
fn rng_seed(seed: u64, tier: Tier, level_number: u32, attempt: u64) -> u64 {
    let mut z = seed
        ^ u64::from(level_number).wrapping_mul(0x9e37_79b9_7f4a_7c15)
        ^ (tier.index() << 56)
        ^ attempt.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// The solved state a scramble starts from.
fn solved_state(params: &TierParams) -> Result<Vec<Vessel>, StateError> {
    let mut vessels = Vec::with_capacity(params.colors + params.extra_vessels);
    for index in 0..params.colors {
        let token = match ColorToken::from_index(index) {
            Some(token) => token,
            None => {
                return Err(StateError::InvalidCount {
                    requested: params.colors,
                    available: ColorToken::PALETTE.len(),
                })
            }
        };
        let units = vec![token; params.capacity];
        vessels.push(Vessel::with_units(index as VesselId, &units, params.capacity)?);
    }
    for extra in 0..params.extra_vessels {
        let id = (params.colors + extra) as VesselId;
        vessels.push(Vessel::empty(id, params.capacity)?);
    }
    Ok(vessels)
}

/// Forward moves whose reversal is a sound scramble step from `vessels`.
///
/// For a forward move `u -> v` of `count` tokens to transfer exactly that
/// count back, the scrambled source `u` must end with a run of exactly
/// `count` (so its current top must differ from the token), and `v`'s top
/// must still match after removal (so the removal must not expose a foreign
/// color unless it empties `v`). Each entry carries the *maximum* count for
/// its pair; the caller picks the actual count.
fn reverse_candidates(vessels: &[Vessel]) -> Vec<Move> {
    let mut candidates = Vec::new();
    for v in vessels {
        let run = v.top_run_length();
        if run == 0 {
            continue;
        }
        let token = match v.top_token() {
            Some(token) => token,
            None => continue,
        };
        let max_run = if run == v.units().len() { run } else { run - 1 };
        if max_run == 0 {
            continue;
        }
        for u in vessels {
            if u.id() == v.id() || u.free_space() == 0 || u.top_token() == Some(token) {
                continue;
            }
            candidates.push(Move {
                from: u.id(),
                to: v.id(),
                token,
                count: max_run.min(u.free_space()),
            });
        }
    }
    candidates
}

/// Apply the reverse of `forward` directly to the vessel list.
fn apply_reverse(vessels: &mut [Vessel], forward: Move) -> Result<(), StateError> {
    let reverse = forward.reversed();
    let from_idx = vessels
        .iter()
        .position(|v| v.id() == reverse.from)
        .ok_or(StateError::UnknownVessel { id: reverse.from })?;
    let to_idx = vessels
        .iter()
        .position(|v| v.id() == reverse.to)
        .ok_or(StateError::UnknownVessel { id: reverse.to })?;
    let (new_from, moved) = vessels[from_idx].remove_top(reverse.count)?;
    let new_to = vessels[to_idx].add_units(&moved)?;
    vessels[from_idx] = new_from;
    vessels[to_idx] = new_to;
    Ok(())
}

/// One scramble pass.
///
/// Well-mixed states often leave no sound reverse step (every top run is a
/// single unit over a foreign color), so the walk is allowed to stall once it
/// has covered at least half the target depth. A stall before that, or a
/// final state that is still solved, is degenerate and returns `None`.
fn scramble(params: &TierParams, rng: &mut SmallRng) -> Result<Option<Vec<Vessel>>, StateError> {
    let min_moves = (params.scramble_moves / 2).max(4);
    let mut vessels = solved_state(params)?;
    let mut applied = 0;
    for _ in 0..params.scramble_moves {
        let candidates = reverse_candidates(&vessels);
        if candidates.is_empty() {
            break;
        }
        let pick = candidates[rng.gen_range(0..candidates.len())];
        let count = rng.gen_range(1..=pick.count);
        apply_reverse(&mut vessels, Move { count, ..pick })?;
        applied += 1;
    }
    if applied < min_moves || vessels.iter().all(Vessel::is_resolved) {
        return Ok(None);
    }
    Ok(Some(vessels))
}

/// Generate a guaranteed-solvable puzzle for `(tier, level_number, seed)`.
///
/// Degenerate scrambles are retried on the same RNG stream, so the result is
/// still a pure function of the inputs.
pub fn generate(tier: Tier, level_number: u32, seed: u64) -> Result<PuzzleState, LevelError> {
    generate_candidate(tier, level_number, seed, 0)
}

/// Like [`generate`], with a candidate index folded into the seed so the
/// level pipeline can ask for a fresh deterministic candidate after a
/// validation rejection.
pub(crate) fn generate_candidate(
    tier: Tier,
    level_number: u32,
    seed: u64,
    attempt: u64,
) -> Result<PuzzleState, LevelError> {
    let params = tier.params();
    let mut rng = SmallRng::seed_from_u64(rng_seed(seed, tier, level_number, attempt));

    for retry in 0..MAX_SCRAMBLE_RETRIES {
        match scramble(&params, &mut rng)? {
            Some(vessels) => {
                let state = PuzzleState::from_vessels(vessels)?;
                debug!(?tier, level_number, seed, retry, "scramble accepted");
                return Ok(state);
            }
            None => {
                debug!(?tier, level_number, seed, retry, "degenerate scramble, retrying");
            }
        }
    }
    Err(LevelError::GenerationFailed {
        attempts: MAX_SCRAMBLE_RETRIES,
    })
}

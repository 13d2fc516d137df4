//! Move legality and state transitions.
//!
//! Everything here is a pure function over the value types in
//! [`crate::state`]: predicates take references, transitions return new
//! states. `apply_move` re-validates even when the caller already checked
//! `can_move`.

use crate::error::StateError;
use crate::state::{Move, PuzzleState, Vessel, VesselId};

/// Whether pouring from `from` into `to` is legal.
///
/// Legal iff the source is non-empty, the destination has room, and the
/// destination is empty or its top color matches the source's top color.
pub fn can_move(from: &Vessel, to: &Vessel) -> bool {
    if from.is_empty() || to.is_full() {
        return false;
    }
    match to.top_token() {
        None => true,
        Some(top) => from.top_token() == Some(top),
    }
}

/// How many units a legal pour actually transfers: the source's top run,
/// clipped to the destination's free space.
pub fn pour_quantity(from: &Vessel, to: &Vessel) -> usize {
    from.top_run_length().min(to.free_space())
}

/// All ordered pairs of distinct vessels with a legal move between them,
/// in vessel-list order.
pub fn legal_moves(state: &PuzzleState) -> Vec<(VesselId, VesselId)> {
    let vessels = state.vessels();
    let mut moves = Vec::new();
    for from in vessels {
        for to in vessels {
            if from.id() != to.id() && can_move(from, to) {
                moves.push((from.id(), to.id()));
            }
        }
    }
    moves
}

/// Apply the pour from `from_id` to `to_id`, returning the successor state.
///
/// The input state is untouched; the returned state carries fresh vessels and
/// the executed [`Move`] appended to its history.
pub fn apply_move(
    state: &PuzzleState,
    from_id: VesselId,
    to_id: VesselId,
) -> Result<PuzzleState, StateError> {
    if from_id == to_id {
        return Err(StateError::IllegalMove {
            from: from_id,
            to: to_id,
        });
    }
    let from_idx = state
        .index_of(from_id)
        .ok_or(StateError::UnknownVessel { id: from_id })?;
    let to_idx = state
        .index_of(to_id)
        .ok_or(StateError::UnknownVessel { id: to_id })?;

    let from = &state.vessels()[from_idx];
    let to = &state.vessels()[to_idx];
    if !can_move(from, to) {
        return Err(StateError::IllegalMove {
            from: from_id,
            to: to_id,
        });
    }
    let token = match from.top_token() {
        Some(token) => token,
        None => {
            return Err(StateError::IllegalMove {
                from: from_id,
                to: to_id,
            })
        }
    };
    let count = pour_quantity(from, to);

    let (new_from, removed) = from.remove_top(count)?;
    let new_to = to.add_units(&removed)?;

    let mut vessels = state.vessels().to_vec();
    vessels[from_idx] = new_from;
    vessels[to_idx] = new_to;

    let mut history = state.history().to_vec();
    history.push(Move {
        from: from_id,
        to: to_id,
        token,
        count,
    });

    Ok(PuzzleState::assemble(vessels, history))
}

/// Invert the most recent move exactly, including partial-run counts.
///
/// This is not `Move::reversed` replayed through the rules: the recorded
/// transfer is undone verbatim, because the reverse of a forward move is not
/// generally a legal forward move.
pub fn undo(state: &PuzzleState) -> Result<PuzzleState, StateError> {
    let mut history = state.history().to_vec();
    let last = match history.pop() {
        Some(mv) => mv,
        None => return Err(StateError::NothingToUndo),
    };
    let from_idx = state
        .index_of(last.from)
        .ok_or(StateError::UnknownVessel { id: last.from })?;
    let to_idx = state
        .index_of(last.to)
        .ok_or(StateError::UnknownVessel { id: last.to })?;

    let (new_to, moved) = state.vessels()[to_idx].remove_top(last.count)?;
    let new_from = state.vessels()[from_idx].add_units(&moved)?;

    let mut vessels = state.vessels().to_vec();
    vessels[from_idx] = new_from;
    vessels[to_idx] = new_to;

    Ok(PuzzleState::assemble(vessels, history))
}

/// A state is solved when every vessel is resolved.
pub fn is_solved(state: &PuzzleState) -> bool {
    state.vessels().iter().all(Vessel::is_resolved)
}

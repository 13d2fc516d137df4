//! Immutable puzzle-state model.
//!
//! These types are plain values: every "mutation" returns a fresh copy, so an
//! old state and the state derived from it never share storage. The JSON
//! shape produced by serde is the level format consumed by the host
//! application and must preserve vessel order, token order, and capacity
//! exactly.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::StateError;

/// Identifier of a vessel within a puzzle state.
///
/// Ids are stable labels; they do not have to match the vessel's position in
/// the state's vessel list.
pub type VesselId = u8;

/// One unit of color. Pure tag, no behavior beyond equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
    Pink,
    Brown,
    Olive,
    Teal,
    Gray,
}

impl ColorToken {
    /// The full palette, in generator order.
    pub const PALETTE: [ColorToken; 12] = [
        ColorToken::Red,
        ColorToken::Orange,
        ColorToken::Yellow,
        ColorToken::Green,
        ColorToken::Cyan,
        ColorToken::Blue,
        ColorToken::Purple,
        ColorToken::Pink,
        ColorToken::Brown,
        ColorToken::Olive,
        ColorToken::Teal,
        ColorToken::Gray,
    ];

    /// Position of this token in [`ColorToken::PALETTE`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<ColorToken> {
        ColorToken::PALETTE.get(index).copied()
    }
}

/// A capacity-bounded stack of color tokens. Index 0 is the bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vessel {
    id: VesselId,
    units: Vec<ColorToken>,
    capacity: usize,
}

impl Vessel {
    /// Create an empty vessel. Capacity must be in `1..=255`.
    pub fn empty(id: VesselId, capacity: usize) -> Result<Vessel, StateError> {
        Vessel::with_units(id, &[], capacity)
    }

    /// Create a vessel pre-filled with `units` (bottom first).
    ///
    /// The slice is copied, so the caller keeps no alias into the new vessel.
    pub fn with_units(
        id: VesselId,
        units: &[ColorToken],
        capacity: usize,
    ) -> Result<Vessel, StateError> {
        if capacity == 0 || capacity > u8::MAX as usize {
            return Err(StateError::InvalidCount {
                requested: capacity,
                available: u8::MAX as usize,
            });
        }
        if units.len() > capacity {
            return Err(StateError::InvalidCount {
                requested: units.len(),
                available: capacity,
            });
        }
        Ok(Vessel {
            id,
            units: units.to_vec(),
            capacity,
        })
    }

    pub fn id(&self) -> VesselId {
        self.id
    }

    /// Tokens currently held, bottom first.
    pub fn units(&self) -> &[ColorToken] {
        &self.units
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.units.len() == self.capacity
    }

    /// Remaining space in units.
    pub fn free_space(&self) -> usize {
        self.capacity - self.units.len()
    }

    /// The topmost token, if any.
    pub fn top_token(&self) -> Option<ColorToken> {
        self.units.last().copied()
    }

    /// Length of the contiguous run of equal tokens at the top.
    pub fn top_run_length(&self) -> usize {
        match self.units.last() {
            None => 0,
            Some(&top) => self.units.iter().rev().take_while(|&&t| t == top).count(),
        }
    }

    /// A vessel is resolved when it is empty, or full of a single color.
    pub fn is_resolved(&self) -> bool {
        if self.units.is_empty() {
            return true;
        }
        self.is_full() && self.units.iter().all(|&t| t == self.units[0])
    }

    /// Return a new vessel with `tokens` appended on top.
    pub fn add_units(&self, tokens: &[ColorToken]) -> Result<Vessel, StateError> {
        if tokens.len() > self.free_space() {
            return Err(StateError::InvalidCount {
                requested: tokens.len(),
                available: self.free_space(),
            });
        }
        let mut units = self.units.clone();
        units.extend_from_slice(tokens);
        Ok(Vessel {
            id: self.id,
            units,
            capacity: self.capacity,
        })
    }

    /// Return a new vessel with the top `count` tokens removed, plus the
    /// removed tokens in bottom-to-top order (so `add_units` on the result
    /// restores them exactly).
    pub fn remove_top(&self, count: usize) -> Result<(Vessel, Vec<ColorToken>), StateError> {
        if count == 0 || count > self.units.len() {
            return Err(StateError::InvalidCount {
                requested: count,
                available: self.units.len(),
            });
        }
        let split = self.units.len() - count;
        let removed = self.units[split..].to_vec();
        let vessel = Vessel {
            id: self.id,
            units: self.units[..split].to_vec(),
            capacity: self.capacity,
        };
        Ok((vessel, removed))
    }

    /// Byte encoding used by the canonical state key: capacity, fill level,
    /// then the tokens bottom-to-top. The id is deliberately excluded.
    fn encode(&self) -> SmallVec<[u8; 8]> {
        let mut buf = SmallVec::with_capacity(2 + self.units.len());
        buf.push(self.capacity as u8);
        buf.push(self.units.len() as u8);
        for &token in &self.units {
            buf.push(token as u8);
        }
        buf
    }
}

/// A completed or proposed transfer of `count` tokens of one color.
///
/// `count` is always the amount the rules would actually transfer, never a
/// player-chosen quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: VesselId,
    pub to: VesselId,
    pub token: ColorToken,
    pub count: usize,
}

impl Move {
    /// Swap source and destination, keeping token and count.
    ///
    /// Only the generator uses this, to walk the move graph backward while
    /// scrambling; a reversed move is not generally legal forward.
    pub fn reversed(self) -> Move {
        Move {
            from: self.to,
            to: self.from,
            token: self.token,
            count: self.count,
        }
    }
}

/// A full puzzle position: the vessels plus the moves that produced it.
///
/// Equality is canonical: two states compare equal iff their vessel multisets
/// match, regardless of vessel order or history. Use [`PuzzleState::vessels`]
/// and [`PuzzleState::history`] for structural comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleState {
    vessels: Vec<Vessel>,
    history: Vec<Move>,
}

impl PuzzleState {
    /// Build a state from vessels with no prior history.
    pub fn from_vessels(vessels: Vec<Vessel>) -> Result<PuzzleState, StateError> {
        for (i, vessel) in vessels.iter().enumerate() {
            if vessels[..i].iter().any(|other| other.id == vessel.id) {
                return Err(StateError::DuplicateVesselId { id: vessel.id });
            }
        }
        Ok(PuzzleState {
            vessels,
            history: Vec::new(),
        })
    }

    /// Internal constructor for transition functions that have already
    /// validated their inputs.
    pub(crate) fn assemble(vessels: Vec<Vessel>, history: Vec<Move>) -> PuzzleState {
        PuzzleState { vessels, history }
    }

    pub fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    /// Moves applied so far, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn vessel(&self, id: VesselId) -> Option<&Vessel> {
        self.vessels.iter().find(|v| v.id == id)
    }

    pub(crate) fn index_of(&self, id: VesselId) -> Option<usize> {
        self.vessels.iter().position(|v| v.id == id)
    }

    /// Total number of units across all vessels.
    pub fn total_units(&self) -> usize {
        self.vessels.iter().map(|v| v.units.len()).sum()
    }

    /// Vessel-order-independent key identifying this position.
    ///
    /// Vessels are encoded (capacity, fill, tokens) and sorted, so states
    /// that differ only by vessel identity or order collapse to one key.
    /// This is the solver's visited-set key and the basis of state equality.
    pub fn canonical_key(&self) -> Vec<u8> {
        let mut records: SmallVec<[SmallVec<[u8; 8]>; 16]> =
            self.vessels.iter().map(Vessel::encode).collect();
        records.sort_unstable();
        let mut key = Vec::with_capacity(self.vessels.len() * 2 + self.total_units());
        for record in records {
            key.extend_from_slice(&record);
        }
        key
    }
}

impl PartialEq for PuzzleState {
    fn eq(&self, other: &PuzzleState) -> bool {
        self.canonical_key() == other.canonical_key()
    }
}

impl Eq for PuzzleState {}

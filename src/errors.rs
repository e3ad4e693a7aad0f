use crate::battle::state::SlotRef;
use schema::Move;
use thiserror::Error;

/// Main error type for the battle turn engine.
///
/// Only structural failures live here. Gameplay failures (a miss, a blocked
/// hit, an empty PP counter) are ordinary message actions and never surface
/// as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleEngineError {
    /// A required collaborator or rule value was missing or invalid at construction.
    #[error("invalid battle construction: {0}")]
    InvalidConstruction(String),

    /// The action queue exceeded its per-turn iteration ceiling.
    #[error("runaway reaction loop: action queue exceeded {ceiling} iterations")]
    RunawayReactionLoop { ceiling: usize },

    #[error(transparent)]
    MoveData(#[from] MoveDataError),

    /// A slot reference pointed outside the battle's slot layout.
    #[error("slot {0} does not exist in this battle")]
    InvalidSlot(SlotRef),

    /// A decision provider could not supply a usable choice.
    #[error("decision provider failed for {slot}: {reason}")]
    DecisionFailed { slot: SlotRef, reason: String },
}

/// Errors related to move catalog lookups and loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveDataError {
    #[error("move {0:?} is not in the catalog")]
    MoveNotFound(Move),

    #[error("move catalog could not be parsed: {0}")]
    MalformedData(String),
}

/// Convenience type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Convenience type alias for Results using MoveDataError
pub type MoveDataResult<T> = Result<T, MoveDataError>;

//! Pokemon Turn Engine
//!
//! A turn-resolution engine for Pokemon-style battles in singles, doubles and
//! triples. Each turn runs through a fixed phase pipeline; every state change
//! is a queued action whose reactions resolve before anything already waiting.

pub mod battle;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod player;
pub mod pokemon;
pub mod random;

// --- PUBLIC API RE-EXPORTS ---

pub use schema::{
    Ability, EffectTarget, Hazard, Item, Move, MoveCategory, MoveData, MoveEffect, MoveTarget,
    PokemonType, SideCondition, StatType, Terrain, Weather,
};

pub use battle::action::{BattleAction, DamageSource};
pub use battle::action_queue::{ActionListener, ActionLog, ActionQueue, ActionStatistics, Resolvable};
pub use battle::ai::ScoringAI;
pub use battle::decision::DecisionProvider;
pub use battle::engine::{BattleEngine, BattleOutcome, BattleReport, TurnSummary};
pub use battle::messages::BattleMessage;
pub use battle::presentation::{NoopPresenter, PresentationSink, TextPresenter};
pub use battle::registry::{EffectKind, HandlerRegistry, TriggerKind};
pub use battle::state::{BattleState, GameState, SideId, SlotRef};
pub use catalog::Catalog;
pub use config::{BattleRules, EngineOptions};
pub use errors::{BattleEngineError, BattleResult, MoveDataError, MoveDataResult};
pub use player::{Party, PlayerAction};
pub use pokemon::{Combatant, MoveInstance, StatBlock, StatusCondition};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};

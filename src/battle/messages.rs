use schema::{Ability, Hazard, Item, PokemonType, SideCondition, StatType, Terrain, Weather};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::battle::calculators::Effectiveness;
use crate::pokemon::StatusCondition;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFailureReason {
    IsAsleep,
    IsFrozen,
    IsParalyzed,
    IsFlinching,
    NoPPRemaining,
    NoTarget,
}

/// Narration produced while a turn resolves. Every message carries the names
/// it needs so that rendering never has to look back into the battle state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleMessage {
    TurnStarted { turn_number: u32 },
    MoveUsed { user: String, move_name: String },
    ActionFailed { user: String, reason: ActionFailureReason },
    Blocked { target: String },
    Missed { user: String },
    CriticalHit,
    Effectiveness { target: String, effectiveness: Effectiveness },
    DamageTaken { target: String, amount: u16 },
    Fainted { name: String },
    SentOut { trainer: String, name: String },
    Withdrew { trainer: String, name: String },
    StatusApplied { target: String, status: StatusCondition },
    StatusUnchanged { target: String },
    StatusDamage { target: String, status: StatusCondition },
    StatusCured { target: String, status: StatusCondition },
    StatChanged { target: String, stat: StatType, delta: i8 },
    StatUnchanged { target: String, stat: StatType, rising: bool },
    Healed { target: String },
    RecoilDamage { target: String },
    WeatherStarted { weather: Weather },
    WeatherEnded { weather: Weather },
    WeatherDamage { target: String, weather: Weather },
    TerrainStarted { terrain: Terrain },
    TerrainEnded { terrain: Terrain },
    SideConditionStarted { trainer: String, condition: SideCondition },
    SideConditionEnded { trainer: String, condition: SideCondition },
    HazardSet { trainer: String, hazard: Hazard },
    HazardDamage { target: String, hazard: Hazard },
    AbilityActivated { owner: String, ability: Ability },
    ItemActivated { owner: String, item: Item },
    ItemConsumed { owner: String, item: Item },
    Protecting { target: String },
    CenterOfAttention { target: String },
    Seeded { target: String },
    SeedDrain { target: String },
    TypeChanged { target: String, pokemon_type: PokemonType },
    Failed,
}

impl fmt::Display for BattleMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleMessage::TurnStarted { turn_number } => write!(f, "=== Turn {} ===", turn_number),
            BattleMessage::MoveUsed { user, move_name } => write!(f, "{} used {}!", user, move_name),
            BattleMessage::ActionFailed { user, reason } => match reason {
                ActionFailureReason::IsAsleep => write!(f, "{} is fast asleep.", user),
                ActionFailureReason::IsFrozen => write!(f, "{} is frozen solid!", user),
                ActionFailureReason::IsParalyzed => {
                    write!(f, "{} is paralyzed! It can't move!", user)
                }
                ActionFailureReason::IsFlinching => write!(f, "{} flinched and couldn't move!", user),
                ActionFailureReason::NoPPRemaining => {
                    write!(f, "{} has no PP left for that move!", user)
                }
                ActionFailureReason::NoTarget => write!(f, "{} has no target!", user),
            },
            BattleMessage::Blocked { target } => write!(f, "{} protected itself!", target),
            BattleMessage::Missed { user } => write!(f, "{}'s attack missed!", user),
            BattleMessage::CriticalHit => write!(f, "A critical hit!"),
            BattleMessage::Effectiveness {
                target,
                effectiveness,
            } => match effectiveness {
                Effectiveness::NoEffect => write!(f, "It doesn't affect {}...", target),
                Effectiveness::NotVeryEffective => write!(f, "It's not very effective..."),
                Effectiveness::Normal => write!(f, "It hit {}.", target),
                Effectiveness::SuperEffective => write!(f, "It's super effective!"),
            },
            BattleMessage::DamageTaken { target, amount } => {
                write!(f, "{} took {} damage!", target, amount)
            }
            BattleMessage::Fainted { name } => write!(f, "{} fainted!", name),
            BattleMessage::SentOut { trainer, name } => write!(f, "{} sent out {}!", trainer, name),
            BattleMessage::Withdrew { trainer, name } => {
                write!(f, "{} withdrew {}!", trainer, name)
            }
            BattleMessage::StatusApplied { target, status } => {
                write!(f, "{} is now {}!", target, status.name())
            }
            BattleMessage::StatusUnchanged { target } => {
                write!(f, "{} is unaffected.", target)
            }
            BattleMessage::StatusDamage { target, status } => {
                write!(f, "{} is hurt because it is {}!", target, status.name())
            }
            BattleMessage::StatusCured { target, status } => {
                write!(f, "{} is no longer {}.", target, status.name())
            }
            BattleMessage::StatChanged { target, stat, delta } => {
                let wording = match delta {
                    d if *d >= 2 => "rose sharply",
                    d if *d > 0 => "rose",
                    d if *d <= -2 => "harshly fell",
                    _ => "fell",
                };
                write!(f, "{}'s {} {}!", target, stat, wording)
            }
            BattleMessage::StatUnchanged {
                target,
                stat,
                rising,
            } => {
                let direction = if *rising { "higher" } else { "lower" };
                write!(f, "{}'s {} won't go any {}!", target, stat, direction)
            }
            BattleMessage::Healed { target } => write!(f, "{} restored some HP.", target),
            BattleMessage::RecoilDamage { target } => {
                write!(f, "{} is damaged by the recoil!", target)
            }
            BattleMessage::WeatherStarted { weather } => match weather {
                Weather::Rain => write!(f, "It started to rain!"),
                Weather::Sun => write!(f, "The sunlight turned harsh!"),
                Weather::Sandstorm => write!(f, "A sandstorm kicked up!"),
                Weather::Hail => write!(f, "It started to hail!"),
            },
            BattleMessage::WeatherEnded { weather } => match weather {
                Weather::Rain => write!(f, "The rain stopped."),
                Weather::Sun => write!(f, "The harsh sunlight faded."),
                Weather::Sandstorm => write!(f, "The sandstorm subsided."),
                Weather::Hail => write!(f, "The hail stopped."),
            },
            BattleMessage::WeatherDamage { target, weather } => {
                write!(f, "{} is buffeted by the {}!", target, weather)
            }
            BattleMessage::TerrainStarted { terrain } => {
                write!(f, "{} spread across the battlefield!", terrain)
            }
            BattleMessage::TerrainEnded { terrain } => write!(f, "The {} faded.", terrain),
            BattleMessage::SideConditionStarted { trainer, condition } => {
                write!(f, "{} went up on {}'s side!", condition, trainer)
            }
            BattleMessage::SideConditionEnded { trainer, condition } => {
                write!(f, "{}'s {} wore off!", trainer, condition)
            }
            BattleMessage::HazardSet { trainer, hazard } => {
                write!(f, "{} were scattered around {}'s side!", hazard, trainer)
            }
            BattleMessage::HazardDamage { target, hazard } => {
                write!(f, "{} is hurt by the {}!", target, hazard)
            }
            BattleMessage::AbilityActivated { owner, ability } => {
                write!(f, "[{}'s {}]", owner, ability)
            }
            BattleMessage::ItemActivated { owner, item } => {
                write!(f, "{}'s {} activated!", owner, item)
            }
            BattleMessage::ItemConsumed { owner, item } => write!(f, "{} used its {}!", owner, item),
            BattleMessage::Protecting { target } => write!(f, "{} is protecting itself!", target),
            BattleMessage::CenterOfAttention { target } => {
                write!(f, "{} became the center of attention!", target)
            }
            BattleMessage::Seeded { target } => write!(f, "{} was seeded!", target),
            BattleMessage::SeedDrain { target } => {
                write!(f, "{}'s health is sapped by Leech Seed!", target)
            }
            BattleMessage::TypeChanged {
                target,
                pokemon_type,
            } => write!(f, "{} became the {} type!", target, pokemon_type),
            BattleMessage::Failed => write!(f, "But it failed!"),
        }
    }
}

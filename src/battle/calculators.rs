//! The damage formula. Pure over the battle state except for the rolls it
//! draws from the randomness source.

use schema::{Ability, Item, MoveCategory, MoveData, PokemonType, SideCondition, Weather};
use serde::{Deserialize, Serialize};

use crate::battle::state::{BattleState, SlotRef};
use crate::battle::stats::{effective_attack, effective_defense};
use crate::pokemon::StatusCondition;
use crate::random::RandomSource;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effectiveness {
    NoEffect,
    NotVeryEffective,
    Normal,
    SuperEffective,
}

impl Effectiveness {
    pub fn from_multiplier(multiplier: f32) -> Self {
        if multiplier == 0.0 {
            Effectiveness::NoEffect
        } else if multiplier < 1.0 {
            Effectiveness::NotVeryEffective
        } else if multiplier > 1.0 {
            Effectiveness::SuperEffective
        } else {
            Effectiveness::Normal
        }
    }
}

/// Every factor that went into one hit, kept for narration and tests.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DamageBreakdown {
    pub base: f64,
    pub critical: bool,
    /// Percentage roll in 85..=100.
    pub random_roll: u8,
    pub stab: bool,
    pub type_multiplier: f32,
    pub modifier: f64,
    pub damage: u16,
}

impl DamageBreakdown {
    pub fn effectiveness(&self) -> Effectiveness {
        Effectiveness::from_multiplier(self.type_multiplier)
    }
}

pub const CRITICAL_HIT_ODDS: u32 = 24;
pub const SPREAD_MODIFIER: f64 = 0.75;

/// Type multiplier of a move against a slot, with Levitate's ground immunity.
pub fn type_multiplier(state: &BattleState, target: SlotRef, move_data: &MoveData) -> f32 {
    let levitating = state
        .combatant(target)
        .is_some_and(|combatant| combatant.ability == Some(Ability::Levitate));
    if levitating && move_data.move_type == PokemonType::Ground {
        return 0.0;
    }
    PokemonType::effectiveness_against(move_data.move_type, &state.effective_types(target))
}

/// Computes one hit of a damaging move. Returns `None` for status moves or
/// when either side of the exchange is missing.
///
/// Rolls are drawn in a fixed order: critical hit, then the damage roll.
pub fn calculate_damage(
    state: &BattleState,
    attacker: SlotRef,
    defender: SlotRef,
    move_data: &MoveData,
    spread: bool,
    rng: &mut dyn RandomSource,
) -> Option<DamageBreakdown> {
    let power = move_data.power?;
    if move_data.category == MoveCategory::Status {
        return None;
    }
    let user = state.combatant(attacker)?;
    state.combatant(defender)?;

    let attack = effective_attack(state, attacker, move_data);
    let defense = effective_defense(state, defender, move_data).max(1.0);
    let level_factor = (2.0 * user.level as f64 / 5.0).floor() + 2.0;
    let base = ((level_factor * power as f64 * attack / defense) / 50.0).floor() + 2.0;

    let critical = rng.next_int(CRITICAL_HIT_ODDS) == 0;
    let random_roll = 85 + rng.next_int(16) as u8;

    let stab = state
        .effective_types(attacker)
        .contains(&move_data.move_type);
    let type_multiplier = type_multiplier(state, defender, move_data);

    let mut modifier = 1.0;
    if spread {
        modifier *= SPREAD_MODIFIER;
    }
    modifier *= weather_modifier(state.weather(), move_data.move_type);
    if critical {
        modifier *= 1.5;
    }
    modifier *= random_roll as f64 / 100.0;
    if stab {
        modifier *= 1.5;
    }
    modifier *= type_multiplier as f64;
    if move_data.category == MoveCategory::Physical
        && matches!(user.status, Some(StatusCondition::Burn))
    {
        modifier *= 0.5;
    }
    if !critical {
        let screen = match move_data.category {
            MoveCategory::Physical => SideCondition::Reflect,
            _ => SideCondition::LightScreen,
        };
        if state.side(defender.side).has_condition(screen) {
            modifier *= 0.5;
        }
    }
    if user.item == Some(Item::LifeOrb) {
        modifier *= 1.3;
    }

    let raw = (base * modifier).floor();
    let damage = if type_multiplier == 0.0 {
        0
    } else {
        (raw as u16).max(1)
    };

    Some(DamageBreakdown {
        base,
        critical,
        random_roll,
        stab,
        type_multiplier,
        modifier,
        damage,
    })
}

fn weather_modifier(weather: Option<Weather>, move_type: PokemonType) -> f64 {
    match (weather, move_type) {
        (Some(Weather::Rain), PokemonType::Water) | (Some(Weather::Sun), PokemonType::Fire) => 1.5,
        (Some(Weather::Rain), PokemonType::Fire) | (Some(Weather::Sun), PokemonType::Water) => 0.5,
        _ => 1.0,
    }
}

//! Residual effects applied once every move of the turn has resolved.

use schema::{PokemonType, Terrain, Weather};

use crate::battle::action::{BattleAction, DamageSource};
use crate::battle::conditions::{VolatileCondition, VolatileKind};
use crate::battle::state::{BattleState, SlotRef};
use crate::battle::triggers::{fraction_of_max_hp, is_grounded};
use crate::battle::turn_order::sort_slots_by_speed;
use crate::pokemon::StatusCondition;
use crate::random::RandomSource;

/// Every residual effect for the turn, fastest slot first. Per slot the order
/// is weather, status, Leech Seed, then terrain healing.
pub fn end_of_turn_actions(state: &BattleState, rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let mut actions = Vec::new();
    for slot in sort_slots_by_speed(state.active_slots(), state, rng) {
        actions.extend(weather_damage_actions(state, slot));
        actions.extend(status_damage_actions(state, slot));
        actions.extend(leech_seed_actions(state, slot));
        actions.extend(terrain_heal_actions(state, slot));
    }
    actions
}

/// Burn and poison chip damage. Badly poisoned damage grows with the counter,
/// which ticks up once the damage has been applied.
pub fn status_damage_actions(state: &BattleState, slot: SlotRef) -> Vec<BattleAction> {
    let Some(combatant) = state.active(slot) else {
        return vec![];
    };
    let Some(status) = combatant.status else {
        return vec![];
    };
    let max_hp = combatant.max_hp() as u32;

    let amount = match status {
        StatusCondition::Burn => max_hp / 16,
        StatusCondition::Poison => max_hp / 8,
        StatusCondition::BadlyPoisoned(counter) => counter as u32 * max_hp / 16,
        _ => return vec![],
    };
    let mut actions = vec![BattleAction::ApplyDamage {
        target: slot,
        amount: amount.max(1) as u16,
        source: DamageSource::Status(status),
    }];
    if matches!(status, StatusCondition::BadlyPoisoned(_)) {
        actions.push(BattleAction::TickStatus { target: slot });
    }
    actions
}

/// Sandstorm spares Rock, Ground and Steel types; Hail spares Ice types.
pub fn weather_damage_actions(state: &BattleState, slot: SlotRef) -> Vec<BattleAction> {
    let Some(weather) = state.weather() else {
        return vec![];
    };
    if !state.is_active(slot) {
        return vec![];
    }
    let types = state.effective_types(slot);
    let immune = match weather {
        Weather::Sandstorm => [PokemonType::Rock, PokemonType::Ground, PokemonType::Steel]
            .iter()
            .any(|t| types.contains(t)),
        Weather::Hail => types.contains(&PokemonType::Ice),
        Weather::Rain | Weather::Sun => true,
    };
    if immune {
        return vec![];
    }
    vec![BattleAction::ApplyDamage {
        target: slot,
        amount: fraction_of_max_hp(state, slot, 16),
        source: DamageSource::Weather(weather),
    }]
}

pub fn leech_seed_actions(state: &BattleState, slot: SlotRef) -> Vec<BattleAction> {
    let Some(VolatileCondition::Seeded { by }) = state.volatile(slot, VolatileKind::Seeded) else {
        return vec![];
    };
    if !state.is_active(slot) {
        return vec![];
    }
    let amount = fraction_of_max_hp(state, slot, 8);
    let mut actions = vec![BattleAction::ApplyDamage {
        target: slot,
        amount,
        source: DamageSource::LeechSeed,
    }];
    if state.is_active(*by) {
        actions.push(BattleAction::ApplyHeal { target: *by, amount });
    }
    actions
}

pub fn terrain_heal_actions(state: &BattleState, slot: SlotRef) -> Vec<BattleAction> {
    if state.terrain() != Some(Terrain::Grassy) || !is_grounded(state, slot) {
        return vec![];
    }
    let hurt = state
        .active(slot)
        .is_some_and(|combatant| combatant.current_hp() < combatant.max_hp());
    if !hurt {
        return vec![];
    }
    vec![BattleAction::ApplyHeal {
        target: slot,
        amount: fraction_of_max_hp(state, slot, 16),
    }]
}

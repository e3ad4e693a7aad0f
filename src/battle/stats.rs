use schema::{Ability, Item, MoveCategory, MoveData, SideCondition, StatType, Weather};

use crate::battle::state::{BattleState, SlotRef};
use crate::pokemon::StatusCondition;
use crate::random::RandomSource;

/// Attack or special attack after stages, as used by the damage formula.
pub fn effective_attack(state: &BattleState, slot: SlotRef, move_data: &MoveData) -> f64 {
    let stat = match move_data.category {
        MoveCategory::Physical => StatType::Atk,
        MoveCategory::Special => StatType::SpAtk,
        MoveCategory::Status => return 0.0,
    };
    staged_stat(state, slot, stat)
}

/// Defense or special defense after stages, as used by the damage formula.
pub fn effective_defense(state: &BattleState, slot: SlotRef, move_data: &MoveData) -> f64 {
    let stat = match move_data.category {
        MoveCategory::Physical => StatType::Def,
        MoveCategory::Special => StatType::SpDef,
        MoveCategory::Status => return 0.0,
    };
    staged_stat(state, slot, stat)
}

/// Speed used for turn ordering: stages, paralysis, tailwind, weather
/// abilities and a Choice Scarf all apply.
pub fn effective_speed(state: &BattleState, slot: SlotRef) -> f64 {
    let Some(combatant) = state.combatant(slot) else {
        return 0.0;
    };
    let mut speed = staged_stat(state, slot, StatType::Spe);

    if matches!(combatant.status, Some(StatusCondition::Paralysis)) {
        speed *= 0.5;
    }
    if state.side(slot.side).has_condition(SideCondition::Tailwind) {
        speed *= 2.0;
    }
    match (combatant.ability, state.weather()) {
        (Some(Ability::SwiftSwim), Some(Weather::Rain))
        | (Some(Ability::Chlorophyll), Some(Weather::Sun)) => speed *= 2.0,
        _ => {}
    }
    if combatant.item == Some(Item::ChoiceScarf) {
        speed *= 1.5;
    }

    speed
}

/// Roll whether a move connects, from its base accuracy and the user's
/// accuracy stage against the target's evasion stage.
pub fn move_hits(
    state: &BattleState,
    user: SlotRef,
    target: SlotRef,
    move_data: &MoveData,
    rng: &mut dyn RandomSource,
) -> bool {
    // If move has no accuracy value, it never misses (like Swift)
    let Some(base_accuracy) = move_data.accuracy else {
        return true;
    };

    let accuracy_stage = stage_of(state, user, StatType::Acc);
    let evasion_stage = stage_of(state, target, StatType::Eva);
    let adjusted_stage = (accuracy_stage - evasion_stage).clamp(-6, 6);

    let threshold = (base_accuracy as f64 * accuracy_stage_multiplier(adjusted_stage)).round();
    let threshold = threshold.clamp(1.0, 100.0) as u32;

    rng.next_int(100) < threshold
}

fn stage_of(state: &BattleState, slot: SlotRef, stat: StatType) -> i8 {
    state
        .slot(slot)
        .map_or(0, |slot_state| slot_state.get_stat_stage(stat))
}

fn staged_stat(state: &BattleState, slot: SlotRef, stat: StatType) -> f64 {
    let base = state
        .combatant(slot)
        .map_or(0, |combatant| combatant.stats.get(stat));
    base as f64 * stat_stage_multiplier(stage_of(state, slot, stat))
}

/// Negative stages: 2 / (2 + |stage|). Positive stages: (2 + stage) / 2.
pub fn stat_stage_multiplier(stage: i8) -> f64 {
    let clamped_stage = stage.clamp(-6, 6);
    if clamped_stage < 0 {
        2.0 / (2.0 + (-clamped_stage) as f64)
    } else {
        (2.0 + clamped_stage as f64) / 2.0
    }
}

/// Accuracy and evasion use thirds instead of halves.
pub fn accuracy_stage_multiplier(stage: i8) -> f64 {
    let clamped_stage = stage.clamp(-6, 6);
    if clamped_stage < 0 {
        3.0 / (3.0 + (-clamped_stage) as f64)
    } else {
        (3.0 + clamped_stage as f64) / 3.0
    }
}

//! Ability, held item and entry hazard handlers.
//!
//! Passive abilities and items (speed or damage multipliers, hazard
//! immunity) are read directly where the numbers are computed and have no
//! entry here.

mod abilities;
mod hazards;
mod items;

use crate::battle::registry::HandlerRegistry;
use crate::battle::state::{BattleState, SlotRef};
use schema::{Ability, PokemonType};

pub(crate) fn register(registry: &mut HandlerRegistry) {
    abilities::register(registry);
    items::register(registry);
    hazards::register(registry);
}

/// Whether the combatant touches the ground and so is hit by ground-level hazards.
pub(crate) fn is_grounded(state: &BattleState, slot: SlotRef) -> bool {
    let floating = state
        .active(slot)
        .is_some_and(|combatant| combatant.ability == Some(Ability::Levitate));
    !floating && !state.effective_types(slot).contains(&PokemonType::Flying)
}

/// A fraction of the combatant's max HP, never less than one.
pub(crate) fn fraction_of_max_hp(state: &BattleState, slot: SlotRef, divisor: u16) -> u16 {
    state
        .combatant(slot)
        .map_or(0, |combatant| (combatant.max_hp() / divisor.max(1)).max(1))
}

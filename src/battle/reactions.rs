//! Reactive scans over actions that just resolved.
//!
//! Rather than subscribing to individual actions, the pipeline hands each
//! freshly drained batch to these scans, which pick out the variants they
//! care about and ask the registry for follow-ups.

use crate::battle::action::{BattleAction, DamageSource};
use crate::battle::registry::{HandlerContext, HandlerRegistry, TriggerKind};
use crate::battle::state::{BattleState, SlotRef};
use crate::battle::turn_order::sort_slots_by_speed;
use crate::catalog::Catalog;
use crate::random::RandomSource;

/// Damage-taken and contact-received triggers for every move hit in `batch`
/// that dealt damage to a target that is still standing.
pub fn damage_reactions(
    registry: &HandlerRegistry,
    catalog: &Catalog,
    state: &BattleState,
    batch: &[BattleAction],
    rng: &mut dyn RandomSource,
) -> Vec<BattleAction> {
    let mut actions = Vec::new();
    for action in batch {
        let BattleAction::ApplyDamage {
            target,
            amount,
            source: DamageSource::Move {
                user,
                move_,
                contact,
                ..
            },
        } = action
        else {
            continue;
        };
        if *amount == 0 || !state.is_active(*target) {
            continue;
        }
        let dealt = state
            .slot(*target)
            .map_or(0, |slot| slot.tracking.damage_from(*user, *move_));
        if dealt == 0 {
            continue;
        }

        let mut ctx = HandlerContext::new(state, *target)
            .with_target(Some(*user))
            .with_damage(*amount);
        if let Ok(move_data) = catalog.move_data(*move_) {
            ctx = ctx.with_move(*move_, move_data);
        }
        actions.extend(registry.process_trigger(TriggerKind::DamageTaken, &ctx, rng));
        if *contact {
            actions.extend(registry.process_trigger(TriggerKind::ContactReceived, &ctx, rng));
        }
    }
    actions
}

/// Entry hazards and switch-in abilities for every switch in `batch` that
/// actually put a combatant on the field, fastest arrival first.
pub fn switch_in_reactions(
    registry: &HandlerRegistry,
    state: &BattleState,
    batch: &[BattleAction],
    rng: &mut dyn RandomSource,
) -> Vec<BattleAction> {
    let arrivals: Vec<SlotRef> = batch
        .iter()
        .filter_map(|action| match action {
            BattleAction::Switch {
                side,
                slot,
                party_index,
            } => {
                let slot_ref = SlotRef::new(*side, *slot);
                let arrived = state
                    .slot(slot_ref)
                    .is_some_and(|slot_state| slot_state.occupant == Some(*party_index));
                (arrived && state.is_active(slot_ref)).then_some(slot_ref)
            }
            _ => None,
        })
        .collect();
    if arrivals.is_empty() {
        return Vec::new();
    }

    let mut actions = Vec::new();
    for slot in sort_slots_by_speed(arrivals, state, rng) {
        actions.extend(registry.process_switch_in(state, slot, rng));
    }
    actions
}

/// Weather-change triggers for every active slot, if `batch` changed the weather.
pub fn weather_change_reactions(
    registry: &HandlerRegistry,
    state: &BattleState,
    batch: &[BattleAction],
    rng: &mut dyn RandomSource,
) -> Vec<BattleAction> {
    if !batch.iter().any(BattleAction::is_weather_change) {
        return Vec::new();
    }
    let mut actions = Vec::new();
    for slot in sort_slots_by_speed(state.active_slots(), state, rng) {
        let ctx = HandlerContext::new(state, slot);
        actions.extend(registry.process_trigger(TriggerKind::WeatherChange, &ctx, rng));
    }
    actions
}

use schema::{MoveCategory, MoveEffect, PokemonType, Terrain};

use crate::battle::action::BattleAction;
use crate::battle::conditions::VolatileCondition;
use crate::battle::messages::BattleMessage;
use crate::battle::registry::HandlerContext;
use crate::battle::state::{BattleState, SlotRef};
use crate::battle::stats::effective_speed;
use crate::pokemon::StatusCondition;
use crate::random::RandomSource;

/// Whether `status` could be inflicted on the combatant in `slot` right now:
/// it must be able to fight, have no status yet, and not be immune by type or
/// terrain.
pub(crate) fn can_receive_status(state: &BattleState, slot: SlotRef, status: StatusCondition) -> bool {
    let Some(combatant) = state.active(slot) else {
        return false;
    };
    if combatant.status.is_some() {
        return false;
    }

    let types = state.effective_types(slot);
    match status {
        StatusCondition::Burn => !types.contains(&PokemonType::Fire),
        StatusCondition::Paralysis => !types.contains(&PokemonType::Electric),
        StatusCondition::Freeze => !types.contains(&PokemonType::Ice),
        StatusCondition::Poison | StatusCondition::BadlyPoisoned(_) => {
            !types.contains(&PokemonType::Poison) && !types.contains(&PokemonType::Steel)
        }
        StatusCondition::Sleep(_) => state.terrain() != Some(Terrain::Electric),
    }
}

// A status move that cannot land says so; a secondary effect just stays quiet.
fn inflict(
    ctx: &HandlerContext<'_>,
    rng: &mut dyn RandomSource,
    chance: u8,
    status: StatusCondition,
) -> Vec<BattleAction> {
    let Some(target) = ctx.target else {
        return vec![];
    };
    let primary = ctx
        .move_data
        .is_some_and(|data| data.category == MoveCategory::Status);

    if !can_receive_status(ctx.state, target, status) {
        if primary && ctx.state.is_active(target) {
            return vec![BattleAction::message(BattleMessage::Failed)];
        }
        return vec![];
    }

    if !rng.chance(chance) {
        return vec![];
    }
    vec![BattleAction::ApplyStatus { target, status }]
}

pub(super) fn apply_burn_effect(ctx: &HandlerContext<'_>, rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    match ctx.effect {
        Some(MoveEffect::Burn(chance)) => inflict(ctx, rng, *chance, StatusCondition::Burn),
        _ => vec![],
    }
}

pub(super) fn apply_paralyze_effect(ctx: &HandlerContext<'_>, rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    match ctx.effect {
        Some(MoveEffect::Paralyze(chance)) => inflict(ctx, rng, *chance, StatusCondition::Paralysis),
        _ => vec![],
    }
}

pub(super) fn apply_poison_effect(ctx: &HandlerContext<'_>, rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    match ctx.effect {
        Some(MoveEffect::Poison(chance)) => inflict(ctx, rng, *chance, StatusCondition::Poison),
        _ => vec![],
    }
}

pub(super) fn apply_badly_poison_effect(
    ctx: &HandlerContext<'_>,
    rng: &mut dyn RandomSource,
) -> Vec<BattleAction> {
    match ctx.effect {
        Some(MoveEffect::BadlyPoison(chance)) => {
            inflict(ctx, rng, *chance, StatusCondition::BadlyPoisoned(1))
        }
        _ => vec![],
    }
}

pub(super) fn apply_freeze_effect(ctx: &HandlerContext<'_>, rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    match ctx.effect {
        Some(MoveEffect::Freeze(chance)) => inflict(ctx, rng, *chance, StatusCondition::Freeze),
        _ => vec![],
    }
}

pub(super) fn apply_sleep_effect(ctx: &HandlerContext<'_>, rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let Some(MoveEffect::Sleep(chance)) = ctx.effect else {
        return vec![];
    };
    let mut actions = inflict(ctx, rng, *chance, StatusCondition::Sleep(0));
    // Duration is only rolled once the status is known to land.
    for action in actions.iter_mut() {
        if let BattleAction::ApplyStatus { status, .. } = action {
            *status = StatusCondition::Sleep(1 + rng.next_int(3) as u8);
        }
    }
    actions
}

/// Flinching only matters if the target has yet to move, so a slower user
/// never causes one. The flinch is tagged for the following turn.
pub(super) fn apply_flinch_effect(ctx: &HandlerContext<'_>, rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let Some(MoveEffect::Flinch(chance)) = ctx.effect else {
        return vec![];
    };
    let Some(target) = ctx.target else {
        return vec![];
    };
    if !ctx.state.is_active(target) {
        return vec![];
    }
    if effective_speed(ctx.state, ctx.source) <= effective_speed(ctx.state, target) {
        return vec![];
    }
    if !rng.chance(*chance) {
        return vec![];
    }
    vec![BattleAction::AddVolatile {
        target,
        condition: VolatileCondition::Flinched {
            turn: ctx.state.turn_number + 1,
        },
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{create_test_battle, TestCombatantBuilder, P1, P2};
    use crate::catalog::Catalog;
    use crate::random::ScriptedRandom;
    use pretty_assertions::assert_eq;
    use schema::Move;

    #[test]
    fn fire_types_cannot_be_burned() {
        let state = create_test_battle(
            vec![TestCombatantBuilder::new("Caster", PokemonType::Fire).build()],
            vec![TestCombatantBuilder::new("Charmander", PokemonType::Fire).build()],
        );
        assert!(!can_receive_status(&state, P2, StatusCondition::Burn));
        assert!(can_receive_status(&state, P2, StatusCondition::Paralysis));
    }

    #[test]
    fn steel_types_cannot_be_poisoned() {
        let state = create_test_battle(
            vec![TestCombatantBuilder::new("A", PokemonType::Normal).build()],
            vec![TestCombatantBuilder::new("Magnemite", PokemonType::Steel).build()],
        );
        assert!(!can_receive_status(&state, P2, StatusCondition::BadlyPoisoned(1)));
    }

    #[test]
    fn status_move_on_statused_target_fails_loudly() {
        let state = create_test_battle(
            vec![TestCombatantBuilder::new("Pikachu", PokemonType::Electric).build()],
            vec![TestCombatantBuilder::new("Rattata", PokemonType::Normal)
                .with_status(StatusCondition::Burn)
                .build()],
        );
        let catalog = Catalog::standard();
        let data = catalog.move_data(Move::ThunderWave).expect("thunder wave");
        let ctx = HandlerContext::new(&state, P1)
            .with_target(Some(P2))
            .with_move(Move::ThunderWave, data)
            .with_effect(&data.effects[0]);

        let actions = apply_paralyze_effect(&ctx, &mut ScriptedRandom::constant(0));
        assert_eq!(actions, vec![BattleAction::message(BattleMessage::Failed)]);
    }

    #[test]
    fn sleep_duration_is_rolled_after_the_chance_gate() {
        let state = create_test_battle(
            vec![TestCombatantBuilder::new("Oddish", PokemonType::Grass).build()],
            vec![TestCombatantBuilder::new("Rattata", PokemonType::Normal).build()],
        );
        let catalog = Catalog::standard();
        let data = catalog.move_data(Move::SleepPowder).expect("sleep powder");
        let ctx = HandlerContext::new(&state, P1)
            .with_target(Some(P2))
            .with_move(Move::SleepPowder, data)
            .with_effect(&data.effects[0]);

        // 100% chance consumes no roll; the duration draws 2 % 3 = 2.
        let actions = apply_sleep_effect(&ctx, &mut ScriptedRandom::new(vec![2]));
        assert_eq!(
            actions,
            vec![BattleAction::ApplyStatus {
                target: P2,
                status: StatusCondition::Sleep(3),
            }]
        );
    }

    #[test]
    fn slower_users_never_cause_flinch() {
        let state = create_test_battle(
            vec![TestCombatantBuilder::new("Slowpoke", PokemonType::Water)
                .with_speed(10)
                .build()],
            vec![TestCombatantBuilder::new("Jolteon", PokemonType::Electric)
                .with_speed(130)
                .build()],
        );
        let effect = MoveEffect::Flinch(100);
        let ctx = HandlerContext::new(&state, P1)
            .with_target(Some(P2))
            .with_effect(&effect);
        assert!(apply_flinch_effect(&ctx, &mut ScriptedRandom::constant(0)).is_empty());

        let reversed = HandlerContext::new(&state, P2)
            .with_target(Some(P1))
            .with_effect(&effect);
        assert_eq!(
            apply_flinch_effect(&reversed, &mut ScriptedRandom::constant(0)),
            vec![BattleAction::AddVolatile {
                target: P1,
                condition: VolatileCondition::Flinched { turn: 1 },
            }]
        );
    }
}

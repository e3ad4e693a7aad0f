use schema::MoveEffect;

use crate::battle::action::{BattleAction, DamageSource};
use crate::battle::calculators::{type_multiplier, Effectiveness};
use crate::battle::registry::HandlerContext;
use crate::random::RandomSource;

fn percent_of(amount: u16, percentage: u8) -> u16 {
    ((amount as u32 * percentage as u32) / 100).max(1) as u16
}

pub(super) fn apply_recoil_effect(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let Some(MoveEffect::Recoil(percentage)) = ctx.effect else {
        return vec![];
    };
    if ctx.damage == 0 || !ctx.state.is_active(ctx.source) {
        return vec![];
    }
    vec![BattleAction::ApplyDamage {
        target: ctx.source,
        amount: percent_of(ctx.damage, *percentage),
        source: DamageSource::Recoil,
    }]
}

pub(super) fn apply_drain_effect(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let Some(MoveEffect::Drain(percentage)) = ctx.effect else {
        return vec![];
    };
    if ctx.damage == 0 || !ctx.state.is_active(ctx.source) {
        return vec![];
    }
    vec![BattleAction::ApplyHeal {
        target: ctx.source,
        amount: percent_of(ctx.damage, *percentage),
    }]
}

pub(super) fn apply_heal_effect(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let Some(MoveEffect::Heal(percentage)) = ctx.effect else {
        return vec![];
    };
    let Some(user) = ctx.state.active(ctx.source) else {
        return vec![];
    };
    vec![BattleAction::ApplyHeal {
        target: ctx.source,
        amount: percent_of(user.max_hp(), *percentage),
    }]
}

/// The first hit has already landed by the time effects run; this queues the
/// remaining hits at the same per-hit damage.
pub(super) fn apply_multi_hit_effect(
    ctx: &HandlerContext<'_>,
    _rng: &mut dyn RandomSource,
) -> Vec<BattleAction> {
    let Some(MoveEffect::MultiHit(hits)) = ctx.effect else {
        return vec![];
    };
    let (Some(target), Some(move_)) = (ctx.target, ctx.move_) else {
        return vec![];
    };
    if ctx.damage == 0 || !ctx.state.is_active(target) {
        return vec![];
    }
    let contact = ctx.move_data.is_some_and(|data| data.contact);
    // Every strike meets the same types; none of the follow-ups is a critical.
    let effectiveness = ctx.move_data.map_or(Effectiveness::Normal, |data| {
        Effectiveness::from_multiplier(type_multiplier(ctx.state, target, data))
    });

    (1..*hits)
        .map(|_| BattleAction::ApplyDamage {
            target,
            amount: ctx.damage,
            source: DamageSource::Move {
                user: ctx.source,
                move_,
                contact,
                critical: false,
                effectiveness,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{create_test_battle, TestCombatantBuilder, P1, P2};
    use crate::catalog::Catalog;
    use crate::random::ScriptedRandom;
    use pretty_assertions::assert_eq;
    use schema::{Move, PokemonType};

    #[test]
    fn recoil_is_a_share_of_damage_dealt() {
        let state = create_test_battle(
            vec![TestCombatantBuilder::new("Tauros", PokemonType::Normal).build()],
            vec![TestCombatantBuilder::new("B", PokemonType::Normal).build()],
        );
        let effect = MoveEffect::Recoil(33);
        let ctx = HandlerContext::new(&state, P1)
            .with_target(Some(P2))
            .with_effect(&effect)
            .with_damage(60);

        assert_eq!(
            apply_recoil_effect(&ctx, &mut ScriptedRandom::constant(0)),
            vec![BattleAction::ApplyDamage {
                target: P1,
                amount: 19,
                source: DamageSource::Recoil,
            }]
        );
    }

    #[test]
    fn drain_heals_at_least_one() {
        let state = create_test_battle(
            vec![TestCombatantBuilder::new("Oddish", PokemonType::Grass).build()],
            vec![TestCombatantBuilder::new("B", PokemonType::Normal).build()],
        );
        let effect = MoveEffect::Drain(50);
        let ctx = HandlerContext::new(&state, P1)
            .with_target(Some(P2))
            .with_effect(&effect)
            .with_damage(1);

        assert_eq!(
            apply_drain_effect(&ctx, &mut ScriptedRandom::constant(0)),
            vec![BattleAction::ApplyHeal { target: P1, amount: 1 }]
        );
    }

    #[test]
    fn multi_hit_queues_the_remaining_hits() {
        let state = create_test_battle(
            vec![TestCombatantBuilder::new("Hitmonlee", PokemonType::Fighting).build()],
            vec![TestCombatantBuilder::new("B", PokemonType::Normal).build()],
        );
        let catalog = Catalog::standard();
        let data = catalog.move_data(Move::DoubleKick).expect("double kick");
        let ctx = HandlerContext::new(&state, P1)
            .with_target(Some(P2))
            .with_move(Move::DoubleKick, data)
            .with_effect(&data.effects[0])
            .with_damage(12);

        let extra = apply_multi_hit_effect(&ctx, &mut ScriptedRandom::constant(0));
        assert_eq!(extra.len(), 1);
        assert!(matches!(
            extra[0],
            BattleAction::ApplyDamage { target: P2, amount: 12, .. }
        ));
    }

    #[test]
    fn follow_up_strikes_keep_the_type_matchup() {
        let state = create_test_battle(
            vec![TestCombatantBuilder::new("Hitmonlee", PokemonType::Fighting).build()],
            vec![TestCombatantBuilder::new("Boulder", PokemonType::Rock).build()],
        );
        let catalog = Catalog::standard();
        let data = catalog.move_data(Move::DoubleKick).expect("double kick");
        let ctx = HandlerContext::new(&state, P1)
            .with_target(Some(P2))
            .with_move(Move::DoubleKick, data)
            .with_effect(&data.effects[0])
            .with_damage(30);

        let extra = apply_multi_hit_effect(&ctx, &mut ScriptedRandom::constant(0));
        assert!(matches!(
            extra[0],
            BattleAction::ApplyDamage {
                source: DamageSource::Move {
                    critical: false,
                    effectiveness: Effectiveness::SuperEffective,
                    ..
                },
                ..
            }
        ));
    }
}

use schema::{Hazard, Item, PokemonType};

use crate::battle::action::{BattleAction, DamageSource};
use crate::battle::move_effects::can_receive_status;
use crate::battle::registry::{EffectKind, HandlerContext, HandlerRegistry, TriggerKind};
use crate::pokemon::StatusCondition;
use crate::random::RandomSource;

use super::{fraction_of_max_hp, is_grounded};

pub(super) fn register(registry: &mut HandlerRegistry) {
    registry.register(EffectKind::Hazard(Hazard::Spikes), TriggerKind::SwitchIn, spikes);
    registry.register(EffectKind::Hazard(Hazard::StealthRock), TriggerKind::SwitchIn, stealth_rock);
    registry.register(EffectKind::Hazard(Hazard::ToxicSpikes), TriggerKind::SwitchIn, toxic_spikes);
}

fn layers(ctx: &HandlerContext<'_>, hazard: Hazard) -> u8 {
    ctx.state.side(ctx.source.side).hazard_layers(hazard)
}

fn wears_boots(ctx: &HandlerContext<'_>) -> bool {
    ctx.state
        .active(ctx.source)
        .is_some_and(|combatant| combatant.item == Some(Item::HeavyDutyBoots))
}

fn spikes(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    if !ctx.state.is_active(ctx.source) || wears_boots(ctx) || !is_grounded(ctx.state, ctx.source) {
        return vec![];
    }
    let divisor = match layers(ctx, Hazard::Spikes) {
        0 => return vec![],
        1 => 8,
        2 => 6,
        _ => 4,
    };
    vec![BattleAction::ApplyDamage {
        target: ctx.source,
        amount: fraction_of_max_hp(ctx.state, ctx.source, divisor),
        source: DamageSource::Hazard(Hazard::Spikes),
    }]
}

/// An eighth of max HP, scaled by how well Rock hits the combatant.
fn stealth_rock(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let Some(combatant) = ctx.state.active(ctx.source) else {
        return vec![];
    };
    if wears_boots(ctx) || layers(ctx, Hazard::StealthRock) == 0 {
        return vec![];
    }
    let multiplier =
        PokemonType::effectiveness_against(PokemonType::Rock, &ctx.state.effective_types(ctx.source));
    let amount = ((combatant.max_hp() as f32 * multiplier / 8.0) as u16).max(1);
    vec![BattleAction::ApplyDamage {
        target: ctx.source,
        amount,
        source: DamageSource::Hazard(Hazard::StealthRock),
    }]
}

fn toxic_spikes(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    if wears_boots(ctx) || !is_grounded(ctx.state, ctx.source) {
        return vec![];
    }
    let status = match layers(ctx, Hazard::ToxicSpikes) {
        0 => return vec![],
        1 => StatusCondition::Poison,
        _ => StatusCondition::BadlyPoisoned(1),
    };
    if !can_receive_status(ctx.state, ctx.source, status) {
        return vec![];
    }
    vec![BattleAction::ApplyStatus {
        target: ctx.source,
        status,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{create_test_battle, predictable_rng, TestCombatantBuilder, P1};
    use crate::battle::state::SideId;
    use pretty_assertions::assert_eq;

    #[test]
    fn spikes_scale_with_layers_and_skip_fliers() {
        let mut state = create_test_battle(
            vec![
                TestCombatantBuilder::new("Rattata", PokemonType::Normal).build(),
            ],
            vec![TestCombatantBuilder::new("B", PokemonType::Normal).build()],
        );
        state.side_mut(SideId::Player1).hazards.insert(Hazard::Spikes, 2);
        let ctx = HandlerContext::new(&state, P1);
        assert_eq!(
            spikes(&ctx, &mut predictable_rng()),
            vec![BattleAction::ApplyDamage {
                target: P1,
                amount: 16,
                source: DamageSource::Hazard(Hazard::Spikes),
            }]
        );

        let mut airborne = create_test_battle(
            vec![TestCombatantBuilder::new("Pidgey", PokemonType::Flying).build()],
            vec![TestCombatantBuilder::new("B", PokemonType::Normal).build()],
        );
        airborne.side_mut(SideId::Player1).hazards.insert(Hazard::Spikes, 3);
        let ctx = HandlerContext::new(&airborne, P1);
        assert!(spikes(&ctx, &mut predictable_rng()).is_empty());
    }

    #[test]
    fn stealth_rock_punishes_rock_weak_types() {
        let mut state = create_test_battle(
            vec![TestCombatantBuilder::new("Charizard", PokemonType::Fire)
                .with_types(vec![PokemonType::Fire, PokemonType::Flying])
                .build()],
            vec![TestCombatantBuilder::new("B", PokemonType::Normal).build()],
        );
        state.side_mut(SideId::Player1).hazards.insert(Hazard::StealthRock, 1);
        let ctx = HandlerContext::new(&state, P1);
        assert_eq!(
            stealth_rock(&ctx, &mut predictable_rng()),
            vec![BattleAction::ApplyDamage {
                target: P1,
                amount: 50,
                source: DamageSource::Hazard(Hazard::StealthRock),
            }]
        );
    }

    #[test]
    fn two_layers_of_toxic_spikes_badly_poison() {
        let mut state = create_test_battle(
            vec![TestCombatantBuilder::new("Rattata", PokemonType::Normal).build()],
            vec![TestCombatantBuilder::new("B", PokemonType::Normal).build()],
        );
        state.side_mut(SideId::Player1).hazards.insert(Hazard::ToxicSpikes, 2);
        let ctx = HandlerContext::new(&state, P1);
        assert_eq!(
            toxic_spikes(&ctx, &mut predictable_rng()),
            vec![BattleAction::ApplyStatus {
                target: P1,
                status: StatusCondition::BadlyPoisoned(1),
            }]
        );
    }
}

use schema::Item;

use crate::battle::action::{BattleAction, DamageSource};
use crate::battle::messages::BattleMessage;
use crate::battle::move_effects::can_receive_status;
use crate::battle::registry::{EffectKind, HandlerContext, HandlerRegistry, TriggerKind};
use crate::pokemon::StatusCondition;
use crate::random::RandomSource;

use super::fraction_of_max_hp;

pub(super) fn register(registry: &mut HandlerRegistry) {
    use TriggerKind::*;

    registry.register(EffectKind::Item(Item::Leftovers), TurnEnd, leftovers);
    registry.register(EffectKind::Item(Item::SitrusBerry), DamageTaken, sitrus_berry);
    registry.register(EffectKind::Item(Item::RockyHelmet), ContactReceived, rocky_helmet);
    registry.register(EffectKind::Item(Item::LifeOrb), AfterMove, life_orb);
    registry.register(EffectKind::Item(Item::ShellBell), AfterMove, shell_bell);
    registry.register(EffectKind::Item(Item::FlameOrb), TurnEnd, flame_orb);
}

fn announce(ctx: &HandlerContext<'_>, item: Item) -> BattleAction {
    BattleAction::message(BattleMessage::ItemActivated {
        owner: ctx.state.name_of(ctx.source),
        item,
    })
}

fn is_hurt(ctx: &HandlerContext<'_>) -> bool {
    ctx.state
        .active(ctx.source)
        .is_some_and(|holder| holder.current_hp() < holder.max_hp())
}

fn leftovers(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    if !is_hurt(ctx) {
        return vec![];
    }
    vec![
        announce(ctx, Item::Leftovers),
        BattleAction::ApplyHeal {
            target: ctx.source,
            amount: fraction_of_max_hp(ctx.state, ctx.source, 16),
        },
    ]
}

// Eaten once the holder drops to half HP or below.
fn sitrus_berry(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let Some(holder) = ctx.state.active(ctx.source) else {
        return vec![];
    };
    if holder.current_hp() > holder.max_hp() / 2 {
        return vec![];
    }
    vec![
        BattleAction::ConsumeItem { target: ctx.source },
        BattleAction::ApplyHeal {
            target: ctx.source,
            amount: fraction_of_max_hp(ctx.state, ctx.source, 4),
        },
    ]
}

fn rocky_helmet(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let Some(attacker) = ctx.target.filter(|slot| ctx.state.is_active(*slot)) else {
        return vec![];
    };
    vec![
        announce(ctx, Item::RockyHelmet),
        BattleAction::ApplyDamage {
            target: attacker,
            amount: fraction_of_max_hp(ctx.state, attacker, 6),
            source: DamageSource::Item(Item::RockyHelmet),
        },
    ]
}

fn life_orb(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    if ctx.damage == 0 {
        return vec![];
    }
    vec![BattleAction::ApplyDamage {
        target: ctx.source,
        amount: fraction_of_max_hp(ctx.state, ctx.source, 10),
        source: DamageSource::Item(Item::LifeOrb),
    }]
}

fn shell_bell(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    if ctx.damage == 0 || !is_hurt(ctx) {
        return vec![];
    }
    vec![
        announce(ctx, Item::ShellBell),
        BattleAction::ApplyHeal {
            target: ctx.source,
            amount: (ctx.damage / 8).max(1),
        },
    ]
}

fn flame_orb(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    if !can_receive_status(ctx.state, ctx.source, StatusCondition::Burn) {
        return vec![];
    }
    vec![
        announce(ctx, Item::FlameOrb),
        BattleAction::ApplyStatus {
            target: ctx.source,
            status: StatusCondition::Burn,
        },
    ]
}

use schema::{EffectTarget, MoveEffect};

use crate::battle::action::BattleAction;
use crate::battle::registry::HandlerContext;
use crate::random::RandomSource;

pub(super) fn apply_stat_change_effect(
    ctx: &HandlerContext<'_>,
    rng: &mut dyn RandomSource,
) -> Vec<BattleAction> {
    let Some(MoveEffect::StatChange(who, stat, stages, chance)) = ctx.effect else {
        return vec![];
    };
    let target = match who {
        EffectTarget::User => ctx.source,
        EffectTarget::Target => match ctx.target {
            Some(target) => target,
            None => return vec![],
        },
    };
    if !ctx.state.is_active(target) {
        return vec![];
    }
    if !rng.chance(*chance) {
        return vec![];
    }
    vec![BattleAction::ChangeStat {
        target,
        stat: *stat,
        stages: *stages,
    }]
}

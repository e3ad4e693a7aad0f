use schema::{MoveEffect, PokemonType, Terrain, Weather};

use crate::battle::action::BattleAction;
use crate::battle::conditions::{VolatileCondition, VolatileKind};
use crate::battle::messages::BattleMessage;
use crate::battle::registry::HandlerContext;
use crate::random::RandomSource;

pub(super) fn apply_protect_effect(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    if !matches!(ctx.effect, Some(MoveEffect::Protect)) {
        return vec![];
    }
    vec![BattleAction::AddVolatile {
        target: ctx.source,
        condition: VolatileCondition::Protected,
    }]
}

pub(super) fn apply_decoy_effect(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    if !matches!(ctx.effect, Some(MoveEffect::Decoy)) {
        return vec![];
    }
    vec![BattleAction::AddVolatile {
        target: ctx.source,
        condition: VolatileCondition::Decoy,
    }]
}

pub(super) fn apply_leech_seed_effect(
    ctx: &HandlerContext<'_>,
    _rng: &mut dyn RandomSource,
) -> Vec<BattleAction> {
    if !matches!(ctx.effect, Some(MoveEffect::LeechSeed)) {
        return vec![];
    }
    let Some(target) = ctx.target.filter(|target| ctx.state.is_active(*target)) else {
        return vec![];
    };
    if ctx.state.effective_types(target).contains(&PokemonType::Grass)
        || ctx.state.has_volatile(target, VolatileKind::Seeded)
    {
        return vec![BattleAction::message(BattleMessage::Failed)];
    }
    vec![BattleAction::AddVolatile {
        target,
        condition: VolatileCondition::Seeded { by: ctx.source },
    }]
}

pub(super) fn apply_weather_effect(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    match ctx.effect {
        Some(MoveEffect::SetWeather(weather)) => vec![BattleAction::SetWeather {
            weather: *weather,
            turns: Weather::DEFAULT_DURATION,
        }],
        _ => vec![],
    }
}

pub(super) fn apply_terrain_effect(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    match ctx.effect {
        Some(MoveEffect::SetTerrain(terrain)) => vec![BattleAction::SetTerrain {
            terrain: *terrain,
            turns: Terrain::DEFAULT_DURATION,
        }],
        _ => vec![],
    }
}

/// Hazards are laid on the side opposite the user.
pub(super) fn apply_hazard_effect(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    match ctx.effect {
        Some(MoveEffect::SetHazard(hazard)) => vec![BattleAction::AddHazard {
            side: ctx.source.side.opponent(),
            hazard: *hazard,
        }],
        _ => vec![],
    }
}

pub(super) fn apply_side_condition_effect(
    ctx: &HandlerContext<'_>,
    _rng: &mut dyn RandomSource,
) -> Vec<BattleAction> {
    match ctx.effect {
        Some(MoveEffect::SetSideCondition(condition)) => vec![BattleAction::SetSideCondition {
            side: ctx.source.side,
            condition: *condition,
            turns: condition.default_duration(),
        }],
        _ => vec![],
    }
}

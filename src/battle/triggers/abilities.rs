use schema::{Ability, PokemonType, StatType, Weather};

use crate::battle::action::{BattleAction, DamageSource};
use crate::battle::conditions::{VolatileCondition, VolatileKind};
use crate::battle::messages::BattleMessage;
use crate::battle::move_effects::can_receive_status;
use crate::battle::registry::{EffectKind, HandlerContext, HandlerRegistry, TriggerKind};
use crate::pokemon::StatusCondition;
use crate::random::RandomSource;

use super::fraction_of_max_hp;

pub(super) fn register(registry: &mut HandlerRegistry) {
    use TriggerKind::*;

    let entries: [(Ability, TriggerKind, crate::battle::registry::EffectHandler); 14] = [
        (Ability::Intimidate, SwitchIn, intimidate),
        (Ability::Drizzle, SwitchIn, weather_setter),
        (Ability::Drought, SwitchIn, weather_setter),
        (Ability::SandStream, SwitchIn, weather_setter),
        (Ability::SnowWarning, SwitchIn, weather_setter),
        (Ability::RoughSkin, ContactReceived, rough_skin),
        (Ability::Static, ContactReceived, contact_status),
        (Ability::FlameBody, ContactReceived, contact_status),
        (Ability::SpeedBoost, TurnEnd, speed_boost),
        (Ability::RainDish, TurnEnd, rain_dish),
        (Ability::Forecast, WeatherChange, forecast),
        (Ability::Forecast, SwitchIn, forecast),
        (Ability::Protean, BeforeMove, protean),
        (Ability::Stamina, DamageTaken, stamina),
    ];
    for (ability, trigger, handler) in entries {
        registry.register(EffectKind::Ability(ability), trigger, handler);
    }
}

fn announce(ctx: &HandlerContext<'_>, ability: Ability) -> BattleAction {
    BattleAction::message(BattleMessage::AbilityActivated {
        owner: ctx.state.name_of(ctx.source),
        ability,
    })
}

fn ability_of(ctx: &HandlerContext<'_>) -> Option<Ability> {
    ctx.state.active(ctx.source)?.ability
}

fn intimidate(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let foes: Vec<_> = ctx
        .state
        .active_foes_of(ctx.source)
        .into_iter()
        .filter(|foe| foe.is_adjacent_to(ctx.source))
        .collect();
    if foes.is_empty() {
        return vec![];
    }

    let mut actions = vec![announce(ctx, Ability::Intimidate)];
    actions.extend(foes.into_iter().map(|foe| BattleAction::ChangeStat {
        target: foe,
        stat: StatType::Atk,
        stages: -1,
    }));
    actions
}

fn weather_setter(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let Some(ability) = ability_of(ctx) else {
        return vec![];
    };
    let weather = match ability {
        Ability::Drizzle => Weather::Rain,
        Ability::Drought => Weather::Sun,
        Ability::SandStream => Weather::Sandstorm,
        Ability::SnowWarning => Weather::Hail,
        _ => return vec![],
    };
    if ctx.state.weather() == Some(weather) {
        return vec![];
    }
    vec![
        announce(ctx, ability),
        BattleAction::SetWeather {
            weather,
            turns: Weather::DEFAULT_DURATION,
        },
    ]
}

fn rough_skin(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let Some(attacker) = ctx.target.filter(|slot| ctx.state.is_active(*slot)) else {
        return vec![];
    };
    vec![
        announce(ctx, Ability::RoughSkin),
        BattleAction::ApplyDamage {
            target: attacker,
            amount: fraction_of_max_hp(ctx.state, attacker, 8),
            source: DamageSource::Ability {
                owner: ctx.source,
                ability: Ability::RoughSkin,
            },
        },
    ]
}

/// Static and Flame Body: a 30% chance to afflict whoever made contact.
fn contact_status(ctx: &HandlerContext<'_>, rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let Some(ability) = ability_of(ctx) else {
        return vec![];
    };
    let status = match ability {
        Ability::Static => StatusCondition::Paralysis,
        Ability::FlameBody => StatusCondition::Burn,
        _ => return vec![],
    };
    let Some(attacker) = ctx.target else {
        return vec![];
    };
    if !can_receive_status(ctx.state, attacker, status) || !rng.chance(30) {
        return vec![];
    }
    vec![
        announce(ctx, ability),
        BattleAction::ApplyStatus {
            target: attacker,
            status,
        },
    ]
}

fn speed_boost(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let maxed = ctx
        .state
        .slot(ctx.source)
        .is_some_and(|slot| slot.get_stat_stage(StatType::Spe) >= 6);
    if maxed {
        return vec![];
    }
    vec![
        announce(ctx, Ability::SpeedBoost),
        BattleAction::ChangeStat {
            target: ctx.source,
            stat: StatType::Spe,
            stages: 1,
        },
    ]
}

fn rain_dish(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    if ctx.state.weather() != Some(Weather::Rain) {
        return vec![];
    }
    let Some(holder) = ctx.state.active(ctx.source) else {
        return vec![];
    };
    if holder.current_hp() >= holder.max_hp() {
        return vec![];
    }
    vec![
        announce(ctx, Ability::RainDish),
        BattleAction::ApplyHeal {
            target: ctx.source,
            amount: fraction_of_max_hp(ctx.state, ctx.source, 16),
        },
    ]
}

/// Forecast follows the weather; in clear skies or sand the form reverts.
fn forecast(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let form = match ctx.state.weather() {
        Some(Weather::Rain) => Some(PokemonType::Water),
        Some(Weather::Sun) => Some(PokemonType::Fire),
        Some(Weather::Hail) => Some(PokemonType::Ice),
        Some(Weather::Sandstorm) | None => None,
    };
    let current = match ctx.state.volatile(ctx.source, VolatileKind::TypeChange) {
        Some(VolatileCondition::TypeChange { pokemon_type }) => Some(*pokemon_type),
        _ => None,
    };
    if form == current {
        return vec![];
    }

    match form {
        Some(pokemon_type) => vec![
            announce(ctx, Ability::Forecast),
            BattleAction::AddVolatile {
                target: ctx.source,
                condition: VolatileCondition::TypeChange { pokemon_type },
            },
        ],
        None => vec![BattleAction::RemoveVolatile {
            target: ctx.source,
            kind: VolatileKind::TypeChange,
        }],
    }
}

fn protean(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    let Some(move_data) = ctx.move_data else {
        return vec![];
    };
    if ctx.state.effective_types(ctx.source) == vec![move_data.move_type] {
        return vec![];
    }
    vec![
        announce(ctx, Ability::Protean),
        BattleAction::AddVolatile {
            target: ctx.source,
            condition: VolatileCondition::TypeChange {
                pokemon_type: move_data.move_type,
            },
        },
    ]
}

fn stamina(ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
    if ctx.damage == 0 {
        return vec![];
    }
    vec![
        announce(ctx, Ability::Stamina),
        BattleAction::ChangeStat {
            target: ctx.source,
            stat: StatType::Def,
            stages: 1,
        },
    ]
}

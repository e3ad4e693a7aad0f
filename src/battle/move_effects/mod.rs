// Move effect handlers. Each one is a pure function from a handler context to
// the actions the effect should cause; the registry calls them after a move's
// damage has been applied.

mod damage_effects;
mod field_effects;
mod stat_effects;
mod status_effects;

use schema::MoveEffectKind;

use crate::battle::registry::{EffectKind, HandlerRegistry, TriggerKind};

use self::{damage_effects::*, field_effects::*, stat_effects::*, status_effects::*};

pub(crate) use self::status_effects::can_receive_status;

pub(crate) fn register(registry: &mut HandlerRegistry) {
    let handlers: [(MoveEffectKind, crate::battle::registry::EffectHandler); 19] = [
        (MoveEffectKind::Burn, apply_burn_effect),
        (MoveEffectKind::Paralyze, apply_paralyze_effect),
        (MoveEffectKind::Poison, apply_poison_effect),
        (MoveEffectKind::BadlyPoison, apply_badly_poison_effect),
        (MoveEffectKind::Freeze, apply_freeze_effect),
        (MoveEffectKind::Sleep, apply_sleep_effect),
        (MoveEffectKind::Flinch, apply_flinch_effect),
        (MoveEffectKind::StatChange, apply_stat_change_effect),
        (MoveEffectKind::Recoil, apply_recoil_effect),
        (MoveEffectKind::Drain, apply_drain_effect),
        (MoveEffectKind::Heal, apply_heal_effect),
        (MoveEffectKind::MultiHit, apply_multi_hit_effect),
        (MoveEffectKind::Protect, apply_protect_effect),
        (MoveEffectKind::Decoy, apply_decoy_effect),
        (MoveEffectKind::LeechSeed, apply_leech_seed_effect),
        (MoveEffectKind::SetWeather, apply_weather_effect),
        (MoveEffectKind::SetTerrain, apply_terrain_effect),
        (MoveEffectKind::SetHazard, apply_hazard_effect),
        (MoveEffectKind::SetSideCondition, apply_side_condition_effect),
    ];

    for (kind, handler) in handlers {
        registry.register(EffectKind::Move(kind), TriggerKind::MoveEffect, handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_move_effect_kind_has_a_handler() {
        let mut registry = HandlerRegistry::new();
        register(&mut registry);
        assert_eq!(registry.len(), MoveEffectKind::iter().count());
    }
}

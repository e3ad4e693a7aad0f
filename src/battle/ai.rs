//! A scoring decision provider for computer-controlled sides.

use async_trait::async_trait;
use ordered_float::OrderedFloat;
use schema::{EffectTarget, MoveData, MoveEffect, MoveTarget, StatType};

use crate::battle::calculators::type_multiplier;
use crate::battle::decision::DecisionProvider;
use crate::battle::move_effects::can_receive_status;
use crate::battle::state::{BattleState, SlotRef};
use crate::battle::stats::effective_attack;
use crate::catalog::Catalog;
use crate::errors::{BattleEngineError, BattleResult};
use crate::player::PlayerAction;
use crate::pokemon::StatusCondition;

/// Picks the move with the best expected value against the foes on the field.
///
/// Scores are deterministic for a given state, so a seeded battle between
/// two scoring sides replays identically.
pub struct ScoringAI {
    catalog: Catalog,
}

impl ScoringAI {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Assigns a value to using `move_data` from `user` against `target`.
    /// Negative scores mean the move is pointless right now.
    fn score_move(&self, state: &BattleState, user: SlotRef, target: SlotRef, move_data: &MoveData) -> f32 {
        let Some(attacker) = state.active(user) else {
            return -1.0;
        };
        let defender = state.active(target);

        // Damage: base power scaled by effectiveness, STAB and the attacking stat.
        let mut damage_score = 0.0;
        if move_data.is_damaging() && defender.is_some() {
            let effectiveness = type_multiplier(state, target, move_data);
            if effectiveness < 0.1 {
                return -1.0;
            }
            let stab = if state.effective_types(user).contains(&move_data.move_type) {
                1.5
            } else {
                1.0
            };
            let level_scalar = (attacker.level as f32 * 2.0).max(1.0);
            let normalized_power = effective_attack(state, user, move_data) as f32 / level_scalar;
            let power = move_data.power.unwrap_or(0) as f32;
            damage_score = power * effectiveness * stab * normalized_power;
        }

        let mut utility_score = 0.0;
        for effect in &move_data.effects {
            utility_score += self.score_effect(state, user, target, effect);
        }

        if !move_data.is_damaging() && utility_score < 1.0 {
            return -1.0;
        }

        let mut final_score = damage_score + utility_score;
        if move_data.is_damaging() {
            // Sure-hit moves get a slight edge.
            let accuracy = move_data.accuracy.unwrap_or(101);
            final_score *= accuracy as f32 / 100.0;
        }
        final_score
    }

    fn score_effect(&self, state: &BattleState, user: SlotRef, target: SlotRef, effect: &MoveEffect) -> f32 {
        let stage = |slot: SlotRef, stat: StatType| {
            state.slot(slot).map_or(0, |slot_state| slot_state.get_stat_stage(stat))
        };
        let status_value = |status: StatusCondition, chance: u8| {
            if can_receive_status(state, target, status) {
                45.0 * (chance as f32 / 100.0)
            } else {
                0.0
            }
        };

        match effect {
            MoveEffect::StatChange(EffectTarget::User, stat, stages, chance) if *stages > 0 => {
                let current = stage(user, *stat);
                if current >= 6 {
                    return 0.0;
                }
                let potential_gain = 1.0 - (current as f32 / 6.0);
                20.0 * (*stages as f32) * potential_gain * (*chance as f32 / 100.0)
            }
            MoveEffect::StatChange(EffectTarget::Target, stat, stages, chance) if *stages < 0 => {
                if stage(target, *stat) <= -6 {
                    return 0.0;
                }
                15.0 * (stages.unsigned_abs() as f32) * (*chance as f32 / 100.0)
            }
            MoveEffect::Burn(chance) => status_value(StatusCondition::Burn, *chance),
            MoveEffect::Paralyze(chance) => status_value(StatusCondition::Paralysis, *chance),
            MoveEffect::Poison(chance) => status_value(StatusCondition::Poison, *chance),
            MoveEffect::BadlyPoison(chance) => status_value(StatusCondition::BadlyPoisoned(1), *chance),
            MoveEffect::Freeze(chance) => status_value(StatusCondition::Freeze, *chance),
            MoveEffect::Sleep(chance) => status_value(StatusCondition::Sleep(1), *chance),
            MoveEffect::Flinch(chance) => 30.0 * (*chance as f32 / 100.0),
            MoveEffect::Heal(_) => {
                let hp = state.active(user).map_or(1.0, |combatant| combatant.hp_fraction());
                if hp < 0.5 {
                    60.0 * (1.0 - hp)
                } else {
                    0.0
                }
            }
            MoveEffect::SetWeather(weather) if state.weather() != Some(*weather) => 10.0,
            MoveEffect::SetTerrain(terrain) if state.terrain() != Some(*terrain) => 10.0,
            MoveEffect::SetHazard(hazard) => {
                if state.side(user.side.opponent()).hazard_layers(*hazard) == 0 {
                    12.0
                } else {
                    0.0
                }
            }
            MoveEffect::SetSideCondition(condition) if !state.side(user.side).has_condition(*condition) => 10.0,
            _ => 0.0,
        }
    }
}

#[async_trait]
impl DecisionProvider for ScoringAI {
    async fn choose_action(&self, state: &BattleState, slot: SlotRef) -> BattleResult<PlayerAction> {
        let combatant = state.active(slot).ok_or(BattleEngineError::InvalidSlot(slot))?;
        let foes = state.active_foes_of(slot);

        let mut best: Option<(PlayerAction, OrderedFloat<f32>)> = None;
        for (move_index, instance) in combatant.moves.iter().enumerate() {
            if instance.pp == 0 {
                continue;
            }
            let move_data = self.catalog.move_data(instance.move_)?;
            let candidates: Vec<Option<SlotRef>> = match move_data.target {
                MoveTarget::SingleFoe => foes.iter().copied().map(Some).collect(),
                _ => vec![None],
            };
            for target in candidates {
                let scored_against = target.or_else(|| foes.first().copied()).unwrap_or(slot);
                let score = OrderedFloat(self.score_move(state, slot, scored_against, move_data));
                if best.as_ref().map_or(true, |(_, top)| score > *top) {
                    best = Some((PlayerAction::UseMove { move_index, target }, score));
                }
            }
        }

        // Only bail out when every move is useless and someone healthier waits.
        if let Some((action, score)) = best {
            if score.0 >= 0.0 {
                return Ok(action);
            }
            let side = state.side(slot.side);
            let healthiest = side
                .bench_candidates()
                .into_iter()
                .max_by_key(|index| OrderedFloat(side.party[*index].hp_fraction()));
            return Ok(match healthiest {
                Some(party_index) => PlayerAction::SwitchCombatant { party_index },
                None => action,
            });
        }

        Ok(PlayerAction::UseMove {
            move_index: 0,
            target: foes.first().copied(),
        })
    }

    async fn select_replacement(
        &self,
        state: &BattleState,
        slot: SlotRef,
        candidates: &[usize],
    ) -> BattleResult<Option<usize>> {
        let side = state.side(slot.side);
        Ok(candidates
            .iter()
            .copied()
            .filter(|index| side.party.get(*index).is_some())
            .max_by_key(|index| OrderedFloat(side.party[*index].hp_fraction())))
    }
}

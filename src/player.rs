use schema::{Hazard, Move, SideCondition, StatType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::battle::conditions::{VolatileCondition, VolatileKind};
use crate::battle::state::SlotRef;
use crate::pokemon::Combatant;

/// The choice a decision provider makes for one slot in one turn.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum PlayerAction {
    // The index refers to the move's position in the active combatant's move list.
    UseMove {
        move_index: usize,
        target: Option<SlotRef>,
    },

    // The index refers to the combatant's position in the party.
    SwitchCombatant { party_index: usize },
}

/// A trainer's roster as handed to the engine.
#[derive(Debug, Clone)]
pub struct Party {
    pub trainer: String,
    pub members: Vec<Combatant>,
}

impl Party {
    pub fn new(trainer: impl Into<String>, members: Vec<Combatant>) -> Self {
        Self {
            trainer: trainer.into(),
            members,
        }
    }
}

/// One damage instance a slot received this turn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRecord {
    pub attacker: SlotRef,
    pub move_: Move,
    pub damage: u16,
}

/// Per-turn damage-tracking flags; reset at turn start and on switch.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DamageTracking {
    pub damage_taken: u16,
    pub hits: Vec<HitRecord>,
    pub acted: bool,
}

impl DamageTracking {
    /// Total damage dealt to this slot by one attacker's move this turn.
    pub fn damage_from(&self, attacker: SlotRef, move_: Move) -> u16 {
        self.hits
            .iter()
            .filter(|hit| hit.attacker == attacker && hit.move_ == move_)
            .map(|hit| hit.damage)
            .sum()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SlotState {
    // Index into the side's party of whoever stands here. Fainted occupants
    // stay referenced until they are replaced.
    pub occupant: Option<usize>,

    // Stage is -6 to +6.
    pub stat_stages: HashMap<StatType, i8>,

    pub volatiles: HashMap<VolatileKind, VolatileCondition>,

    pub tracking: DamageTracking,

    pub last_move: Option<Move>,
}

impl SlotState {
    pub fn get_stat_stage(&self, stat: StatType) -> i8 {
        self.stat_stages.get(&stat).copied().unwrap_or(0)
    }

    /// Apply a stage delta, clamped to -6..=6. Returns the change that actually happened.
    pub fn modify_stat_stage(&mut self, stat: StatType, delta: i8) -> i8 {
        let current = self.get_stat_stage(stat);
        let new_stage = (current + delta).clamp(-6, 6);
        if new_stage == 0 {
            self.stat_stages.remove(&stat);
        } else {
            self.stat_stages.insert(stat, new_stage);
        }
        new_stage - current
    }

    pub fn add_volatile(&mut self, condition: VolatileCondition) {
        self.volatiles.insert(condition.kind(), condition);
    }

    pub fn remove_volatile(&mut self, kind: VolatileKind) -> Option<VolatileCondition> {
        self.volatiles.remove(&kind)
    }

    /// Forget everything tied to the previous occupant.
    pub fn clear_battle_attributes(&mut self) {
        self.stat_stages.clear();
        self.volatiles.clear();
        self.tracking = DamageTracking::default();
        self.last_move = None;
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BattleSide {
    pub trainer: String,

    pub party: Vec<Combatant>,

    pub slots: Vec<SlotState>,

    // Value is turns remaining.
    pub conditions: HashMap<SideCondition, u8>,

    // Value is layers laid.
    pub hazards: HashMap<Hazard, u8>,
}

impl BattleSide {
    pub fn new(party: Party, slot_count: usize) -> Self {
        Self {
            trainer: party.trainer,
            party: party.members,
            slots: (0..slot_count).map(|_| SlotState::default()).collect(),
            conditions: HashMap::new(),
            hazards: HashMap::new(),
        }
    }

    /// Whether a party member currently stands in any slot.
    pub fn is_on_field(&self, party_index: usize) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.occupant == Some(party_index))
    }

    /// Party members that could be sent in: healthy and not already on the field.
    pub fn bench_candidates(&self) -> Vec<usize> {
        self.party
            .iter()
            .enumerate()
            .filter(|(index, combatant)| !combatant.is_fainted() && !self.is_on_field(*index))
            .map(|(index, _)| index)
            .collect()
    }

    /// Slot indices that are empty or hold a fainted combatant.
    pub fn vacant_slots(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| match slot.occupant {
                None => true,
                Some(index) => self.party.get(index).map_or(true, |c| c.is_fainted()),
            })
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_defeated(&self) -> bool {
        self.party.iter().all(|combatant| combatant.is_fainted())
    }

    pub fn remaining(&self) -> usize {
        self.party.iter().filter(|c| !c.is_fainted()).count()
    }

    pub fn has_condition(&self, condition: SideCondition) -> bool {
        self.conditions.contains_key(&condition)
    }

    pub fn hazard_layers(&self, hazard: Hazard) -> u8 {
        self.hazards.get(&hazard).copied().unwrap_or(0)
    }

    /// Decrements every side condition, returning those that expired.
    pub fn tick_conditions(&mut self) -> Vec<SideCondition> {
        let mut expired = Vec::new();
        for (condition, turns) in self.conditions.iter_mut() {
            *turns = turns.saturating_sub(1);
            if *turns == 0 {
                expired.push(*condition);
            }
        }
        expired.sort_by_key(|condition| *condition as u8);
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokemon::{MoveInstance, StatBlock};
    use pretty_assertions::assert_eq;
    use schema::PokemonType;

    fn member(name: &str) -> Combatant {
        Combatant::new(
            name,
            50,
            vec![PokemonType::Normal],
            StatBlock::new(100, 50, 50, 50, 50, 50),
            vec![MoveInstance::new(Move::Tackle, 10)],
        )
    }

    #[test]
    fn stat_stages_clamp_and_report_actual_change() {
        let mut slot = SlotState::default();
        assert_eq!(slot.modify_stat_stage(StatType::Atk, 4), 4);
        assert_eq!(slot.modify_stat_stage(StatType::Atk, 4), 2);
        assert_eq!(slot.get_stat_stage(StatType::Atk), 6);
        assert_eq!(slot.modify_stat_stage(StatType::Atk, -6), -6);
        assert!(slot.stat_stages.is_empty());
    }

    #[test]
    fn bench_excludes_fielded_and_fainted_members() {
        let mut fainted = member("C");
        fainted.take_damage(100);
        let mut side = BattleSide::new(Party::new("Red", vec![member("A"), member("B"), fainted]), 1);
        side.slots[0].occupant = Some(0);

        assert_eq!(side.bench_candidates(), vec![1]);
        assert!(side.vacant_slots().is_empty());
        assert!(!side.is_defeated());
    }

    #[test]
    fn side_conditions_expire() {
        let mut side = BattleSide::new(Party::new("Red", vec![member("A")]), 1);
        side.conditions.insert(SideCondition::Reflect, 2);
        side.conditions.insert(SideCondition::Tailwind, 1);

        assert_eq!(side.tick_conditions(), vec![SideCondition::Tailwind]);
        side.conditions.remove(&SideCondition::Tailwind);
        assert_eq!(side.tick_conditions(), vec![SideCondition::Reflect]);
    }
}

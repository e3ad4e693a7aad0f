use schema::{PokemonType, Terrain, Weather};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::battle::conditions::{VolatileCondition, VolatileKind};
use crate::errors::{BattleEngineError, BattleResult};
use crate::player::{BattleSide, SlotState};
use crate::pokemon::Combatant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SideId {
    Player1,
    Player2,
}

impl SideId {
    pub const BOTH: [SideId; 2] = [SideId::Player1, SideId::Player2];

    pub fn to_index(self) -> usize {
        match self {
            SideId::Player1 => 0,
            SideId::Player2 => 1,
        }
    }

    pub fn opponent(self) -> SideId {
        match self {
            SideId::Player1 => SideId::Player2,
            SideId::Player2 => SideId::Player1,
        }
    }
}

/// A position on the field: one side plus a slot index on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotRef {
    pub side: SideId,
    pub index: usize,
}

impl SlotRef {
    pub fn new(side: SideId, index: usize) -> Self {
        Self { side, index }
    }

    pub fn is_ally_of(&self, other: SlotRef) -> bool {
        self.side == other.side
    }

    /// Adjacency on a line of slots: foes facing within one position, or a
    /// neighbouring ally.
    pub fn is_adjacent_to(&self, other: SlotRef) -> bool {
        if *self == other {
            return false;
        }
        let distance = self.index.abs_diff(other.index);
        if self.side == other.side {
            distance == 1
        } else {
            distance <= 1
        }
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            SideId::Player1 => "p1",
            SideId::Player2 => "p2",
        };
        write!(f, "{}:{}", side, self.index)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    WaitingForActions,
    TurnInProgress,
    Player1Win,
    Player2Win,
    Draw,
}

impl GameState {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            GameState::Player1Win | GameState::Player2Win | GameState::Draw
        )
    }
}

/// A field-wide effect with a remaining duration in turns.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timed<T> {
    pub kind: T,
    pub turns_remaining: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    pub weather: Option<Timed<Weather>>,
    pub terrain: Option<Timed<Terrain>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BattleState {
    pub sides: [BattleSide; 2],
    pub field: Field,
    pub turn_number: u32,
    pub game_state: GameState,
}

impl BattleState {
    pub fn new(player1: BattleSide, player2: BattleSide) -> Self {
        Self {
            sides: [player1, player2],
            field: Field::default(),
            turn_number: 0,
            game_state: GameState::WaitingForActions,
        }
    }

    pub fn side(&self, side: SideId) -> &BattleSide {
        &self.sides[side.to_index()]
    }

    pub fn side_mut(&mut self, side: SideId) -> &mut BattleSide {
        &mut self.sides[side.to_index()]
    }

    pub fn slot(&self, slot: SlotRef) -> Option<&SlotState> {
        self.side(slot.side).slots.get(slot.index)
    }

    pub fn slot_mut(&mut self, slot: SlotRef) -> Option<&mut SlotState> {
        self.side_mut(slot.side).slots.get_mut(slot.index)
    }

    pub fn check_slot(&self, slot: SlotRef) -> BattleResult<()> {
        match self.slot(slot) {
            Some(_) => Ok(()),
            None => Err(BattleEngineError::InvalidSlot(slot)),
        }
    }

    /// The combatant referenced by a slot, fainted or not.
    pub fn combatant(&self, slot: SlotRef) -> Option<&Combatant> {
        let side = self.side(slot.side);
        let occupant = side.slots.get(slot.index)?.occupant?;
        side.party.get(occupant)
    }

    pub fn combatant_mut(&mut self, slot: SlotRef) -> Option<&mut Combatant> {
        let side = self.side_mut(slot.side);
        let occupant = side.slots.get(slot.index)?.occupant?;
        side.party.get_mut(occupant)
    }

    /// The combatant in a slot, only if it can still fight.
    pub fn active(&self, slot: SlotRef) -> Option<&Combatant> {
        self.combatant(slot).filter(|combatant| !combatant.is_fainted())
    }

    pub fn is_active(&self, slot: SlotRef) -> bool {
        self.active(slot).is_some()
    }

    pub fn name_of(&self, slot: SlotRef) -> String {
        self.combatant(slot)
            .map(|combatant| combatant.name.clone())
            .unwrap_or_else(|| format!("empty slot {}", slot))
    }

    pub fn slot_refs(&self, side: SideId) -> Vec<SlotRef> {
        (0..self.side(side).slots.len())
            .map(|index| SlotRef::new(side, index))
            .collect()
    }

    /// Every slot on the field, Player 1 first.
    pub fn all_slot_refs(&self) -> Vec<SlotRef> {
        SideId::BOTH
            .iter()
            .flat_map(|side| self.slot_refs(*side))
            .collect()
    }

    /// Every slot holding a combatant that can still fight.
    pub fn active_slots(&self) -> Vec<SlotRef> {
        self.all_slot_refs()
            .into_iter()
            .filter(|slot| self.is_active(*slot))
            .collect()
    }

    pub fn active_foes_of(&self, slot: SlotRef) -> Vec<SlotRef> {
        self.slot_refs(slot.side.opponent())
            .into_iter()
            .filter(|foe| self.is_active(*foe))
            .collect()
    }

    pub fn has_volatile(&self, slot: SlotRef, kind: VolatileKind) -> bool {
        self.slot(slot)
            .is_some_and(|slot_state| slot_state.volatiles.contains_key(&kind))
    }

    pub fn volatile(&self, slot: SlotRef, kind: VolatileKind) -> Option<&VolatileCondition> {
        self.slot(slot)?.volatiles.get(&kind)
    }

    /// Types used for STAB and effectiveness, honouring a type change.
    pub fn effective_types(&self, slot: SlotRef) -> Vec<PokemonType> {
        if let Some(VolatileCondition::TypeChange { pokemon_type }) =
            self.volatile(slot, VolatileKind::TypeChange)
        {
            return vec![*pokemon_type];
        }
        self.combatant(slot)
            .map(|combatant| combatant.types.clone())
            .unwrap_or_default()
    }

    pub fn weather(&self) -> Option<Weather> {
        self.field.weather.map(|timed| timed.kind)
    }

    pub fn terrain(&self) -> Option<Terrain> {
        self.field.terrain.map(|timed| timed.kind)
    }

    /// Decide the battle if one or both sides have nobody left to fight.
    pub fn check_outcome(&self) -> Option<GameState> {
        let p1_out = self.side(SideId::Player1).is_defeated();
        let p2_out = self.side(SideId::Player2).is_defeated();
        match (p1_out, p2_out) {
            (true, true) => Some(GameState::Draw),
            (true, false) => Some(GameState::Player2Win),
            (false, true) => Some(GameState::Player1Win),
            (false, false) => None,
        }
    }
}

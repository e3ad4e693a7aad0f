use async_trait::async_trait;
use schema::{Ability, Item, Move, PokemonType};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use crate::battle::action::BattleAction;
use crate::battle::decision::DecisionProvider;
use crate::battle::messages::BattleMessage;
use crate::battle::presentation::PresentationSink;
use crate::battle::state::{BattleState, SideId, SlotRef};
use crate::catalog::Catalog;
use crate::errors::{BattleEngineError, BattleResult};
use crate::player::{BattleSide, Party, PlayerAction};
use crate::pokemon::{Combatant, MoveInstance, StatBlock, StatusCondition};
use crate::random::ScriptedRandom;

pub const P1: SlotRef = SlotRef {
    side: SideId::Player1,
    index: 0,
};
pub const P2: SlotRef = SlotRef {
    side: SideId::Player2,
    index: 0,
};

/// A builder for test combatants with flat, predictable stats.
///
/// Defaults are level 50, 100 HP, 50 in every other stat and a single Tackle.
///
/// # Example
/// ```ignore
/// let combatant = TestCombatantBuilder::new("Pikachu", PokemonType::Electric)
///     .with_moves(vec![Move::Thunderbolt])
///     .with_status(StatusCondition::Paralysis)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    name: String,
    level: u8,
    types: Vec<PokemonType>,
    stats: StatBlock,
    moves: Vec<Move>,
    status: Option<StatusCondition>,
    ability: Option<Ability>,
    item: Option<Item>,
    current_hp: Option<u16>,
}

impl TestCombatantBuilder {
    pub fn new(name: &str, pokemon_type: PokemonType) -> Self {
        Self {
            name: name.to_string(),
            level: 50,
            types: vec![pokemon_type],
            stats: StatBlock::new(100, 50, 50, 50, 50, 50),
            moves: vec![Move::Tackle],
            status: None,
            ability: None,
            item: None,
            current_hp: None,
        }
    }

    /// PP for each move is taken from the standard catalog.
    pub fn with_moves(mut self, moves: Vec<Move>) -> Self {
        self.moves = moves;
        self
    }

    pub fn with_types(mut self, types: Vec<PokemonType>) -> Self {
        self.types = types;
        self
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn with_stats(mut self, stats: StatBlock) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_speed(mut self, speed: u16) -> Self {
        self.stats.speed = speed;
        self
    }

    pub fn with_status(mut self, status: StatusCondition) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = Some(ability);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.item = Some(item);
        self
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn build(self) -> Combatant {
        let catalog = Catalog::standard();
        let moves = self
            .moves
            .into_iter()
            .map(|move_| {
                let pp = catalog.move_data(move_).map_or(10, |data| data.max_pp);
                MoveInstance::new(move_, pp)
            })
            .collect();

        let mut combatant = Combatant::new(self.name, self.level, self.types, self.stats, moves);
        combatant.status = self.status;
        combatant.ability = self.ability;
        combatant.item = self.item;
        if let Some(hp) = self.current_hp {
            combatant.set_hp(hp);
        }
        combatant
    }
}

fn side_with_leads(trainer: &str, members: Vec<Combatant>, slot_count: usize) -> BattleSide {
    let occupied = slot_count.min(members.len());
    let mut side = BattleSide::new(Party::new(trainer, members), slot_count);
    for index in 0..occupied {
        side.slots[index].occupant = Some(index);
    }
    side
}

/// A singles battle with each party's first member already on the field.
pub fn create_test_battle(p1_party: Vec<Combatant>, p2_party: Vec<Combatant>) -> BattleState {
    BattleState::new(
        side_with_leads("Player 1", p1_party, 1),
        side_with_leads("Player 2", p2_party, 1),
    )
}

/// A doubles battle with each party's first two members on the field.
pub fn create_doubles_battle(p1_party: Vec<Combatant>, p2_party: Vec<Combatant>) -> BattleState {
    BattleState::new(
        side_with_leads("Player 1", p1_party, 2),
        side_with_leads("Player 2", p2_party, 2),
    )
}

/// A scripted source returning 50 forever: no critical hits, no 50%-or-less
/// chance gates, and a damage roll of 87.
pub fn predictable_rng() -> ScriptedRandom {
    ScriptedRandom::constant(50)
}

/// A decision provider that replays queued choices per slot.
///
/// Slots with nothing queued use their first move on the default target.
/// Slots marked as failing return an error every time they are asked.
#[derive(Default)]
pub struct ScriptedProvider {
    actions: Mutex<HashMap<SlotRef, VecDeque<PlayerAction>>>,
    replacements: Mutex<HashMap<SlotRef, VecDeque<usize>>>,
    failing: HashSet<SlotRef>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action(self, slot: SlotRef, action: PlayerAction) -> Self {
        lock(&self.actions).entry(slot).or_default().push_back(action);
        self
    }

    pub fn with_move(self, slot: SlotRef, move_index: usize) -> Self {
        self.with_action(
            slot,
            PlayerAction::UseMove {
                move_index,
                target: None,
            },
        )
    }

    pub fn with_replacement(self, slot: SlotRef, party_index: usize) -> Self {
        lock(&self.replacements)
            .entry(slot)
            .or_default()
            .push_back(party_index);
        self
    }

    pub fn failing_for(mut self, slot: SlotRef) -> Self {
        self.failing.insert(slot);
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[async_trait]
impl DecisionProvider for ScriptedProvider {
    async fn choose_action(&self, _state: &BattleState, slot: SlotRef) -> BattleResult<PlayerAction> {
        if self.failing.contains(&slot) {
            return Err(BattleEngineError::DecisionFailed {
                slot,
                reason: "scripted failure".to_string(),
            });
        }
        let queued = lock(&self.actions)
            .get_mut(&slot)
            .and_then(|queue| queue.pop_front());
        Ok(queued.unwrap_or(PlayerAction::UseMove {
            move_index: 0,
            target: None,
        }))
    }

    async fn select_replacement(
        &self,
        _state: &BattleState,
        slot: SlotRef,
        _candidates: &[usize],
    ) -> BattleResult<Option<usize>> {
        Ok(lock(&self.replacements)
            .get_mut(&slot)
            .and_then(|queue| queue.pop_front()))
    }
}

/// Keeps every action it was asked to present.
#[derive(Default)]
pub struct RecordingPresenter {
    presented: Mutex<Vec<BattleAction>>,
}

impl RecordingPresenter {
    pub fn actions(&self) -> Vec<BattleAction> {
        lock(&self.presented).clone()
    }

    pub fn messages(&self) -> Vec<BattleMessage> {
        self.actions()
            .into_iter()
            .filter_map(|action| match action {
                BattleAction::EmitMessage(message) => Some(message),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PresentationSink for RecordingPresenter {
    async fn present(&self, action: &BattleAction, _state: &BattleState) {
        lock(&self.presented).push(action.clone());
    }
}

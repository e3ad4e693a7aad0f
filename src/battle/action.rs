//! The closed set of executable battle actions.
//!
//! Each variant owns its parameters and knows how to apply itself to a
//! [`BattleState`]. Resolution is synchronous and returns the reactions it
//! caused; presentation is the only asynchronous step and never touches state.

use async_trait::async_trait;
use schema::{Ability, Hazard, Item, Move, SideCondition, StatType, Terrain, Weather};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use tracing::warn;

use crate::battle::action_queue::Resolvable;
use crate::battle::calculators::Effectiveness;
use crate::battle::conditions::{VolatileCondition, VolatileKind};
use crate::battle::messages::BattleMessage;
use crate::battle::presentation::PresentationSink;
use crate::battle::state::{BattleState, SideId, SlotRef, Timed};
use crate::player::HitRecord;
use crate::pokemon::StatusCondition;

/// Where a damage instance came from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum DamageSource {
    Move {
        user: SlotRef,
        move_: Move,
        contact: bool,
        critical: bool,
        effectiveness: Effectiveness,
    },
    Recoil,
    Status(StatusCondition),
    Weather(Weather),
    Hazard(Hazard),
    Ability { owner: SlotRef, ability: Ability },
    Item(Item),
    LeechSeed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, IntoStaticStr)]
pub enum BattleAction {
    UseMove {
        user: SlotRef,
        move_: Move,
        targets: Vec<SlotRef>,
    },
    ApplyDamage {
        target: SlotRef,
        amount: u16,
        source: DamageSource,
    },
    ApplyHeal {
        target: SlotRef,
        amount: u16,
    },
    ApplyStatus {
        target: SlotRef,
        status: StatusCondition,
    },
    CureStatus {
        target: SlotRef,
    },
    /// Advance a status counter: toxic grows, sleep shortens.
    TickStatus {
        target: SlotRef,
    },
    ChangeStat {
        target: SlotRef,
        stat: StatType,
        stages: i8,
    },
    AddVolatile {
        target: SlotRef,
        condition: VolatileCondition,
    },
    RemoveVolatile {
        target: SlotRef,
        kind: VolatileKind,
    },
    Switch {
        side: SideId,
        slot: usize,
        party_index: usize,
    },
    SetWeather {
        weather: Weather,
        turns: u8,
    },
    ClearWeather,
    SetTerrain {
        terrain: Terrain,
        turns: u8,
    },
    ClearTerrain,
    SetSideCondition {
        side: SideId,
        condition: SideCondition,
        turns: u8,
    },
    RemoveSideCondition {
        side: SideId,
        condition: SideCondition,
    },
    AddHazard {
        side: SideId,
        hazard: Hazard,
    },
    ConsumeItem {
        target: SlotRef,
    },
    /// Tick every timed field, side and single-turn effect down by one turn.
    AdvanceDurations,
    MoveAnimation {
        user: SlotRef,
        move_: Move,
        targets: Vec<SlotRef>,
    },
    EmitMessage(BattleMessage),
}

impl BattleAction {
    pub fn message(message: BattleMessage) -> Self {
        BattleAction::EmitMessage(message)
    }

    /// Short variant name, used for statistics and logs.
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// The text a plain-text presenter shows for this action.
    pub fn describe(&self) -> Option<String> {
        match self {
            BattleAction::EmitMessage(message) => Some(message.to_string()),
            _ => None,
        }
    }

    pub fn is_weather_change(&self) -> bool {
        matches!(
            self,
            BattleAction::SetWeather { .. } | BattleAction::ClearWeather
        )
    }

    fn apply(&self, state: &mut BattleState) -> Vec<BattleAction> {
        match self {
            BattleAction::UseMove { user, move_, .. } => resolve_use_move(state, *user, *move_),
            BattleAction::ApplyDamage {
                target,
                amount,
                source,
            } => resolve_damage(state, *target, *amount, source),
            BattleAction::ApplyHeal { target, amount } => {
                let name = state.name_of(*target);
                let healed = state
                    .combatant_mut(*target)
                    .map_or(0, |combatant| combatant.heal(*amount));
                if healed == 0 {
                    return vec![];
                }
                vec![BattleAction::message(BattleMessage::Healed { target: name })]
            }
            BattleAction::ApplyStatus { target, status } => {
                let name = state.name_of(*target);
                let Some(combatant) = state.combatant_mut(*target) else {
                    return vec![];
                };
                if combatant.is_fainted() {
                    return vec![];
                }
                if combatant.status.is_some() {
                    return vec![BattleAction::message(BattleMessage::StatusUnchanged {
                        target: name,
                    })];
                }
                combatant.status = Some(*status);
                vec![BattleAction::message(BattleMessage::StatusApplied {
                    target: name,
                    status: *status,
                })]
            }
            BattleAction::CureStatus { target } => {
                let name = state.name_of(*target);
                let cured = state
                    .combatant_mut(*target)
                    .and_then(|combatant| combatant.status.take());
                match cured {
                    Some(status) => vec![BattleAction::message(BattleMessage::StatusCured {
                        target: name,
                        status,
                    })],
                    None => vec![],
                }
            }
            BattleAction::TickStatus { target } => {
                if let Some(combatant) = state.combatant_mut(*target) {
                    combatant.status = match combatant.status {
                        Some(StatusCondition::BadlyPoisoned(counter)) => {
                            Some(StatusCondition::BadlyPoisoned(counter.saturating_add(1).min(15)))
                        }
                        Some(StatusCondition::Sleep(turns)) => {
                            Some(StatusCondition::Sleep(turns.saturating_sub(1)))
                        }
                        other => other,
                    };
                }
                vec![]
            }
            BattleAction::ChangeStat {
                target,
                stat,
                stages,
            } => {
                if !state.is_active(*target) {
                    return vec![];
                }
                let name = state.name_of(*target);
                let Some(slot) = state.slot_mut(*target) else {
                    return vec![];
                };
                let delta = slot.modify_stat_stage(*stat, *stages);
                let message = if delta == 0 {
                    BattleMessage::StatUnchanged {
                        target: name,
                        stat: *stat,
                        rising: *stages > 0,
                    }
                } else {
                    BattleMessage::StatChanged {
                        target: name,
                        stat: *stat,
                        delta,
                    }
                };
                vec![BattleAction::message(message)]
            }
            BattleAction::AddVolatile { target, condition } => {
                if !state.is_active(*target) {
                    return vec![];
                }
                let name = state.name_of(*target);
                if let Some(slot) = state.slot_mut(*target) {
                    slot.add_volatile(condition.clone());
                }
                let message = match condition {
                    VolatileCondition::Protected => BattleMessage::Protecting { target: name },
                    VolatileCondition::Decoy => BattleMessage::CenterOfAttention { target: name },
                    VolatileCondition::Seeded { .. } => BattleMessage::Seeded { target: name },
                    VolatileCondition::TypeChange { pokemon_type } => BattleMessage::TypeChanged {
                        target: name,
                        pokemon_type: *pokemon_type,
                    },
                    VolatileCondition::Flinched { .. } => return vec![],
                };
                vec![BattleAction::message(message)]
            }
            BattleAction::RemoveVolatile { target, kind } => {
                if let Some(slot) = state.slot_mut(*target) {
                    slot.remove_volatile(*kind);
                }
                vec![]
            }
            BattleAction::Switch {
                side,
                slot,
                party_index,
            } => resolve_switch(state, *side, *slot, *party_index),
            BattleAction::SetWeather { weather, turns } => {
                if state.weather() == Some(*weather) {
                    return vec![BattleAction::message(BattleMessage::Failed)];
                }
                state.field.weather = Some(Timed {
                    kind: *weather,
                    turns_remaining: *turns,
                });
                vec![BattleAction::message(BattleMessage::WeatherStarted {
                    weather: *weather,
                })]
            }
            BattleAction::ClearWeather => match state.field.weather.take() {
                Some(timed) => vec![BattleAction::message(BattleMessage::WeatherEnded {
                    weather: timed.kind,
                })],
                None => vec![],
            },
            BattleAction::SetTerrain { terrain, turns } => {
                if state.terrain() == Some(*terrain) {
                    return vec![BattleAction::message(BattleMessage::Failed)];
                }
                state.field.terrain = Some(Timed {
                    kind: *terrain,
                    turns_remaining: *turns,
                });
                vec![BattleAction::message(BattleMessage::TerrainStarted {
                    terrain: *terrain,
                })]
            }
            BattleAction::ClearTerrain => match state.field.terrain.take() {
                Some(timed) => vec![BattleAction::message(BattleMessage::TerrainEnded {
                    terrain: timed.kind,
                })],
                None => vec![],
            },
            BattleAction::SetSideCondition {
                side,
                condition,
                turns,
            } => {
                let battle_side = state.side_mut(*side);
                if battle_side.has_condition(*condition) {
                    return vec![BattleAction::message(BattleMessage::Failed)];
                }
                battle_side.conditions.insert(*condition, *turns);
                vec![BattleAction::message(BattleMessage::SideConditionStarted {
                    trainer: battle_side.trainer.clone(),
                    condition: *condition,
                })]
            }
            BattleAction::RemoveSideCondition { side, condition } => {
                let battle_side = state.side_mut(*side);
                match battle_side.conditions.remove(condition) {
                    Some(_) => vec![BattleAction::message(BattleMessage::SideConditionEnded {
                        trainer: battle_side.trainer.clone(),
                        condition: *condition,
                    })],
                    None => vec![],
                }
            }
            BattleAction::AddHazard { side, hazard } => {
                let battle_side = state.side_mut(*side);
                let layers = battle_side.hazard_layers(*hazard);
                if layers >= hazard.max_layers() {
                    return vec![BattleAction::message(BattleMessage::Failed)];
                }
                battle_side.hazards.insert(*hazard, layers + 1);
                vec![BattleAction::message(BattleMessage::HazardSet {
                    trainer: battle_side.trainer.clone(),
                    hazard: *hazard,
                })]
            }
            BattleAction::ConsumeItem { target } => {
                let name = state.name_of(*target);
                let consumed = state
                    .combatant_mut(*target)
                    .and_then(|combatant| combatant.item.take());
                match consumed {
                    Some(item) => vec![BattleAction::message(BattleMessage::ItemConsumed {
                        owner: name,
                        item,
                    })],
                    None => vec![],
                }
            }
            BattleAction::AdvanceDurations => resolve_advance_durations(state),
            BattleAction::MoveAnimation { .. } | BattleAction::EmitMessage(_) => vec![],
        }
    }
}

fn resolve_use_move(state: &mut BattleState, user: SlotRef, move_: Move) -> Vec<BattleAction> {
    let name = state.name_of(user);
    if let Some(combatant) = state.combatant_mut(user) {
        if let Some(index) = combatant.move_slot(move_) {
            combatant.moves[index].use_move();
        }
    }
    if let Some(slot) = state.slot_mut(user) {
        slot.last_move = Some(move_);
        slot.tracking.acted = true;
    }
    vec![BattleAction::message(BattleMessage::MoveUsed {
        user: name,
        move_name: move_.to_string(),
    })]
}

fn resolve_damage(
    state: &mut BattleState,
    target: SlotRef,
    amount: u16,
    source: &DamageSource,
) -> Vec<BattleAction> {
    // A hit from an attacker that went down before its damage landed does nothing.
    if let DamageSource::Move { user, .. } = source {
        if !state.is_active(*user) {
            return vec![];
        }
    }
    if !state.is_active(target) {
        return vec![];
    }

    let name = state.name_of(target);
    let Some(combatant) = state.combatant_mut(target) else {
        return vec![];
    };
    let lost = combatant.take_damage(amount);
    let fainted = combatant.is_fainted();

    if let Some(slot) = state.slot_mut(target) {
        slot.tracking.damage_taken = slot.tracking.damage_taken.saturating_add(lost);
        if let DamageSource::Move { user, move_, .. } = source {
            slot.tracking.hits.push(HitRecord {
                attacker: *user,
                move_: *move_,
                damage: lost,
            });
        }
    }

    let mut reactions = Vec::new();
    match source {
        DamageSource::Move {
            critical,
            effectiveness,
            ..
        } => {
            if *critical {
                reactions.push(BattleAction::message(BattleMessage::CriticalHit));
            }
            if *effectiveness != Effectiveness::Normal {
                reactions.push(BattleAction::message(BattleMessage::Effectiveness {
                    target: name.clone(),
                    effectiveness: *effectiveness,
                }));
            }
            reactions.push(BattleAction::message(BattleMessage::DamageTaken {
                target: name.clone(),
                amount: lost,
            }));
        }
        DamageSource::Recoil => reactions.push(BattleAction::message(
            BattleMessage::RecoilDamage {
                target: name.clone(),
            },
        )),
        DamageSource::Status(status) => reactions.push(BattleAction::message(
            BattleMessage::StatusDamage {
                target: name.clone(),
                status: *status,
            },
        )),
        DamageSource::Weather(weather) => reactions.push(BattleAction::message(
            BattleMessage::WeatherDamage {
                target: name.clone(),
                weather: *weather,
            },
        )),
        DamageSource::Hazard(hazard) => reactions.push(BattleAction::message(
            BattleMessage::HazardDamage {
                target: name.clone(),
                hazard: *hazard,
            },
        )),
        DamageSource::LeechSeed => reactions.push(BattleAction::message(
            BattleMessage::SeedDrain {
                target: name.clone(),
            },
        )),
        DamageSource::Ability { .. } | DamageSource::Item(_) => {
            reactions.push(BattleAction::message(BattleMessage::DamageTaken {
                target: name.clone(),
                amount: lost,
            }))
        }
    }

    if fainted {
        reactions.push(BattleAction::message(BattleMessage::Fainted { name }));
    }
    reactions
}

fn resolve_switch(
    state: &mut BattleState,
    side: SideId,
    slot: usize,
    party_index: usize,
) -> Vec<BattleAction> {
    let battle_side = state.side_mut(side);
    let eligible = battle_side
        .party
        .get(party_index)
        .is_some_and(|combatant| !combatant.is_fainted())
        && !battle_side.is_on_field(party_index)
        && slot < battle_side.slots.len();
    if !eligible {
        warn!(?side, slot, party_index, "ignoring switch to an ineligible combatant");
        return vec![];
    }

    let trainer = battle_side.trainer.clone();
    let mut reactions = Vec::new();
    if let Some(previous) = battle_side.slots[slot].occupant {
        if let Some(outgoing) = battle_side.party.get(previous) {
            if !outgoing.is_fainted() {
                reactions.push(BattleAction::message(BattleMessage::Withdrew {
                    trainer: trainer.clone(),
                    name: outgoing.name.clone(),
                }));
            }
        }
    }

    let slot_state = &mut battle_side.slots[slot];
    slot_state.clear_battle_attributes();
    slot_state.occupant = Some(party_index);

    reactions.push(BattleAction::message(BattleMessage::SentOut {
        trainer,
        name: battle_side.party[party_index].name.clone(),
    }));
    reactions
}

fn resolve_advance_durations(state: &mut BattleState) -> Vec<BattleAction> {
    let mut reactions = Vec::new();

    for slot in state.all_slot_refs() {
        let Some(slot_state) = state.slot(slot) else {
            continue;
        };
        let mut expiring: Vec<VolatileKind> = slot_state
            .volatiles
            .values()
            .filter(|condition| condition.is_single_turn())
            .map(|condition| condition.kind())
            .collect();
        expiring.sort_by_key(|kind| *kind as u8);
        reactions.extend(
            expiring
                .into_iter()
                .map(|kind| BattleAction::RemoveVolatile { target: slot, kind }),
        );
    }

    for side in SideId::BOTH {
        for condition in state.side_mut(side).tick_conditions() {
            reactions.push(BattleAction::RemoveSideCondition { side, condition });
        }
    }

    if let Some(terrain) = state.field.terrain.as_mut() {
        terrain.turns_remaining = terrain.turns_remaining.saturating_sub(1);
        if terrain.turns_remaining == 0 {
            reactions.push(BattleAction::ClearTerrain);
        }
    }

    if let Some(weather) = state.field.weather.as_mut() {
        weather.turns_remaining = weather.turns_remaining.saturating_sub(1);
        if weather.turns_remaining == 0 {
            reactions.push(BattleAction::ClearWeather);
        }
    }

    reactions
}

#[async_trait]
impl Resolvable for BattleAction {
    fn resolve(&self, state: &mut BattleState) -> Vec<Self> {
        self.apply(state)
    }

    async fn present(&self, view: &dyn PresentationSink, state: &BattleState) {
        view.present(self, state).await;
    }
}

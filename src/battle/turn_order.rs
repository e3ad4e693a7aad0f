use ordered_float::OrderedFloat;
use std::cmp::Reverse;

use crate::battle::action::BattleAction;
use crate::battle::state::{BattleState, SlotRef};
use crate::battle::stats::effective_speed;
use crate::catalog::Catalog;
use crate::random::RandomSource;

// A helper struct local to this implementation detail.
#[derive(Debug, Clone, Copy)]
struct ActionPriority {
    action_priority: i8, // Switch: 6, Move: 0
    move_priority: i8,   // Priority from move data (e.g., Quick Attack)
    speed: f64,          // Effective speed of the acting slot
    tiebreak: f64,       // Random key; equal speeds never fall back to collection order
}

impl ActionPriority {
    fn sort_key(&self) -> (Reverse<i8>, Reverse<i8>, Reverse<OrderedFloat<f64>>, OrderedFloat<f64>) {
        (
            Reverse(self.action_priority),
            Reverse(self.move_priority),
            Reverse(OrderedFloat(self.speed)),
            OrderedFloat(self.tiebreak),
        )
    }
}

/// The slot an ordered action belongs to.
pub fn acting_slot(action: &BattleAction) -> Option<SlotRef> {
    match action {
        BattleAction::UseMove { user, .. } => Some(*user),
        BattleAction::Switch { side, slot, .. } => Some(SlotRef::new(*side, *slot)),
        _ => None,
    }
}

/// Orders a turn's actions by bracket, move priority and effective speed,
/// all descending. Each action draws one random tie-break key up front, so a
/// fixed seed always produces the same order.
pub fn sort_actions(
    actions: Vec<BattleAction>,
    state: &BattleState,
    catalog: &Catalog,
    rng: &mut dyn RandomSource,
) -> Vec<BattleAction> {
    let mut keyed: Vec<(ActionPriority, BattleAction)> = actions
        .into_iter()
        .map(|action| {
            let priority = calculate_action_priority(&action, state, catalog, rng);
            (priority, action)
        })
        .collect();

    keyed.sort_by_key(|(priority, _)| priority.sort_key());
    keyed.into_iter().map(|(_, action)| action).collect()
}

fn calculate_action_priority(
    action: &BattleAction,
    state: &BattleState,
    catalog: &Catalog,
    rng: &mut dyn RandomSource,
) -> ActionPriority {
    let speed = acting_slot(action).map_or(0.0, |slot| effective_speed(state, slot));
    let tiebreak = rng.next_float();
    match action {
        BattleAction::Switch { .. } => ActionPriority {
            action_priority: 6,
            move_priority: 0,
            speed,
            tiebreak,
        },
        BattleAction::UseMove { move_, .. } => ActionPriority {
            action_priority: 0,
            move_priority: catalog.move_data(*move_).map_or(0, |data| data.priority),
            speed,
            tiebreak,
        },
        _ => ActionPriority {
            action_priority: -1,
            move_priority: 0,
            speed,
            tiebreak,
        },
    }
}

/// Orders slots by effective speed, fastest first, with random tie-breaks.
pub fn sort_slots_by_speed(
    slots: Vec<SlotRef>,
    state: &BattleState,
    rng: &mut dyn RandomSource,
) -> Vec<SlotRef> {
    let mut keyed: Vec<(Reverse<OrderedFloat<f64>>, OrderedFloat<f64>, SlotRef)> = slots
        .into_iter()
        .map(|slot| {
            (
                Reverse(OrderedFloat(effective_speed(state, slot))),
                OrderedFloat(rng.next_float()),
                slot,
            )
        })
        .collect();
    keyed.sort_by_key(|(speed, tiebreak, _)| (*speed, *tiebreak));
    keyed.into_iter().map(|(_, _, slot)| slot).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{create_test_battle, TestCombatantBuilder, P1, P2};
    use crate::random::{ScriptedRandom, SeededRandom};
    use pretty_assertions::assert_eq;
    use schema::{Move, PokemonType};

    fn use_move(user: SlotRef, move_: Move) -> BattleAction {
        BattleAction::UseMove {
            user,
            move_,
            targets: vec![],
        }
    }

    fn speed_duel(p1_speed: u16, p2_speed: u16) -> BattleState {
        create_test_battle(
            vec![TestCombatantBuilder::new("One", PokemonType::Normal)
                .with_speed(p1_speed)
                .build()],
            vec![TestCombatantBuilder::new("Two", PokemonType::Normal)
                .with_speed(p2_speed)
                .build()],
        )
    }

    #[test]
    fn faster_slot_moves_first() {
        let state = speed_duel(40, 90);
        let catalog = Catalog::standard();
        let ordered = sort_actions(
            vec![use_move(P1, Move::Tackle), use_move(P2, Move::Tackle)],
            &state,
            &catalog,
            &mut ScriptedRandom::constant(0),
        );
        assert_eq!(acting_slot(&ordered[0]), Some(P2));
    }

    #[test]
    fn priority_beats_speed_and_switches_beat_priority() {
        let state = speed_duel(40, 90);
        let catalog = Catalog::standard();
        let switch = BattleAction::Switch {
            side: P2.side,
            slot: 0,
            party_index: 1,
        };
        let ordered = sort_actions(
            vec![
                use_move(P2, Move::Tackle),
                use_move(P1, Move::QuickAttack),
                switch.clone(),
            ],
            &state,
            &catalog,
            &mut ScriptedRandom::constant(0),
        );
        assert_eq!(ordered[0], switch);
        assert_eq!(ordered[1], use_move(P1, Move::QuickAttack));
        assert_eq!(ordered[2], use_move(P2, Move::Tackle));
    }

    #[test]
    fn speed_ties_use_the_random_key_not_collection_order() {
        let state = speed_duel(70, 70);
        let catalog = Catalog::standard();
        let actions = vec![use_move(P1, Move::Tackle), use_move(P2, Move::Tackle)];

        // P1 draws 0.9, P2 draws 0.1: the lower key goes first.
        let ordered = sort_actions(
            actions.clone(),
            &state,
            &catalog,
            &mut ScriptedRandom::new(vec![900, 100]),
        );
        assert_eq!(acting_slot(&ordered[0]), Some(P2));

        let ordered = sort_actions(
            actions,
            &state,
            &catalog,
            &mut ScriptedRandom::new(vec![100, 900]),
        );
        assert_eq!(acting_slot(&ordered[0]), Some(P1));
    }

    #[test]
    fn speed_ties_are_reproducible_for_a_seed() {
        let state = speed_duel(70, 70);
        let catalog = Catalog::standard();
        let actions = vec![use_move(P1, Move::Tackle), use_move(P2, Move::Tackle)];

        for seed in 0..20 {
            let first = sort_actions(
                actions.clone(),
                &state,
                &catalog,
                &mut SeededRandom::from_seed(seed),
            );
            let second = sort_actions(
                actions.clone(),
                &state,
                &catalog,
                &mut SeededRandom::from_seed(seed),
            );
            assert_eq!(first, second, "seed {} produced two different orders", seed);
        }
    }
}

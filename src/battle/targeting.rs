use schema::{MoveData, MoveTarget};

use crate::battle::state::{BattleState, SlotRef};

/// Expands a move's target scope into concrete slots.
///
/// Single-target moves aimed at the opposing side are pulled to the first
/// active redirector (a slot drawing fire) on that side. Otherwise the
/// declared target is kept while it is still legal, and a fainted or missing
/// target is replaced by the first legal one. When nothing legal remains the
/// declared target is returned unchanged; the accuracy step treats such a
/// hit as landing with no effect.
pub fn resolve_targets(
    state: &BattleState,
    user: SlotRef,
    move_data: &MoveData,
    declared: Option<SlotRef>,
    redirectors: &[SlotRef],
) -> Vec<SlotRef> {
    match move_data.target {
        MoveTarget::User | MoveTarget::AllySide | MoveTarget::FoeSide | MoveTarget::Field => {
            vec![user]
        }
        MoveTarget::SingleFoe => {
            let redirected = redirectors.iter().copied().find(|slot| {
                slot.side == user.side.opponent() && state.is_active(*slot)
            });
            if let Some(redirector) = redirected {
                return vec![redirector];
            }

            let legal = |slot: &SlotRef| {
                *slot != user && state.is_active(*slot) && user.is_adjacent_to(*slot)
            };
            if let Some(target) = declared.filter(|slot| legal(slot)) {
                return vec![target];
            }
            match state.active_foes_of(user).into_iter().find(|slot| legal(slot)) {
                Some(target) => vec![target],
                None => declared.into_iter().collect(),
            }
        }
        MoveTarget::AllAdjacentFoes => with_fallback(
            state
                .active_foes_of(user)
                .into_iter()
                .filter(|foe| user.is_adjacent_to(*foe))
                .collect(),
            declared,
        ),
        MoveTarget::AllAdjacent => with_fallback(
            state
                .active_slots()
                .into_iter()
                .filter(|slot| user.is_adjacent_to(*slot))
                .collect(),
            declared,
        ),
        MoveTarget::AllFoes => with_fallback(state.active_foes_of(user), declared),
    }
}

fn with_fallback(targets: Vec<SlotRef>, declared: Option<SlotRef>) -> Vec<SlotRef> {
    if targets.is_empty() {
        declared.into_iter().collect()
    } else {
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::state::SideId;
    use crate::battle::tests::common::{create_doubles_battle, create_test_battle, TestCombatantBuilder, P1, P2};
    use crate::catalog::Catalog;
    use pretty_assertions::assert_eq;
    use schema::{Move, PokemonType};

    fn member(name: &str) -> crate::pokemon::Combatant {
        TestCombatantBuilder::new(name, PokemonType::Normal).build()
    }

    const P1B: SlotRef = SlotRef {
        side: SideId::Player1,
        index: 1,
    };
    const P2B: SlotRef = SlotRef {
        side: SideId::Player2,
        index: 1,
    };

    #[test]
    fn declared_target_is_kept_when_legal() {
        let state = create_doubles_battle(
            vec![member("A"), member("B")],
            vec![member("C"), member("D")],
        );
        let catalog = Catalog::standard();
        let tackle = catalog.move_data(Move::Tackle).expect("tackle");

        assert_eq!(resolve_targets(&state, P1, tackle, Some(P2B), &[]), vec![P2B]);
    }

    #[test]
    fn fainted_target_is_retargeted_to_first_legal_foe() {
        let mut fainted = member("C");
        fainted.take_damage(u16::MAX);
        let state = create_doubles_battle(vec![member("A"), member("B")], vec![fainted, member("D")]);
        let catalog = Catalog::standard();
        let tackle = catalog.move_data(Move::Tackle).expect("tackle");

        assert_eq!(resolve_targets(&state, P1B, tackle, Some(P2), &[]), vec![P2B]);
    }

    #[test]
    fn redirector_draws_single_target_moves() {
        let state = create_doubles_battle(
            vec![member("A"), member("B")],
            vec![member("C"), member("D")],
        );
        let catalog = Catalog::standard();
        let tackle = catalog.move_data(Move::Tackle).expect("tackle");
        let surf = catalog.move_data(Move::Surf).expect("surf");

        assert_eq!(resolve_targets(&state, P1, tackle, Some(P2), &[P2B]), vec![P2B]);
        // Allies of the user never redirect its moves.
        assert_eq!(resolve_targets(&state, P1, tackle, Some(P2), &[P1B]), vec![P2]);
        // Spread moves ignore redirection.
        assert_eq!(
            resolve_targets(&state, P1, surf, None, &[P2B]),
            vec![P1B, P2, P2B]
        );
    }

    #[test]
    fn no_legal_target_keeps_the_declared_one() {
        let mut fainted = member("Gone");
        fainted.take_damage(u16::MAX);
        let state = create_test_battle(vec![member("A")], vec![fainted]);
        let catalog = Catalog::standard();
        let tackle = catalog.move_data(Move::Tackle).expect("tackle");

        assert_eq!(resolve_targets(&state, P1, tackle, Some(P2), &[]), vec![P2]);
    }

    #[test]
    fn self_and_field_moves_target_the_user() {
        let state = create_test_battle(vec![member("A")], vec![member("B")]);
        let catalog = Catalog::standard();
        for move_ in [Move::SwordsDance, Move::RainDance, Move::Spikes, Move::Reflect] {
            let data = catalog.move_data(move_).expect("catalogued");
            assert_eq!(resolve_targets(&state, P1, data, None, &[]), vec![P1]);
        }
    }
}

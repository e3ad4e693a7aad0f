use tracing::{debug, warn};

use super::{PhaseStep, TurnContext};
use crate::battle::action::BattleAction;
use crate::battle::engine::BattleEngine;
use crate::battle::reactions::switch_in_reactions;
use crate::battle::state::{BattleState, SideId, SlotRef};
use crate::errors::BattleResult;

impl BattleEngine<'_> {
    /// Refills vacant slots until none can be refilled. A replacement can
    /// faint on arrival to entry hazards, so this repeats, bounded by the
    /// party size.
    pub(crate) async fn fainted_check(
        &mut self,
        step: PhaseStep,
        state: &mut BattleState,
        ctx: &mut TurnContext,
    ) -> BattleResult<()> {
        for round in 0..=self.rules.max_party_size {
            if state.game_state.is_finished() {
                return Ok(());
            }
            let replacements = self.select_replacements(state).await;
            if replacements.is_empty() {
                return Ok(());
            }
            debug!(round, count = replacements.len(), "sending in replacements");

            ctx.generated.extend(replacements);
            let batch = self.barrier(step, state, ctx).await?;
            ctx.generated = switch_in_reactions(&self.registry, state, &batch, &mut *self.rng);
            self.barrier(step, state, ctx).await?;
        }
        Ok(())
    }

    /// One switch per vacant slot that still has a bench candidate. Each
    /// side's picks are drawn from a shrinking pool so the same combatant is
    /// never sent into two slots.
    async fn select_replacements(&mut self, state: &BattleState) -> Vec<BattleAction> {
        let mut switches = Vec::new();
        for side in SideId::BOTH {
            let provider = self.providers[side.to_index()];
            let mut remaining = state.side(side).bench_candidates();

            for index in state.side(side).vacant_slots() {
                if remaining.is_empty() {
                    break;
                }
                let slot = SlotRef::new(side, index);
                let requested = match provider.select_replacement(state, slot, &remaining).await {
                    Ok(Some(choice)) if remaining.contains(&choice) => Some(choice),
                    Ok(Some(choice)) => {
                        warn!(%slot, choice, "provider picked an unavailable replacement");
                        None
                    }
                    Ok(None) => None,
                    Err(err) => {
                        warn!(%slot, %err, "replacement selection failed");
                        None
                    }
                };
                let party_index = match requested {
                    Some(choice) => choice,
                    None => remaining[self.rng.next_int(remaining.len() as u32) as usize],
                };

                remaining.retain(|candidate| *candidate != party_index);
                switches.push(BattleAction::Switch {
                    side,
                    slot: index,
                    party_index,
                });
            }
        }
        switches
    }
}

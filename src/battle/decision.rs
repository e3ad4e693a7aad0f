use async_trait::async_trait;

use crate::battle::state::{BattleState, SlotRef};
use crate::errors::BattleResult;
use crate::player::PlayerAction;

/// Supplies choices for the slots of one side.
///
/// The engine borrows providers for the length of a battle and asks them one
/// slot at a time. Errors and illegal answers are isolated to the slot that
/// produced them: the engine logs them and picks a random legal choice.
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    /// Choose this turn's action for an occupied slot.
    async fn choose_action(&self, state: &BattleState, slot: SlotRef) -> BattleResult<PlayerAction>;

    /// Pick a party index to fill a vacant slot. Returning `None` lets the
    /// engine choose uniformly among `candidates`.
    async fn select_replacement(
        &self,
        _state: &BattleState,
        _slot: SlotRef,
        _candidates: &[usize],
    ) -> BattleResult<Option<usize>> {
        Ok(None)
    }
}

//! The per-turn phase pipeline.
//!
//! A turn runs [`PhaseStep::ALL`] in order against one [`TurnContext`].
//! Steps only ever queue actions into `generated`; a barrier drains that
//! buffer through the action queue and files what resolved under the step
//! that drained it, so later steps can scan exactly "what just happened".

mod fainted;
mod phases;

use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

use crate::battle::action::BattleAction;
use crate::battle::calculators::DamageBreakdown;
use crate::battle::state::SlotRef;

/// Position of an action in the turn's sorted order.
pub type ActionId = usize;

/// One (move action, target) pair; protection, accuracy and damage are
/// decided per target.
pub type HitKey = (ActionId, SlotRef);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PhaseStep {
    TurnStart,
    CollectActions,
    ResolveTargets,
    SortActions,
    ValidateMoves,
    CheckProtection,
    CheckAccuracy,
    BeforeMove,
    PreDamageBarrier,
    CalculateDamage,
    ApplyDamage,
    AnimateMoves,
    DamageReactions,
    MoveEffects,
    AfterMove,
    Switches,
    DeferredActions,
    FaintedCheck,
    EndOfTurn,
    DecrementDurations,
    TurnEndTriggers,
}

impl PhaseStep {
    pub const ALL: [PhaseStep; 21] = [
        PhaseStep::TurnStart,
        PhaseStep::CollectActions,
        PhaseStep::ResolveTargets,
        PhaseStep::SortActions,
        PhaseStep::ValidateMoves,
        PhaseStep::CheckProtection,
        PhaseStep::CheckAccuracy,
        PhaseStep::BeforeMove,
        PhaseStep::PreDamageBarrier,
        PhaseStep::CalculateDamage,
        PhaseStep::ApplyDamage,
        PhaseStep::AnimateMoves,
        PhaseStep::DamageReactions,
        PhaseStep::MoveEffects,
        PhaseStep::AfterMove,
        PhaseStep::Switches,
        PhaseStep::DeferredActions,
        PhaseStep::FaintedCheck,
        PhaseStep::EndOfTurn,
        PhaseStep::DecrementDurations,
        PhaseStep::TurnEndTriggers,
    ];

    /// Steps that still run once the battle has been decided mid-turn. The
    /// rest are skipped outright; within a running step, fainted
    /// participants are filtered individually.
    pub fn always_runs(&self) -> bool {
        matches!(
            self,
            PhaseStep::FaintedCheck | PhaseStep::EndOfTurn | PhaseStep::DecrementDurations
        )
    }
}

/// Scratch state for a single turn. Created when the turn starts and
/// dropped when it ends.
#[derive(Debug, Default)]
pub struct TurnContext {
    pub turn: u32,
    pub collected: Vec<BattleAction>,
    pub sorted: Vec<BattleAction>,
    pub generated: Vec<BattleAction>,
    pub processed: Vec<BattleAction>,
    /// Non-damaging move effects held back until the deferred-actions step,
    /// paired with the user whose move caused them.
    pub deferred: Vec<(SlotRef, BattleAction)>,
    pub validity: HashMap<ActionId, bool>,
    pub protection: HashMap<HitKey, bool>,
    pub accuracy: HashMap<HitKey, bool>,
    pub breakdowns: HashMap<HitKey, DamageBreakdown>,
    /// Damage that actually landed, read back once the hits resolved.
    pub dealt: HashMap<HitKey, u16>,
    batches: HashMap<PhaseStep, Range<usize>>,
}

impl TurnContext {
    pub fn new(turn: u32) -> Self {
        Self {
            turn,
            ..Self::default()
        }
    }

    pub fn is_valid(&self, id: ActionId) -> bool {
        self.validity.get(&id).copied().unwrap_or(false)
    }

    pub fn is_protected(&self, key: HitKey) -> bool {
        self.protection.get(&key).copied().unwrap_or(false)
    }

    /// Targets without an accuracy entry were never rolled for, which only
    /// happens to moves that were invalid or blocked.
    pub fn did_hit(&self, key: HitKey) -> bool {
        self.accuracy.get(&key).copied().unwrap_or(false)
    }

    /// Validated move actions in sorted order, with their ids.
    pub fn valid_moves(&self) -> Vec<(ActionId, BattleAction)> {
        self.sorted
            .iter()
            .enumerate()
            .filter(|(id, action)| {
                matches!(action, BattleAction::UseMove { .. }) && self.is_valid(*id)
            })
            .map(|(id, action)| (id, action.clone()))
            .collect()
    }

    /// Files a freshly drained batch under the step that drained it.
    pub(crate) fn record_batch(&mut self, step: PhaseStep, batch: Vec<BattleAction>) {
        let start = self.processed.len();
        self.processed.extend(batch);
        let end = self.processed.len();
        self.batches
            .entry(step)
            .and_modify(|range| range.end = end)
            .or_insert(start..end);
    }

    /// Everything the given step's barriers resolved, in order.
    pub fn batch(&self, step: PhaseStep) -> &[BattleAction] {
        match self.batches.get(&step) {
            Some(range) => &self.processed[range.clone()],
            None => &[],
        }
    }
}

/// Per-target result of one move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    pub target: SlotRef,
    pub protected: bool,
    pub hit: bool,
    pub damage: u16,
}

/// What became of one move action this turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub user: SlotRef,
    pub move_: schema::Move,
    pub valid: bool,
    pub targets: Vec<TargetOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::messages::BattleMessage;
    use pretty_assertions::assert_eq;

    #[test]
    fn pipeline_has_twenty_one_distinct_steps() {
        let mut seen = std::collections::HashSet::new();
        for step in PhaseStep::ALL {
            assert!(seen.insert(step));
        }
        assert_eq!(seen.len(), 21);
        assert_eq!(
            PhaseStep::ALL.iter().filter(|step| step.always_runs()).count(),
            3
        );
    }

    #[test]
    fn batches_accumulate_per_step() {
        let mut ctx = TurnContext::new(1);
        let first = BattleAction::message(BattleMessage::Failed);
        let second = BattleAction::message(BattleMessage::CriticalHit);

        ctx.record_batch(PhaseStep::TurnStart, vec![first.clone()]);
        ctx.record_batch(PhaseStep::Switches, vec![second.clone()]);
        ctx.record_batch(PhaseStep::Switches, vec![first.clone()]);

        assert_eq!(ctx.batch(PhaseStep::TurnStart), &[first.clone()]);
        assert_eq!(ctx.batch(PhaseStep::Switches), &[second, first]);
        assert!(ctx.batch(PhaseStep::EndOfTurn).is_empty());
    }
}

use std::collections::HashSet;

use schema::{MoveEffectKind, MoveData};
use tracing::{debug, trace, warn};

use super::{ActionId, PhaseStep, TurnContext};
use crate::battle::action::{BattleAction, DamageSource};
use crate::battle::calculators::{calculate_damage, Effectiveness};
use crate::battle::conditions::{VolatileCondition, VolatileKind};
use crate::battle::end_of_turn::end_of_turn_actions;
use crate::battle::engine::BattleEngine;
use crate::battle::messages::{ActionFailureReason, BattleMessage};
use crate::battle::reactions::{damage_reactions, switch_in_reactions};
use crate::battle::registry::{HandlerContext, TriggerKind};
use crate::battle::state::{BattleState, SideId, SlotRef};
use crate::battle::stats::move_hits;
use crate::battle::targeting::resolve_targets;
use crate::battle::turn_order::{sort_actions, sort_slots_by_speed};
use crate::errors::BattleResult;
use crate::player::{DamageTracking, PlayerAction};
use crate::pokemon::StatusCondition;

impl BattleEngine<'_> {
    /// Runs one step. `Ok(false)` asks the pipeline to stop early.
    pub(crate) async fn run_step(
        &mut self,
        step: PhaseStep,
        state: &mut BattleState,
        ctx: &mut TurnContext,
    ) -> BattleResult<bool> {
        trace!(?step, "running step");
        match step {
            PhaseStep::TurnStart => self.turn_start(state, ctx).await?,
            PhaseStep::CollectActions => self.collect_actions(state, ctx).await,
            PhaseStep::ResolveTargets => self.resolve_move_targets(state, ctx)?,
            PhaseStep::SortActions => {
                ctx.sorted = sort_actions(ctx.collected.clone(), state, &self.catalog, &mut *self.rng);
            }
            PhaseStep::ValidateMoves => self.validate_moves(state, ctx),
            PhaseStep::CheckProtection => self.check_protection(state, ctx)?,
            PhaseStep::CheckAccuracy => self.check_accuracy(state, ctx)?,
            PhaseStep::BeforeMove => self.before_move(state, ctx)?,
            PhaseStep::PreDamageBarrier => {
                self.barrier(step, state, ctx).await?;
            }
            PhaseStep::CalculateDamage => self.calculate_hits(state, ctx)?,
            PhaseStep::ApplyDamage => self.apply_damage(state, ctx).await?,
            PhaseStep::AnimateMoves => {
                for (_, action) in ctx.valid_moves() {
                    if let BattleAction::UseMove {
                        user,
                        move_,
                        targets,
                    } = action
                    {
                        if !state.is_active(user) {
                            continue;
                        }
                        ctx.generated.push(BattleAction::MoveAnimation {
                            user,
                            move_,
                            targets,
                        });
                    }
                }
                self.barrier(step, state, ctx).await?;
            }
            PhaseStep::DamageReactions => {
                let hits = ctx.batch(PhaseStep::ApplyDamage).to_vec();
                ctx.generated =
                    damage_reactions(&self.registry, &self.catalog, state, &hits, &mut *self.rng);
                self.barrier(step, state, ctx).await?;
            }
            PhaseStep::MoveEffects => self.move_effects(state, ctx).await?,
            PhaseStep::AfterMove => self.after_move(state, ctx).await?,
            PhaseStep::Switches => self.execute_switches(state, ctx).await?,
            PhaseStep::DeferredActions => {
                // Effects of a user knocked out after they were worked out are dropped.
                ctx.generated = std::mem::take(&mut ctx.deferred)
                    .into_iter()
                    .filter(|(user, _)| state.is_active(*user))
                    .map(|(_, action)| action)
                    .collect();
                self.barrier(step, state, ctx).await?;
            }
            PhaseStep::FaintedCheck => self.fainted_check(step, state, ctx).await?,
            PhaseStep::EndOfTurn => {
                ctx.generated = end_of_turn_actions(state, &mut *self.rng);
                self.barrier(step, state, ctx).await?;
                self.fainted_check(step, state, ctx).await?;
            }
            PhaseStep::DecrementDurations => {
                ctx.generated.push(BattleAction::AdvanceDurations);
                self.barrier(step, state, ctx).await?;
            }
            PhaseStep::TurnEndTriggers => {
                for slot in sort_slots_by_speed(state.active_slots(), state, &mut *self.rng) {
                    let handler_ctx = HandlerContext::new(state, slot);
                    ctx.generated.extend(self.registry.process_trigger(
                        TriggerKind::TurnEnd,
                        &handler_ctx,
                        &mut *self.rng,
                    ));
                }
                self.barrier(step, state, ctx).await?;
                self.fainted_check(step, state, ctx).await?;
            }
        }
        Ok(true)
    }

    async fn turn_start(&mut self, state: &mut BattleState, ctx: &mut TurnContext) -> BattleResult<()> {
        ctx.generated.push(BattleAction::message(BattleMessage::TurnStarted {
            turn_number: ctx.turn,
        }));
        for slot in state.all_slot_refs() {
            let Some(slot_state) = state.slot_mut(slot) else {
                continue;
            };
            slot_state.tracking = DamageTracking::default();
            if let Some(VolatileCondition::Flinched { turn }) = slot_state.volatiles.get(&VolatileKind::Flinched) {
                if *turn < ctx.turn {
                    ctx.generated.push(BattleAction::RemoveVolatile {
                        target: slot,
                        kind: VolatileKind::Flinched,
                    });
                }
            }
        }
        self.barrier(PhaseStep::TurnStart, state, ctx).await?;
        Ok(())
    }

    /// Asks every occupied slot for a choice. Switches on the same side are
    /// coordinated through a reservation set so no bench combatant is picked
    /// twice.
    async fn collect_actions(&mut self, state: &BattleState, ctx: &mut TurnContext) {
        let mut reserved: HashSet<(SideId, usize)> = HashSet::new();

        for slot in state.active_slots() {
            let provider = self.providers[slot.side.to_index()];
            let choice = match provider.choose_action(state, slot).await {
                Ok(choice) => Some(choice),
                Err(err) => {
                    warn!(%slot, %err, "decision provider failed, choosing at random");
                    None
                }
            };
            if let Some(action) = self.convert_choice(state, slot, choice, &mut reserved) {
                debug!(%slot, kind = action.kind(), "collected action");
                ctx.collected.push(action);
            }
        }
    }

    fn convert_choice(
        &mut self,
        state: &BattleState,
        slot: SlotRef,
        choice: Option<PlayerAction>,
        reserved: &mut HashSet<(SideId, usize)>,
    ) -> Option<BattleAction> {
        let combatant = state.active(slot)?;
        match choice {
            Some(PlayerAction::UseMove { move_index, target }) => match combatant.moves.get(move_index) {
                Some(instance) => Some(BattleAction::UseMove {
                    user: slot,
                    move_: instance.move_,
                    targets: target.into_iter().collect(),
                }),
                None => {
                    warn!(%slot, move_index, "provider chose a move slot that does not exist");
                    self.fallback_move(state, slot)
                }
            },
            Some(PlayerAction::SwitchCombatant { party_index }) => {
                let open: Vec<usize> = state
                    .side(slot.side)
                    .bench_candidates()
                    .into_iter()
                    .filter(|candidate| !reserved.contains(&(slot.side, *candidate)))
                    .collect();
                let pick = if open.contains(&party_index) {
                    Some(party_index)
                } else if open.is_empty() {
                    None
                } else {
                    let alternate = open[self.rng.next_int(open.len() as u32) as usize];
                    debug!(%slot, requested = party_index, alternate, "switch target taken, using alternate");
                    Some(alternate)
                };
                match pick {
                    Some(party_index) => {
                        reserved.insert((slot.side, party_index));
                        Some(BattleAction::Switch {
                            side: slot.side,
                            slot: slot.index,
                            party_index,
                        })
                    }
                    None => {
                        warn!(%slot, "no combatant left to switch to");
                        self.fallback_move(state, slot)
                    }
                }
            }
            None => self.fallback_move(state, slot),
        }
    }

    /// A uniformly random move that still has PP, or the first move if none does.
    fn fallback_move(&mut self, state: &BattleState, slot: SlotRef) -> Option<BattleAction> {
        let combatant = state.active(slot)?;
        let usable: Vec<_> = combatant.moves.iter().filter(|instance| instance.pp > 0).collect();
        let instance = if usable.is_empty() {
            combatant.moves.first()?
        } else {
            usable[self.rng.next_int(usable.len() as u32) as usize]
        };
        Some(BattleAction::UseMove {
            user: slot,
            move_: instance.move_,
            targets: Vec::new(),
        })
    }

    fn resolve_move_targets(&self, state: &BattleState, ctx: &mut TurnContext) -> BattleResult<()> {
        let mut redirectors: Vec<SlotRef> = state
            .active_slots()
            .into_iter()
            .filter(|slot| state.has_volatile(*slot, VolatileKind::Decoy))
            .collect();
        for action in &ctx.collected {
            if let BattleAction::UseMove { user, move_, .. } = action {
                if self.catalog.move_data(*move_)?.has_effect(MoveEffectKind::Decoy)
                    && !redirectors.contains(user)
                {
                    redirectors.push(*user);
                }
            }
        }
        redirectors.sort();

        for action in ctx.collected.iter_mut() {
            if let BattleAction::UseMove {
                user,
                move_,
                targets,
            } = action
            {
                let move_data = self.catalog.move_data(*move_)?;
                let declared = targets.first().copied();
                *targets = resolve_targets(state, *user, move_data, declared, &redirectors);
            }
        }
        Ok(())
    }

    fn validate_moves(&mut self, state: &BattleState, ctx: &mut TurnContext) {
        for (id, action) in ctx.sorted.iter().enumerate() {
            match action {
                BattleAction::UseMove {
                    user,
                    move_,
                    targets,
                } => {
                    let (valid, actions) = self.validate_move(state, ctx.turn, *user, *move_, targets);
                    ctx.validity.insert(id, valid);
                    ctx.generated.extend(actions);
                }
                BattleAction::Switch { .. } => {
                    ctx.validity.insert(id, true);
                }
                _ => {}
            }
        }
    }

    /// Whether a move may go ahead, plus the actions the check produced:
    /// failure messages, status counter updates, or the move use itself.
    fn validate_move(
        &mut self,
        state: &BattleState,
        turn: u32,
        user: SlotRef,
        move_: schema::Move,
        targets: &[SlotRef],
    ) -> (bool, Vec<BattleAction>) {
        let Some(combatant) = state.active(user) else {
            return (false, vec![]);
        };
        let fail = |reason| {
            BattleAction::message(BattleMessage::ActionFailed {
                user: combatant.name.clone(),
                reason,
            })
        };
        let mut actions = Vec::new();

        if let Some(VolatileCondition::Flinched { turn: flinch_turn }) =
            state.volatile(user, VolatileKind::Flinched)
        {
            if *flinch_turn == turn {
                actions.push(BattleAction::RemoveVolatile {
                    target: user,
                    kind: VolatileKind::Flinched,
                });
                actions.push(fail(ActionFailureReason::IsFlinching));
                return (false, actions);
            }
        }

        match combatant.status {
            Some(StatusCondition::Sleep(0)) => actions.push(BattleAction::CureStatus { target: user }),
            Some(StatusCondition::Sleep(_)) => {
                actions.push(BattleAction::TickStatus { target: user });
                actions.push(fail(ActionFailureReason::IsAsleep));
                return (false, actions);
            }
            Some(StatusCondition::Freeze) => {
                if self.rng.chance(20) {
                    actions.push(BattleAction::CureStatus { target: user });
                } else {
                    actions.push(fail(ActionFailureReason::IsFrozen));
                    return (false, actions);
                }
            }
            Some(StatusCondition::Paralysis) => {
                if self.rng.chance(25) {
                    actions.push(fail(ActionFailureReason::IsParalyzed));
                    return (false, actions);
                }
            }
            _ => {}
        }

        let pp = combatant
            .move_slot(move_)
            .map_or(0, |index| combatant.moves[index].pp);
        if pp == 0 {
            actions.push(fail(ActionFailureReason::NoPPRemaining));
            return (false, actions);
        }
        if targets.is_empty() {
            actions.push(fail(ActionFailureReason::NoTarget));
            return (false, actions);
        }

        actions.push(BattleAction::UseMove {
            user,
            move_,
            targets: targets.to_vec(),
        });
        (true, actions)
    }

    /// A target is protected if it already carries the Protected condition,
    /// or if its own validated Protect move is ordered ahead of this move.
    fn check_protection(&self, state: &BattleState, ctx: &mut TurnContext) -> BattleResult<()> {
        let mut protectors: Vec<(ActionId, SlotRef)> = Vec::new();
        for (id, action) in ctx.valid_moves() {
            if let BattleAction::UseMove { user, move_, .. } = action {
                if self.catalog.move_data(move_)?.has_effect(MoveEffectKind::Protect) {
                    protectors.push((id, user));
                }
            }
        }

        for (id, action) in ctx.valid_moves() {
            let BattleAction::UseMove { user, targets, .. } = action else {
                continue;
            };
            for target in targets.into_iter().filter(|target| *target != user) {
                let protected = state.has_volatile(target, VolatileKind::Protected)
                    || protectors
                        .iter()
                        .any(|(protector_id, protector)| *protector == target && *protector_id < id);
                ctx.protection.insert((id, target), protected);
                if protected {
                    ctx.generated.push(BattleAction::message(BattleMessage::Blocked {
                        target: state.name_of(target),
                    }));
                }
            }
        }
        Ok(())
    }

    /// Fainted targets count as hit without a roll; whatever follows simply
    /// has nothing to act on.
    fn check_accuracy(&mut self, state: &BattleState, ctx: &mut TurnContext) -> BattleResult<()> {
        for (id, action) in ctx.valid_moves() {
            let BattleAction::UseMove {
                user,
                move_,
                targets,
            } = action
            else {
                continue;
            };
            let move_data = self.catalog.move_data(move_)?;
            for target in targets {
                if ctx.is_protected((id, target)) {
                    continue;
                }
                let hit = target == user
                    || !state.is_active(target)
                    || move_hits(state, user, target, move_data, &mut *self.rng);
                ctx.accuracy.insert((id, target), hit);
                if !hit {
                    ctx.generated.push(BattleAction::message(BattleMessage::Missed {
                        user: state.name_of(user),
                    }));
                }
            }
        }
        Ok(())
    }

    fn before_move(&mut self, state: &BattleState, ctx: &mut TurnContext) -> BattleResult<()> {
        for (_, action) in ctx.valid_moves() {
            let BattleAction::UseMove {
                user,
                move_,
                targets,
            } = action
            else {
                continue;
            };
            let move_data = self.catalog.move_data(move_)?;
            let handler_ctx = HandlerContext::new(state, user)
                .with_target(targets.first().copied())
                .with_move(move_, move_data);
            ctx.generated.extend(self.registry.process_trigger(
                TriggerKind::BeforeMove,
                &handler_ctx,
                &mut *self.rng,
            ));
        }
        Ok(())
    }

    /// Damage breakdowns for every connecting hit. Status moves have their
    /// effects worked out here and held back for the deferred step.
    fn calculate_hits(&mut self, state: &BattleState, ctx: &mut TurnContext) -> BattleResult<()> {
        for (id, action) in ctx.valid_moves() {
            let BattleAction::UseMove {
                user,
                move_,
                targets,
            } = action
            else {
                continue;
            };
            if !state.is_active(user) {
                continue;
            }
            let move_data = self.catalog.move_data(move_)?;
            let spread = move_data.target.is_spread() && targets.len() > 1;

            for target in &targets {
                let key = (id, *target);
                if ctx.is_protected(key) || !ctx.did_hit(key) || !state.is_active(*target) {
                    continue;
                }
                if move_data.is_damaging() {
                    if let Some(breakdown) =
                        calculate_damage(state, user, *target, move_data, spread, &mut *self.rng)
                    {
                        trace!(%user, target = %target, damage = breakdown.damage, "damage calculated");
                        ctx.breakdowns.insert(key, breakdown);
                    }
                } else {
                    let effects = self.registry.process_move_effects(
                        state,
                        user,
                        *target,
                        move_,
                        move_data,
                        0,
                        &mut *self.rng,
                    );
                    ctx.deferred.extend(effects.into_iter().map(|effect| (user, effect)));
                }
            }
        }
        Ok(())
    }

    async fn apply_damage(&mut self, state: &mut BattleState, ctx: &mut TurnContext) -> BattleResult<()> {
        for (id, action) in ctx.valid_moves() {
            let BattleAction::UseMove {
                user,
                move_,
                targets,
            } = action
            else {
                continue;
            };
            let move_data = self.catalog.move_data(move_)?;
            for target in targets {
                let Some(breakdown) = ctx.breakdowns.get(&(id, target)) else {
                    continue;
                };
                let effectiveness = breakdown.effectiveness();
                if effectiveness == Effectiveness::NoEffect {
                    ctx.generated.push(BattleAction::message(BattleMessage::Effectiveness {
                        target: state.name_of(target),
                        effectiveness,
                    }));
                    continue;
                }
                ctx.generated.push(BattleAction::ApplyDamage {
                    target,
                    amount: breakdown.damage,
                    source: DamageSource::Move {
                        user,
                        move_,
                        contact: move_data.contact,
                        critical: breakdown.critical,
                        effectiveness,
                    },
                });
            }
        }
        self.barrier(PhaseStep::ApplyDamage, state, ctx).await?;
        record_dealt(state, ctx);
        Ok(())
    }

    /// Secondary effects of damaging moves, fed the damage that actually
    /// landed. Extra multi-hit strikes get their own damage reactions.
    async fn move_effects(&mut self, state: &mut BattleState, ctx: &mut TurnContext) -> BattleResult<()> {
        for (id, action) in ctx.valid_moves() {
            let BattleAction::UseMove {
                user,
                move_,
                targets,
            } = action
            else {
                continue;
            };
            let move_data: &MoveData = self.catalog.move_data(move_)?;
            for target in targets {
                let dealt = ctx.dealt.get(&(id, target)).copied().unwrap_or(0);
                if dealt == 0 {
                    continue;
                }
                ctx.generated.extend(self.registry.process_move_effects(
                    state,
                    user,
                    target,
                    move_,
                    move_data,
                    dealt,
                    &mut *self.rng,
                ));
            }
        }
        let batch = self.barrier(PhaseStep::MoveEffects, state, ctx).await?;

        ctx.generated = damage_reactions(&self.registry, &self.catalog, state, &batch, &mut *self.rng);
        self.barrier(PhaseStep::MoveEffects, state, ctx).await?;

        // Extra strikes count towards the totals.
        record_dealt(state, ctx);
        Ok(())
    }

    async fn after_move(&mut self, state: &mut BattleState, ctx: &mut TurnContext) -> BattleResult<()> {
        for (id, action) in ctx.valid_moves() {
            let BattleAction::UseMove {
                user,
                move_,
                targets,
            } = action
            else {
                continue;
            };
            if !state.is_active(user) {
                continue;
            }
            let move_data = self.catalog.move_data(move_)?;
            let total: u16 = targets
                .iter()
                .map(|target| ctx.dealt.get(&(id, *target)).copied().unwrap_or(0))
                .sum();
            let handler_ctx = HandlerContext::new(state, user)
                .with_target(targets.first().copied())
                .with_move(move_, move_data)
                .with_damage(total);
            ctx.generated.extend(self.registry.process_trigger(
                TriggerKind::AfterMove,
                &handler_ctx,
                &mut *self.rng,
            ));
        }
        self.barrier(PhaseStep::AfterMove, state, ctx).await?;
        Ok(())
    }

    async fn execute_switches(&mut self, state: &mut BattleState, ctx: &mut TurnContext) -> BattleResult<()> {
        let switches: Vec<BattleAction> = ctx
            .sorted
            .iter()
            .enumerate()
            .filter(|(id, action)| matches!(action, BattleAction::Switch { .. }) && ctx.is_valid(*id))
            .map(|(_, action)| action.clone())
            .collect();
        if switches.is_empty() {
            return Ok(());
        }

        ctx.generated.extend(switches);
        let batch = self.barrier(PhaseStep::Switches, state, ctx).await?;
        ctx.generated = switch_in_reactions(&self.registry, state, &batch, &mut *self.rng);
        self.barrier(PhaseStep::Switches, state, ctx).await?;
        Ok(())
    }
}

/// Reads back how much each calculated hit actually took off, from the
/// target's per-turn tracking.
fn record_dealt(state: &BattleState, ctx: &mut TurnContext) {
    for (id, target) in ctx.breakdowns.keys().copied() {
        if let Some(BattleAction::UseMove { user, move_, .. }) = ctx.sorted.get(id) {
            let dealt = state
                .slot(target)
                .map_or(0, |slot| slot.tracking.damage_from(*user, *move_));
            ctx.dealt.insert((id, target), dealt);
        }
    }
}

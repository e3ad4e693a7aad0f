//! The battle engine: owns the rules, data, randomness and action queue for
//! one battle, and drives turns through the phase pipeline.

use serde::Serialize;
use tracing::{debug, info, info_span, Instrument};

use crate::battle::action::BattleAction;
use crate::battle::action_queue::{ActionListener, ActionQueue};
use crate::battle::decision::DecisionProvider;
use crate::battle::pipeline::{MoveOutcome, PhaseStep, TargetOutcome, TurnContext};
use crate::battle::presentation::PresentationSink;
use crate::battle::reactions::{switch_in_reactions, weather_change_reactions};
use crate::battle::registry::HandlerRegistry;
use crate::battle::state::{BattleState, GameState, SideId};
use crate::catalog::Catalog;
use crate::config::{BattleRules, EngineOptions};
use crate::errors::{BattleEngineError, BattleResult};
use crate::player::{BattleSide, Party};
use crate::random::{RandomSource, SeededRandom};

/// What happened during one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnSummary {
    pub turn: u32,
    /// Every action resolved this turn, in resolution order.
    pub actions: Vec<BattleAction>,
    pub moves: Vec<MoveOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BattleOutcome {
    Winner(SideId),
    Draw,
    TurnLimitReached,
}

#[derive(Debug, Clone, Serialize)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub turns: u32,
    /// Combatants still able to fight, indexed by side.
    pub remaining: [usize; 2],
    pub actions_resolved: usize,
    pub summary: String,
}

pub struct BattleEngine<'a> {
    pub(crate) rules: BattleRules,
    pub(crate) catalog: Catalog,
    pub(crate) registry: HandlerRegistry,
    pub(crate) rng: Box<dyn RandomSource>,
    pub(crate) queue: ActionQueue,
    pub(crate) providers: [&'a dyn DecisionProvider; 2],
    pub(crate) view: &'a dyn PresentationSink,
}

impl<'a> BattleEngine<'a> {
    /// Validates the rules and both parties, resolves every optional
    /// collaborator in `options` to a concrete default, and returns a fresh
    /// battle state alongside the engine that will run it.
    ///
    /// Slots start empty; [`begin_battle`](Self::begin_battle) sends out the
    /// opening combatants.
    pub fn initialize(
        options: EngineOptions,
        party_a: Party,
        party_b: Party,
        provider_a: &'a dyn DecisionProvider,
        provider_b: &'a dyn DecisionProvider,
        view: &'a dyn PresentationSink,
    ) -> BattleResult<(BattleState, Self)> {
        let EngineOptions {
            rules,
            seed,
            random,
            catalog,
            registry,
        } = options;
        rules.validate()?;

        let catalog = catalog.unwrap_or_else(Catalog::standard);
        validate_party(&party_a, &rules, &catalog)?;
        validate_party(&party_b, &rules, &catalog)?;

        let rng: Box<dyn RandomSource> = match (random, seed) {
            (Some(random), _) => random,
            (None, Some(seed)) => Box::new(SeededRandom::from_seed(seed)),
            (None, None) => Box::new(SeededRandom::from_entropy()),
        };

        let state = BattleState::new(
            BattleSide::new(party_a, rules.slots_per_side),
            BattleSide::new(party_b, rules.slots_per_side),
        );
        let engine = Self {
            queue: ActionQueue::new(rules.max_queue_iterations),
            rules,
            catalog,
            registry: registry.unwrap_or_else(HandlerRegistry::standard),
            rng,
            providers: [provider_a, provider_b],
            view,
        };

        info!(
            slots = engine.rules.slots_per_side,
            handlers = engine.registry.len(),
            "battle engine initialized"
        );
        Ok((state, engine))
    }

    pub fn add_listener(&mut self, listener: Box<dyn ActionListener>) {
        self.queue.add_listener(listener);
    }

    pub fn rules(&self) -> &BattleRules {
        &self.rules
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Sends out the first combatants of each party and runs their switch-in
    /// effects. Returns the actions that resolved.
    pub async fn begin_battle(&mut self, state: &mut BattleState) -> BattleResult<Vec<BattleAction>> {
        self.queue.reset_budget();

        let mut openers = Vec::new();
        for side in SideId::BOTH {
            let battle_side = state.side(side);
            let count = battle_side.slots.len().min(battle_side.party.len());
            openers.extend((0..count).map(|index| BattleAction::Switch {
                side,
                slot: index,
                party_index: index,
            }));
        }

        let mut resolved = self.settle(state, openers).await?;
        let reactions = switch_in_reactions(&self.registry, state, &resolved, &mut *self.rng);
        resolved.extend(self.settle(state, reactions).await?);

        if !state.game_state.is_finished() {
            state.game_state = GameState::WaitingForActions;
        }
        Ok(resolved)
    }

    /// Runs one full turn through every pipeline step.
    pub async fn run_turn(&mut self, state: &mut BattleState, turn_number: u32) -> BattleResult<TurnSummary> {
        state.turn_number = turn_number;
        state.game_state = GameState::TurnInProgress;
        self.queue.reset_budget();

        let mut ctx = TurnContext::new(turn_number);
        let span = info_span!("turn", turn = turn_number);
        async {
            for step in PhaseStep::ALL {
                if state.game_state.is_finished() && !step.always_runs() {
                    debug!(?step, "battle decided, skipping step");
                    continue;
                }
                if !self.run_step(step, state, &mut ctx).await? {
                    debug!(?step, "pipeline stopped early");
                    break;
                }
            }
            Ok::<(), BattleEngineError>(())
        }
        .instrument(span)
        .await?;

        if !state.game_state.is_finished() {
            state.game_state = GameState::WaitingForActions;
        }
        debug!(
            turn = turn_number,
            resolved = ctx.processed.len(),
            iterations = self.queue.iterations(),
            "turn complete"
        );
        Ok(summarize(ctx))
    }

    /// Plays turns until one side has nobody left or the turn limit is hit.
    /// Opens the battle first if no combatant has been sent out yet.
    pub async fn run_battle(&mut self, state: &mut BattleState) -> BattleResult<BattleReport> {
        let mut actions_resolved = 0;
        let unopened = state
            .all_slot_refs()
            .into_iter()
            .all(|slot| state.slot(slot).is_some_and(|s| s.occupant.is_none()));
        if unopened {
            actions_resolved += self.begin_battle(state).await?.len();
        }

        let mut turns = 0;
        while !state.game_state.is_finished() && turns < self.rules.max_turns {
            turns += 1;
            let next_turn = state.turn_number + 1;
            let summary = self.run_turn(state, next_turn).await?;
            actions_resolved += summary.actions.len();
        }

        let outcome = match state.game_state {
            GameState::Player1Win => BattleOutcome::Winner(SideId::Player1),
            GameState::Player2Win => BattleOutcome::Winner(SideId::Player2),
            GameState::Draw => BattleOutcome::Draw,
            GameState::WaitingForActions | GameState::TurnInProgress => BattleOutcome::TurnLimitReached,
        };
        let remaining = [
            state.side(SideId::Player1).remaining(),
            state.side(SideId::Player2).remaining(),
        ];
        let summary = match outcome {
            BattleOutcome::Winner(side) => format!(
                "{} defeated {} in {} turns",
                state.side(side).trainer,
                state.side(side.opponent()).trainer,
                state.turn_number
            ),
            BattleOutcome::Draw => format!("draw after {} turns", state.turn_number),
            BattleOutcome::TurnLimitReached => {
                format!("no winner after {} turns", state.turn_number)
            }
        };
        info!(?outcome, turns = state.turn_number, actions_resolved, "battle finished");

        Ok(BattleReport {
            outcome,
            turns: state.turn_number,
            remaining,
            actions_resolved,
            summary,
        })
    }

    /// Drains `actions` through the queue, then keeps draining weather-change
    /// reactions until the weather holds still. Updates the game state if
    /// the battle was decided.
    pub(crate) async fn settle(
        &mut self,
        state: &mut BattleState,
        actions: Vec<BattleAction>,
    ) -> BattleResult<Vec<BattleAction>> {
        self.queue.enqueue_range(actions);
        let mut resolved = self.queue.drain(state, self.view).await?;

        let mut start = 0;
        loop {
            let follow_ups =
                weather_change_reactions(&self.registry, state, &resolved[start..], &mut *self.rng);
            if follow_ups.is_empty() {
                break;
            }
            start = resolved.len();
            self.queue.enqueue_range(follow_ups);
            resolved.extend(self.queue.drain(state, self.view).await?);
        }

        if let Some(outcome) = state.check_outcome() {
            state.game_state = outcome;
        }
        Ok(resolved)
    }

    /// The barrier: drains whatever the current step generated and files the
    /// result under that step.
    pub(crate) async fn barrier(
        &mut self,
        step: PhaseStep,
        state: &mut BattleState,
        ctx: &mut TurnContext,
    ) -> BattleResult<Vec<BattleAction>> {
        let generated = std::mem::take(&mut ctx.generated);
        let batch = self.settle(state, generated).await?;
        ctx.record_batch(step, batch.clone());
        Ok(batch)
    }
}

fn validate_party(party: &Party, rules: &BattleRules, catalog: &Catalog) -> BattleResult<()> {
    if party.members.is_empty() {
        return Err(BattleEngineError::InvalidConstruction(format!(
            "{} has no combatants",
            party.trainer
        )));
    }
    if party.members.len() > rules.max_party_size {
        return Err(BattleEngineError::InvalidConstruction(format!(
            "{} brought {} combatants, the limit is {}",
            party.trainer,
            party.members.len(),
            rules.max_party_size
        )));
    }
    for member in &party.members {
        if member.moves.is_empty() {
            return Err(BattleEngineError::InvalidConstruction(format!(
                "{} has no moves",
                member.name
            )));
        }
        for instance in &member.moves {
            catalog.move_data(instance.move_)?;
        }
    }
    Ok(())
}

fn summarize(ctx: TurnContext) -> TurnSummary {
    let moves = ctx
        .sorted
        .iter()
        .enumerate()
        .filter_map(|(id, action)| match action {
            BattleAction::UseMove {
                user,
                move_,
                targets,
            } => Some(MoveOutcome {
                user: *user,
                move_: *move_,
                valid: ctx.is_valid(id),
                targets: targets
                    .iter()
                    .map(|target| TargetOutcome {
                        target: *target,
                        protected: ctx.is_protected((id, *target)),
                        hit: ctx.did_hit((id, *target)),
                        damage: ctx.dealt.get(&(id, *target)).copied().unwrap_or(0),
                    })
                    .collect(),
            }),
            _ => None,
        })
        .collect();

    TurnSummary {
        turn: ctx.turn,
        actions: ctx.processed,
        moves,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::presentation::NoopPresenter;
    use crate::battle::tests::common::{ScriptedProvider, TestCombatantBuilder};
    use pretty_assertions::assert_eq;
    use schema::{Move, PokemonType};

    fn party(trainer: &str, moves: Vec<Move>) -> Party {
        Party::new(
            trainer,
            vec![TestCombatantBuilder::new(trainer, PokemonType::Normal)
                .with_moves(moves)
                .build()],
        )
    }

    #[test]
    fn rejects_empty_parties() {
        let provider = ScriptedProvider::default();
        let view = NoopPresenter;
        let result = BattleEngine::initialize(
            EngineOptions::default(),
            Party::new("Red", vec![]),
            party("Blue", vec![Move::Tackle]),
            &provider,
            &provider,
            &view,
        );
        assert!(matches!(result, Err(BattleEngineError::InvalidConstruction(_))));
    }

    #[test]
    fn rejects_moves_missing_from_the_catalog() {
        let provider = ScriptedProvider::default();
        let view = NoopPresenter;
        let mut catalog = Catalog::new();
        catalog.insert(
            Move::Tackle,
            Catalog::standard().move_data(Move::Tackle).expect("tackle").clone(),
        );

        let result = BattleEngine::initialize(
            EngineOptions::default().with_catalog(catalog),
            party("Red", vec![Move::Tackle]),
            party("Blue", vec![Move::Ember]),
            &provider,
            &provider,
            &view,
        );
        assert!(matches!(result, Err(BattleEngineError::MoveData(_))));
    }

    #[tokio::test]
    async fn begin_battle_fills_every_slot() {
        let provider = ScriptedProvider::default();
        let view = NoopPresenter;
        let (mut state, mut engine) = BattleEngine::initialize(
            EngineOptions::default().with_seed(7),
            party("Red", vec![Move::Tackle]),
            party("Blue", vec![Move::Tackle]),
            &provider,
            &provider,
            &view,
        )
        .expect("valid battle");

        let resolved = engine.begin_battle(&mut state).await.expect("opening");
        assert_eq!(
            resolved
                .iter()
                .filter(|action| matches!(action, BattleAction::Switch { .. }))
                .count(),
            2
        );
        assert_eq!(state.slot(crate::battle::tests::common::P1).and_then(|s| s.occupant), Some(0));
        assert_eq!(state.game_state, GameState::WaitingForActions);
    }
}

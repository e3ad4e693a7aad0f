#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use schema::{Move, PokemonType};

    use crate::battle::action::BattleAction;
    use crate::battle::conditions::VolatileKind;
    use crate::battle::engine::BattleEngine;
    use crate::battle::messages::{ActionFailureReason, BattleMessage};
    use crate::battle::pipeline::{PhaseStep, TurnContext};
    use crate::battle::presentation::NoopPresenter;
    use crate::battle::state::{BattleState, GameState, SideId, SlotRef};
    use crate::battle::tests::common::{
        create_test_battle, predictable_rng, RecordingPresenter, ScriptedProvider, TestCombatantBuilder, P1, P2,
    };
    use crate::config::{BattleRules, EngineOptions};
    use crate::player::{Party, PlayerAction};
    use crate::pokemon::{Combatant, StatusCondition};
    use crate::random::{RandomSource, ScriptedRandom};

    async fn open_battle<'a>(
        rules: BattleRules,
        rng: Box<dyn RandomSource>,
        red: Vec<Combatant>,
        blue: Vec<Combatant>,
        provider: &'a ScriptedProvider,
        view: &'a RecordingPresenter,
    ) -> (BattleState, BattleEngine<'a>) {
        let (mut state, mut engine) = BattleEngine::initialize(
            EngineOptions::new(rules).with_random(rng),
            Party::new("Red", red),
            Party::new("Blue", blue),
            provider,
            provider,
            view,
        )
        .expect("valid battle");
        engine.begin_battle(&mut state).await.expect("opening");
        (state, engine)
    }

    fn hp(state: &BattleState, slot: SlotRef) -> u16 {
        state.combatant(slot).map_or(0, |combatant| combatant.current_hp())
    }

    #[tokio::test]
    async fn both_tackles_land_in_collection_order() {
        let provider = ScriptedProvider::default();
        let view = RecordingPresenter::default();
        let (mut state, mut engine) = open_battle(
            BattleRules::singles(),
            Box::new(predictable_rng()),
            vec![TestCombatantBuilder::new("Left", PokemonType::Fire).build()],
            vec![TestCombatantBuilder::new("Right", PokemonType::Water).build()],
            &provider,
            &view,
        )
        .await;

        let summary = engine.run_turn(&mut state, 1).await.expect("turn");

        assert_eq!(summary.turn, 1);
        assert_eq!(summary.moves.len(), 2);
        assert_eq!(summary.moves[0].user, P1);
        assert_eq!(summary.moves[1].user, P2);
        for outcome in &summary.moves {
            assert!(outcome.valid);
            assert!(outcome.targets[0].hit);
            assert_eq!(outcome.targets[0].damage, 16);
        }
        assert_eq!(hp(&state, P1), 84);
        assert_eq!(hp(&state, P2), 84);
        assert_eq!(state.game_state, GameState::WaitingForActions);

        let turn_messages: Vec<BattleMessage> = summary
            .actions
            .iter()
            .filter_map(|action| match action {
                BattleAction::EmitMessage(message) => Some(message.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(turn_messages[0], BattleMessage::TurnStarted { turn_number: 1 });
        assert_eq!(
            turn_messages
                .iter()
                .filter(|message| matches!(message, BattleMessage::DamageTaken { .. }))
                .count(),
            2
        );
        // Presentation saw the opening switches too.
        assert!(view.messages().len() > turn_messages.len());
    }

    #[tokio::test]
    async fn protect_blocks_a_slower_attack() {
        let provider = ScriptedProvider::default();
        let view = RecordingPresenter::default();
        let (mut state, mut engine) = open_battle(
            BattleRules::singles(),
            Box::new(predictable_rng()),
            vec![TestCombatantBuilder::new("Guard", PokemonType::Normal)
                .with_moves(vec![Move::Protect])
                .build()],
            vec![TestCombatantBuilder::new("Striker", PokemonType::Normal).build()],
            &provider,
            &view,
        )
        .await;

        let summary = engine.run_turn(&mut state, 1).await.expect("turn");

        let tackle = &summary.moves[1];
        assert_eq!(tackle.user, P2);
        assert!(tackle.targets[0].protected);
        assert!(!tackle.targets[0].hit);
        assert_eq!(tackle.targets[0].damage, 0);
        assert_eq!(hp(&state, P1), 100);
        assert!(summary.actions.contains(&BattleAction::message(BattleMessage::Blocked {
            target: "Guard".to_string(),
        })));
        // Protection only lasts for the turn it was raised in.
        assert!(!state.has_volatile(P1, VolatileKind::Protected));
    }

    #[tokio::test]
    async fn fainted_targets_count_as_hit_without_a_roll() {
        let provider = ScriptedProvider::default();
        let view = NoopPresenter;
        // 80 misses anything with 75% accuracy.
        let (_, mut engine) = BattleEngine::initialize(
            EngineOptions::default().with_random(Box::new(ScriptedRandom::constant(80))),
            Party::new("Red", vec![TestCombatantBuilder::new("Red", PokemonType::Grass).build()]),
            Party::new("Blue", vec![TestCombatantBuilder::new("Blue", PokemonType::Normal).build()]),
            &provider,
            &provider,
            &view,
        )
        .expect("valid battle");

        let sleeper = TestCombatantBuilder::new("Sleeper", PokemonType::Grass)
            .with_moves(vec![Move::SleepPowder])
            .build();
        let mut fainted_target = create_test_battle(
            vec![sleeper.clone()],
            vec![TestCombatantBuilder::new("Down", PokemonType::Normal).with_hp(0).build()],
        );
        let mut live_target = create_test_battle(
            vec![sleeper],
            vec![TestCombatantBuilder::new("Up", PokemonType::Normal).build()],
        );

        for (state, expect_hit) in [(&mut fainted_target, true), (&mut live_target, false)] {
            let mut ctx = TurnContext::new(1);
            ctx.sorted = vec![BattleAction::UseMove {
                user: P1,
                move_: Move::SleepPowder,
                targets: vec![P2],
            }];
            ctx.validity.insert(0, true);

            engine
                .run_step(PhaseStep::CheckAccuracy, state, &mut ctx)
                .await
                .expect("accuracy step");

            assert_eq!(ctx.did_hit((0, P2)), expect_hit);
            assert_eq!(ctx.generated.is_empty(), expect_hit);
        }
    }

    #[tokio::test]
    async fn full_paralysis_stops_the_move() {
        let provider = ScriptedProvider::default();
        let view = RecordingPresenter::default();
        let (mut state, mut engine) = open_battle(
            BattleRules::singles(),
            Box::new(ScriptedRandom::constant(10)),
            vec![TestCombatantBuilder::new("Stiff", PokemonType::Normal)
                .with_status(StatusCondition::Paralysis)
                .build()],
            vec![TestCombatantBuilder::new("Other", PokemonType::Water).build()],
            &provider,
            &view,
        )
        .await;

        let summary = engine.run_turn(&mut state, 1).await.expect("turn");

        let stiff = summary
            .moves
            .iter()
            .find(|outcome| outcome.user == P1)
            .expect("collected");
        assert!(!stiff.valid);
        assert_eq!(hp(&state, P2), 100);
        assert!(view.messages().contains(&BattleMessage::ActionFailed {
            user: "Stiff".to_string(),
            reason: ActionFailureReason::IsParalyzed,
        }));
    }

    #[tokio::test]
    async fn sleep_counts_down_before_waking() {
        let provider = ScriptedProvider::default();
        let view = RecordingPresenter::default();
        let (mut state, mut engine) = open_battle(
            BattleRules::singles(),
            Box::new(predictable_rng()),
            vec![TestCombatantBuilder::new("Dozer", PokemonType::Fire)
                .with_status(StatusCondition::Sleep(1))
                .build()],
            vec![TestCombatantBuilder::new("Target", PokemonType::Water)
                .with_moves(vec![Move::Splash])
                .build()],
            &provider,
            &view,
        )
        .await;

        let first = engine.run_turn(&mut state, 1).await.expect("turn 1");
        assert!(!first.moves[0].valid);
        assert_eq!(
            state.combatant(P1).and_then(|combatant| combatant.status),
            Some(StatusCondition::Sleep(0))
        );

        let second = engine.run_turn(&mut state, 2).await.expect("turn 2");
        let dozer = second
            .moves
            .iter()
            .find(|outcome| outcome.user == P1)
            .expect("collected");
        assert!(dozer.valid);
        assert_eq!(state.combatant(P1).and_then(|combatant| combatant.status), None);
        assert_eq!(hp(&state, P2), 84);
    }

    #[tokio::test]
    async fn provider_errors_fall_back_to_a_random_move() {
        let provider = ScriptedProvider::default().failing_for(P1);
        let view = RecordingPresenter::default();
        let (mut state, mut engine) = open_battle(
            BattleRules::singles(),
            Box::new(predictable_rng()),
            vec![TestCombatantBuilder::new("Left", PokemonType::Fire).build()],
            vec![TestCombatantBuilder::new("Right", PokemonType::Water).build()],
            &provider,
            &view,
        )
        .await;

        let summary = engine.run_turn(&mut state, 1).await.expect("turn");

        assert_eq!(summary.moves.len(), 2);
        assert!(summary.moves.iter().all(|outcome| outcome.valid));
        assert_eq!(hp(&state, P2), 84);
    }

    #[tokio::test]
    async fn a_knockout_ends_the_battle_mid_turn() {
        let provider = ScriptedProvider::default();
        let view = RecordingPresenter::default();
        let (mut state, mut engine) = open_battle(
            BattleRules::singles(),
            Box::new(predictable_rng()),
            vec![TestCombatantBuilder::new("Quick", PokemonType::Fire).with_speed(80).build()],
            vec![TestCombatantBuilder::new("Frail", PokemonType::Water).with_hp(10).build()],
            &provider,
            &view,
        )
        .await;

        let summary = engine.run_turn(&mut state, 1).await.expect("turn");

        assert_eq!(state.game_state, GameState::Player1Win);
        assert_eq!(hp(&state, P1), 100);
        assert_eq!(summary.moves[0].targets[0].damage, 10);
        assert!(view.messages().contains(&BattleMessage::Fainted {
            name: "Frail".to_string(),
        }));
    }

    #[tokio::test]
    async fn a_knocked_out_user_loses_its_status_move() {
        let provider = ScriptedProvider::default();
        let view = RecordingPresenter::default();
        let (mut state, mut engine) = open_battle(
            BattleRules::singles(),
            Box::new(predictable_rng()),
            vec![TestCombatantBuilder::new("Fast", PokemonType::Normal).with_speed(90).build()],
            vec![
                TestCombatantBuilder::new("Slow", PokemonType::Normal)
                    .with_speed(10)
                    .with_hp(5)
                    .with_moves(vec![Move::ThunderWave])
                    .build(),
                TestCombatantBuilder::new("Backup", PokemonType::Normal).build(),
            ],
            &provider,
            &view,
        )
        .await;

        let summary = engine.run_turn(&mut state, 1).await.expect("turn");

        assert_eq!(state.combatant(P1).and_then(|combatant| combatant.status), None);
        assert!(!summary.actions.iter().any(|action| matches!(
            action,
            BattleAction::MoveAnimation { user, .. } if *user == P2
        ) || matches!(action, BattleAction::ApplyStatus { .. })));
        // The replacement came in after the knockout.
        assert_eq!(state.slot(P2).and_then(|slot| slot.occupant), Some(1));
    }

    #[tokio::test]
    async fn follow_me_draws_every_single_target_attack() {
        let left_ally = SlotRef::new(SideId::Player1, 1);
        let provider = ScriptedProvider::default().with_action(
            P2,
            PlayerAction::UseMove {
                move_index: 0,
                target: Some(left_ally),
            },
        );
        let view = RecordingPresenter::default();
        let (mut state, mut engine) = open_battle(
            BattleRules::doubles(),
            Box::new(predictable_rng()),
            vec![
                TestCombatantBuilder::new("Decoy", PokemonType::Normal)
                    .with_moves(vec![Move::FollowMe])
                    .build(),
                TestCombatantBuilder::new("Ward", PokemonType::Normal)
                    .with_moves(vec![Move::Splash])
                    .build(),
            ],
            vec![
                TestCombatantBuilder::new("Foe A", PokemonType::Normal).build(),
                TestCombatantBuilder::new("Foe B", PokemonType::Normal).build(),
            ],
            &provider,
            &view,
        )
        .await;

        let summary = engine.run_turn(&mut state, 1).await.expect("turn");

        let foe_targets: Vec<SlotRef> = summary
            .moves
            .iter()
            .filter(|outcome| outcome.user.side == SideId::Player2)
            .flat_map(|outcome| outcome.targets.iter().map(|target| target.target))
            .collect();
        assert_eq!(foe_targets, vec![P1, P1]);
        assert_eq!(hp(&state, left_ally), 100);
        assert!(hp(&state, P1) < 100);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{Item, Move, PokemonType, Weather};

    use crate::battle::engine::BattleEngine;
    use crate::battle::state::{BattleState, Timed};
    use crate::battle::tests::common::{predictable_rng, RecordingPresenter, ScriptedProvider, TestCombatantBuilder, P1, P2};
    use crate::config::EngineOptions;
    use crate::player::Party;
    use crate::pokemon::{Combatant, StatusCondition};

    fn resting(name: &str, pokemon_type: PokemonType) -> TestCombatantBuilder {
        TestCombatantBuilder::new(name, pokemon_type).with_moves(vec![Move::Splash])
    }

    async fn play_turns(red: Combatant, blue: Combatant, turns: u32, setup: impl FnOnce(&mut BattleState)) -> Vec<(u16, Option<StatusCondition>)> {
        let provider = ScriptedProvider::default();
        let view = RecordingPresenter::default();
        let (mut state, mut engine) = BattleEngine::initialize(
            EngineOptions::default().with_random(Box::new(predictable_rng())),
            Party::new("Red", vec![red]),
            Party::new("Blue", vec![blue]),
            &provider,
            &provider,
            &view,
        )
        .expect("valid battle");
        engine.begin_battle(&mut state).await.expect("opening");
        setup(&mut state);

        let mut history = Vec::new();
        for turn in 1..=turns {
            engine.run_turn(&mut state, turn).await.expect("turn");
            let combatant = state.combatant(P1).expect("still on the field");
            history.push((combatant.current_hp(), combatant.status));
        }
        history
    }

    #[tokio::test]
    async fn toxic_damage_grows_every_turn() {
        let history = play_turns(
            resting("Victim", PokemonType::Normal)
                .with_status(StatusCondition::BadlyPoisoned(1))
                .build(),
            resting("Other", PokemonType::Normal).build(),
            3,
            |_| {},
        )
        .await;

        // 6, then 12, then 18 damage.
        assert_eq!(
            history,
            vec![
                (94, Some(StatusCondition::BadlyPoisoned(2))),
                (82, Some(StatusCondition::BadlyPoisoned(3))),
                (64, Some(StatusCondition::BadlyPoisoned(4))),
            ]
        );
    }

    #[rstest]
    #[case(StatusCondition::Burn, 94)]
    #[case(StatusCondition::Poison, 88)]
    #[case(StatusCondition::Paralysis, 100)]
    #[tokio::test]
    async fn status_damage_per_turn(#[case] status: StatusCondition, #[case] expected_hp: u16) {
        let history = play_turns(
            resting("Victim", PokemonType::Normal).with_status(status).build(),
            resting("Other", PokemonType::Normal).build(),
            1,
            |_| {},
        )
        .await;

        assert_eq!(history[0], (expected_hp, Some(status)));
    }

    #[tokio::test]
    async fn leftovers_offsets_sandstorm_damage() {
        let history = play_turns(
            resting("Holder", PokemonType::Normal).with_item(Item::Leftovers).build(),
            resting("Rock", PokemonType::Rock).build(),
            2,
            |state| {
                state.field.weather = Some(Timed {
                    kind: Weather::Sandstorm,
                    turns_remaining: 5,
                });
            },
        )
        .await;

        // Sand takes 6 at end of turn, Leftovers gives it back in the trigger step.
        assert_eq!(history[0].0, 100);
        assert_eq!(history[1].0, 100);
    }

    #[tokio::test]
    async fn weather_expires_after_its_duration() {
        let provider = ScriptedProvider::default();
        let view = RecordingPresenter::default();
        let (mut state, mut engine) = BattleEngine::initialize(
            EngineOptions::default().with_random(Box::new(predictable_rng())),
            Party::new("Red", vec![resting("Red", PokemonType::Water).build()]),
            Party::new("Blue", vec![resting("Blue", PokemonType::Water).build()]),
            &provider,
            &provider,
            &view,
        )
        .expect("valid battle");
        engine.begin_battle(&mut state).await.expect("opening");
        state.field.weather = Some(Timed {
            kind: Weather::Rain,
            turns_remaining: 2,
        });

        engine.run_turn(&mut state, 1).await.expect("turn 1");
        assert_eq!(state.weather(), Some(Weather::Rain));
        engine.run_turn(&mut state, 2).await.expect("turn 2");
        assert_eq!(state.weather(), None);
        assert_eq!(state.combatant(P2).map(|combatant| combatant.current_hp()), Some(100));
    }
}

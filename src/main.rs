//! Plays one battle between two scoring sides and prints the report.
//!
//! Usage: `pokemon-turn-engine [seed] [singles|doubles]`

use std::process::ExitCode;

use pokemon_turn_engine::{
    Ability, BattleEngine, BattleRules, Catalog, Combatant, EngineOptions, Item, Move, MoveInstance, Party,
    PokemonType, ScoringAI, StatBlock, TextPresenter,
};
use tracing::error;

fn member(
    catalog: &Catalog,
    name: &str,
    types: Vec<PokemonType>,
    stats: StatBlock,
    moves: &[Move],
) -> Combatant {
    let moves = moves
        .iter()
        .map(|move_| {
            let pp = catalog.move_data(*move_).map_or(10, |data| data.max_pp);
            MoveInstance::new(*move_, pp)
        })
        .collect();
    Combatant::new(name, 50, types, stats, moves)
}

fn demo_parties(catalog: &Catalog) -> (Party, Party) {
    use PokemonType::*;

    let red = Party::new(
        "Trainer Red",
        vec![
            member(
                catalog,
                "Pikachu",
                vec![Electric],
                StatBlock::new(110, 75, 60, 70, 70, 110),
                &[Move::Thunderbolt, Move::QuickAttack, Move::ThunderWave, Move::Protect],
            )
            .with_ability(Ability::Static),
            member(
                catalog,
                "Charizard",
                vec![Fire, Flying],
                StatBlock::new(153, 104, 98, 129, 105, 120),
                &[Move::Flamethrower, Move::SwordsDance, Move::Earthquake, Move::SunnyDay],
            )
            .with_item(Item::Leftovers),
            member(
                catalog,
                "Venusaur",
                vec![Grass, Poison],
                StatBlock::new(155, 102, 103, 120, 120, 100),
                &[Move::GigaDrain, Move::SleepPowder, Move::LeechSeed, Move::Toxic],
            )
            .with_ability(Ability::RainDish),
        ],
    );
    let blue = Party::new(
        "Trainer Blue",
        vec![
            member(
                catalog,
                "Blastoise",
                vec![Water],
                StatBlock::new(154, 103, 120, 105, 125, 98),
                &[Move::Surf, Move::IceBeam, Move::Bite, Move::RainDance],
            )
            .with_ability(Ability::Drizzle),
            member(
                catalog,
                "Golem",
                vec![Rock, Ground],
                StatBlock::new(155, 130, 150, 75, 85, 65),
                &[Move::Earthquake, Move::RockSlide, Move::StealthRock, Move::DoubleEdge],
            )
            .with_item(Item::SitrusBerry),
            member(
                catalog,
                "Gengar",
                vec![Ghost, Poison],
                StatBlock::new(135, 85, 80, 150, 95, 130),
                &[Move::ShadowBall, Move::Psychic, Move::WillOWisp, Move::Spikes],
            )
            .with_item(Item::LifeOrb),
        ],
    );
    (red, blue)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|arg| arg.parse::<u64>().ok()).unwrap_or(1);
    let rules = match args.next().as_deref() {
        Some("doubles") => BattleRules::doubles(),
        _ => BattleRules::singles(),
    };

    let catalog = Catalog::standard();
    let (red, blue) = demo_parties(&catalog);
    let red_ai = ScoringAI::new(catalog.clone());
    let blue_ai = ScoringAI::new(catalog.clone());
    let view = TextPresenter::new();

    let options = EngineOptions::new(rules).with_seed(seed).with_catalog(catalog);
    let (mut state, mut engine) = match BattleEngine::initialize(options, red, blue, &red_ai, &blue_ai, &view) {
        Ok(pair) => pair,
        Err(err) => {
            error!(%err, "could not set up the battle");
            return ExitCode::FAILURE;
        }
    };

    let report = match engine.run_battle(&mut state).await {
        Ok(report) => report,
        Err(err) => {
            error!(%err, "battle aborted");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            error!(%err, "could not serialize the report");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

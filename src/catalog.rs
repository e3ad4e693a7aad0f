//! Read-only move data.
//!
//! The engine only ever looks moves up; it never edits an entry once the
//! catalog is built.

use schema::{
    EffectTarget, Hazard, Move, MoveCategory, MoveData, MoveEffect, MoveTarget, PokemonType,
    SideCondition, StatType, Terrain, Weather,
};
use std::collections::HashMap;

use crate::errors::{MoveDataError, MoveDataResult};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    moves: HashMap<Move, MoveData>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a catalog from a RON map of `Move` to `MoveData`.
    pub fn from_ron_str(source: &str) -> MoveDataResult<Self> {
        let moves: HashMap<Move, MoveData> =
            ron::from_str(source).map_err(|err| MoveDataError::MalformedData(err.to_string()))?;
        Ok(Self { moves })
    }

    pub fn insert(&mut self, move_: Move, data: MoveData) {
        self.moves.insert(move_, data);
    }

    pub fn move_data(&self, move_: Move) -> MoveDataResult<&MoveData> {
        self.moves.get(&move_).ok_or(MoveDataError::MoveNotFound(move_))
    }

    pub fn contains(&self, move_: Move) -> bool {
        self.moves.contains_key(&move_)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// The built-in move list.
    pub fn standard() -> Self {
        use MoveCategory::{Physical, Special};
        use PokemonType::*;

        let mut catalog = Self::new();
        let mut add = |move_: Move, data: MoveData| catalog.insert(move_, data);

        add(Move::Tackle, attack("Tackle", Normal, Physical, 40, Some(100), 35).contact());
        add(
            Move::QuickAttack,
            attack("Quick Attack", Normal, Physical, 40, Some(100), 30)
                .contact()
                .priority(1),
        );
        add(
            Move::DoubleEdge,
            attack("Double-Edge", Normal, Physical, 120, Some(100), 15)
                .contact()
                .effect(MoveEffect::Recoil(33)),
        );
        add(
            Move::Swift,
            attack("Swift", Normal, Special, 60, None, 20).target(MoveTarget::AllAdjacentFoes),
        );
        add(
            Move::Ember,
            attack("Ember", Fire, Special, 40, Some(100), 25).effect(MoveEffect::Burn(10)),
        );
        add(
            Move::Flamethrower,
            attack("Flamethrower", Fire, Special, 90, Some(100), 15).effect(MoveEffect::Burn(10)),
        );
        add(Move::WaterGun, attack("Water Gun", Water, Special, 40, Some(100), 25));
        add(
            Move::Surf,
            attack("Surf", Water, Special, 90, Some(100), 15).target(MoveTarget::AllAdjacent),
        );
        add(
            Move::ThunderShock,
            attack("Thunder Shock", Electric, Special, 40, Some(100), 30)
                .effect(MoveEffect::Paralyze(10)),
        );
        add(
            Move::Thunderbolt,
            attack("Thunderbolt", Electric, Special, 90, Some(100), 15)
                .effect(MoveEffect::Paralyze(10)),
        );
        add(Move::VineWhip, attack("Vine Whip", Grass, Physical, 45, Some(100), 25).contact());
        add(
            Move::RazorLeaf,
            attack("Razor Leaf", Grass, Physical, 55, Some(95), 25)
                .target(MoveTarget::AllAdjacentFoes),
        );
        add(
            Move::GigaDrain,
            attack("Giga Drain", Grass, Special, 75, Some(100), 10).effect(MoveEffect::Drain(50)),
        );
        add(
            Move::IceBeam,
            attack("Ice Beam", Ice, Special, 90, Some(100), 10).effect(MoveEffect::Freeze(10)),
        );
        add(
            Move::DoubleKick,
            attack("Double Kick", Fighting, Physical, 30, Some(100), 30)
                .contact()
                .effect(MoveEffect::MultiHit(2)),
        );
        add(
            Move::PoisonSting,
            attack("Poison Sting", Poison, Physical, 15, Some(100), 35)
                .effect(MoveEffect::Poison(30)),
        );
        add(
            Move::Earthquake,
            attack("Earthquake", Ground, Physical, 100, Some(100), 10)
                .target(MoveTarget::AllAdjacent),
        );
        add(
            Move::RockSlide,
            attack("Rock Slide", Rock, Physical, 75, Some(90), 10)
                .target(MoveTarget::AllAdjacentFoes)
                .effect(MoveEffect::Flinch(30)),
        );
        add(
            Move::Bite,
            attack("Bite", Dark, Physical, 60, Some(100), 25)
                .contact()
                .effect(MoveEffect::Flinch(30)),
        );
        add(
            Move::Psychic,
            attack("Psychic", Psychic, Special, 90, Some(100), 10).effect(MoveEffect::StatChange(
                EffectTarget::Target,
                StatType::SpDef,
                -1,
                10,
            )),
        );
        add(Move::ShadowBall, attack("Shadow Ball", Ghost, Special, 80, Some(100), 15));
        add(
            Move::MetalClaw,
            attack("Metal Claw", Steel, Physical, 50, Some(95), 35)
                .contact()
                .effect(MoveEffect::StatChange(EffectTarget::User, StatType::Atk, 1, 10)),
        );
        add(Move::Moonblast, attack("Moonblast", Fairy, Special, 95, Some(100), 15));

        add(
            Move::Toxic,
            status("Toxic", Poison, Some(90), 10, MoveTarget::SingleFoe)
                .effect(MoveEffect::BadlyPoison(100)),
        );
        add(
            Move::ThunderWave,
            status("Thunder Wave", Electric, Some(90), 20, MoveTarget::SingleFoe)
                .effect(MoveEffect::Paralyze(100)),
        );
        add(
            Move::WillOWisp,
            status("Will-O-Wisp", Fire, Some(85), 15, MoveTarget::SingleFoe)
                .effect(MoveEffect::Burn(100)),
        );
        add(
            Move::SleepPowder,
            status("Sleep Powder", Grass, Some(75), 15, MoveTarget::SingleFoe)
                .effect(MoveEffect::Sleep(100)),
        );
        add(
            Move::SwordsDance,
            status("Swords Dance", Normal, None, 20, MoveTarget::User).effect(
                MoveEffect::StatChange(EffectTarget::User, StatType::Atk, 2, 100),
            ),
        );
        add(
            Move::Growl,
            status("Growl", Normal, Some(100), 40, MoveTarget::AllAdjacentFoes).effect(
                MoveEffect::StatChange(EffectTarget::Target, StatType::Atk, -1, 100),
            ),
        );
        add(
            Move::Recover,
            status("Recover", Normal, None, 5, MoveTarget::User).effect(MoveEffect::Heal(50)),
        );
        add(
            Move::Protect,
            status("Protect", Normal, None, 10, MoveTarget::User)
                .priority(4)
                .effect(MoveEffect::Protect),
        );
        add(
            Move::FollowMe,
            status("Follow Me", Normal, None, 20, MoveTarget::User)
                .priority(2)
                .effect(MoveEffect::Decoy),
        );
        add(
            Move::LeechSeed,
            status("Leech Seed", Grass, Some(90), 10, MoveTarget::SingleFoe)
                .effect(MoveEffect::LeechSeed),
        );
        add(
            Move::RainDance,
            status("Rain Dance", Water, None, 5, MoveTarget::Field)
                .effect(MoveEffect::SetWeather(Weather::Rain)),
        );
        add(
            Move::SunnyDay,
            status("Sunny Day", Fire, None, 5, MoveTarget::Field)
                .effect(MoveEffect::SetWeather(Weather::Sun)),
        );
        add(
            Move::Sandstorm,
            status("Sandstorm", Rock, None, 10, MoveTarget::Field)
                .effect(MoveEffect::SetWeather(Weather::Sandstorm)),
        );
        add(
            Move::Hail,
            status("Hail", Ice, None, 10, MoveTarget::Field)
                .effect(MoveEffect::SetWeather(Weather::Hail)),
        );
        add(
            Move::GrassyTerrain,
            status("Grassy Terrain", Grass, None, 10, MoveTarget::Field)
                .effect(MoveEffect::SetTerrain(Terrain::Grassy)),
        );
        add(
            Move::ElectricTerrain,
            status("Electric Terrain", Electric, None, 10, MoveTarget::Field)
                .effect(MoveEffect::SetTerrain(Terrain::Electric)),
        );
        add(
            Move::Spikes,
            status("Spikes", Ground, None, 20, MoveTarget::FoeSide)
                .effect(MoveEffect::SetHazard(Hazard::Spikes)),
        );
        add(
            Move::ToxicSpikes,
            status("Toxic Spikes", Poison, None, 20, MoveTarget::FoeSide)
                .effect(MoveEffect::SetHazard(Hazard::ToxicSpikes)),
        );
        add(
            Move::StealthRock,
            status("Stealth Rock", Rock, None, 20, MoveTarget::FoeSide)
                .effect(MoveEffect::SetHazard(Hazard::StealthRock)),
        );
        add(
            Move::Reflect,
            status("Reflect", Psychic, None, 20, MoveTarget::AllySide)
                .effect(MoveEffect::SetSideCondition(SideCondition::Reflect)),
        );
        add(
            Move::LightScreen,
            status("Light Screen", Psychic, None, 30, MoveTarget::AllySide)
                .effect(MoveEffect::SetSideCondition(SideCondition::LightScreen)),
        );
        add(
            Move::Tailwind,
            status("Tailwind", Flying, None, 15, MoveTarget::AllySide)
                .effect(MoveEffect::SetSideCondition(SideCondition::Tailwind)),
        );
        add(Move::Splash, status("Splash", Normal, None, 40, MoveTarget::User));

        catalog
    }
}

fn attack(
    name: &str,
    move_type: PokemonType,
    category: MoveCategory,
    power: u8,
    accuracy: Option<u8>,
    max_pp: u8,
) -> MoveData {
    MoveData {
        name: name.to_string(),
        move_type,
        category,
        power: Some(power),
        accuracy,
        max_pp,
        priority: 0,
        contact: false,
        target: MoveTarget::SingleFoe,
        effects: Vec::new(),
    }
}

fn status(
    name: &str,
    move_type: PokemonType,
    accuracy: Option<u8>,
    max_pp: u8,
    target: MoveTarget,
) -> MoveData {
    MoveData {
        name: name.to_string(),
        move_type,
        category: MoveCategory::Status,
        power: None,
        accuracy,
        max_pp,
        priority: 0,
        contact: false,
        target,
        effects: Vec::new(),
    }
}

/// Chained adjustments used while building the standard table.
trait MoveDataExt {
    fn contact(self) -> Self;
    fn priority(self, priority: i8) -> Self;
    fn target(self, target: MoveTarget) -> Self;
    fn effect(self, effect: MoveEffect) -> Self;
}

impl MoveDataExt for MoveData {
    fn contact(mut self) -> Self {
        self.contact = true;
        self
    }

    fn priority(mut self, priority: i8) -> Self {
        self.priority = priority;
        self
    }

    fn target(mut self, target: MoveTarget) -> Self {
        self.target = target;
        self
    }

    fn effect(mut self, effect: MoveEffect) -> Self {
        self.effects.push(effect);
        self
    }
}

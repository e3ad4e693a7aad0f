use crate::battle_data::{Hazard, SideCondition, StatType, Terrain, Weather};
use crate::pokemon_types::PokemonType;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumDiscriminants, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "title_case")]
pub enum Move {
    Tackle,
    QuickAttack,
    #[strum(serialize = "Double-Edge")]
    DoubleEdge,
    Swift,
    Ember,
    Flamethrower,
    WaterGun,
    Surf,
    ThunderShock,
    Thunderbolt,
    VineWhip,
    RazorLeaf,
    GigaDrain,
    IceBeam,
    DoubleKick,
    PoisonSting,
    Earthquake,
    RockSlide,
    Bite,
    Psychic,
    ShadowBall,
    MetalClaw,
    Moonblast,
    Toxic,
    ThunderWave,
    #[strum(serialize = "Will-O-Wisp")]
    WillOWisp,
    SleepPowder,
    SwordsDance,
    Growl,
    Recover,
    Protect,
    FollowMe,
    LeechSeed,
    RainDance,
    SunnyDay,
    Sandstorm,
    Hail,
    GrassyTerrain,
    ElectricTerrain,
    Spikes,
    ToxicSpikes,
    StealthRock,
    Reflect,
    LightScreen,
    Tailwind,
    Splash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

impl fmt::Display for MoveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveCategory::Physical => write!(f, "Physical"),
            MoveCategory::Special => write!(f, "Special"),
            MoveCategory::Status => write!(f, "Status"),
        }
    }
}

/// The declared target scope of a move, expanded to concrete slots at
/// target-resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveTarget {
    /// The user only.
    User,
    /// One chosen opponent; can be redirected.
    SingleFoe,
    /// Every adjacent opponent.
    AllAdjacentFoes,
    /// Every adjacent combatant, allies included.
    AllAdjacent,
    /// Every opponent regardless of position.
    AllFoes,
    /// The user's side as a whole.
    AllySide,
    /// The opposing side as a whole.
    FoeSide,
    /// The whole field.
    Field,
}

impl MoveTarget {
    /// True when the move can hit more than one combatant; those moves take the spread penalty.
    pub fn is_spread(&self) -> bool {
        matches!(
            self,
            MoveTarget::AllAdjacentFoes | MoveTarget::AllAdjacent | MoveTarget::AllFoes
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectTarget {
    User,
    Target,
}

/// A non-primary effect attached to a move. Chances are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(name(MoveEffectKind), derive(Hash, Serialize, Deserialize, EnumIter))]
pub enum MoveEffect {
    Burn(u8),
    Paralyze(u8),
    Poison(u8),
    BadlyPoison(u8),
    Freeze(u8),
    Sleep(u8),
    Flinch(u8),
    StatChange(EffectTarget, StatType, i8, u8),
    Recoil(u8),
    Drain(u8),
    Heal(u8),
    MultiHit(u8),
    Protect,
    Decoy,
    LeechSeed,
    SetWeather(Weather),
    SetTerrain(Terrain),
    SetHazard(Hazard),
    SetSideCondition(SideCondition),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub name: String,
    pub move_type: PokemonType,
    pub category: MoveCategory,
    pub power: Option<u8>, // None for no damage moves
    pub accuracy: Option<u8>, // None for sure-hit moves
    pub max_pp: u8,
    #[serde(default)]
    pub priority: i8,
    #[serde(default)]
    pub contact: bool,
    pub target: MoveTarget,
    #[serde(default)]
    pub effects: Vec<MoveEffect>,
}

impl MoveData {
    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status && self.power.is_some()
    }

    pub fn has_effect(&self, kind: MoveEffectKind) -> bool {
        self.effects
            .iter()
            .any(|effect| MoveEffectKind::from(effect) == kind)
    }
}

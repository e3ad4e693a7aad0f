use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Weather {
    Rain,
    Sun,
    Sandstorm,
    Hail,
}

impl Weather {
    /// Turns a weather lasts when summoned by a move or an ability.
    pub const DEFAULT_DURATION: u8 = 5;
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Terrain {
    #[strum(serialize = "Grassy Terrain")]
    Grassy,
    #[strum(serialize = "Electric Terrain")]
    Electric,
}

impl Terrain {
    pub const DEFAULT_DURATION: u8 = 5;
}

/// Timed conditions that protect or boost one whole side.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideCondition {
    Reflect,
    LightScreen,
    Tailwind,
}

impl SideCondition {
    pub fn default_duration(&self) -> u8 {
        match self {
            SideCondition::Reflect | SideCondition::LightScreen => 5,
            SideCondition::Tailwind => 4,
        }
    }
}

impl fmt::Display for SideCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            SideCondition::Reflect => "Reflect",
            SideCondition::LightScreen => "Light Screen",
            SideCondition::Tailwind => "Tailwind",
        };
        write!(f, "{}", display_name)
    }
}

/// Entry hazards laid on a side; they hurt whatever switches in there.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hazard {
    Spikes,
    ToxicSpikes,
    StealthRock,
}

impl Hazard {
    pub fn max_layers(&self) -> u8 {
        match self {
            Hazard::Spikes => 3,
            Hazard::ToxicSpikes => 2,
            Hazard::StealthRock => 1,
        }
    }
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Hazard::Spikes => "Spikes",
            Hazard::ToxicSpikes => "Toxic Spikes",
            Hazard::StealthRock => "Stealth Rock",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum StatType {
    Atk,
    Def,
    SpAtk,
    SpDef,
    Spe,
    Acc,
    Eva,
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatType::Atk => write!(f, "Attack"),
            StatType::Def => write!(f, "Defense"),
            StatType::SpAtk => write!(f, "Special Attack"),
            StatType::SpDef => write!(f, "Special Defense"),
            StatType::Spe => write!(f, "Speed"),
            StatType::Acc => write!(f, "Accuracy"),
            StatType::Eva => write!(f, "Evasion"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "title_case")]
pub enum Ability {
    Intimidate,
    Drizzle,
    Drought,
    SandStream,
    SnowWarning,
    RoughSkin,
    Static,
    FlameBody,
    SpeedBoost,
    RainDish,
    Forecast,
    Protean,
    Stamina,
    SwiftSwim,
    Chlorophyll,
    Levitate,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "title_case")]
pub enum Item {
    Leftovers,
    SitrusBerry,
    RockyHelmet,
    LifeOrb,
    ShellBell,
    FlameOrb,
    HeavyDutyBoots,
    ChoiceScarf,
}

impl Item {
    /// Items that are used up when they activate.
    pub fn is_consumable(&self) -> bool {
        matches!(self, Item::SitrusBerry)
    }
}

use schema::{Ability, Item, Move, PokemonType, StatType};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCondition {
    Burn,
    Poison,
    /// Toxic poison; the counter starts at 1 and grows each end of turn.
    BadlyPoisoned(u8),
    Paralysis,
    /// Turns of sleep remaining.
    Sleep(u8),
    Freeze,
}

impl StatusCondition {
    pub fn name(&self) -> &'static str {
        match self {
            StatusCondition::Burn => "burned",
            StatusCondition::Poison => "poisoned",
            StatusCondition::BadlyPoisoned(_) => "badly poisoned",
            StatusCondition::Paralysis => "paralyzed",
            StatusCondition::Sleep(_) => "asleep",
            StatusCondition::Freeze => "frozen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub special_attack: u16,
    pub special_defense: u16,
    pub speed: u16,
}

impl StatBlock {
    pub fn new(hp: u16, attack: u16, defense: u16, special_attack: u16, special_defense: u16, speed: u16) -> Self {
        Self {
            hp,
            attack,
            defense,
            special_attack,
            special_defense,
            speed,
        }
    }

    /// Raw value of a stat. Accuracy and evasion have no raw value and read as zero.
    pub fn get(&self, stat: StatType) -> u16 {
        match stat {
            StatType::Atk => self.attack,
            StatType::Def => self.defense,
            StatType::SpAtk => self.special_attack,
            StatType::SpDef => self.special_defense,
            StatType::Spe => self.speed,
            StatType::Acc | StatType::Eva => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveInstance {
    pub move_: Move,
    pub pp: u8,
}

impl MoveInstance {
    pub fn new(move_: Move, pp: u8) -> Self {
        Self { move_, pp }
    }

    /// Spend one PP. Returns false if the move was already out of PP.
    pub fn use_move(&mut self) -> bool {
        if self.pp == 0 {
            return false;
        }
        self.pp -= 1;
        true
    }
}

/// A party member. Battle-only attributes (stat stages, volatiles, tracking)
/// live on the slot, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub level: u8,
    pub types: Vec<PokemonType>,
    pub stats: StatBlock,
    current_hp: u16,
    pub moves: Vec<MoveInstance>,
    pub status: Option<StatusCondition>,
    pub ability: Option<Ability>,
    pub item: Option<Item>,
}

impl Combatant {
    pub fn new(
        name: impl Into<String>,
        level: u8,
        types: Vec<PokemonType>,
        stats: StatBlock,
        moves: Vec<MoveInstance>,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            types,
            current_hp: stats.hp,
            stats,
            moves,
            status: None,
            ability: None,
            item: None,
        }
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = Some(ability);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.item = Some(item);
        self
    }

    pub fn current_hp(&self) -> u16 {
        self.current_hp
    }

    pub fn max_hp(&self) -> u16 {
        self.stats.hp
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Fraction of max HP remaining, in `[0, 1]`.
    pub fn hp_fraction(&self) -> f32 {
        if self.stats.hp == 0 {
            return 0.0;
        }
        self.current_hp as f32 / self.stats.hp as f32
    }

    pub fn set_hp(&mut self, hp: u16) {
        self.current_hp = hp.min(self.stats.hp);
    }

    /// Subtract HP and return the amount actually lost. Fainting clears major status.
    pub fn take_damage(&mut self, amount: u16) -> u16 {
        let lost = amount.min(self.current_hp);
        self.current_hp -= lost;
        if self.current_hp == 0 {
            self.status = None;
        }
        lost
    }

    /// Restore HP up to the maximum and return the amount actually healed.
    pub fn heal(&mut self, amount: u16) -> u16 {
        if self.is_fainted() {
            return 0;
        }
        let healed = amount.min(self.stats.hp - self.current_hp);
        self.current_hp += healed;
        healed
    }

    pub fn has_type(&self, pokemon_type: PokemonType) -> bool {
        self.types.contains(&pokemon_type)
    }

    pub fn move_slot(&self, move_: Move) -> Option<usize> {
        self.moves.iter().position(|instance| instance.move_ == move_)
    }
}

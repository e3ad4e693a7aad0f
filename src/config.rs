use serde::{Deserialize, Serialize};

use crate::battle::registry::HandlerRegistry;
use crate::catalog::Catalog;
use crate::errors::{BattleEngineError, BattleResult};
use crate::random::RandomSource;

/// Format rules for one battle. Loadable from RON; omitted fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleRules {
    /// Active positions per side: 1 for singles, 2 for doubles, 3 for triples.
    pub slots_per_side: usize,
    pub max_party_size: usize,
    /// Dequeues allowed per turn before the action queue gives up on a reaction loop.
    pub max_queue_iterations: usize,
    /// Turns `run_battle` plays before calling the battle off.
    pub max_turns: u32,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self::singles()
    }
}

impl BattleRules {
    pub const DEFAULT_QUEUE_CEILING: usize = 1000;

    pub fn singles() -> Self {
        Self {
            slots_per_side: 1,
            max_party_size: 6,
            max_queue_iterations: Self::DEFAULT_QUEUE_CEILING,
            max_turns: 1000,
        }
    }

    pub fn doubles() -> Self {
        Self {
            slots_per_side: 2,
            ..Self::singles()
        }
    }

    pub fn from_ron_str(source: &str) -> BattleResult<Self> {
        let rules: BattleRules = ron::from_str(source).map_err(|err| {
            BattleEngineError::InvalidConstruction(format!("battle rules: {}", err))
        })?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> BattleResult<()> {
        if !(1..=3).contains(&self.slots_per_side) {
            return Err(BattleEngineError::InvalidConstruction(format!(
                "slots_per_side must be between 1 and 3, got {}",
                self.slots_per_side
            )));
        }
        if !(1..=6).contains(&self.max_party_size) {
            return Err(BattleEngineError::InvalidConstruction(format!(
                "max_party_size must be between 1 and 6, got {}",
                self.max_party_size
            )));
        }
        if self.max_queue_iterations == 0 {
            return Err(BattleEngineError::InvalidConstruction(
                "max_queue_iterations must be positive".to_string(),
            ));
        }
        if self.max_turns == 0 {
            return Err(BattleEngineError::InvalidConstruction(
                "max_turns must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything the engine factory needs besides the parties and borrowed
/// collaborators. Unset fields are filled in once, by
/// [`BattleEngine::initialize`](crate::battle::engine::BattleEngine::initialize).
#[derive(Default)]
pub struct EngineOptions {
    pub rules: BattleRules,
    /// Seed for the default randomness source. Ignored when `random` is set.
    pub seed: Option<u64>,
    pub random: Option<Box<dyn RandomSource>>,
    pub catalog: Option<Catalog>,
    pub registry: Option<HandlerRegistry>,
}

impl EngineOptions {
    pub fn new(rules: BattleRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_random(mut self, random: Box<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }
}

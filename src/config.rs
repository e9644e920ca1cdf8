use crate::common::{DiceType, TensIndexing};
use serde::{Deserialize, Serialize};

/// Limits and dice sizes an [`Engine`](crate::Engine) works with.
///
/// The configuration is immutable once handed to an engine; build another
/// engine to evaluate with different limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Largest dice count a single sub-expression may ask for.
    pub max_dice_count: usize,
    /// Largest number of extra dice one explosion chain may add.
    pub max_explosions: usize,
    pub dice_types: Vec<DiceType>,
    pub tens_indexing: TensIndexing,
}

impl EngineConfig {
    pub const DEFAULT_MAX_DICE_COUNT: usize = 100;
    pub const DEFAULT_MAX_EXPLOSIONS: usize = 10;

    pub fn with_max_dice_count(mut self, max: usize) -> Self {
        self.max_dice_count = max;
        self
    }

    pub fn with_max_explosions(mut self, max: usize) -> Self {
        self.max_explosions = max;
        self
    }

    pub fn with_dice_types(mut self, types: impl IntoIterator<Item = DiceType>) -> Self {
        self.dice_types = types.into_iter().collect();
        self
    }

    pub fn with_tens_indexing(mut self, indexing: TensIndexing) -> Self {
        self.tens_indexing = indexing;
        self
    }

    pub fn allows(&self, dice_type: DiceType) -> bool {
        self.dice_types.contains(&dice_type)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_dice_count: Self::DEFAULT_MAX_DICE_COUNT,
            max_explosions: Self::DEFAULT_MAX_EXPLOSIONS,
            dice_types: DiceType::ALL.to_vec(),
            tens_indexing: TensIndexing::default(),
        }
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RollMode {
    #[default]
    Check,
    /// Criticals are always on and a natural 1 on the primary die is a miss.
    Attack,
}

/// Per-call roll mechanics.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiceFormulaOptions {
    /// Positive for advantage, negative for disadvantage.
    pub advantage_level: i32,
    pub allow_criticals: bool,
    pub allow_fumbles: bool,
    pub vicious: bool,
    pub explode_all: bool,
    pub mode: RollMode,
}

impl DiceFormulaOptions {
    pub fn attack() -> Self {
        Self {
            mode: RollMode::Attack,
            ..Self::default()
        }
    }

    pub fn with_advantage(mut self, level: i32) -> Self {
        self.advantage_level = level;
        self
    }

    pub fn with_criticals(mut self) -> Self {
        self.allow_criticals = true;
        self
    }

    pub fn with_fumbles(mut self) -> Self {
        self.allow_fumbles = true;
        self
    }

    pub fn with_vicious(mut self) -> Self {
        self.vicious = true;
        self
    }

    pub fn with_explode_all(mut self) -> Self {
        self.explode_all = true;
        self
    }

    pub fn criticals_enabled(&self) -> bool {
        self.allow_criticals || self.mode == RollMode::Attack
    }
}

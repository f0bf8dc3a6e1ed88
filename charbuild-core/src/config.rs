//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Default point-buy budget.
pub const DEFAULT_POINT_BUY_BUDGET: i32 = 32;

/// Highest total character level.
pub const DEFAULT_MAX_LEVEL: u8 = 30;

/// First total level at which epic feats become available.
pub const DEFAULT_EPIC_LEVEL: u8 = 21;

/// Tunable limits of the rule set.
///
/// Everything else (cost tables, the first-level skill multiplier, rank caps)
/// is part of the rules themselves and lives next to the code that uses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Points available for the attribute point-buy.
    pub point_buy_budget: i32,

    /// Maximum total level; `AddLevel` beyond it is ignored.
    pub max_level: u8,

    /// Total level at which epic feats unlock.
    pub epic_level: u8,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the point-buy budget.
    pub fn with_point_buy_budget(mut self, budget: i32) -> Self {
        self.point_buy_budget = budget;
        self
    }

    /// Set the maximum total level.
    pub fn with_max_level(mut self, level: u8) -> Self {
        self.max_level = level;
        self
    }

    /// Set the level at which epic feats unlock.
    pub fn with_epic_level(mut self, level: u8) -> Self {
        self.epic_level = level;
        self
    }

    /// Parse a configuration document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            point_buy_budget: DEFAULT_POINT_BUY_BUDGET,
            max_level: DEFAULT_MAX_LEVEL,
            epic_level: DEFAULT_EPIC_LEVEL,
        }
    }
}

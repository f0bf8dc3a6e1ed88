//! Errors raised by the pure rule computations.
//!
//! Input-range problems (an attribute of 19, an overspent level) are never
//! errors here; they surface as [`ValidationResult`](crate::character::ValidationResult)
//! entries. A `RulesError` means the caller asked for something that cannot
//! exist, such as the skill budget of a level the character does not have.

use thiserror::Error;

/// Precondition failures of the rules computations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("Level {level} not found (character has {total} levels)")]
    LevelNotFound { level: u8, total: u8 },

    #[error("Class '{0}' not found in catalog")]
    UnknownClass(String),

    #[error("Skill '{0}' not found in catalog")]
    UnknownSkill(String),
}

impl RulesError {
    pub fn level_not_found(level: u8, total: u8) -> Self {
        Self::LevelNotFound { level, total }
    }
}

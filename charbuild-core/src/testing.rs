//! Testing utilities for the character builder.
//!
//! - Fixture constructors for catalogs and characters
//! - `TestHarness` for scripted command sequences
//! - Assertion helpers for verifying builder state

use crate::catalog::{Catalog, FeatId};
use crate::character::{Character, LevelEntry};
use crate::config::EngineConfig;
use crate::rules::{BuilderState, Command, Resolution, RulesEngine};
use std::sync::Arc;

/// Hit points used for levels in classes missing from the catalog.
const FALLBACK_HIT_POINTS: i32 = 6;

/// The bundled catalog.
pub fn fixture_catalog() -> Arc<Catalog> {
    Catalog::standard()
}

/// A character with one level per class id, built directly without the
/// engine: maximum hit points, no feats, no skills, all attributes at 10.
pub fn character_with_levels(race_id: &str, classes: &[&str]) -> Character {
    let catalog = fixture_catalog();
    let mut character = Character::new("Fixture", race_id);
    for (index, class_id) in classes.iter().enumerate() {
        let hit_points = catalog
            .class(class_id)
            .map(|c| c.hit_die.sides())
            .unwrap_or(FALLBACK_HIT_POINTS);
        character.push_level(LevelEntry::new(index as u8 + 1, *class_id, hit_points));
    }
    character
}

/// Drives a [`RulesEngine`] one command at a time and keeps every
/// resolution for inspection.
pub struct TestHarness {
    pub engine: RulesEngine,
    pub state: BuilderState,
    pub resolutions: Vec<Resolution>,
}

impl TestHarness {
    /// Harness over the bundled catalog with default limits.
    pub fn new() -> Self {
        Self::with_engine(RulesEngine::standard())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_engine(RulesEngine::new(fixture_catalog(), config))
    }

    pub fn with_engine(engine: RulesEngine) -> Self {
        Self {
            engine,
            state: BuilderState::new(),
            resolutions: Vec::new(),
        }
    }

    /// Resolve and apply one command.
    pub fn send(&mut self, command: Command) -> &Resolution {
        let resolution = self.engine.resolve(&self.state, command);
        crate::rules::apply_effects(&mut self.state, &resolution.effects);
        self.resolutions.push(resolution);
        &self.resolutions[self.resolutions.len() - 1]
    }

    pub fn create(&mut self, name: &str, race_id: &str) -> &mut Self {
        self.send(Command::CreateCharacter {
            name: name.to_string(),
            race_id: race_id.to_string(),
        });
        self
    }

    /// Add one level per class, each with maximum hit points.
    pub fn add_levels(&mut self, classes: &[&str]) -> &mut Self {
        for class_id in classes {
            self.send(Command::AddLevel {
                class_id: class_id.to_string(),
                hit_points_gained: i32::MAX,
            });
        }
        self
    }

    pub fn add_feat(&mut self, level: u8, feat_id: &str) -> &mut Self {
        self.send(Command::AddFeatToLevel {
            level,
            feat_id: feat_id.to_string(),
        });
        self
    }

    pub fn character(&self) -> Option<&Character> {
        self.state.character.as_ref()
    }

    pub fn total_level(&self) -> u8 {
        self.character().map(|c| c.total_level).unwrap_or(0)
    }

    pub fn unspent_at(&self, level: u8) -> Option<i32> {
        self.character()
            .and_then(|c| c.level(level))
            .map(|l| l.unspent_skill_points)
    }

    pub fn has_feat(&self, feat_id: &str) -> bool {
        self.character().map(|c| c.has_feat(feat_id)).unwrap_or(false)
    }

    pub fn automatic_feats(&self) -> Vec<FeatId> {
        self.character()
            .and_then(|c| c.level(1))
            .map(|l| l.automatic_feats.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Note of the most recent resolution.
    pub fn last_note(&self) -> Option<&str> {
        self.resolutions.last().map(|r| r.note.as_str())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

#[track_caller]
pub fn assert_total_level(harness: &TestHarness, expected: u8) {
    let actual = harness.total_level();
    assert_eq!(actual, expected, "Expected total level {expected}, got {actual}");
}

#[track_caller]
pub fn assert_has_feat(harness: &TestHarness, feat_id: &str) {
    assert!(harness.has_feat(feat_id), "Expected feat '{feat_id}' to be held");
}

#[track_caller]
pub fn assert_lacks_feat(harness: &TestHarness, feat_id: &str) {
    assert!(!harness.has_feat(feat_id), "Expected feat '{feat_id}' to NOT be held");
}

/// Assert the cached skill ranks equal the per-level sums.
#[track_caller]
pub fn assert_skill_cache_consistent(character: &Character) {
    let mut expected = character.clone();
    expected.recompute_skill_ranks();
    assert_eq!(
        character.skill_ranks, expected.skill_ranks,
        "Skill rank cache drifted from level entries"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_with_levels() {
        let character = character_with_levels("human", &["fighter", "mystic"]);
        assert_eq!(character.total_level, 2);
        assert_eq!(character.level(1).unwrap().hit_points_gained, 10);
        assert_eq!(character.level(2).unwrap().hit_points_gained, FALLBACK_HIT_POINTS);
        assert!(character.all_feats().is_empty());
    }

    #[test]
    fn test_harness_flow() {
        let mut harness = TestHarness::new();
        harness.create("Aria", "human").add_levels(&["fighter", "fighter"]);
        assert_total_level(&harness, 2);
        assert_has_feat(&harness, "heavy_armor_proficiency");
        assert_lacks_feat(&harness, "dodge");

        harness.add_feat(1, "dodge");
        assert_has_feat(&harness, "dodge");
        assert!(harness.last_note().unwrap().contains("dodge"));
        assert_skill_cache_consistent(harness.character().unwrap());
    }

    #[test]
    fn test_harness_respects_config() {
        let mut harness = TestHarness::with_config(EngineConfig::default().with_max_level(1));
        harness.create("Aria", "human").add_levels(&["fighter", "fighter"]);
        assert_total_level(&harness, 1);
        assert_eq!(harness.last_note(), Some("Maximum level reached"));
    }
}

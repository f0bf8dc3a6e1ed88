//! Whole-character validation.
//!
//! Validation never blocks edits. It is run on demand and its result is
//! stored next to the character, not inside it.

use crate::attributes::validate_attribute_allocation;
use crate::catalog::Catalog;
use crate::character::{Character, LevelEntry, ValidationResult};
use crate::config::EngineConfig;
use crate::error::RulesError;
use crate::feats::{feat_prerequisites, feat_slots, slots_at_level};
use crate::skills::skill_points_for_level;
use std::collections::{BTreeMap, BTreeSet};

/// The character as it stood right after `level` was taken.
pub fn snapshot_at_level(character: &Character, level: u8) -> Character {
    let mut snapshot = character.clone();
    snapshot.levels.truncate(level as usize);
    snapshot.total_level = snapshot.levels.len() as u8;
    snapshot.recompute_skill_ranks();
    snapshot
}

fn check_structure(character: &Character, config: &EngineConfig, result: &mut ValidationResult) {
    if character.total_level > config.max_level {
        result.error(format!(
            "Total level {} exceeds the maximum of {}",
            character.total_level, config.max_level
        ));
    }

    if character.levels.len() != character.total_level as usize {
        result.error(format!(
            "Total level is {} but {} levels are recorded",
            character.total_level,
            character.levels.len()
        ));
    }

    for (index, entry) in character.levels.iter().enumerate() {
        let position = index + 1;
        if entry.level as usize != position {
            result.error(format!(
                "Level entry {} is numbered {}",
                position, entry.level
            ));
        }
        if entry.attribute_increase.is_some() && !LevelEntry::grants_attribute_increase(entry.level) {
            result.error(format!(
                "Level {} has an attribute increase but is not a multiple of 4",
                entry.level
            ));
        }
        if entry.unspent_skill_points < 0 {
            result.error(format!("Level {} has negative unspent skill points", entry.level));
        }
    }
}

fn check_skill_cache(character: &Character, result: &mut ValidationResult) {
    let mut expected = character.clone();
    expected.recompute_skill_ranks();

    let skills: BTreeSet<&String> = character
        .skill_ranks
        .keys()
        .chain(expected.skill_ranks.keys())
        .collect();
    for skill in skills {
        let cached = character.skill_ranks.get(skill).copied().unwrap_or(0);
        let summed = expected.skill_ranks.get(skill).copied().unwrap_or(0);
        if cached != summed {
            result.error(format!(
                "Skill '{}' caches {} ranks but levels sum to {}",
                skill, cached, summed
            ));
        }
    }
}

fn check_levels(
    character: &Character,
    catalog: &Catalog,
    config: &EngineConfig,
    result: &mut ValidationResult,
) {
    for entry in &character.levels {
        let level = entry.level;

        if let Some(class) = catalog.class(&entry.class_id) {
            let die = class.hit_die.sides();
            if !(1..=die).contains(&entry.hit_points_gained) {
                result.error(format!(
                    "Level {}: {} hit points is outside 1..={}",
                    level, entry.hit_points_gained, die
                ));
            }
        }

        match skill_points_for_level(character, level, catalog) {
            Ok(points) if points.remaining_points < 0 => {
                result.error(format!(
                    "Level {}: {} skill points overspent",
                    level, -points.remaining_points
                ));
            }
            Ok(_) => {}
            Err(RulesError::UnknownClass(class_id)) => {
                result.warning(format!(
                    "Level {}: class '{}' not found in catalog",
                    level, class_id
                ));
            }
            Err(err) => result.error(err.to_string()),
        }

        if entry.chosen_feats.is_empty() {
            continue;
        }
        let snapshot = snapshot_at_level(character, level);
        for feat_id in &entry.chosen_feats {
            match catalog.feat(feat_id) {
                Some(feat) => {
                    let eligibility = feat_prerequisites(&snapshot, feat, catalog, config);
                    if !eligibility.can_select {
                        result.warning(format!(
                            "Level {}: {} prerequisites not met ({})",
                            level,
                            feat.name,
                            eligibility.reasons.join(", ")
                        ));
                    }
                }
                None => result.warning(format!("Level {}: unknown feat '{}'", level, feat_id)),
            }
        }
    }

    let slots = feat_slots(character, catalog);
    let chosen: BTreeMap<u8, usize> = character
        .levels
        .iter()
        .map(|l| (l.level, l.chosen_feats.len()))
        .collect();
    for (level, count) in chosen {
        let available = slots_at_level(&slots, level);
        if count > available {
            result.warning(format!(
                "Level {}: {} feats chosen for {} slots",
                level, count, available
            ));
        }
    }
}

/// Check the level history against the progression rules.
pub fn validate_character_progression(
    character: &Character,
    catalog: &Catalog,
    config: &EngineConfig,
) -> ValidationResult {
    let mut result = ValidationResult::new();
    check_structure(character, config, &mut result);
    check_skill_cache(character, &mut result);
    check_levels(character, catalog, config, &mut result);
    result
}

/// Attribute allocation plus progression.
pub fn validate_character(
    character: &Character,
    catalog: &Catalog,
    config: &EngineConfig,
) -> ValidationResult {
    validate_attribute_allocation(&character.base_attributes, config.point_buy_budget)
        .merge(validate_character_progression(character, catalog, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{character_with_levels, fixture_catalog};

    #[test]
    fn test_fresh_character_is_valid() {
        let catalog = fixture_catalog();
        let character = character_with_levels("human", &["fighter", "fighter"]);
        let result = validate_character(&character, &catalog, &EngineConfig::default());
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_level_count_mismatch() {
        let catalog = fixture_catalog();
        let mut character = character_with_levels("human", &["fighter"]);
        character.total_level = 2;
        let result = validate_character_progression(&character, &catalog, &EngineConfig::default());
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("levels are recorded")));
    }

    #[test]
    fn test_negative_unspent_from_stored_data() {
        // Commands clamp this to zero; only loaded documents can carry it.
        let catalog = fixture_catalog();
        let mut character = character_with_levels("human", &["fighter"]);
        character.levels[0].unspent_skill_points = -3;
        let result = validate_character_progression(&character, &catalog, &EngineConfig::default());
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("negative unspent skill points")));
    }

    #[test]
    fn test_over_max_level() {
        let catalog = fixture_catalog();
        let character = character_with_levels("human", &["fighter"; 3]);
        let config = EngineConfig::default().with_max_level(2);
        let result = validate_character_progression(&character, &catalog, &config);
        assert!(result.errors.iter().any(|e| e.contains("exceeds the maximum")));
    }

    #[test]
    fn test_skill_cache_drift() {
        let catalog = fixture_catalog();
        let mut character = character_with_levels("human", &["rogue"]);
        character.skill_ranks.insert("hide".to_string(), 3);
        let result = validate_character_progression(&character, &catalog, &EngineConfig::default());
        assert!(result.errors.iter().any(|e| e.contains("'hide'")));
    }

    #[test]
    fn test_overspent_level() {
        let catalog = fixture_catalog();
        let mut character = character_with_levels("dwarf", &["fighter"]);
        character
            .level_mut(1)
            .unwrap()
            .skill_ranks_this_level
            .insert("hide".to_string(), 5);
        character.recompute_skill_ranks();
        let result = validate_character_progression(&character, &catalog, &EngineConfig::default());
        assert_eq!(result.errors, vec!["Level 1: 2 skill points overspent".to_string()]);
    }

    #[test]
    fn test_unknown_class_is_warning() {
        let catalog = fixture_catalog();
        let character = character_with_levels("human", &["mystic"]);
        let result = validate_character_progression(&character, &catalog, &EngineConfig::default());
        assert!(result.valid);
        assert!(result.warnings.iter().any(|w| w.contains("'mystic'")));
    }

    #[test]
    fn test_feat_prerequisites_checked_at_their_level() {
        let catalog = fixture_catalog();
        let mut character = character_with_levels("human", &["fighter", "fighter", "fighter"]);
        character.base_attributes.dexterity = 13;
        // Blooded at level 1 stays legal after later levels.
        character.level_mut(1).unwrap().add_feat("blooded");
        // Mobility before Dodge is flagged.
        character.level_mut(2).unwrap().add_feat("mobility");
        character.level_mut(3).unwrap().add_feat("dodge");

        let result = validate_character_progression(&character, &catalog, &EngineConfig::default());
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("Level 2: Mobility"));
    }

    #[test]
    fn test_too_many_feats_for_slots() {
        let catalog = fixture_catalog();
        let mut character = character_with_levels("dwarf", &["rogue", "rogue"]);
        character.level_mut(2).unwrap().add_feat("alertness");
        let result = validate_character_progression(&character, &catalog, &EngineConfig::default());
        assert!(result
            .warnings
            .iter()
            .any(|w| w == "Level 2: 1 feats chosen for 0 slots"));
    }

    #[test]
    fn test_attribute_errors_merge() {
        let catalog = fixture_catalog();
        let mut character = character_with_levels("human", &["fighter"]);
        character.base_attributes.strength = 20;
        let result = validate_character(&character, &catalog, &EngineConfig::default());
        assert!(!result.valid);
    }

    #[test]
    fn test_snapshot_at_level() {
        let character = character_with_levels("human", &["fighter", "rogue", "wizard"]);
        let snapshot = snapshot_at_level(&character, 2);
        assert_eq!(snapshot.total_level, 2);
        assert_eq!(snapshot.levels.len(), 2);
        assert!(!snapshot.has_class("wizard"));
    }
}

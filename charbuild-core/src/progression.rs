//! Derived statistics: base attack bonus, hit points and saving throws.

use crate::attributes::{final_attributes, modifier};
use crate::catalog::{BabProgression, Catalog, ClassId, Save};
use crate::character::Character;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Saving throw totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SavingThrows {
    pub fortitude: i32,
    pub reflex: i32,
    pub will: i32,
}

impl SavingThrows {
    pub fn get(&self, save: Save) -> i32 {
        match save {
            Save::Fortitude => self.fortitude,
            Save::Reflex => self.reflex,
            Save::Will => self.will,
        }
    }

    fn add(&mut self, save: Save, bonus: i32) {
        match save {
            Save::Fortitude => self.fortitude += bonus,
            Save::Reflex => self.reflex += bonus,
            Save::Will => self.will += bonus,
        }
    }
}

/// BAB of a single class at a given class level.
pub fn class_bab(progression: BabProgression, level: u8) -> i32 {
    (level as i32 * progression.quarters_per_level()).div_euclid(4)
}

/// Total base attack bonus.
///
/// Each level contributes 1, 3/4 or 1/2 by progression and the sum is
/// floored once. Classes missing from the catalog count as medium.
pub fn base_attack_bonus(character: &Character, catalog: &Catalog) -> i32 {
    let quarters: i32 = character
        .levels
        .iter()
        .map(|entry| {
            catalog
                .class(&entry.class_id)
                .map(|c| c.base_attack_bonus)
                .unwrap_or_default()
                .quarters_per_level()
        })
        .sum();
    quarters.div_euclid(4)
}

/// Levels held in each class.
pub fn class_levels(character: &Character) -> BTreeMap<ClassId, u8> {
    let mut levels = BTreeMap::new();
    for entry in &character.levels {
        *levels.entry(entry.class_id.clone()).or_insert(0) += 1;
    }
    levels
}

/// Hit points gained plus the Constitution modifier, at least 1 per level.
pub fn total_hit_points(character: &Character, catalog: &Catalog) -> i32 {
    let con = modifier(final_attributes(character, catalog).constitution);
    character
        .levels
        .iter()
        .map(|entry| (entry.hit_points_gained + con).max(1))
        .sum()
}

/// Save progression value at a class level.
pub fn save_bonus(good: bool, level: u8) -> i32 {
    let level = level as i32;
    if good {
        2 + level / 2
    } else {
        level / 3
    }
}

/// Base saves summed per class; unknown classes have poor saves.
pub fn saving_throws(character: &Character, catalog: &Catalog) -> SavingThrows {
    let mut saves = SavingThrows::default();
    for (class_id, level) in class_levels(character) {
        let class = catalog.class(&class_id);
        for save in Save::all() {
            let good = class.map(|c| c.primary_saves.contains(&save)).unwrap_or(false);
            saves.add(save, save_bonus(good, level));
        }
    }
    saves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{character_with_levels, fixture_catalog};

    #[test]
    fn test_class_bab() {
        assert_eq!(class_bab(BabProgression::Full, 7), 7);
        assert_eq!(class_bab(BabProgression::Medium, 7), 5);
        assert_eq!(class_bab(BabProgression::Low, 7), 3);
    }

    #[test]
    fn test_multiclass_bab_floors_once() {
        let catalog = fixture_catalog();
        // 0.75 + 0.75 + 0.5 + 0.5 = 2.5
        let character = character_with_levels("human", &["rogue", "rogue", "wizard", "wizard"]);
        assert_eq!(base_attack_bonus(&character, &catalog), 2);
    }

    #[test]
    fn test_unknown_class_is_medium() {
        let catalog = fixture_catalog();
        let character = character_with_levels("human", &["mystic"; 4]);
        assert_eq!(base_attack_bonus(&character, &catalog), 3);
    }

    #[test]
    fn test_hit_points_minimum_one() {
        let catalog = fixture_catalog();
        let mut character = character_with_levels("human", &["wizard", "wizard"]);
        character.base_attributes.constitution = 6;
        character.level_mut(2).unwrap().hit_points_gained = 1;
        // (4 - 2) + max(1, 1 - 2)
        assert_eq!(total_hit_points(&character, &catalog), 3);
    }

    #[test]
    fn test_saving_throws_per_class() {
        let catalog = fixture_catalog();
        let character = character_with_levels("human", &["fighter", "fighter", "rogue"]);
        let saves = saving_throws(&character, &catalog);
        // fighter 2: fort 3, ref 0, will 0; rogue 1: fort 0, ref 2, will 0
        assert_eq!(saves.fortitude, 3);
        assert_eq!(saves.reflex, 2);
        assert_eq!(saves.will, 0);
        assert_eq!(saves.get(Save::Reflex), 2);
    }

    #[test]
    fn test_class_levels() {
        let character = character_with_levels("human", &["fighter", "rogue", "fighter"]);
        let levels = class_levels(&character);
        assert_eq!(levels.get("fighter"), Some(&2));
        assert_eq!(levels.get("rogue"), Some(&1));
    }
}

//! Attribute math: point-buy costs, racial modifiers and ability modifiers.

use crate::catalog::Catalog;
use crate::character::{Attribute, Attributes, Character, ValidationResult};
use std::collections::BTreeMap;

/// Lowest purchasable score.
pub const MIN_SCORE: i32 = 8;

/// Highest purchasable score.
pub const MAX_SCORE: i32 = 18;

/// Largest spread between the best and worst score before a warning.
pub const BALANCE_SPREAD: i32 = 10;

/// Point-buy cost of each purchasable score, from 8 to 18.
const POINT_COSTS: [i32; 11] = [0, 1, 2, 3, 4, 5, 6, 8, 10, 13, 16];

/// Cost of a single score. Scores outside [8, 18] cost nothing; the range
/// check is reported separately by [`validate_attribute_allocation`].
pub fn point_cost(value: i32) -> i32 {
    if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return 0;
    }
    POINT_COSTS[(value - MIN_SCORE) as usize]
}

/// Total point-buy cost of an attribute set.
pub fn total_point_cost(attributes: &Attributes) -> i32 {
    attributes.iter().map(|(_, v)| point_cost(v)).sum()
}

/// Ability modifier: `floor((score - 10) / 2)`.
pub fn modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Base attributes plus the race's fixed bonuses.
///
/// An unknown race contributes nothing.
pub fn final_attributes(character: &Character, catalog: &Catalog) -> Attributes {
    match catalog.race(&character.race_id) {
        Some(race) => character.base_attributes.with_bonuses(&race.attribute_bonuses),
        None => character.base_attributes,
    }
}

/// Base attributes plus an already resolved bonus map, for races whose
/// bonus is chosen by the player.
pub fn final_attributes_with(character: &Character, bonuses: &BTreeMap<Attribute, i32>) -> Attributes {
    character.base_attributes.with_bonuses(bonuses)
}

/// Final attributes plus every level's attribute increase. Display only.
pub fn attributes_with_increases(character: &Character, catalog: &Catalog) -> Attributes {
    let mut attributes = final_attributes(character, catalog);
    for attribute in character.levels.iter().filter_map(|l| l.attribute_increase) {
        let current = attributes.get(attribute);
        attributes.set(attribute, current + 1);
    }
    attributes
}

/// Check a point-buy allocation.
///
/// Scores outside [8, 18] and a cost above `budget` are errors; an
/// unbalanced spread is only a warning.
pub fn validate_attribute_allocation(attributes: &Attributes, budget: i32) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (attribute, value) in attributes.iter() {
        if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
            result.error(format!(
                "{} must be between {} and {} (got {})",
                attribute.name(),
                MIN_SCORE,
                MAX_SCORE,
                value
            ));
        }
    }

    let cost = total_point_cost(attributes);
    if cost > budget {
        result.error(format!(
            "Point-buy cost {} exceeds the budget of {}",
            cost, budget
        ));
    }

    let (min, max) = attributes
        .iter()
        .fold((i32::MAX, i32::MIN), |(lo, hi), (_, v)| (lo.min(v), hi.max(v)));
    if max - min > BALANCE_SPREAD {
        result.warning(format!(
            "Attributes are very unbalanced (spread of {})",
            max - min
        ));
    }

    result
}

/// Points left in the budget; negative when overspent.
pub fn remaining_points(attributes: &Attributes, budget: i32) -> i32 {
    budget - total_point_cost(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Race;

    #[test]
    fn test_point_cost_table() {
        let expected = [
            (8, 0),
            (9, 1),
            (10, 2),
            (11, 3),
            (12, 4),
            (13, 5),
            (14, 6),
            (15, 8),
            (16, 10),
            (17, 13),
            (18, 16),
        ];
        for (score, cost) in expected {
            assert_eq!(point_cost(score), cost, "score {}", score);
        }
        assert_eq!(point_cost(7), 0);
        assert_eq!(point_cost(19), 0);
    }

    #[test]
    fn test_modifier_floors_negative() {
        assert_eq!(modifier(10), 0);
        assert_eq!(modifier(11), 0);
        assert_eq!(modifier(16), 3);
        assert_eq!(modifier(9), -1);
        assert_eq!(modifier(6), -2);
        assert_eq!(modifier(1), -5);
    }

    #[test]
    fn test_default_allocation_is_valid() {
        let result = validate_attribute_allocation(&Attributes::default(), 32);
        assert!(result.valid);
        assert_eq!(total_point_cost(&Attributes::default()), 12);
    }

    #[test]
    fn test_over_budget_is_error() {
        let attrs = Attributes::new(18, 18, 14, 10, 10, 8);
        let result = validate_attribute_allocation(&attrs, 32);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("budget")));
    }

    #[test]
    fn test_out_of_range_is_error() {
        let attrs = Attributes::new(19, 10, 10, 10, 10, 7);
        let result = validate_attribute_allocation(&attrs, 100);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_spread_is_warning_only() {
        // Cost 16 + 0 * 5 = 16, spread 10 is fine.
        let balanced = Attributes::new(18, 8, 8, 8, 8, 8);
        assert!(validate_attribute_allocation(&balanced, 32).warnings.is_empty());
        // Out-of-range score widens the spread past 10.
        let lopsided = Attributes::new(18, 8, 8, 8, 8, 7);
        let result = validate_attribute_allocation(&lopsided, 32);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_final_attributes_apply_race() {
        let catalog = Catalog::new().with_race(
            Race::new("elf", "Elf")
                .with_bonus(Attribute::Dexterity, 2)
                .with_bonus(Attribute::Constitution, -2),
        );
        let character = Character::new("Lia", "elf");
        let attrs = final_attributes(&character, &catalog);
        assert_eq!(attrs.dexterity, 12);
        assert_eq!(attrs.constitution, 8);
        assert_eq!(attrs.strength, 10);
    }

    #[test]
    fn test_final_attributes_with_chosen_bonus() {
        let character = Character::new("Ren", "half_elf");
        let mut bonus = BTreeMap::new();
        bonus.insert(Attribute::Charisma, 2);
        assert_eq!(final_attributes_with(&character, &bonus).charisma, 12);
    }
}

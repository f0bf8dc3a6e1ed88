//! Character data model.
//!
//! A [`Character`] is the aggregate root: base attributes, a race, and an
//! append-only history of [`LevelEntry`] records. Everything else (final
//! attributes, skill budgets, feat slots) is derived from it by the rule
//! modules.

use crate::catalog::{ClassId, FeatId, RaceId, SkillId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

/// Version string written into every character.
pub const SCHEMA_VERSION: &str = "1.0";

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// The six attributes.
///
/// Catalog data may spell them in French (`force`, `dexterite`, ...); both
/// spellings deserialize to the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    #[serde(alias = "force", alias = "str")]
    Strength,
    #[serde(alias = "dexterite", alias = "dex")]
    Dexterity,
    #[serde(alias = "con")]
    Constitution,
    #[serde(alias = "int")]
    Intelligence,
    #[serde(alias = "sagesse", alias = "wis")]
    Wisdom,
    #[serde(alias = "charisme", alias = "cha")]
    Charisma,
}

impl Attribute {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Attribute::Strength => "STR",
            Attribute::Dexterity => "DEX",
            Attribute::Constitution => "CON",
            Attribute::Intelligence => "INT",
            Attribute::Wisdom => "WIS",
            Attribute::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Strength => "Strength",
            Attribute::Dexterity => "Dexterity",
            Attribute::Constitution => "Constitution",
            Attribute::Intelligence => "Intelligence",
            Attribute::Wisdom => "Wisdom",
            Attribute::Charisma => "Charisma",
        }
    }

    pub fn all() -> [Attribute; 6] {
        [
            Attribute::Strength,
            Attribute::Dexterity,
            Attribute::Constitution,
            Attribute::Intelligence,
            Attribute::Wisdom,
            Attribute::Charisma,
        ]
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// A full set of attribute scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Attributes {
    pub fn new(str: i32, dex: i32, con: i32, int: i32, wis: i32, cha: i32) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    /// Every attribute at the same score.
    pub fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value, value, value)
    }

    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Constitution => self.constitution,
            Attribute::Intelligence => self.intelligence,
            Attribute::Wisdom => self.wisdom,
            Attribute::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: i32) {
        match attribute {
            Attribute::Strength => self.strength = value,
            Attribute::Dexterity => self.dexterity = value,
            Attribute::Constitution => self.constitution = value,
            Attribute::Intelligence => self.intelligence = value,
            Attribute::Wisdom => self.wisdom = value,
            Attribute::Charisma => self.charisma = value,
        }
    }

    /// Iterate over `(attribute, score)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, i32)> + '_ {
        Attribute::all().into_iter().map(move |a| (a, self.get(a)))
    }

    /// Apply a set of additive bonuses.
    pub fn with_bonuses(mut self, bonuses: &BTreeMap<Attribute, i32>) -> Self {
        for (attribute, bonus) in bonuses {
            let current = self.get(*attribute);
            self.set(*attribute, current + bonus);
        }
        self
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self::uniform(10)
    }
}

/// A partial attribute update; `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributePatch {
    pub strength: Option<i32>,
    pub dexterity: Option<i32>,
    pub constitution: Option<i32>,
    pub intelligence: Option<i32>,
    pub wisdom: Option<i32>,
    pub charisma: Option<i32>,
}

impl AttributePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one attribute in the patch.
    pub fn set(mut self, attribute: Attribute, value: i32) -> Self {
        let slot = match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Dexterity => &mut self.dexterity,
            Attribute::Constitution => &mut self.constitution,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Wisdom => &mut self.wisdom,
            Attribute::Charisma => &mut self.charisma,
        };
        *slot = Some(value);
        self
    }

    /// A patch that overwrites every attribute.
    pub fn from_attributes(attributes: &Attributes) -> Self {
        Attribute::all()
            .into_iter()
            .fold(Self::new(), |patch, a| patch.set(a, attributes.get(a)))
    }

    /// Merge the patch into a full attribute set.
    pub fn apply_to(&self, attributes: &Attributes) -> Attributes {
        let mut merged = *attributes;
        let fields = [
            (Attribute::Strength, self.strength),
            (Attribute::Dexterity, self.dexterity),
            (Attribute::Constitution, self.constitution),
            (Attribute::Intelligence, self.intelligence),
            (Attribute::Wisdom, self.wisdom),
            (Attribute::Charisma, self.charisma),
        ];
        for (attribute, value) in fields {
            if let Some(value) = value {
                merged.set(attribute, value);
            }
        }
        merged
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// Levels
// ============================================================================

/// One character level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEntry {
    /// 1-based level number.
    pub level: u8,
    pub class_id: ClassId,
    pub hit_points_gained: i32,
    #[serde(default)]
    pub skill_ranks_this_level: BTreeMap<SkillId, i32>,
    #[serde(default)]
    pub unspent_skill_points: i32,
    #[serde(default)]
    pub chosen_feats: BTreeSet<FeatId>,
    #[serde(default)]
    pub automatic_feats: BTreeSet<FeatId>,
    /// Only ever set on levels that are multiples of 4.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_increase: Option<Attribute>,
}

impl LevelEntry {
    pub fn new(level: u8, class_id: impl Into<ClassId>, hit_points_gained: i32) -> Self {
        Self {
            level,
            class_id: class_id.into(),
            hit_points_gained,
            skill_ranks_this_level: BTreeMap::new(),
            unspent_skill_points: 0,
            chosen_feats: BTreeSet::new(),
            automatic_feats: BTreeSet::new(),
            attribute_increase: None,
        }
    }

    /// Whether this level grants an attribute increase.
    pub fn grants_attribute_increase(level: u8) -> bool {
        level > 0 && level % 4 == 0
    }

    /// Add a feat to the chosen set. Returns `false` if it was already there.
    pub fn add_feat(&mut self, feat_id: impl Into<FeatId>) -> bool {
        self.chosen_feats.insert(feat_id.into())
    }

    /// Remove a feat from the chosen set. Returns `false` if it was absent.
    pub fn remove_feat(&mut self, feat_id: &str) -> bool {
        self.chosen_feats.remove(feat_id)
    }
}

// ============================================================================
// Character
// ============================================================================

/// A player character and its complete level history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub race_id: RaceId,
    pub base_attributes: Attributes,
    pub levels: Vec<LevelEntry>,
    pub total_level: u8,
    /// Cached sum of `skill_ranks_this_level` over all levels.
    pub skill_ranks: BTreeMap<SkillId, i32>,
    #[serde(default)]
    pub alignment: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub schema_version: String,
}

impl Character {
    /// A fresh level-0 character with every attribute at 10.
    pub fn new(name: impl Into<String>, race_id: impl Into<RaceId>) -> Self {
        Self::with_identity(name, race_id, CharacterId::new(), Utc::now())
    }

    /// Same as [`Character::new`] with a caller-supplied id and timestamp.
    pub fn with_identity(
        name: impl Into<String>,
        race_id: impl Into<RaceId>,
        id: CharacterId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            race_id: race_id.into(),
            base_attributes: Attributes::default(),
            levels: Vec::new(),
            total_level: 0,
            skill_ranks: BTreeMap::new(),
            alignment: None,
            description: None,
            created_at: now,
            modified_at: now,
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }

    /// The entry for a 1-based level.
    pub fn level(&self, level: u8) -> Option<&LevelEntry> {
        if level == 0 {
            return None;
        }
        self.levels.get(level as usize - 1)
    }

    pub fn level_mut(&mut self, level: u8) -> Option<&mut LevelEntry> {
        if level == 0 {
            return None;
        }
        self.levels.get_mut(level as usize - 1)
    }

    /// Append a level and keep `total_level` in sync.
    pub fn push_level(&mut self, entry: LevelEntry) {
        self.levels.push(entry);
        self.total_level = self.levels.len() as u8;
    }

    /// Whether the character has any level in the class.
    pub fn has_class(&self, class_id: &str) -> bool {
        self.levels.iter().any(|l| l.class_id == class_id)
    }

    /// Distinct class ids in order of first appearance.
    pub fn class_ids(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.levels {
            if !seen.contains(&entry.class_id.as_str()) {
                seen.push(&entry.class_id);
            }
        }
        seen
    }

    /// Every feat held, chosen or automatic, across all levels.
    pub fn all_feats(&self) -> BTreeSet<&str> {
        self.levels
            .iter()
            .flat_map(|l| l.chosen_feats.iter().chain(l.automatic_feats.iter()))
            .map(String::as_str)
            .collect()
    }

    pub fn has_feat(&self, feat_id: &str) -> bool {
        self.levels
            .iter()
            .any(|l| l.chosen_feats.contains(feat_id) || l.automatic_feats.contains(feat_id))
    }

    /// Rebuild the skill rank cache from scratch.
    pub fn recompute_skill_ranks(&mut self) {
        let mut totals: BTreeMap<SkillId, i32> = BTreeMap::new();
        for entry in &self.levels {
            for (skill, ranks) in &entry.skill_ranks_this_level {
                *totals.entry(skill.clone()).or_insert(0) += ranks;
            }
        }
        self.skill_ranks = totals;
    }

    /// Update the modification timestamp.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.modified_at = at;
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Outcome of an on-demand validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.valid = false;
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Fold another result into this one.
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.valid = self.errors.is_empty();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_character_is_empty() {
        let character = Character::new("Aldric", "human");
        assert_eq!(character.total_level, 0);
        assert!(character.levels.is_empty());
        assert_eq!(character.base_attributes, Attributes::uniform(10));
        assert_eq!(character.created_at, character.modified_at);
        assert_eq!(character.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_default_validation_result_is_valid() {
        let result = ValidationResult::default();
        assert!(result.valid);
        assert_eq!(result, ValidationResult::new());

        let merged = ValidationResult::default().merge(ValidationResult::default());
        assert!(merged.valid);
    }

    #[test]
    fn test_attribute_patch_merges() {
        let patch = AttributePatch::new()
            .set(Attribute::Strength, 16)
            .set(Attribute::Charisma, 8);
        let merged = patch.apply_to(&Attributes::default());
        assert_eq!(merged.strength, 16);
        assert_eq!(merged.charisma, 8);
        assert_eq!(merged.dexterity, 10);
    }

    #[test]
    fn test_attribute_french_aliases() {
        let bonuses: BTreeMap<Attribute, i32> =
            serde_json::from_str(r#"{ "dexterite": 2, "constitution": -2 }"#).unwrap();
        assert_eq!(bonuses.get(&Attribute::Dexterity), Some(&2));
        assert_eq!(bonuses.get(&Attribute::Constitution), Some(&-2));
    }

    #[test]
    fn test_recompute_skill_ranks() {
        let mut character = Character::new("Test", "human");
        let mut first = LevelEntry::new(1, "rogue", 6);
        first.skill_ranks_this_level.insert("hide".to_string(), 4);
        let mut second = LevelEntry::new(2, "rogue", 6);
        second.skill_ranks_this_level.insert("hide".to_string(), 1);
        second.skill_ranks_this_level.insert("search".to_string(), 2);
        character.push_level(first);
        character.push_level(second);
        character.recompute_skill_ranks();

        assert_eq!(character.skill_ranks.get("hide"), Some(&5));
        assert_eq!(character.skill_ranks.get("search"), Some(&2));
        assert_eq!(character.total_level, 2);
    }

    #[test]
    fn test_level_feat_edits_are_idempotent() {
        let mut entry = LevelEntry::new(1, "fighter", 10);
        assert!(entry.add_feat("dodge"));
        assert!(!entry.add_feat("dodge"));
        assert!(!entry.remove_feat("mobility"));
        assert_eq!(entry.chosen_feats.len(), 1);
    }

    #[test]
    fn test_validation_merge() {
        let mut a = ValidationResult::new();
        a.warning("unbalanced");
        let mut b = ValidationResult::new();
        b.error("too expensive");
        let merged = a.merge(b);
        assert!(!merged.valid);
        assert_eq!(merged.errors.len(), 1);
        assert_eq!(merged.warnings.len(), 1);
    }
}

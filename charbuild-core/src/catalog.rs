//! Rule catalog: races, classes, feats, skills and requirement overlays.
//!
//! The catalog is immutable input. It is built once (from JSON or from the
//! bundled tables in [`class_data`](crate::class_data)) and shared behind an
//! `Arc`. Field names follow the upstream data files, which is why several
//! serde renames are French.

use crate::character::Attribute;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type RaceId = String;
pub type ClassId = String;
pub type FeatId = String;
pub type SkillId = String;

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Invalid hit die: {0}")]
    InvalidHitDie(String),
}

// ============================================================================
// Hit dice and progressions
// ============================================================================

/// Class hit die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HitDie {
    D4,
    D6,
    D8,
    D10,
    D12,
}

impl HitDie {
    pub fn sides(&self) -> i32 {
        match self {
            HitDie::D4 => 4,
            HitDie::D6 => 6,
            HitDie::D8 => 8,
            HitDie::D10 => 10,
            HitDie::D12 => 12,
        }
    }

    /// Roll the die with the thread-local RNG.
    pub fn roll(&self) -> i32 {
        self.roll_with_rng(&mut rand::thread_rng())
    }

    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> i32 {
        rng.gen_range(1..=self.sides())
    }
}

impl FromStr for HitDie {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d4" | "4" => Ok(HitDie::D4),
            "d6" | "6" => Ok(HitDie::D6),
            "d8" | "8" => Ok(HitDie::D8),
            "d10" | "10" => Ok(HitDie::D10),
            "d12" | "12" => Ok(HitDie::D12),
            _ => Err(CatalogError::InvalidHitDie(s.to_string())),
        }
    }
}

impl TryFrom<String> for HitDie {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HitDie> for String {
    fn from(die: HitDie) -> Self {
        die.to_string()
    }
}

impl fmt::Display for HitDie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// Base attack bonus progression of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BabProgression {
    Full,
    #[default]
    Medium,
    Low,
}

impl BabProgression {
    /// Attack bonus per level, in quarters.
    pub fn quarters_per_level(&self) -> i32 {
        match self {
            BabProgression::Full => 4,
            BabProgression::Medium => 3,
            BabProgression::Low => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassType {
    #[default]
    Base,
    Prestige,
}

/// Saving throw categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Save {
    #[serde(alias = "fort")]
    Fortitude,
    #[serde(alias = "ref")]
    Reflex,
    Will,
}

impl Save {
    pub fn all() -> [Save; 3] {
        [Save::Fortitude, Save::Reflex, Save::Will]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastingKind {
    Arcane,
    Divine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellcastingInfo {
    #[serde(rename = "type")]
    pub kind: CastingKind,
    pub ability: Attribute,
}

// ============================================================================
// Races
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialModifiers {
    #[serde(rename = "bonusCompetences", default)]
    pub skill_bonuses: BTreeMap<SkillId, i32>,
}

/// A playable race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub id: RaceId,
    #[serde(rename = "nom", alias = "name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "attributeBonuses", default)]
    pub attribute_bonuses: BTreeMap<Attribute, i32>,
    #[serde(rename = "donsRaciaux", default)]
    pub racial_feats: Vec<FeatId>,
    #[serde(rename = "modificateursSpeciaux", default)]
    pub special_modifiers: SpecialModifiers,
    /// Extra skill point per level and an extra general feat at level 1.
    #[serde(default)]
    pub generalist: bool,
}

impl Race {
    pub fn new(id: impl Into<RaceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            attribute_bonuses: BTreeMap::new(),
            racial_feats: Vec::new(),
            special_modifiers: SpecialModifiers::default(),
            generalist: false,
        }
    }

    pub fn with_bonus(mut self, attribute: Attribute, bonus: i32) -> Self {
        self.attribute_bonuses.insert(attribute, bonus);
        self
    }

    pub fn with_racial_feats(mut self, feats: &[&str]) -> Self {
        self.racial_feats = feats.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_skill_bonus(mut self, skill: impl Into<SkillId>, bonus: i32) -> Self {
        self.special_modifiers.skill_bonuses.insert(skill.into(), bonus);
        self
    }

    pub fn generalist(mut self) -> Self {
        self.generalist = true;
        self
    }

    pub fn skill_bonus(&self, skill_id: &str) -> i32 {
        self.special_modifiers
            .skill_bonuses
            .get(skill_id)
            .copied()
            .unwrap_or(0)
    }
}

// ============================================================================
// Classes
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proficiencies {
    #[serde(default)]
    pub weapons: Vec<String>,
    #[serde(default)]
    pub armor: Vec<String>,
    #[serde(default)]
    pub shields: bool,
}

/// Generic prestige prerequisites. Absent categories are satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub base_attack_bonus: Option<i32>,
    #[serde(default)]
    pub skills: BTreeMap<String, i32>,
    #[serde(default)]
    pub feats: Vec<String>,
    #[serde(default)]
    pub race: Vec<String>,
    #[serde(default)]
    pub alignment: Option<String>,
    #[serde(default)]
    pub ability_scores: BTreeMap<Attribute, i32>,
    #[serde(default)]
    pub spellcasting: Option<String>,
    #[serde(default)]
    pub special: Option<String>,
}

impl Requirements {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Kind of a feat slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    General,
    #[default]
    Bonus,
    Class,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlotKind::General => "general",
            SlotKind::Bonus => "bonus",
            SlotKind::Class => "class",
        };
        write!(f, "{}", name)
    }
}

/// Bonus feat slots granted at specific class levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusFeatGrant {
    /// Class levels (not total levels) at which a slot opens.
    pub levels: Vec<u8>,
    #[serde(default)]
    pub kind: SlotKind,
    /// Feat types or ids the slot accepts. Empty accepts anything.
    #[serde(default)]
    pub restrictions: Vec<String>,
}

/// A base or prestige class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassData {
    pub id: ClassId,
    #[serde(rename = "nom", alias = "name")]
    pub name: String,
    #[serde(rename = "type", default)]
    pub class_type: ClassType,
    pub hit_die: HitDie,
    #[serde(default)]
    pub skill_points: Option<i32>,
    #[serde(default)]
    pub base_attack_bonus: BabProgression,
    #[serde(default)]
    pub proficiencies: Proficiencies,
    #[serde(default)]
    pub skills: BTreeSet<SkillId>,
    #[serde(default)]
    pub primary_saves: BTreeSet<Save>,
    #[serde(default)]
    pub spellcasting: Option<SpellcastingInfo>,
    #[serde(default)]
    pub alignment_restriction: Option<String>,
    #[serde(default)]
    pub requirements: Requirements,
    #[serde(default)]
    pub no_simple_weapons: bool,
    #[serde(default)]
    pub bonus_feats: Vec<BonusFeatGrant>,
    #[serde(default)]
    pub wild_shape: bool,
}

impl ClassData {
    pub fn new(id: impl Into<ClassId>, name: impl Into<String>, hit_die: HitDie) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            class_type: ClassType::Base,
            hit_die,
            skill_points: None,
            base_attack_bonus: BabProgression::Medium,
            proficiencies: Proficiencies::default(),
            skills: BTreeSet::new(),
            primary_saves: BTreeSet::new(),
            spellcasting: None,
            alignment_restriction: None,
            requirements: Requirements::default(),
            no_simple_weapons: false,
            bonus_feats: Vec::new(),
            wild_shape: false,
        }
    }

    pub fn prestige(mut self) -> Self {
        self.class_type = ClassType::Prestige;
        self
    }

    pub fn with_skill_points(mut self, points: i32) -> Self {
        self.skill_points = Some(points);
        self
    }

    pub fn with_bab(mut self, progression: BabProgression) -> Self {
        self.base_attack_bonus = progression;
        self
    }

    pub fn with_skills(mut self, skills: &[&str]) -> Self {
        self.skills = skills.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_saves(mut self, saves: &[Save]) -> Self {
        self.primary_saves = saves.iter().copied().collect();
        self
    }

    pub fn with_weapons(mut self, weapons: &[&str]) -> Self {
        self.proficiencies.weapons = weapons.iter().map(|w| w.to_string()).collect();
        self
    }

    pub fn with_armor(mut self, armor: &[&str]) -> Self {
        self.proficiencies.armor = armor.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_shields(mut self) -> Self {
        self.proficiencies.shields = true;
        self
    }

    pub fn with_spellcasting(mut self, kind: CastingKind, ability: Attribute) -> Self {
        self.spellcasting = Some(SpellcastingInfo { kind, ability });
        self
    }

    pub fn with_alignment_restriction(mut self, restriction: impl Into<String>) -> Self {
        self.alignment_restriction = Some(restriction.into());
        self
    }

    pub fn with_requirements(mut self, requirements: Requirements) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn without_simple_weapons(mut self) -> Self {
        self.no_simple_weapons = true;
        self
    }

    pub fn with_bonus_feats(mut self, grant: BonusFeatGrant) -> Self {
        self.bonus_feats.push(grant);
        self
    }

    pub fn with_wild_shape(mut self) -> Self {
        self.wild_shape = true;
        self
    }

    pub fn is_prestige(&self) -> bool {
        self.class_type == ClassType::Prestige
    }

    pub fn is_class_skill(&self, skill_id: &str) -> bool {
        self.skills.contains(skill_id)
    }

    pub fn casting_kind(&self) -> Option<CastingKind> {
        self.spellcasting.as_ref().map(|s| s.kind)
    }
}

// ============================================================================
// Feats and skills
// ============================================================================

/// A feat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feat {
    pub id: FeatId,
    #[serde(rename = "nom", alias = "name")]
    pub name: String,
    /// Comma-separated categories, e.g. `"General, Fighter"`.
    #[serde(rename = "type", default)]
    pub feat_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        rename = "conditionsCaractéristiques",
        alias = "conditionsCaracteristiques",
        default
    )]
    pub attribute_minimums: BTreeMap<Attribute, i32>,
    #[serde(rename = "conditionsId", default)]
    pub required_feats: Vec<FeatId>,
    #[serde(rename = "niveau_min", default)]
    pub min_level: Option<u8>,
    #[serde(rename = "niveau_max", default)]
    pub max_level: Option<u8>,
    #[serde(default)]
    pub first_level_only: bool,
    #[serde(default)]
    pub epic: bool,
    #[serde(default)]
    pub repeatable: bool,
}

impl Feat {
    pub fn new(id: impl Into<FeatId>, name: impl Into<String>, feat_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            feat_type: feat_type.into(),
            description: String::new(),
            attribute_minimums: BTreeMap::new(),
            required_feats: Vec::new(),
            min_level: None,
            max_level: None,
            first_level_only: false,
            epic: false,
            repeatable: false,
        }
    }

    pub fn with_minimum(mut self, attribute: Attribute, value: i32) -> Self {
        self.attribute_minimums.insert(attribute, value);
        self
    }

    pub fn with_required_feats(mut self, feats: &[&str]) -> Self {
        self.required_feats = feats.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_level_range(mut self, min: Option<u8>, max: Option<u8>) -> Self {
        self.min_level = min;
        self.max_level = max;
        self
    }

    pub fn first_level_only(mut self) -> Self {
        self.first_level_only = true;
        self
    }

    pub fn epic(mut self) -> Self {
        self.epic = true;
        self
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// Lowercased categories.
    pub fn types(&self) -> impl Iterator<Item = String> + '_ {
        self.feat_type
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
    }

    /// Whether any category contains `needle` (case-insensitive).
    pub fn has_type(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.types().any(|t| t.contains(&needle))
    }

    pub fn is_metamagic(&self) -> bool {
        self.has_type("metamagic") || self.has_type("métamagie")
    }

    /// Metamagic and wizard-typed feats need a spellcasting class.
    pub fn requires_caster(&self) -> bool {
        self.is_metamagic() || self.has_type("magicien") || self.has_type("wizard")
    }
}

/// A skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    #[serde(rename = "nom", alias = "name")]
    pub name: String,
    #[serde(rename = "attributPrincipal", alias = "key_attribute")]
    pub key_attribute: Attribute,
    /// Trained-only. Informational; the math does not enforce it.
    #[serde(rename = "formation", default)]
    pub trained_only: bool,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Skill {
    pub fn new(id: impl Into<SkillId>, name: impl Into<String>, key_attribute: Attribute) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            key_attribute,
            trained_only: false,
            aliases: Vec::new(),
        }
    }

    pub fn trained_only(mut self) -> Self {
        self.trained_only = true;
        self
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Whether `name` designates this skill, by id or alias.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.id.to_lowercase() == name || self.aliases.iter().any(|a| a.to_lowercase() == name)
    }
}

// ============================================================================
// Requirement overlays
// ============================================================================

/// An extra prerequisite attached to a specific prestige class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayCheck {
    MinTotalLevel { level: u8, message: String },
    AnyClassLevel { classes: Vec<ClassId>, message: String },
    MinLevelWithClass { level: u8, classes: Vec<ClassId>, message: String },
    MinSkillRanks { skill: String, ranks: i32, label: String },
    AlignmentIncludes { terms: Vec<String>, message: String },
    AlignmentExcludes { terms: Vec<String>, message: String },
}

impl OverlayCheck {
    /// Human-readable statement of the check.
    pub fn describe(&self) -> String {
        match self {
            OverlayCheck::MinTotalLevel { message, .. }
            | OverlayCheck::AnyClassLevel { message, .. }
            | OverlayCheck::MinLevelWithClass { message, .. }
            | OverlayCheck::AlignmentIncludes { message, .. }
            | OverlayCheck::AlignmentExcludes { message, .. } => message.clone(),
            OverlayCheck::MinSkillRanks { label, ranks, .. } => format!("{} {} ranks", label, ranks),
        }
    }
}

/// Extra checks and documentation for one class id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementOverlay {
    pub class_id: ClassId,
    #[serde(default)]
    pub checks: Vec<OverlayCheck>,
    /// Requirements that are documented but not machine-checked.
    #[serde(default)]
    pub descriptions: Vec<String>,
}

impl RequirementOverlay {
    pub fn new(class_id: impl Into<ClassId>) -> Self {
        Self {
            class_id: class_id.into(),
            checks: Vec::new(),
            descriptions: Vec::new(),
        }
    }

    pub fn check(mut self, check: OverlayCheck) -> Self {
        self.checks.push(check);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.descriptions.push(description.into());
        self
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Serialized form of a catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogBundle {
    #[serde(default)]
    pub races: Vec<Race>,
    #[serde(default)]
    pub classes: Vec<ClassData>,
    #[serde(default)]
    pub feats: Vec<Feat>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub overlays: Vec<RequirementOverlay>,
}

/// Immutable lookup tables for every rule record.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    races: BTreeMap<RaceId, Race>,
    classes: BTreeMap<ClassId, ClassData>,
    feats: BTreeMap<FeatId, Feat>,
    skills: BTreeMap<SkillId, Skill>,
    overlays: BTreeMap<ClassId, RequirementOverlay>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON bundle.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let bundle: CatalogBundle = serde_json::from_str(json)?;
        Self::from_bundle(bundle)
    }

    /// Build a catalog, rejecting duplicate ids.
    pub fn from_bundle(bundle: CatalogBundle) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::new();
        for race in bundle.races {
            insert_unique(&mut catalog.races, "race", race.id.clone(), race)?;
        }
        for class in bundle.classes {
            insert_unique(&mut catalog.classes, "class", class.id.clone(), class)?;
        }
        for feat in bundle.feats {
            insert_unique(&mut catalog.feats, "feat", feat.id.clone(), feat)?;
        }
        for skill in bundle.skills {
            insert_unique(&mut catalog.skills, "skill", skill.id.clone(), skill)?;
        }
        for overlay in bundle.overlays {
            insert_unique(&mut catalog.overlays, "overlay", overlay.class_id.clone(), overlay)?;
        }
        Ok(catalog)
    }

    /// Back to the serialized form.
    pub fn to_bundle(&self) -> CatalogBundle {
        CatalogBundle {
            races: self.races.values().cloned().collect(),
            classes: self.classes.values().cloned().collect(),
            feats: self.feats.values().cloned().collect(),
            skills: self.skills.values().cloned().collect(),
            overlays: self.overlays.values().cloned().collect(),
        }
    }

    pub fn with_race(mut self, race: Race) -> Self {
        self.races.insert(race.id.clone(), race);
        self
    }

    pub fn with_class(mut self, class: ClassData) -> Self {
        self.classes.insert(class.id.clone(), class);
        self
    }

    pub fn with_feat(mut self, feat: Feat) -> Self {
        self.feats.insert(feat.id.clone(), feat);
        self
    }

    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.skills.insert(skill.id.clone(), skill);
        self
    }

    pub fn with_overlay(mut self, overlay: RequirementOverlay) -> Self {
        self.overlays.insert(overlay.class_id.clone(), overlay);
        self
    }

    pub fn race(&self, id: &str) -> Option<&Race> {
        self.races.get(id)
    }

    pub fn class(&self, id: &str) -> Option<&ClassData> {
        self.classes.get(id)
    }

    pub fn feat(&self, id: &str) -> Option<&Feat> {
        self.feats.get(id)
    }

    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.get(id)
    }

    /// Look up a skill by id first, then by alias.
    pub fn resolve_skill(&self, name: &str) -> Option<&Skill> {
        self.skills
            .get(name)
            .or_else(|| self.skills.values().find(|s| s.matches(name)))
    }

    pub fn overlay(&self, class_id: &str) -> Option<&RequirementOverlay> {
        self.overlays.get(class_id)
    }

    pub fn races(&self) -> impl Iterator<Item = &Race> {
        self.races.values()
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassData> {
        self.classes.values()
    }

    pub fn feats(&self) -> impl Iterator<Item = &Feat> {
        self.feats.values()
    }

    pub fn skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }
}

fn insert_unique<T>(
    map: &mut BTreeMap<String, T>,
    kind: &'static str,
    id: String,
    value: T,
) -> Result<(), CatalogError> {
    if map.contains_key(&id) {
        return Err(CatalogError::DuplicateId { kind, id });
    }
    map.insert(id, value);
    Ok(())
}

//! Class prerequisites.
//!
//! Base classes are always open. Prestige classes are checked against the
//! generic [`Requirements`](crate::catalog::Requirements) schema and then
//! against the class's overlay, if the catalog has one. Categories that are
//! absent from the data are satisfied.

use crate::attributes::final_attributes;
use crate::catalog::{CastingKind, Catalog, ClassData, ClassId, OverlayCheck};
use crate::character::Character;
use crate::progression::base_attack_bonus;
use crate::skills::total_ranks;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Special requirement satisfied by a wild-shape class.
pub const WILD_SHAPE_SPECIAL: &str = "wild_shape_or_polymorph_spell_known";

/// Marker returned for a prestige class with nothing documented.
pub const UNDOCUMENTED: &str = "Undocumented requirements";

/// Whether a character may take a class, and what is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassQualification {
    pub can_take: bool,
    pub missing_requirements: Vec<String>,
}

impl ClassQualification {
    fn from_missing(missing_requirements: Vec<String>) -> Self {
        Self {
            can_take: missing_requirements.is_empty(),
            missing_requirements,
        }
    }
}

// ============================================================================
// Spellcasting requirements
// ============================================================================

/// Parsed form of `any_level_N`, `arcane_level_N` and `divine_level_N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellcastingRequirement {
    Any(u8),
    Arcane(u8),
    Divine(u8),
}

impl SpellcastingRequirement {
    pub fn parse(value: &str) -> Option<Self> {
        let (kind, level) = value.trim().split_once("_level_")?;
        let level: u8 = level.parse().ok()?;
        match kind {
            "any" => Some(Self::Any(level)),
            "arcane" => Some(Self::Arcane(level)),
            "divine" => Some(Self::Divine(level)),
            _ => None,
        }
    }

    pub fn spell_level(&self) -> u8 {
        match self {
            Self::Any(l) | Self::Arcane(l) | Self::Divine(l) => *l,
        }
    }

    /// Caster levels needed to cast spells of this level.
    pub fn caster_levels_needed(&self) -> u8 {
        (2 * self.spell_level()).saturating_sub(1)
    }

    pub fn is_met(&self, character: &Character, catalog: &Catalog) -> bool {
        let needed = self.caster_levels_needed();
        let levels_of = |kind: CastingKind| {
            character
                .levels
                .iter()
                .filter(|l| catalog.class(&l.class_id).and_then(|c| c.casting_kind()) == Some(kind))
                .count()
        };
        let held = match self {
            Self::Any(_) => character.total_level as usize,
            Self::Arcane(_) => levels_of(CastingKind::Arcane),
            Self::Divine(_) => levels_of(CastingKind::Divine),
        };
        held >= needed as usize
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Any(l) => format!("Able to cast level {} spells", l),
            Self::Arcane(l) => format!("Able to cast level {} arcane spells", l),
            Self::Divine(l) => format!("Able to cast level {} divine spells", l),
        }
    }
}

fn describe_spellcasting(value: &str) -> String {
    SpellcastingRequirement::parse(value)
        .map(|r| r.describe())
        .unwrap_or_else(|| format!("Spellcasting: {}", value))
}

// ============================================================================
// Alignment
// ============================================================================

const ALIGNMENT_SYNONYMS: [(&str, &[&str]); 5] = [
    ("lawful", &["lawful", "loyal"]),
    ("chaotic", &["chaotic", "chaotique"]),
    ("good", &["good", "bon"]),
    ("evil", &["evil", "mauvais"]),
    ("neutral", &["neutral", "neutre"]),
];

fn alignment_has(alignment: &str, term: &str) -> bool {
    let synonyms = ALIGNMENT_SYNONYMS
        .iter()
        .find(|(key, words)| *key == term || words.contains(&term))
        .map(|(_, words)| *words);
    match synonyms {
        Some(words) => words.iter().any(|w| alignment.contains(w)),
        None => alignment.contains(term),
    }
}

/// Match a character alignment against a restriction such as `"lawful good"`,
/// `"non-lawful"` or `"not good"`.
///
/// Positive restrictions need every term; negated ones need none of them.
/// A character without an alignment fails positive restrictions and passes
/// negated ones.
pub fn alignment_matches(alignment: Option<&str>, restriction: &str) -> bool {
    let restriction = restriction.trim().to_lowercase();
    let restriction = restriction.strip_prefix("any ").unwrap_or(&restriction);
    let (negated, terms) = match restriction
        .strip_prefix("non-")
        .or_else(|| restriction.strip_prefix("not "))
        .or_else(|| restriction.strip_prefix("non "))
    {
        Some(rest) => (true, rest),
        None => (false, restriction),
    };

    let terms: Vec<&str> = terms.split_whitespace().collect();
    if terms.is_empty() {
        return true;
    }

    let alignment = alignment.unwrap_or("").to_lowercase();
    if negated {
        !terms.iter().any(|t| alignment_has(&alignment, t))
    } else {
        !alignment.is_empty() && terms.iter().all(|t| alignment_has(&alignment, t))
    }
}

// ============================================================================
// Feats
// ============================================================================

/// Whether a held feat satisfies a required feat name.
///
/// Matches by id, by the held feat's display name containing the required
/// text, or by the required id containing the held id.
pub fn feat_satisfies(held_id: &str, required: &str, catalog: &Catalog) -> bool {
    if held_id == required {
        return true;
    }
    let required_lower = required.to_lowercase();
    if let Some(feat) = catalog.feat(held_id) {
        if feat.name.to_lowercase().contains(&required_lower) {
            return true;
        }
    }
    !held_id.is_empty() && required.contains(held_id)
}

fn has_required_feat(character: &Character, required: &str, catalog: &Catalog) -> bool {
    character
        .all_feats()
        .into_iter()
        .any(|held| feat_satisfies(held, required, catalog))
}

/// Display name of a feat id.
pub fn feat_display_name(feat_id: &str, catalog: &Catalog) -> String {
    match catalog.feat(feat_id) {
        Some(feat) => feat.name.clone(),
        None => feat_id
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn skill_label(name: &str, catalog: &Catalog) -> (String, String) {
    match catalog.resolve_skill(name) {
        Some(skill) => (skill.id.clone(), skill.name.clone()),
        None => (name.to_string(), name.to_string()),
    }
}

// ============================================================================
// Checks
// ============================================================================

fn alignment_requirement(class: &ClassData) -> Option<&str> {
    class
        .requirements
        .alignment
        .as_deref()
        .or(class.alignment_restriction.as_deref())
        .filter(|a| !a.trim().is_empty())
}

fn has_any_class(character: &Character, classes: &[ClassId]) -> bool {
    classes.iter().any(|c| character.has_class(c))
}

fn check_overlay(check: &OverlayCheck, character: &Character, catalog: &Catalog) -> Option<String> {
    let alignment = character.alignment.as_deref().unwrap_or("").to_lowercase();

    match check {
        OverlayCheck::MinTotalLevel { level, message } => {
            (character.total_level < *level).then(|| message.clone())
        }
        OverlayCheck::AnyClassLevel { classes, message } => {
            (!has_any_class(character, classes)).then(|| message.clone())
        }
        OverlayCheck::MinLevelWithClass {
            level,
            classes,
            message,
        } => (character.total_level < *level || !has_any_class(character, classes)).then(|| message.clone()),
        OverlayCheck::MinSkillRanks { skill, ranks, label } => {
            let (skill_id, _) = skill_label(skill, catalog);
            let current = total_ranks(character, &skill_id);
            (current < *ranks).then(|| format!("{} {} ranks (current: {})", label, ranks, current))
        }
        OverlayCheck::AlignmentIncludes { terms, message } => {
            (!terms.iter().any(|t| alignment.contains(&t.to_lowercase()))).then(|| message.clone())
        }
        OverlayCheck::AlignmentExcludes { terms, message } => {
            terms
                .iter()
                .any(|t| alignment.contains(&t.to_lowercase()))
                .then(|| message.clone())
        }
    }
}

/// Check whether the character qualifies for a class.
pub fn check_class_requirements(
    character: &Character,
    class: &ClassData,
    catalog: &Catalog,
) -> ClassQualification {
    if !class.is_prestige() {
        return ClassQualification::from_missing(Vec::new());
    }

    let requirements = &class.requirements;
    let mut missing = Vec::new();

    if let Some(min) = requirements.base_attack_bonus {
        let current = base_attack_bonus(character, catalog);
        if current < min {
            missing.push(format!("BAB +{} (current: +{})", min, current));
        }
    }

    for (name, min) in &requirements.skills {
        let (skill_id, label) = skill_label(name, catalog);
        let current = total_ranks(character, &skill_id);
        if current < *min {
            missing.push(format!("{} {} ranks (current: {})", label, min, current));
        }
    }

    for required in &requirements.feats {
        if !has_required_feat(character, required, catalog) {
            missing.push(format!("Feat: {}", feat_display_name(required, catalog)));
        }
    }

    if !requirements.ability_scores.is_empty() {
        let attributes = final_attributes(character, catalog);
        for (attribute, min) in &requirements.ability_scores {
            let current = attributes.get(*attribute);
            if current < *min {
                missing.push(format!("{} {}+ (current: {})", attribute.name(), min, current));
            }
        }
    }

    if !requirements.race.is_empty() {
        let race = character.race_id.to_lowercase();
        if !requirements.race.iter().any(|r| race.contains(&r.to_lowercase())) {
            missing.push(format!("Race: {}", requirements.race.join(" or ")));
        }
    }

    if let Some(restriction) = alignment_requirement(class) {
        if !alignment_matches(character.alignment.as_deref(), restriction) {
            missing.push(format!("Alignment: {}", restriction));
        }
    }

    if let Some(spellcasting) = &requirements.spellcasting {
        if let Some(parsed) = SpellcastingRequirement::parse(spellcasting) {
            if !parsed.is_met(character, catalog) {
                missing.push(parsed.describe());
            }
        }
    }

    if requirements.special.as_deref() == Some(WILD_SHAPE_SPECIAL) {
        let has_wild_shape = character
            .levels
            .iter()
            .filter_map(|l| catalog.class(&l.class_id))
            .any(|c| c.wild_shape);
        if !has_wild_shape {
            missing.push("Wild shape or a known polymorph spell".to_string());
        }
    }

    if let Some(overlay) = catalog.overlay(&class.id) {
        missing.extend(
            overlay
                .checks
                .iter()
                .filter_map(|check| check_overlay(check, character, catalog)),
        );
    }

    ClassQualification::from_missing(missing)
}

/// Every requirement of a class in readable form, regardless of status.
pub fn complete_requirements(class: &ClassData, catalog: &Catalog) -> Vec<String> {
    if !class.is_prestige() {
        return Vec::new();
    }

    let requirements = &class.requirements;
    let mut all = Vec::new();

    if let Some(bab) = requirements.base_attack_bonus {
        all.push(format!("BAB +{}", bab));
    }
    for (name, ranks) in &requirements.skills {
        let (_, label) = skill_label(name, catalog);
        all.push(format!("{} {} ranks", label, ranks));
    }
    for feat in &requirements.feats {
        all.push(format!("Feat: {}", feat_display_name(feat, catalog)));
    }
    for (attribute, min) in &requirements.ability_scores {
        all.push(format!("{} {}+", attribute.name(), min));
    }
    if !requirements.race.is_empty() {
        all.push(format!("Race: {}", requirements.race.join(" or ")));
    }
    if let Some(alignment) = alignment_requirement(class) {
        all.push(format!("Alignment: {}", alignment));
    }
    if let Some(spellcasting) = &requirements.spellcasting {
        all.push(describe_spellcasting(spellcasting));
    }
    if let Some(special) = &requirements.special {
        if special == WILD_SHAPE_SPECIAL {
            all.push("Wild shape or a known polymorph spell".to_string());
        } else {
            all.push(special.replace('_', " "));
        }
    }

    if let Some(overlay) = catalog.overlay(&class.id) {
        all.extend(overlay.checks.iter().map(OverlayCheck::describe));
        all.extend(overlay.descriptions.iter().cloned());
    }

    if all.is_empty() {
        all.push(UNDOCUMENTED.to_string());
    }
    all
}

/// Qualification for every class in the catalog.
pub fn qualifying_classes(character: &Character, catalog: &Catalog) -> BTreeMap<ClassId, ClassQualification> {
    catalog
        .classes()
        .map(|class| (class.id.clone(), check_class_requirements(character, class, catalog)))
        .collect()
}

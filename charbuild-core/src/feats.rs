//! Feat slots, feat eligibility and automatic class/race grants.

use crate::attributes::final_attributes;
use crate::catalog::{Catalog, Feat, FeatId, SlotKind};
use crate::character::Character;
use crate::config::EngineConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Feat every character gets unless one of its classes opts out.
pub const SIMPLE_WEAPON_FEAT: &str = "simple_weapon_proficiency";

/// Feat granted by a weapon proficiency category.
pub fn weapon_proficiency_feat(category: &str) -> Option<&'static str> {
    match category {
        "simple" => Some(SIMPLE_WEAPON_FEAT),
        "martial" => Some("martial_weapon_proficiency"),
        "exotic" => Some("exotic_weapon_proficiency"),
        _ => None,
    }
}

/// Feat granted by an armor proficiency category.
pub fn armor_proficiency_feat(category: &str) -> Option<&'static str> {
    match category {
        "light" => Some("light_armor_proficiency"),
        "medium" => Some("medium_armor_proficiency"),
        "heavy" => Some("heavy_armor_proficiency"),
        _ => None,
    }
}

pub const SHIELD_PROFICIENCY_FEAT: &str = "shield_proficiency";

/// A level-indexed opportunity to choose a feat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatSlot {
    pub id: String,
    pub level: u8,
    pub kind: SlotKind,
    /// `"general"`, `"racial_<race>"` or the granting class id.
    pub source: String,
    /// Feat types or ids accepted. Empty accepts anything.
    pub restrictions: Vec<String>,
}

impl FeatSlot {
    /// Whether a feat fits this slot's restrictions.
    pub fn accepts(&self, feat: &Feat) -> bool {
        self.restrictions.is_empty()
            || self
                .restrictions
                .iter()
                .any(|r| feat.id == *r || feat.has_type(r))
    }
}

/// Whether a feat can be taken, with the reasons it cannot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatEligibility {
    pub can_select: bool,
    pub reasons: Vec<String>,
}

impl Default for FeatEligibility {
    /// No reasons against, so selectable.
    fn default() -> Self {
        Self {
            can_select: true,
            reasons: Vec::new(),
        }
    }
}

/// Slot usage counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatStats {
    pub total_slots: usize,
    pub general_slots: usize,
    pub bonus_slots: usize,
    pub class_slots: usize,
    pub used_slots: usize,
    pub remaining_slots: usize,
}

// ============================================================================
// Slots
// ============================================================================

/// Levels 1, 3, 6, 9, ... up to `total_level`.
pub fn general_slot_levels(total_level: u8) -> Vec<u8> {
    (1..=total_level)
        .filter(|l| *l == 1 || l % 3 == 0)
        .collect()
}

/// The generalist race's extra level-1 general slot.
pub fn racial_bonus_feat_slots(character: &Character, catalog: &Catalog) -> Vec<FeatSlot> {
    match catalog.race(&character.race_id) {
        Some(race) if race.generalist && character.total_level >= 1 => vec![FeatSlot {
            id: format!("racial_{}_1", race.id),
            level: 1,
            kind: SlotKind::General,
            source: format!("racial_{}", race.id),
            restrictions: Vec::new(),
        }],
        _ => Vec::new(),
    }
}

/// Slots opened by class bonus feat grants, counted in class levels.
pub fn class_bonus_feat_slots(character: &Character, catalog: &Catalog) -> Vec<FeatSlot> {
    let mut class_levels: BTreeMap<&str, u8> = BTreeMap::new();
    let mut slots = Vec::new();

    for entry in &character.levels {
        let counter = class_levels.entry(entry.class_id.as_str()).or_insert(0);
        *counter += 1;
        let class_level = *counter;

        let Some(class) = catalog.class(&entry.class_id) else {
            continue;
        };
        for grant in class.bonus_feats.iter().filter(|g| g.levels.contains(&class_level)) {
            slots.push(FeatSlot {
                id: format!("{}_{}_{}", class.id, class_level, grant.kind),
                level: entry.level,
                kind: grant.kind,
                source: class.id.clone(),
                restrictions: grant.restrictions.clone(),
            });
        }
    }
    slots
}

/// Every feat slot up to the current total level, ordered by level.
pub fn feat_slots(character: &Character, catalog: &Catalog) -> Vec<FeatSlot> {
    let mut slots: Vec<FeatSlot> = general_slot_levels(character.total_level)
        .into_iter()
        .map(|level| FeatSlot {
            id: format!("general_{}", level),
            level,
            kind: SlotKind::General,
            source: "general".to_string(),
            restrictions: Vec::new(),
        })
        .collect();
    slots.extend(racial_bonus_feat_slots(character, catalog));
    slots.extend(class_bonus_feat_slots(character, catalog));
    slots.sort_by_key(|s| s.level);
    slots
}

/// Number of slots opened at one level.
pub fn slots_at_level(slots: &[FeatSlot], level: u8) -> usize {
    slots.iter().filter(|s| s.level == level).count()
}

pub fn feat_stats(character: &Character, catalog: &Catalog) -> FeatStats {
    let slots = feat_slots(character, catalog);
    let count = |kind: SlotKind| slots.iter().filter(|s| s.kind == kind).count();
    let used_slots = character.levels.iter().map(|l| l.chosen_feats.len()).sum();

    FeatStats {
        total_slots: slots.len(),
        general_slots: count(SlotKind::General),
        bonus_slots: count(SlotKind::Bonus),
        class_slots: count(SlotKind::Class),
        used_slots,
        remaining_slots: slots.len().saturating_sub(used_slots),
    }
}

// ============================================================================
// Automatic feats
// ============================================================================

/// Feats implied by the character's classes.
pub fn automatic_feats(character: &Character, catalog: &Catalog) -> BTreeSet<FeatId> {
    let mut feats = BTreeSet::new();

    let opts_out = character
        .levels
        .iter()
        .filter_map(|l| catalog.class(&l.class_id))
        .any(|c| c.no_simple_weapons);
    if !opts_out {
        feats.insert(SIMPLE_WEAPON_FEAT.to_string());
    }

    for class in character.levels.iter().filter_map(|l| catalog.class(&l.class_id)) {
        let proficiencies = &class.proficiencies;
        feats.extend(
            proficiencies
                .weapons
                .iter()
                .filter_map(|w| weapon_proficiency_feat(w))
                .map(String::from),
        );
        feats.extend(
            proficiencies
                .armor
                .iter()
                .filter_map(|a| armor_proficiency_feat(a))
                .map(String::from),
        );
        if proficiencies.shields {
            feats.insert(SHIELD_PROFICIENCY_FEAT.to_string());
        }
    }
    feats
}

/// Automatic feats not yet recorded on any level.
pub fn missing_automatic_feats(character: &Character, catalog: &Catalog) -> BTreeSet<FeatId> {
    let recorded: BTreeSet<&str> = character
        .levels
        .iter()
        .flat_map(|l| l.automatic_feats.iter().map(String::as_str))
        .collect();
    automatic_feats(character, catalog)
        .into_iter()
        .filter(|f| !recorded.contains(f.as_str()))
        .collect()
}

/// Record missing automatic feats on level 1. Returns what was added.
pub fn add_missing_automatic_feats(character: &mut Character, catalog: &Catalog) -> BTreeSet<FeatId> {
    let missing = missing_automatic_feats(character, catalog);
    match character.level_mut(1) {
        Some(first) => {
            first.automatic_feats.extend(missing.iter().cloned());
            missing
        }
        None => BTreeSet::new(),
    }
}

/// The race's granted feats.
pub fn racial_feats(character: &Character, catalog: &Catalog) -> Vec<FeatId> {
    catalog
        .race(&character.race_id)
        .map(|r| r.racial_feats.clone())
        .unwrap_or_default()
}

/// Racial feats not yet on level 1.
pub fn missing_racial_feats(character: &Character, catalog: &Catalog) -> BTreeSet<FeatId> {
    let Some(first) = character.level(1) else {
        return BTreeSet::new();
    };
    racial_feats(character, catalog)
        .into_iter()
        .filter(|f| !first.automatic_feats.contains(f))
        .collect()
}

/// Merge racial feats into level 1. Feats from a previous race stay.
pub fn apply_racial_feats(character: &mut Character, catalog: &Catalog) -> BTreeSet<FeatId> {
    let missing = missing_racial_feats(character, catalog);
    if let Some(first) = character.level_mut(1) {
        first.automatic_feats.extend(missing.iter().cloned());
    }
    missing
}

// ============================================================================
// Eligibility
// ============================================================================

fn has_spellcasting_class(character: &Character, catalog: &Catalog) -> bool {
    character
        .levels
        .iter()
        .filter_map(|l| catalog.class(&l.class_id))
        .any(|c| c.spellcasting.is_some())
}

/// Prerequisites of a feat, ignoring whether it is already held.
pub fn feat_prerequisites(
    character: &Character,
    feat: &Feat,
    catalog: &Catalog,
    config: &EngineConfig,
) -> FeatEligibility {
    let mut reasons = Vec::new();
    let attributes = final_attributes(character, catalog);
    let level = character.total_level;

    for (attribute, minimum) in &feat.attribute_minimums {
        let current = attributes.get(*attribute);
        if current < *minimum {
            reasons.push(format!(
                "{} {}+ required (current: {})",
                attribute.name(),
                minimum,
                current
            ));
        }
    }

    for required in &feat.required_feats {
        if !character.has_feat(required) {
            let name = catalog.feat(required).map(|f| f.name.as_str()).unwrap_or(required.as_str());
            reasons.push(format!("Requires feat: {}", name));
        }
    }

    if feat.first_level_only && level > 1 {
        reasons.push("Only available at level 1".to_string());
    }

    if feat.epic && level < config.epic_level {
        reasons.push(format!("Epic feat requires level {}", config.epic_level));
    }

    if let Some(min) = feat.min_level {
        if level < min {
            reasons.push(format!("Requires level {}", min));
        }
    }

    if let Some(max) = feat.max_level {
        if level > max {
            reasons.push(format!("Not available after level {}", max));
        }
    }

    if feat.requires_caster() && !has_spellcasting_class(character, catalog) {
        reasons.push("Requires a spellcasting class".to_string());
    }

    FeatEligibility {
        can_select: reasons.is_empty(),
        reasons,
    }
}

/// Whether the character can take a feat right now.
pub fn can_select_feat(
    character: &Character,
    feat: &Feat,
    catalog: &Catalog,
    config: &EngineConfig,
) -> FeatEligibility {
    let mut eligibility = feat_prerequisites(character, feat, catalog, config);
    if !feat.repeatable && character.has_feat(&feat.id) {
        eligibility.reasons.insert(0, "Feat already known".to_string());
        eligibility.can_select = false;
    }
    eligibility
}

/// Catalog feats the character can place in a slot.
pub fn available_feats_for_slot<'a>(
    character: &Character,
    slot: &FeatSlot,
    catalog: &'a Catalog,
    config: &EngineConfig,
) -> Vec<&'a Feat> {
    catalog
        .feats()
        .filter(|feat| slot.accepts(feat))
        .filter(|feat| can_select_feat(character, feat, catalog, config).can_select)
        .collect()
}

// ============================================================================
// Level edits
// ============================================================================

/// Add a chosen feat to a level. Returns `false` when nothing changed.
pub fn add_feat_to_level(character: &mut Character, level: u8, feat_id: &str) -> bool {
    character
        .level_mut(level)
        .map(|entry| entry.add_feat(feat_id))
        .unwrap_or(false)
}

/// Remove a chosen feat from a level. Returns `false` when nothing changed.
pub fn remove_feat_from_level(character: &mut Character, level: u8, feat_id: &str) -> bool {
    character
        .level_mut(level)
        .map(|entry| entry.remove_feat(feat_id))
        .unwrap_or(false)
}

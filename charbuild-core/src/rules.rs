//! Character state machine with a Command/Effect pipeline.
//!
//! 1. The caller issues a [`Command`] against the current [`BuilderState`].
//! 2. [`RulesEngine::resolve`] checks it against the rules and the catalog
//!    and produces a [`Resolution`]: the effects to apply, plus a note.
//! 3. [`apply_effects`] applies them to a copy of the state.
//!
//! Resolution reads the clock and the catalog; application reads nothing but
//! the effects, so replaying effects always yields the same snapshot. A
//! command that cannot apply (no character, unknown level, unknown class)
//! resolves to no effects and the state is returned unchanged.

use crate::catalog::{Catalog, ClassId, FeatId, RaceId, SkillId};
use crate::character::{
    Attribute, AttributePatch, Attributes, Character, CharacterId, LevelEntry, ValidationResult,
};
use crate::config::EngineConfig;
use crate::feats::{missing_automatic_feats, missing_racial_feats};
use crate::skills::skill_points_for_level;
use crate::validation::validate_character;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

// ============================================================================
// State
// ============================================================================

/// Lifecycle phase of the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Uninitialized,
    Active,
}

/// Everything the builder holds between commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderState {
    pub character: Option<Character>,
    pub validation: Option<ValidationResult>,
    pub is_modified: bool,
}

impl BuilderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.character.is_some() {
            Phase::Active
        } else {
            Phase::Uninitialized
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

/// A requested change to the builder state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Start a new level-0 character.
    CreateCharacter { name: String, race_id: RaceId },

    /// Replace the current character with a stored one.
    LoadCharacter { character: Box<Character> },

    /// Merge new base attribute values.
    UpdateAttributes { patch: AttributePatch },

    /// Change race; racial feats of the new race are added, never removed.
    UpdateRace { race_id: RaceId },

    /// Append a level.
    AddLevel { class_id: ClassId, hit_points_gained: i32 },

    /// Pick the attribute raised at a level that is a multiple of 4.
    SetAttributeIncrease { level: u8, attribute: Attribute },

    /// Merge skill ranks into the most recent level.
    UpdateSkills { skills: BTreeMap<SkillId, i32> },

    /// Merge skill ranks into a given level.
    UpdateLevelSkills {
        level: u8,
        skills: BTreeMap<SkillId, i32>,
        remaining_points: i32,
    },

    AddFeatToLevel { level: u8, feat_id: FeatId },

    RemoveFeatFromLevel { level: u8, feat_id: FeatId },

    /// Replace a level's chosen feats.
    UpdateLevelFeats { level: u8, feats: BTreeSet<FeatId> },

    /// Re-derive class proficiency feats onto level 1.
    AddMissingAutomaticFeats,

    SetAlignment { alignment: Option<String> },

    /// Drop the current character.
    ResetCharacter,

    /// Store an on-demand validation result.
    SetValidation { result: ValidationResult },
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateCharacter { .. } => "create_character",
            Command::LoadCharacter { .. } => "load_character",
            Command::UpdateAttributes { .. } => "update_attributes",
            Command::UpdateRace { .. } => "update_race",
            Command::AddLevel { .. } => "add_level",
            Command::SetAttributeIncrease { .. } => "set_attribute_increase",
            Command::UpdateSkills { .. } => "update_skills",
            Command::UpdateLevelSkills { .. } => "update_level_skills",
            Command::AddFeatToLevel { .. } => "add_feat_to_level",
            Command::RemoveFeatFromLevel { .. } => "remove_feat_from_level",
            Command::UpdateLevelFeats { .. } => "update_level_feats",
            Command::AddMissingAutomaticFeats => "add_missing_automatic_feats",
            Command::SetAlignment { .. } => "set_alignment",
            Command::ResetCharacter => "reset_character",
            Command::SetValidation { .. } => "set_validation",
        }
    }
}

// ============================================================================
// Effects
// ============================================================================

/// The outcome of resolving a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub effects: Vec<Effect>,
    pub note: String,
}

impl Resolution {
    pub fn new(note: impl Into<String>) -> Self {
        Self {
            effects: Vec::new(),
            note: note.into(),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    /// Whether applying this resolution changes nothing.
    pub fn is_noop(&self) -> bool {
        self.effects.is_empty()
    }
}

/// A concrete state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    CharacterCreated { character: Box<Character> },

    CharacterLoaded { character: Box<Character> },

    AttributesChanged { attributes: Attributes },

    RaceChanged { race_id: RaceId },

    LevelAdded { entry: LevelEntry },

    AttributeIncreaseSet { level: u8, attribute: Attribute },

    /// A level's full skill map after the merge.
    LevelSkillsChanged {
        level: u8,
        ranks: BTreeMap<SkillId, i32>,
        unspent_skill_points: i32,
    },

    FeatAdded { level: u8, feat_id: FeatId },

    FeatRemoved { level: u8, feat_id: FeatId },

    LevelFeatsReplaced { level: u8, feats: BTreeSet<FeatId> },

    /// Added to level 1's automatic feats.
    AutomaticFeatsGranted { feats: BTreeSet<FeatId> },

    AlignmentChanged { alignment: Option<String> },

    CharacterReset,

    ValidationStored { result: ValidationResult },

    Touched { at: DateTime<Utc> },
}

impl Effect {
    /// Whether the effect counts as an unsaved edit.
    fn marks_modified(&self) -> bool {
        !matches!(
            self,
            Effect::CharacterLoaded { .. } | Effect::CharacterReset | Effect::ValidationStored { .. }
        )
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Resolves commands against a catalog and configuration.
#[derive(Debug, Clone)]
pub struct RulesEngine {
    catalog: Arc<Catalog>,
    config: EngineConfig,
}

impl RulesEngine {
    pub fn new(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    /// Engine over the bundled tables with default limits.
    pub fn standard() -> Self {
        Self::new(Catalog::standard(), EngineConfig::default())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve a command and apply it to a copy of `state`.
    pub fn dispatch(&self, state: &BuilderState, command: Command) -> BuilderState {
        let resolution = self.resolve(state, command);
        let mut next = state.clone();
        apply_effects(&mut next, &resolution.effects);
        next
    }

    /// Run validation on the current character, if any.
    pub fn validate(&self, state: &BuilderState) -> Option<ValidationResult> {
        state
            .character
            .as_ref()
            .map(|c| validate_character(c, &self.catalog, &self.config))
    }

    /// Work out the effects of a command without touching the state.
    pub fn resolve(&self, state: &BuilderState, command: Command) -> Resolution {
        let name = command.name();
        debug!(command = name, "Resolving command");

        let character = match (&command, state.character.as_ref()) {
            (Command::CreateCharacter { name, race_id }, _) => {
                return self.resolve_create(name, race_id);
            }
            (Command::LoadCharacter { character }, _) => {
                return Resolution::new(format!("Loaded {}", character.name))
                    .with_effect(Effect::CharacterLoaded {
                        character: character.clone(),
                    });
            }
            (_, Some(character)) => character,
            (_, None) => {
                warn!(command = name, "Ignoring command without a current character");
                return Resolution::new("No current character");
            }
        };

        let resolution = match command {
            Command::CreateCharacter { .. } | Command::LoadCharacter { .. } => {
                Resolution::new("Already handled")
            }
            Command::UpdateAttributes { patch } => self.resolve_update_attributes(character, &patch),
            Command::UpdateRace { race_id } => self.resolve_update_race(character, race_id),
            Command::AddLevel {
                class_id,
                hit_points_gained,
            } => self.resolve_add_level(character, class_id, hit_points_gained),
            Command::SetAttributeIncrease { level, attribute } => {
                self.resolve_attribute_increase(character, level, attribute)
            }
            Command::UpdateSkills { skills } => match character.total_level {
                0 => {
                    warn!("Ignoring skill update on a character without levels");
                    Resolution::new("No level to update")
                }
                latest => self.resolve_level_skills(character, latest, &skills, None),
            },
            Command::UpdateLevelSkills {
                level,
                skills,
                remaining_points,
            } => self.resolve_level_skills(character, level, &skills, Some(remaining_points)),
            Command::AddFeatToLevel { level, feat_id } => {
                self.resolve_add_feat(character, level, feat_id)
            }
            Command::RemoveFeatFromLevel { level, feat_id } => {
                self.resolve_remove_feat(character, level, feat_id)
            }
            Command::UpdateLevelFeats { level, feats } => {
                self.resolve_update_level_feats(character, level, feats)
            }
            Command::AddMissingAutomaticFeats => self.resolve_missing_automatic_feats(character),
            Command::SetAlignment { alignment } => {
                if character.alignment == alignment {
                    Resolution::new("Alignment unchanged")
                } else {
                    Resolution::new("Alignment changed")
                        .with_effect(Effect::AlignmentChanged { alignment })
                }
            }
            Command::ResetCharacter => {
                return Resolution::new("Character reset").with_effect(Effect::CharacterReset);
            }
            Command::SetValidation { result } => {
                return Resolution::new("Validation stored")
                    .with_effect(Effect::ValidationStored { result });
            }
        };

        if resolution.is_noop() {
            resolution
        } else {
            resolution.with_effect(Effect::Touched { at: Utc::now() })
        }
    }

    fn resolve_create(&self, name: &str, race_id: &str) -> Resolution {
        let character = Character::with_identity(name, race_id, CharacterId::new(), Utc::now());
        Resolution::new(format!("Created {}", name)).with_effect(Effect::CharacterCreated {
            character: Box::new(character),
        })
    }

    fn resolve_update_attributes(&self, character: &Character, patch: &AttributePatch) -> Resolution {
        let attributes = patch.apply_to(&character.base_attributes);
        if attributes == character.base_attributes {
            return Resolution::new("Attributes unchanged");
        }
        Resolution::new("Attributes updated").with_effect(Effect::AttributesChanged { attributes })
    }

    fn resolve_update_race(&self, character: &Character, race_id: RaceId) -> Resolution {
        if character.race_id == race_id {
            return Resolution::new("Race unchanged");
        }
        if self.catalog.race(&race_id).is_none() {
            warn!(race_id = %race_id, "Race not found in catalog");
        }

        let mut next = character.clone();
        next.race_id = race_id.clone();
        let racial = missing_racial_feats(&next, &self.catalog);

        let mut resolution =
            Resolution::new(format!("Race changed to {}", race_id)).with_effect(Effect::RaceChanged { race_id });
        if !racial.is_empty() {
            resolution = resolution.with_effect(Effect::AutomaticFeatsGranted { feats: racial });
        }
        resolution
    }

    fn resolve_add_level(&self, character: &Character, class_id: ClassId, hit_points: i32) -> Resolution {
        if character.total_level >= self.config.max_level {
            warn!(
                max_level = self.config.max_level,
                "Ignoring level beyond the maximum"
            );
            return Resolution::new("Maximum level reached");
        }
        let Some(class) = self.catalog.class(&class_id) else {
            warn!(class_id = %class_id, "Ignoring level in a class missing from the catalog");
            return Resolution::new(format!("Unknown class {}", class_id));
        };

        let level = character.total_level + 1;
        let mut entry = LevelEntry::new(level, class_id, hit_points.clamp(1, class.hit_die.sides()));
        if LevelEntry::grants_attribute_increase(level) {
            entry.attribute_increase = Some(Attribute::Strength);
        }

        let mut next = character.clone();
        next.push_level(entry.clone());
        if let Ok(points) = skill_points_for_level(&next, level, &self.catalog) {
            entry.unspent_skill_points = points.total_points;
            if let Some(added) = next.level_mut(level) {
                added.unspent_skill_points = points.total_points;
            }
        }

        let mut granted = missing_automatic_feats(&next, &self.catalog);
        granted.extend(missing_racial_feats(&next, &self.catalog));

        let mut resolution = Resolution::new(format!("Level {} in {}", level, class.name))
            .with_effect(Effect::LevelAdded { entry });
        if !granted.is_empty() {
            resolution = resolution.with_effect(Effect::AutomaticFeatsGranted { feats: granted });
        }
        resolution
    }

    fn resolve_attribute_increase(&self, character: &Character, level: u8, attribute: Attribute) -> Resolution {
        match character.level(level) {
            Some(entry) if LevelEntry::grants_attribute_increase(level) => {
                if entry.attribute_increase == Some(attribute) {
                    Resolution::new("Attribute increase unchanged")
                } else {
                    Resolution::new(format!("Level {} raises {}", level, attribute))
                        .with_effect(Effect::AttributeIncreaseSet { level, attribute })
                }
            }
            _ => {
                warn!(level, "Ignoring attribute increase on an ineligible level");
                Resolution::new("Level does not grant an attribute increase")
            }
        }
    }

    fn resolve_level_skills(
        &self,
        character: &Character,
        level: u8,
        skills: &BTreeMap<SkillId, i32>,
        remaining_points: Option<i32>,
    ) -> Resolution {
        let Some(entry) = character.level(level) else {
            warn!(level, "Ignoring skill update on a missing level");
            return Resolution::new(format!("Level {} not found", level));
        };
        if let Some((skill, value)) = skills.iter().find(|(_, v)| **v < 0) {
            warn!(level, skill = %skill, ranks = *value, "Ignoring negative skill ranks");
            return Resolution::new(format!("Negative ranks for {} rejected", skill));
        }

        let mut ranks = entry.skill_ranks_this_level.clone();
        ranks.extend(skills.iter().map(|(k, v)| (k.clone(), *v)));

        let unspent = match remaining_points {
            Some(points) => points.max(0),
            None => {
                let mut next = character.clone();
                if let Some(target) = next.level_mut(level) {
                    target.skill_ranks_this_level = ranks.clone();
                }
                skill_points_for_level(&next, level, &self.catalog)
                    .map(|p| p.remaining_points.max(0))
                    .unwrap_or(entry.unspent_skill_points)
            }
        };

        if ranks == entry.skill_ranks_this_level && unspent == entry.unspent_skill_points {
            return Resolution::new("Skills unchanged");
        }
        Resolution::new(format!("Skills updated at level {}", level)).with_effect(
            Effect::LevelSkillsChanged {
                level,
                ranks,
                unspent_skill_points: unspent,
            },
        )
    }

    fn resolve_add_feat(&self, character: &Character, level: u8, feat_id: FeatId) -> Resolution {
        match character.level(level) {
            None => {
                warn!(level, "Ignoring feat on a missing level");
                Resolution::new(format!("Level {} not found", level))
            }
            Some(entry) if entry.chosen_feats.contains(&feat_id) => {
                Resolution::new("Feat already chosen at this level")
            }
            Some(_) => Resolution::new(format!("Added {} at level {}", feat_id, level))
                .with_effect(Effect::FeatAdded { level, feat_id }),
        }
    }

    fn resolve_remove_feat(&self, character: &Character, level: u8, feat_id: FeatId) -> Resolution {
        match character.level(level) {
            Some(entry) if entry.chosen_feats.contains(&feat_id) => {
                Resolution::new(format!("Removed {} from level {}", feat_id, level))
                    .with_effect(Effect::FeatRemoved { level, feat_id })
            }
            _ => Resolution::new("Feat not chosen at this level"),
        }
    }

    fn resolve_update_level_feats(&self, character: &Character, level: u8, feats: BTreeSet<FeatId>) -> Resolution {
        match character.level(level) {
            None => {
                warn!(level, "Ignoring feat update on a missing level");
                Resolution::new(format!("Level {} not found", level))
            }
            Some(entry) if entry.chosen_feats == feats => Resolution::new("Feats unchanged"),
            Some(_) => Resolution::new(format!("Feats replaced at level {}", level))
                .with_effect(Effect::LevelFeatsReplaced { level, feats }),
        }
    }

    fn resolve_missing_automatic_feats(&self, character: &Character) -> Resolution {
        if character.level(1).is_none() {
            return Resolution::new("No first level");
        }
        let missing = missing_automatic_feats(character, &self.catalog);
        if missing.is_empty() {
            return Resolution::new("Automatic feats up to date");
        }
        Resolution::new(format!("Granted {} automatic feats", missing.len()))
            .with_effect(Effect::AutomaticFeatsGranted { feats: missing })
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Effect application
// ============================================================================

/// Apply a list of effects in order.
pub fn apply_effects(state: &mut BuilderState, effects: &[Effect]) {
    for effect in effects {
        apply_effect(state, effect);
    }
}

/// Apply a single effect.
pub fn apply_effect(state: &mut BuilderState, effect: &Effect) {
    match effect {
        Effect::CharacterCreated { character } => {
            state.character = Some(character.as_ref().clone());
            state.validation = None;
            state.is_modified = true;
            return;
        }
        Effect::CharacterLoaded { character } => {
            state.character = Some(character.as_ref().clone());
            state.validation = None;
            state.is_modified = false;
            return;
        }
        Effect::CharacterReset => {
            *state = BuilderState::new();
            return;
        }
        Effect::ValidationStored { result } => {
            state.validation = Some(result.clone());
            return;
        }
        _ => {}
    }

    let Some(character) = state.character.as_mut() else {
        return;
    };

    match effect {
        Effect::AttributesChanged { attributes } => {
            character.base_attributes = *attributes;
        }
        Effect::RaceChanged { race_id } => {
            character.race_id = race_id.clone();
        }
        Effect::LevelAdded { entry } => {
            character.push_level(entry.clone());
        }
        Effect::AttributeIncreaseSet { level, attribute } => {
            if let Some(entry) = character.level_mut(*level) {
                entry.attribute_increase = Some(*attribute);
            }
        }
        Effect::LevelSkillsChanged {
            level,
            ranks,
            unspent_skill_points,
        } => {
            if let Some(entry) = character.level_mut(*level) {
                entry.skill_ranks_this_level = ranks.clone();
                entry.unspent_skill_points = *unspent_skill_points;
            }
            character.recompute_skill_ranks();
        }
        Effect::FeatAdded { level, feat_id } => {
            if let Some(entry) = character.level_mut(*level) {
                entry.add_feat(feat_id.clone());
            }
        }
        Effect::FeatRemoved { level, feat_id } => {
            if let Some(entry) = character.level_mut(*level) {
                entry.remove_feat(feat_id);
            }
        }
        Effect::LevelFeatsReplaced { level, feats } => {
            if let Some(entry) = character.level_mut(*level) {
                entry.chosen_feats = feats.clone();
            }
        }
        Effect::AutomaticFeatsGranted { feats } => {
            if let Some(first) = character.level_mut(1) {
                first.automatic_feats.extend(feats.iter().cloned());
            }
        }
        Effect::AlignmentChanged { alignment } => {
            character.alignment = alignment.clone();
        }
        Effect::Touched { at } => {
            character.touch(*at);
        }
        Effect::CharacterCreated { .. }
        | Effect::CharacterLoaded { .. }
        | Effect::CharacterReset
        | Effect::ValidationStored { .. } => {}
    }

    if effect.marks_modified() {
        state.is_modified = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> RulesEngine {
        RulesEngine::standard()
    }

    fn created(engine: &RulesEngine, race: &str) -> BuilderState {
        engine.dispatch(
            &BuilderState::new(),
            Command::CreateCharacter {
                name: "Test".to_string(),
                race_id: race.to_string(),
            },
        )
    }

    fn add_level(engine: &RulesEngine, state: &BuilderState, class: &str) -> BuilderState {
        engine.dispatch(
            state,
            Command::AddLevel {
                class_id: class.to_string(),
                hit_points_gained: 100,
            },
        )
    }

    fn character(state: &BuilderState) -> &Character {
        state.character.as_ref().unwrap()
    }

    #[test]
    fn test_create_character() {
        let engine = engine();
        let state = created(&engine, "human");
        assert_eq!(state.phase(), Phase::Active);
        assert!(state.is_modified);
        let c = character(&state);
        assert_eq!(c.total_level, 0);
        assert_eq!(c.base_attributes, Attributes::uniform(10));
    }

    #[test]
    fn test_commands_without_character_are_noops() {
        let engine = engine();
        let state = BuilderState::new();
        let next = add_level(&engine, &state, "fighter");
        assert_eq!(next, state);
        let next = engine.dispatch(&state, Command::SetAlignment { alignment: Some("neutral".into()) });
        assert_eq!(next.phase(), Phase::Uninitialized);
    }

    #[test]
    fn test_add_level_clamps_hit_points_and_grants_feats() {
        let engine = engine();
        let state = add_level(&engine, &created(&engine, "elf"), "fighter");
        let c = character(&state);
        let first = c.level(1).unwrap();
        assert_eq!(first.hit_points_gained, 10);
        assert!(first.automatic_feats.contains("martial_weapon_proficiency"));
        assert!(first.automatic_feats.contains("keen_sense"));
        // elf fighter: max(1, 2 + 0) * 4
        assert_eq!(first.unspent_skill_points, 8);

        let low = engine.dispatch(
            &state,
            Command::AddLevel {
                class_id: "fighter".to_string(),
                hit_points_gained: -3,
            },
        );
        assert_eq!(character(&low).level(2).unwrap().hit_points_gained, 1);
    }

    #[test]
    fn test_add_level_unknown_class_is_noop() {
        let engine = engine();
        let state = created(&engine, "human");
        let next = add_level(&engine, &state, "mystic");
        assert_eq!(next, state);
    }

    #[test]
    fn test_fourth_level_gets_placeholder_increase() {
        let engine = engine();
        let mut state = created(&engine, "human");
        for _ in 0..4 {
            state = add_level(&engine, &state, "rogue");
        }
        let c = character(&state);
        assert_eq!(c.level(4).unwrap().attribute_increase, Some(Attribute::Strength));
        assert_eq!(c.level(3).unwrap().attribute_increase, None);

        let state = engine.dispatch(
            &state,
            Command::SetAttributeIncrease {
                level: 4,
                attribute: Attribute::Dexterity,
            },
        );
        assert_eq!(
            character(&state).level(4).unwrap().attribute_increase,
            Some(Attribute::Dexterity)
        );

        let unchanged = engine.dispatch(
            &state,
            Command::SetAttributeIncrease {
                level: 3,
                attribute: Attribute::Dexterity,
            },
        );
        assert_eq!(unchanged, state);
    }

    #[test]
    fn test_level_cap() {
        let engine = RulesEngine::new(Catalog::standard(), EngineConfig::default().with_max_level(2));
        let mut state = created(&engine, "human");
        for _ in 0..3 {
            state = add_level(&engine, &state, "fighter");
        }
        assert_eq!(character(&state).total_level, 2);
    }

    #[test]
    fn test_update_skills_targets_latest_level() {
        let engine = engine();
        let mut state = created(&engine, "human");
        state = add_level(&engine, &state, "rogue");
        state = add_level(&engine, &state, "rogue");

        let skills: BTreeMap<SkillId, i32> = [("hide".to_string(), 1), ("lore".to_string(), 2)]
            .into_iter()
            .collect();
        state = engine.dispatch(&state, Command::UpdateSkills { skills });

        let c = character(&state);
        let second = c.level(2).unwrap();
        assert_eq!(second.skill_ranks_this_level.get("hide"), Some(&1));
        // human rogue, Int 10: 8 + 0 + 1 = 9, 3 spent
        assert_eq!(second.unspent_skill_points, 6);
        assert_eq!(c.skill_ranks.get("lore"), Some(&2));
        assert!(c.level(1).unwrap().skill_ranks_this_level.is_empty());
    }

    #[test]
    fn test_update_level_skills_clamps_remaining() {
        let engine = engine();
        let mut state = created(&engine, "human");
        state = add_level(&engine, &state, "rogue");
        let skills: BTreeMap<SkillId, i32> = [("hide".to_string(), 4)].into_iter().collect();
        state = engine.dispatch(
            &state,
            Command::UpdateLevelSkills {
                level: 1,
                skills,
                remaining_points: -5,
            },
        );
        let c = character(&state);
        assert_eq!(c.level(1).unwrap().unspent_skill_points, 0);
        assert_eq!(c.skill_ranks.get("hide"), Some(&4));
    }

    #[test]
    fn test_negative_skill_ranks_rejected() {
        let engine = engine();
        let mut state = created(&engine, "human");
        state = add_level(&engine, &state, "rogue");
        let hide: BTreeMap<SkillId, i32> = [("hide".to_string(), 4)].into_iter().collect();
        state = engine.dispatch(&state, Command::UpdateSkills { skills: hide });

        let negative: BTreeMap<SkillId, i32> = [("hide".to_string(), -2)].into_iter().collect();
        let resolution = engine.resolve(
            &state,
            Command::UpdateSkills {
                skills: negative.clone(),
            },
        );
        assert!(resolution.is_noop());
        assert!(resolution.note.contains("rejected"));

        let after = engine.dispatch(
            &state,
            Command::UpdateLevelSkills {
                level: 1,
                skills: negative,
                remaining_points: 10,
            },
        );
        assert_eq!(after, state);
        assert_eq!(character(&after).skill_ranks.get("hide"), Some(&4));
    }

    #[test]
    fn test_feat_edits() {
        let engine = engine();
        let mut state = add_level(&engine, &created(&engine, "human"), "fighter");

        state = engine.dispatch(
            &state,
            Command::AddFeatToLevel {
                level: 1,
                feat_id: "alertness".to_string(),
            },
        );
        assert!(character(&state).level(1).unwrap().chosen_feats.contains("alertness"));

        let same = engine.dispatch(
            &state,
            Command::RemoveFeatFromLevel {
                level: 1,
                feat_id: "dodge".to_string(),
            },
        );
        assert_eq!(same, state);

        let feats: BTreeSet<FeatId> = ["dodge".to_string(), "toughness".to_string()].into_iter().collect();
        state = engine.dispatch(&state, Command::UpdateLevelFeats { level: 1, feats: feats.clone() });
        assert_eq!(character(&state).level(1).unwrap().chosen_feats, feats);

        let out_of_range = engine.dispatch(
            &state,
            Command::AddFeatToLevel {
                level: 9,
                feat_id: "dodge".to_string(),
            },
        );
        assert_eq!(out_of_range, state);
    }

    #[test]
    fn test_race_change_keeps_old_racial_feats() {
        let engine = engine();
        let mut state = add_level(&engine, &created(&engine, "elf"), "wizard");
        state = engine.dispatch(&state, Command::UpdateRace { race_id: "dwarf".to_string() });
        let first = character(&state).level(1).unwrap();
        assert!(first.automatic_feats.contains("keen_sense"));
        assert!(first.automatic_feats.contains("darkvision"));
        assert_eq!(character(&state).race_id, "dwarf");
    }

    #[test]
    fn test_missing_automatic_feats_command_is_idempotent() {
        let engine = engine();
        let mut state = add_level(&engine, &created(&engine, "human"), "fighter");
        state.character.as_mut().unwrap().levels[0].automatic_feats.clear();

        let once = engine.dispatch(&state, Command::AddMissingAutomaticFeats);
        assert!(!character(&once).level(1).unwrap().automatic_feats.is_empty());
        let twice = engine.dispatch(&once, Command::AddMissingAutomaticFeats);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_load_and_reset() {
        let engine = engine();
        let state = add_level(&engine, &created(&engine, "human"), "fighter");
        let saved = character(&state).clone();

        let loaded = engine.dispatch(
            &BuilderState::new(),
            Command::LoadCharacter {
                character: Box::new(saved.clone()),
            },
        );
        assert!(!loaded.is_modified);
        assert_eq!(character(&loaded), &saved);

        let reset = engine.dispatch(&loaded, Command::ResetCharacter);
        assert_eq!(reset, BuilderState::new());
    }

    #[test]
    fn test_validation_is_stored_not_implicit() {
        let engine = engine();
        let mut state = created(&engine, "human");
        let patch = AttributePatch::new().set(Attribute::Strength, 25);
        state = engine.dispatch(&state, Command::UpdateAttributes { patch });
        assert!(state.validation.is_none());

        let result = engine.validate(&state).unwrap();
        assert!(!result.valid);
        let state = engine.dispatch(&state, Command::SetValidation { result: result.clone() });
        assert_eq!(state.validation, Some(result));
    }

    #[test]
    fn test_mutations_touch_modified_at() {
        let engine = engine();
        let state = created(&engine, "human");
        let created_at = character(&state).modified_at;
        let next = add_level(&engine, &state, "fighter");
        assert!(character(&next).modified_at >= created_at);
        assert!(next.is_modified);
    }

    #[test]
    fn test_replaying_effects_is_deterministic() {
        let engine = engine();
        let state = created(&engine, "human");
        let resolution = engine.resolve(
            &state,
            Command::AddLevel {
                class_id: "bard".to_string(),
                hit_points_gained: 4,
            },
        );
        let mut a = state.clone();
        let mut b = state.clone();
        apply_effects(&mut a, &resolution.effects);
        apply_effects(&mut b, &resolution.effects);
        assert_eq!(a, b);
    }
}

//! CharacterSession - the public API a character builder UI talks to.
//!
//! It wraps the rules engine, the current builder state and a character
//! store into one handle. Edits always go through; only saving and the
//! checked level-up refuse to proceed on failed rules.

use crate::attributes::{final_attributes, remaining_points};
use crate::catalog::{Catalog, ClassId, FeatId, SkillId};
use crate::character::{Attribute, AttributePatch, Attributes, Character, CharacterId, ValidationResult};
use crate::error::RulesError;
use crate::feats::{available_feats_for_slot, feat_slots, feat_stats, FeatSlot, FeatStats};
use crate::persist::{CharacterStore, CharacterSummary, MemoryStore, PersistError};
use crate::progression::{base_attack_bonus, saving_throws, total_hit_points, SavingThrows};
use crate::requirements::{check_class_requirements, qualifying_classes, ClassQualification};
use crate::rules::{apply_effects, BuilderState, Command, Resolution, RulesEngine};
use crate::skills::{skill_points_for_level, skill_summary, SkillPointsInfo, SkillSummaryEntry};
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors from CharacterSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No character is loaded")]
    NoCharacter,

    #[error("Character is invalid: {}", .0.errors.join("; "))]
    Invalid(ValidationResult),

    #[error("Requirements for {class_id} not met: {}", .missing.join(", "))]
    RequirementsNotMet { class_id: ClassId, missing: Vec<String> },

    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),
}

/// A character building session.
pub struct CharacterSession {
    engine: RulesEngine,
    state: BuilderState,
    store: Arc<dyn CharacterStore>,
}

impl CharacterSession {
    pub fn new(engine: RulesEngine, store: Arc<dyn CharacterStore>) -> Self {
        Self {
            engine,
            state: BuilderState::new(),
            store,
        }
    }

    /// Standard catalog and an in-memory store.
    pub fn in_memory() -> Self {
        Self::new(RulesEngine::standard(), Arc::new(MemoryStore::new()))
    }

    pub fn engine(&self) -> &RulesEngine {
        &self.engine
    }

    pub fn catalog(&self) -> &Catalog {
        self.engine.catalog()
    }

    pub fn state(&self) -> &BuilderState {
        &self.state
    }

    pub fn character(&self) -> Option<&Character> {
        self.state.character.as_ref()
    }

    pub fn is_modified(&self) -> bool {
        self.state.is_modified
    }

    fn require_character(&self) -> Result<&Character, SessionError> {
        self.character().ok_or(SessionError::NoCharacter)
    }

    /// Resolve and apply a command.
    pub fn apply(&mut self, command: Command) -> Resolution {
        let resolution = self.engine.resolve(&self.state, command);
        apply_effects(&mut self.state, &resolution.effects);
        debug!(effects = resolution.effects.len(), note = %resolution.note, "Applied command");
        resolution
    }

    // ========================================================================
    // Edits
    // ========================================================================

    pub fn create_character(&mut self, name: impl Into<String>, race_id: impl Into<String>) -> Resolution {
        self.apply(Command::CreateCharacter {
            name: name.into(),
            race_id: race_id.into(),
        })
    }

    pub fn update_attributes(&mut self, patch: AttributePatch) -> Resolution {
        self.apply(Command::UpdateAttributes { patch })
    }

    pub fn update_race(&mut self, race_id: impl Into<String>) -> Resolution {
        self.apply(Command::UpdateRace {
            race_id: race_id.into(),
        })
    }

    pub fn add_level(&mut self, class_id: impl Into<ClassId>, hit_points_gained: i32) -> Resolution {
        self.apply(Command::AddLevel {
            class_id: class_id.into(),
            hit_points_gained,
        })
    }

    /// Add a level only if the character qualifies for the class.
    pub fn add_level_checked(
        &mut self,
        class_id: impl Into<ClassId>,
        hit_points_gained: i32,
    ) -> Result<Resolution, SessionError> {
        let class_id = class_id.into();
        let character = self.require_character()?;
        let class = self
            .catalog()
            .class(&class_id)
            .ok_or_else(|| RulesError::UnknownClass(class_id.clone()))?;

        let qualification = check_class_requirements(character, class, self.catalog());
        if !qualification.can_take {
            return Err(SessionError::RequirementsNotMet {
                class_id,
                missing: qualification.missing_requirements,
            });
        }
        Ok(self.add_level(class_id, hit_points_gained))
    }

    /// Checked level-up with hit points rolled on the class hit die.
    pub fn add_level_rolled<R: Rng>(
        &mut self,
        class_id: impl Into<ClassId>,
        rng: &mut R,
    ) -> Result<Resolution, SessionError> {
        let class_id = class_id.into();
        let hit_points = self
            .catalog()
            .class(&class_id)
            .map(|c| c.hit_die.roll_with_rng(rng))
            .ok_or_else(|| RulesError::UnknownClass(class_id.clone()))?;
        self.add_level_checked(class_id, hit_points)
    }

    pub fn set_attribute_increase(&mut self, level: u8, attribute: Attribute) -> Resolution {
        self.apply(Command::SetAttributeIncrease { level, attribute })
    }

    pub fn update_skills(&mut self, skills: BTreeMap<SkillId, i32>) -> Resolution {
        self.apply(Command::UpdateSkills { skills })
    }

    pub fn update_level_skills(
        &mut self,
        level: u8,
        skills: BTreeMap<SkillId, i32>,
        remaining_points: i32,
    ) -> Resolution {
        self.apply(Command::UpdateLevelSkills {
            level,
            skills,
            remaining_points,
        })
    }

    pub fn add_feat(&mut self, level: u8, feat_id: impl Into<FeatId>) -> Resolution {
        self.apply(Command::AddFeatToLevel {
            level,
            feat_id: feat_id.into(),
        })
    }

    pub fn remove_feat(&mut self, level: u8, feat_id: impl Into<FeatId>) -> Resolution {
        self.apply(Command::RemoveFeatFromLevel {
            level,
            feat_id: feat_id.into(),
        })
    }

    pub fn update_level_feats(&mut self, level: u8, feats: BTreeSet<FeatId>) -> Resolution {
        self.apply(Command::UpdateLevelFeats { level, feats })
    }

    pub fn add_missing_automatic_feats(&mut self) -> Resolution {
        self.apply(Command::AddMissingAutomaticFeats)
    }

    pub fn set_alignment(&mut self, alignment: Option<String>) -> Resolution {
        self.apply(Command::SetAlignment { alignment })
    }

    pub fn reset(&mut self) -> Resolution {
        self.apply(Command::ResetCharacter)
    }

    /// Run validation and store the result in the state.
    pub fn validate(&mut self) -> Option<ValidationResult> {
        let result = self.engine.validate(&self.state)?;
        self.apply(Command::SetValidation { result: result.clone() });
        Some(result)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn final_attributes(&self) -> Result<Attributes, SessionError> {
        Ok(final_attributes(self.require_character()?, self.catalog()))
    }

    pub fn remaining_attribute_points(&self) -> Result<i32, SessionError> {
        let character = self.require_character()?;
        Ok(remaining_points(
            &character.base_attributes,
            self.engine.config().point_buy_budget,
        ))
    }

    pub fn skill_points(&self, level: u8) -> Result<SkillPointsInfo, SessionError> {
        Ok(skill_points_for_level(self.require_character()?, level, self.catalog())?)
    }

    pub fn skill_summary(&self) -> Result<Vec<SkillSummaryEntry>, SessionError> {
        Ok(skill_summary(self.require_character()?, self.catalog()))
    }

    pub fn feat_slots(&self) -> Result<Vec<FeatSlot>, SessionError> {
        Ok(feat_slots(self.require_character()?, self.catalog()))
    }

    pub fn feat_stats(&self) -> Result<FeatStats, SessionError> {
        Ok(feat_stats(self.require_character()?, self.catalog()))
    }

    /// Ids of feats the character can put in a slot.
    pub fn available_feats(&self, slot: &FeatSlot) -> Result<Vec<FeatId>, SessionError> {
        let character = self.require_character()?;
        Ok(
            available_feats_for_slot(character, slot, self.catalog(), self.engine.config())
                .into_iter()
                .map(|f| f.id.clone())
                .collect(),
        )
    }

    pub fn qualifying_classes(&self) -> Result<BTreeMap<ClassId, ClassQualification>, SessionError> {
        Ok(qualifying_classes(self.require_character()?, self.catalog()))
    }

    pub fn base_attack_bonus(&self) -> Result<i32, SessionError> {
        Ok(base_attack_bonus(self.require_character()?, self.catalog()))
    }

    pub fn hit_points(&self) -> Result<i32, SessionError> {
        Ok(total_hit_points(self.require_character()?, self.catalog()))
    }

    pub fn saving_throws(&self) -> Result<SavingThrows, SessionError> {
        Ok(saving_throws(self.require_character()?, self.catalog()))
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Validate, then save the current character.
    pub async fn save(&mut self) -> Result<(), SessionError> {
        let result = self.validate().ok_or(SessionError::NoCharacter)?;
        if !result.valid {
            return Err(SessionError::Invalid(result));
        }
        let character = self.require_character()?;
        self.store.save(character).await?;
        self.state.is_modified = false;
        Ok(())
    }

    /// Load a stored character into the session.
    pub async fn load(&mut self, id: &CharacterId) -> Result<Resolution, SessionError> {
        let character = self.store.load(id).await?;
        Ok(self.apply(Command::LoadCharacter {
            character: Box::new(character),
        }))
    }

    pub async fn list(&self) -> Result<Vec<CharacterSummary>, SessionError> {
        Ok(self.store.list().await?)
    }

    pub async fn delete(&self, id: &CharacterId) -> Result<(), SessionError> {
        Ok(self.store.delete(id).await?)
    }
}

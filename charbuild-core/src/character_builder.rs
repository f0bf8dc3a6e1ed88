//! Fluent character builder.
//!
//! Collects a name, race, point-buy scores and a level plan, then replays it
//! through the [`RulesEngine`] so the result is exactly what the command
//! sequence would produce interactively. Feats are checked as they are
//! placed and the finished character must validate.

use crate::catalog::{ClassId, FeatId, RaceId, SkillId};
use crate::character::{Attribute, AttributePatch, Attributes, Character, ValidationResult};
use crate::feats::can_select_feat;
use crate::rules::{apply_effects, BuilderState, Command, Resolution, RulesEngine};
use std::collections::BTreeMap;
use thiserror::Error;

/// Error from character building.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("Character name is required")]
    MissingName,

    #[error("Race selection is required")]
    MissingRace,

    #[error("Race {0} is not in the catalog")]
    UnknownRace(RaceId),

    #[error("Class {0} is not in the catalog")]
    UnknownClass(ClassId),

    #[error("Feat {0} is not in the catalog")]
    UnknownFeat(FeatId),

    #[error("Level {level} in {class_id} was rejected: {note}")]
    LevelRejected { level: u8, class_id: ClassId, note: String },

    #[error("Level {level}: cannot take {feat_id} ({})", .reasons.join(", "))]
    FeatRejected {
        level: u8,
        feat_id: FeatId,
        reasons: Vec<String>,
    },

    #[error("Character is invalid: {}", .0.errors.join("; "))]
    Invalid(ValidationResult),
}

/// One planned level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLevel {
    pub class_id: ClassId,
    /// `None` takes the hit die maximum.
    pub hit_points: Option<i32>,
    pub attribute_increase: Option<Attribute>,
    pub skills: BTreeMap<SkillId, i32>,
    pub feats: Vec<FeatId>,
}

impl PlannedLevel {
    pub fn new(class_id: impl Into<ClassId>) -> Self {
        Self {
            class_id: class_id.into(),
            hit_points: None,
            attribute_increase: None,
            skills: BTreeMap::new(),
            feats: Vec::new(),
        }
    }
}

/// Builder for characters.
#[derive(Debug, Clone, Default)]
pub struct CharacterBuilder {
    name: Option<String>,
    race_id: Option<RaceId>,
    attributes: AttributePatch,
    alignment: Option<String>,
    description: Option<String>,
    levels: Vec<PlannedLevel>,
}

impl CharacterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn race(mut self, race_id: impl Into<RaceId>) -> Self {
        self.race_id = Some(race_id.into());
        self
    }

    /// Set every base attribute.
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = AttributePatch::from_attributes(&attributes);
        self
    }

    /// Set one base attribute; the rest stay at 10.
    pub fn attribute(mut self, attribute: Attribute, value: i32) -> Self {
        self.attributes = self.attributes.set(attribute, value);
        self
    }

    pub fn alignment(mut self, alignment: impl Into<String>) -> Self {
        self.alignment = Some(alignment.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Plan a level at maximum hit points.
    pub fn level(mut self, class_id: impl Into<ClassId>) -> Self {
        self.levels.push(PlannedLevel::new(class_id));
        self
    }

    /// Plan a level with explicit hit points.
    pub fn level_with_hp(mut self, class_id: impl Into<ClassId>, hit_points: i32) -> Self {
        let mut planned = PlannedLevel::new(class_id);
        planned.hit_points = Some(hit_points);
        self.levels.push(planned);
        self
    }

    /// Plan several levels at maximum hit points.
    pub fn levels(mut self, class_id: &str, count: u8) -> Self {
        for _ in 0..count {
            self.levels.push(PlannedLevel::new(class_id));
        }
        self
    }

    /// Add a feat to the most recently planned level.
    pub fn feat(mut self, feat_id: impl Into<FeatId>) -> Self {
        if let Some(last) = self.levels.last_mut() {
            last.feats.push(feat_id.into());
        }
        self
    }

    /// Put ranks into a skill at the most recently planned level.
    pub fn skill(mut self, skill_id: impl Into<SkillId>, ranks: i32) -> Self {
        if let Some(last) = self.levels.last_mut() {
            last.skills.insert(skill_id.into(), ranks);
        }
        self
    }

    /// Pick the attribute raised at the most recently planned level.
    pub fn attribute_increase(mut self, attribute: Attribute) -> Self {
        if let Some(last) = self.levels.last_mut() {
            last.attribute_increase = Some(attribute);
        }
        self
    }

    pub fn planned_levels(&self) -> &[PlannedLevel] {
        &self.levels
    }

    /// Replay the plan through the engine.
    pub fn build(self, engine: &RulesEngine) -> Result<Character, BuilderError> {
        let name = self.name.ok_or(BuilderError::MissingName)?;
        let race_id = self.race_id.ok_or(BuilderError::MissingRace)?;
        if engine.catalog().race(&race_id).is_none() {
            return Err(BuilderError::UnknownRace(race_id));
        }

        let mut state = BuilderState::new();
        run(engine, &mut state, Command::CreateCharacter { name, race_id });
        run(
            engine,
            &mut state,
            Command::UpdateAttributes {
                patch: self.attributes,
            },
        );
        if self.alignment.is_some() {
            run(
                engine,
                &mut state,
                Command::SetAlignment {
                    alignment: self.alignment,
                },
            );
        }

        for (index, planned) in self.levels.into_iter().enumerate() {
            let level = index as u8 + 1;
            if engine.catalog().class(&planned.class_id).is_none() {
                return Err(BuilderError::UnknownClass(planned.class_id));
            }

            let resolution = run(
                engine,
                &mut state,
                Command::AddLevel {
                    class_id: planned.class_id.clone(),
                    hit_points_gained: planned.hit_points.unwrap_or(i32::MAX),
                },
            );
            if resolution.is_noop() {
                return Err(BuilderError::LevelRejected {
                    level,
                    class_id: planned.class_id,
                    note: resolution.note,
                });
            }

            if let Some(attribute) = planned.attribute_increase {
                run(engine, &mut state, Command::SetAttributeIncrease { level, attribute });
            }
            if !planned.skills.is_empty() {
                run(
                    engine,
                    &mut state,
                    Command::UpdateSkills {
                        skills: planned.skills,
                    },
                );
            }
            for feat_id in planned.feats {
                check_feat(engine, &state, level, &feat_id)?;
                run(engine, &mut state, Command::AddFeatToLevel { level, feat_id });
            }
        }

        if let Some(result) = engine.validate(&state) {
            if !result.valid {
                return Err(BuilderError::Invalid(result));
            }
        }

        let mut character = state.character.ok_or(BuilderError::MissingName)?;
        character.description = self.description;
        Ok(character)
    }
}

fn run(engine: &RulesEngine, state: &mut BuilderState, command: Command) -> Resolution {
    let resolution = engine.resolve(state, command);
    apply_effects(state, &resolution.effects);
    resolution
}

fn check_feat(engine: &RulesEngine, state: &BuilderState, level: u8, feat_id: &str) -> Result<(), BuilderError> {
    let feat = engine
        .catalog()
        .feat(feat_id)
        .ok_or_else(|| BuilderError::UnknownFeat(feat_id.to_string()))?;
    let Some(character) = state.character.as_ref() else {
        return Err(BuilderError::MissingName);
    };
    let eligibility = can_select_feat(character, feat, engine.catalog(), engine.config());
    if eligibility.can_select {
        Ok(())
    } else {
        Err(BuilderError::FeatRejected {
            level,
            feat_id: feat_id.to_string(),
            reasons: eligibility.reasons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::base_attack_bonus;

    #[test]
    fn test_build_fighter() {
        let engine = RulesEngine::standard();
        let character = CharacterBuilder::new()
            .name("Brom")
            .race("dwarf")
            .attribute(Attribute::Strength, 16)
            .attribute(Attribute::Constitution, 14)
            .alignment("lawful neutral")
            .level("fighter")
            .feat("power_attack")
            .feat("cleave")
            .skill("discipline", 4)
            .levels("fighter", 3)
            .attribute_increase(Attribute::Strength)
            .description("A stubborn shieldbearer.")
            .build(&engine)
            .expect("Build should succeed");

        assert_eq!(character.total_level, 4);
        assert_eq!(character.level(1).unwrap().hit_points_gained, 10);
        assert!(character.level(1).unwrap().chosen_feats.contains("cleave"));
        assert_eq!(character.skill_ranks.get("discipline"), Some(&4));
        assert_eq!(character.level(4).unwrap().attribute_increase, Some(Attribute::Strength));
        assert_eq!(character.alignment.as_deref(), Some("lawful neutral"));
        assert_eq!(character.description.as_deref(), Some("A stubborn shieldbearer."));
        assert_eq!(base_attack_bonus(&character, engine.catalog()), 4);
    }

    #[test]
    fn test_missing_name_error() {
        let engine = RulesEngine::standard();
        let result = CharacterBuilder::new().race("human").level("fighter").build(&engine);
        assert_eq!(result.unwrap_err(), BuilderError::MissingName);
    }

    #[test]
    fn test_unknown_class_error() {
        let engine = RulesEngine::standard();
        let result = CharacterBuilder::new()
            .name("Nobody")
            .race("human")
            .level("mystic")
            .build(&engine);
        assert_eq!(result.unwrap_err(), BuilderError::UnknownClass("mystic".to_string()));
    }

    #[test]
    fn test_feat_prerequisites_enforced() {
        let engine = RulesEngine::standard();
        let err = CharacterBuilder::new()
            .name("Quick")
            .race("human")
            .attribute(Attribute::Dexterity, 14)
            .level("rogue")
            .feat("mobility")
            .build(&engine)
            .unwrap_err();
        match err {
            BuilderError::FeatRejected { level, feat_id, reasons } => {
                assert_eq!(level, 1);
                assert_eq!(feat_id, "mobility");
                assert_eq!(reasons, vec!["Requires feat: Dodge".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_attributes_rejected() {
        let engine = RulesEngine::standard();
        let err = CharacterBuilder::new()
            .name("Giant")
            .race("human")
            .attribute(Attribute::Strength, 20)
            .build(&engine)
            .unwrap_err();
        assert!(matches!(err, BuilderError::Invalid(_)));
    }

    #[test]
    fn test_level_cap_rejects_extra_levels() {
        let engine = RulesEngine::new(
            crate::catalog::Catalog::standard(),
            crate::config::EngineConfig::default().with_max_level(2),
        );
        let err = CharacterBuilder::new()
            .name("Eager")
            .race("human")
            .levels("wizard", 3)
            .build(&engine)
            .unwrap_err();
        assert!(matches!(err, BuilderError::LevelRejected { level: 3, .. }));
    }
}

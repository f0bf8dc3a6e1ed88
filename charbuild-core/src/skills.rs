//! Skill math: per-level budgets, class-skill costs, rank caps and modifiers.

use crate::attributes::{final_attributes, modifier};
use crate::catalog::{Catalog, ClassData, Skill, SkillId};
use crate::character::{Character, LevelEntry};
use crate::error::RulesError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Skill points when a class does not say.
pub const DEFAULT_SKILL_POINTS: i32 = 2;

/// First-level budget multiplier.
pub const FIRST_LEVEL_MULTIPLIER: i32 = 4;

/// Skill point budget of one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillPointsInfo {
    pub base_points: i32,
    pub int_modifier: i32,
    pub total_points: i32,
    pub spent_points: i32,
    /// May be negative when the level is overspent.
    pub remaining_points: i32,
    pub is_first_level: bool,
}

/// Per-skill view used by a skill editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillInfo {
    pub skill_id: SkillId,
    pub current_ranks: i32,
    pub max_ranks: i32,
    pub is_class_skill: bool,
    pub cost_per_rank: i32,
    pub can_increase: bool,
    pub modifier: i32,
}

/// Outcome of [`can_spend_skill_points`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendCheck {
    pub can_spend: bool,
    pub reasons: Vec<String>,
}

/// One row of [`skill_summary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSummaryEntry {
    pub skill_id: SkillId,
    pub name: String,
    pub total_ranks: i32,
    pub modifier: i32,
    pub class_skill_anywhere: bool,
    pub trained_only: bool,
}

fn level_and_class<'a>(
    character: &'a Character,
    level: u8,
    catalog: &'a Catalog,
) -> Result<(&'a LevelEntry, &'a ClassData), RulesError> {
    let entry = character
        .level(level)
        .ok_or_else(|| RulesError::level_not_found(level, character.total_level))?;
    let class = catalog
        .class(&entry.class_id)
        .ok_or_else(|| RulesError::UnknownClass(entry.class_id.clone()))?;
    Ok((entry, class))
}

/// Whether `skill_id` is a class skill of `class_id`. Unknown classes have none.
pub fn is_class_skill(catalog: &Catalog, class_id: &str, skill_id: &str) -> bool {
    catalog
        .class(class_id)
        .map(|c| c.is_class_skill(skill_id))
        .unwrap_or(false)
}

/// 1 for class skills, 2 otherwise.
pub fn cost_per_rank(class: &ClassData, skill_id: &str) -> i32 {
    if class.is_class_skill(skill_id) {
        1
    } else {
        2
    }
}

/// Rank cap at a given character level.
pub fn max_ranks_for_skill(is_class_skill: bool, character_level: u8) -> i32 {
    let cap = character_level as i32 + 3;
    if is_class_skill {
        cap
    } else {
        cap / 2
    }
}

/// Points spent at one level. Negative entries do not refund anything.
pub fn spent_points_at_level(entry: &LevelEntry, class: &ClassData) -> i32 {
    entry
        .skill_ranks_this_level
        .iter()
        .filter(|(_, ranks)| **ranks > 0)
        .map(|(skill, ranks)| ranks * cost_per_rank(class, skill))
        .sum()
}

/// Budget for a level.
///
/// `total = max(1, base + int)`, plus one for a generalist race, times four
/// at level 1. Asking about a level the character does not have, or whose
/// class is missing from the catalog, is an error.
pub fn skill_points_for_level(
    character: &Character,
    level: u8,
    catalog: &Catalog,
) -> Result<SkillPointsInfo, RulesError> {
    let (entry, class) = level_and_class(character, level, catalog)?;

    let base_points = class.skill_points.unwrap_or(DEFAULT_SKILL_POINTS);
    let int_modifier = modifier(final_attributes(character, catalog).intelligence);

    let mut total_points = (base_points + int_modifier).max(1);
    if catalog
        .race(&character.race_id)
        .map(|r| r.generalist)
        .unwrap_or(false)
    {
        total_points += 1;
    }

    let is_first_level = level == 1;
    if is_first_level {
        total_points *= FIRST_LEVEL_MULTIPLIER;
    }

    let spent_points = spent_points_at_level(entry, class);

    Ok(SkillPointsInfo {
        base_points,
        int_modifier,
        total_points,
        spent_points,
        remaining_points: total_points - spent_points,
        is_first_level,
    })
}

/// Ranks in a skill summed over every level.
pub fn total_ranks(character: &Character, skill_id: &str) -> i32 {
    character
        .levels
        .iter()
        .filter_map(|l| l.skill_ranks_this_level.get(skill_id))
        .sum()
}

fn modifier_for(character: &Character, skill: &Skill, catalog: &Catalog) -> i32 {
    let attributes = final_attributes(character, catalog);
    let racial = catalog
        .race(&character.race_id)
        .map(|r| r.skill_bonus(&skill.id))
        .unwrap_or(0);
    total_ranks(character, &skill.id) + modifier(attributes.get(skill.key_attribute)) + racial
}

/// Ranks + key attribute modifier + racial bonus.
pub fn skill_modifier(character: &Character, skill_id: &str, catalog: &Catalog) -> Result<i32, RulesError> {
    let skill = catalog
        .skill(skill_id)
        .ok_or_else(|| RulesError::UnknownSkill(skill_id.to_string()))?;
    Ok(modifier_for(character, skill, catalog))
}

/// Editor view of a skill as seen from the class of `level`.
pub fn skill_info(
    character: &Character,
    skill_id: &str,
    level: u8,
    catalog: &Catalog,
) -> Result<SkillInfo, RulesError> {
    let skill = catalog
        .skill(skill_id)
        .ok_or_else(|| RulesError::UnknownSkill(skill_id.to_string()))?;
    let (_, class) = level_and_class(character, level, catalog)?;

    let current_ranks = total_ranks(character, skill_id);
    let class_skill = class.is_class_skill(skill_id);
    let max_ranks = max_ranks_for_skill(class_skill, character.total_level);

    Ok(SkillInfo {
        skill_id: skill.id.clone(),
        current_ranks,
        max_ranks,
        is_class_skill: class_skill,
        cost_per_rank: cost_per_rank(class, skill_id),
        can_increase: current_ranks < max_ranks,
        modifier: modifier_for(character, skill, catalog),
    })
}

/// Whether `ranks` more ranks can go into a skill at `level`.
pub fn can_spend_skill_points(
    character: &Character,
    skill_id: &str,
    ranks: i32,
    level: u8,
    catalog: &Catalog,
) -> Result<SpendCheck, RulesError> {
    let info = skill_info(character, skill_id, level, catalog)?;
    let points = skill_points_for_level(character, level, catalog)?;
    let trained_only = catalog.skill(skill_id).map(|s| s.trained_only).unwrap_or(false);

    let mut reasons = Vec::new();

    if info.current_ranks >= info.max_ranks {
        reasons.push(format!("Maximum ranks reached ({})", info.max_ranks));
    }

    let cost = ranks * info.cost_per_rank;
    if cost > points.remaining_points {
        reasons.push(format!(
            "Not enough skill points ({} required, {} available)",
            cost, points.remaining_points
        ));
    }

    if trained_only && info.current_ranks == 0 && !info.is_class_skill {
        reasons.push("This skill requires training (class skill required)".to_string());
    }

    Ok(SpendCheck {
        can_spend: reasons.is_empty(),
        reasons,
    })
}

/// Remaining points of every level, keyed by level number.
pub fn all_unspent_skill_points(
    character: &Character,
    catalog: &Catalog,
) -> Result<BTreeMap<u8, i32>, RulesError> {
    (1..=character.total_level)
        .map(|level| {
            skill_points_for_level(character, level, catalog).map(|p| (level, p.remaining_points))
        })
        .collect()
}

/// Skills with ranks, or that are class skills for any held class.
pub fn skill_summary(character: &Character, catalog: &Catalog) -> Vec<SkillSummaryEntry> {
    catalog
        .skills()
        .map(|skill| {
            let class_skill_anywhere = character
                .levels
                .iter()
                .any(|l| is_class_skill(catalog, &l.class_id, &skill.id));
            SkillSummaryEntry {
                skill_id: skill.id.clone(),
                name: skill.name.clone(),
                total_ranks: total_ranks(character, &skill.id),
                modifier: modifier_for(character, skill, catalog),
                class_skill_anywhere,
                trained_only: skill.trained_only,
            }
        })
        .filter(|entry| entry.total_ranks > 0 || entry.class_skill_anywhere)
        .collect()
}

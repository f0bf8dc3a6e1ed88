//! End-to-end progression tests driven through the session and the engine.
//!
//! Run with: `cargo test -p charbuild-core --test progression_flow`

use charbuild_core::rules::{BuilderState, Command, RulesEngine};
use charbuild_core::testing::{assert_skill_cache_consistent, assert_total_level, TestHarness};
use charbuild_core::{Attribute, AttributePatch, CharacterSession, SessionError};
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn session_with(race: &str, attribute: Attribute, value: i32) -> CharacterSession {
    let mut session = CharacterSession::in_memory();
    session.create_character("Tester", race);
    session.update_attributes(AttributePatch::new().set(attribute, value));
    session
}

// =============================================================================
// SKILL BUDGETS
// =============================================================================

#[test]
fn test_first_level_skill_budgets() {
    setup();
    let cases = [
        ("rogue", 16, 48),
        ("sorcerer", 14, 20),
        ("sorcerer", 6, 8),
    ];
    for (class_id, intelligence, expected) in cases {
        let mut session = session_with("human", Attribute::Intelligence, intelligence);
        session.add_level(class_id, 6);
        let points = session.skill_points(1).expect("Level 1 should exist");
        assert_eq!(
            points.total_points, expected,
            "human {class_id} with Int {intelligence}"
        );
        assert!(points.is_first_level);
        assert_eq!(session.character().unwrap().level(1).unwrap().unspent_skill_points, expected);
    }
}

#[test]
fn test_later_levels_have_no_multiplier() {
    setup();
    let mut session = session_with("human", Attribute::Intelligence, 16);
    session.add_level("rogue", 6);
    session.add_level("rogue", 6);
    assert_eq!(session.skill_points(2).unwrap().total_points, 12);
    assert!(matches!(session.skill_points(3), Err(SessionError::Rules(_))));
}

#[test]
fn test_spending_tracks_unspent_points() {
    setup();
    let mut session = session_with("human", Attribute::Intelligence, 16);
    session.add_level("rogue", 6);

    let mut skills = BTreeMap::new();
    skills.insert("hide".to_string(), 4);
    skills.insert("concentration".to_string(), 2);
    session.update_skills(skills);

    let character = session.character().unwrap();
    // 4 class ranks + 2 cross-class ranks at double cost
    assert_eq!(character.level(1).unwrap().unspent_skill_points, 40);
    assert_skill_cache_consistent(character);
}

// =============================================================================
// LEVELS
// =============================================================================

#[test]
fn test_level_cap_at_thirty() {
    setup();
    let mut harness = TestHarness::new();
    harness.create("Veteran", "human");
    for _ in 0..31 {
        harness.add_levels(&["fighter"]);
    }
    assert_total_level(&harness, 30);
    let character = harness.character().unwrap();
    assert_eq!(character.levels.len(), 30);
    assert!(character.levels.iter().enumerate().all(|(i, l)| l.level as usize == i + 1));
}

#[test]
fn test_invariants_after_mixed_commands() {
    setup();
    let mut harness = TestHarness::new();
    harness
        .create("Mixed", "half_elf")
        .add_levels(&["rogue", "wizard", "rogue", "fighter"]);

    harness.send(Command::UpdateLevelSkills {
        level: 2,
        skills: [("spellcraft".to_string(), 2)].into_iter().collect(),
        remaining_points: 1,
    });
    harness.send(Command::UpdateSkills {
        skills: [("parry".to_string(), 3)].into_iter().collect(),
    });
    harness.send(Command::UpdateRace {
        race_id: "gnome".to_string(),
    });
    harness.send(Command::SetAttributeIncrease {
        level: 4,
        attribute: Attribute::Dexterity,
    });

    let character = harness.character().unwrap();
    assert_eq!(character.levels.len(), character.total_level as usize);
    assert_skill_cache_consistent(character);
    assert_eq!(character.skill_ranks.get("parry"), Some(&3));
    assert_eq!(character.level(2).unwrap().unspent_skill_points, 1);
    assert_eq!(character.level(4).unwrap().attribute_increase, Some(Attribute::Dexterity));
}

#[test]
fn test_removing_absent_feat_changes_nothing() {
    setup();
    let engine = RulesEngine::standard();
    let mut state = BuilderState::new();
    for command in [
        Command::CreateCharacter {
            name: "Still".to_string(),
            race_id: "human".to_string(),
        },
        Command::AddLevel {
            class_id: "monk".to_string(),
            hit_points_gained: 8,
        },
    ] {
        state = engine.dispatch(&state, command);
    }

    let after = engine.dispatch(
        &state,
        Command::RemoveFeatFromLevel {
            level: 1,
            feat_id: "power_attack".to_string(),
        },
    );
    assert_eq!(after, state);
}

#[test]
fn test_monk_skips_simple_weapons() {
    setup();
    let mut harness = TestHarness::new();
    harness.create("Palm", "human").add_levels(&["monk"]);
    assert!(!harness.has_feat("simple_weapon_proficiency"));

    let mut harness = TestHarness::new();
    harness.create("Blade", "human").add_levels(&["fighter"]);
    assert!(harness.has_feat("simple_weapon_proficiency"));
}

// =============================================================================
// PRESTIGE CLASSES
// =============================================================================

#[test]
fn test_pale_master_after_five_wizard_levels() {
    setup();
    let mut session = CharacterSession::in_memory();
    session.create_character("Necro", "human");
    session.set_alignment(Some("neutral evil".to_string()));
    for _ in 0..4 {
        session.add_level("wizard", 4);
    }
    let before = session.qualifying_classes().unwrap();
    assert!(!before["pale_master"].can_take);

    session.add_level("wizard", 4);
    let after = session.qualifying_classes().unwrap();
    assert!(after["pale_master"].can_take, "{:?}", after["pale_master"]);

    session.add_level_checked("pale_master", 6).expect("Should qualify");
    assert_eq!(session.character().unwrap().total_level, 6);
}

#[test]
fn test_good_wizard_cannot_become_pale_master() {
    setup();
    let mut session = CharacterSession::in_memory();
    session.create_character("Saint", "human");
    session.set_alignment(Some("lawful good".to_string()));
    for _ in 0..5 {
        session.add_level("wizard", 4);
    }
    let err = session.add_level_checked("pale_master", 6).unwrap_err();
    assert!(matches!(err, SessionError::RequirementsNotMet { .. }));
}

#[test]
fn test_base_classes_always_qualify() {
    setup();
    let mut session = CharacterSession::in_memory();
    session.create_character("Anyone", "halfling");
    let classes = session.qualifying_classes().unwrap();
    for class in session.catalog().classes().filter(|c| !c.is_prestige()) {
        assert!(classes[&class.id].can_take, "{} should be open", class.id);
    }
}

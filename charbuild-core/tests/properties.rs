//! Property tests for the point-buy table and the command state machine.

use charbuild_core::attributes::{point_cost, total_point_cost};
use charbuild_core::feats::{add_missing_automatic_feats, automatic_feats};
use charbuild_core::rules::{BuilderState, Command, RulesEngine};
use charbuild_core::testing::{assert_skill_cache_consistent, character_with_levels, fixture_catalog};
use charbuild_core::{Attribute, Attributes};
use proptest::prelude::*;

const CLASSES: [&str; 6] = ["fighter", "rogue", "wizard", "cleric", "monk", "pale_master"];
const SKILLS: [&str; 5] = ["hide", "lore", "spellcraft", "tumble", "parry"];

fn attribute_strategy() -> impl Strategy<Value = Attribute> {
    prop::sample::select(Attribute::all().to_vec())
}

fn attributes_strategy() -> impl Strategy<Value = Attributes> {
    prop::array::uniform6(8..=18i32).prop_map(|[s, d, c, i, w, ch]| Attributes::new(s, d, c, i, w, ch))
}

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        (prop::sample::select(CLASSES.to_vec()), -5..20i32).prop_map(|(class_id, hp)| Command::AddLevel {
            class_id: class_id.to_string(),
            hit_points_gained: hp,
        }),
        (prop::sample::select(SKILLS.to_vec()), 0..6i32).prop_map(|(skill, ranks)| Command::UpdateSkills {
            skills: [(skill.to_string(), ranks)].into_iter().collect(),
        }),
        (0..8u8, prop::sample::select(SKILLS.to_vec()), 0..6i32, -3..10i32).prop_map(
            |(level, skill, ranks, remaining)| Command::UpdateLevelSkills {
                level,
                skills: [(skill.to_string(), ranks)].into_iter().collect(),
                remaining_points: remaining,
            }
        ),
        (0..8u8, prop::sample::select(vec!["dodge", "alertness", "toughness"])).prop_map(|(level, feat)| {
            Command::AddFeatToLevel {
                level,
                feat_id: feat.to_string(),
            }
        }),
        (0..8u8, prop::sample::select(vec!["dodge", "alertness"])).prop_map(|(level, feat)| {
            Command::RemoveFeatFromLevel {
                level,
                feat_id: feat.to_string(),
            }
        }),
        prop::sample::select(vec!["human", "elf", "dwarf"]).prop_map(|race| Command::UpdateRace {
            race_id: race.to_string(),
        }),
        (0..8u8, attribute_strategy()).prop_map(|(level, attribute)| Command::SetAttributeIncrease {
            level,
            attribute,
        }),
        Just(Command::AddMissingAutomaticFeats),
    ]
}

proptest! {
    #[test]
    fn point_cost_is_monotonic(value in 8..18i32) {
        prop_assert!(point_cost(value + 1) >= point_cost(value));
    }

    #[test]
    fn total_cost_monotonic_per_attribute(attributes in attributes_strategy(), attribute in attribute_strategy()) {
        let current = attributes.get(attribute);
        prop_assume!(current < 18);
        let mut raised = attributes;
        raised.set(attribute, current + 1);
        prop_assert!(total_point_cost(&raised) >= total_point_cost(&attributes));
    }

    #[test]
    fn command_sequences_keep_invariants(commands in prop::collection::vec(command_strategy(), 0..40)) {
        let engine = RulesEngine::standard();
        let mut state = engine.dispatch(&BuilderState::new(), Command::CreateCharacter {
            name: "Prop".to_string(),
            race_id: "human".to_string(),
        });
        for command in commands {
            state = engine.dispatch(&state, command);
            let character = state.character.as_ref().unwrap();
            prop_assert_eq!(character.levels.len(), character.total_level as usize);
            prop_assert!(character.total_level <= engine.config().max_level);
            prop_assert!(character.levels.iter().all(|l| l.unspent_skill_points >= 0));
            assert_skill_cache_consistent(character);
        }
    }

    #[test]
    fn automatic_feats_are_idempotent(classes in prop::collection::vec(prop::sample::select(CLASSES.to_vec()), 1..6)) {
        let catalog = fixture_catalog();
        let mut character = character_with_levels("human", &classes);
        add_missing_automatic_feats(&mut character, &catalog);
        let once = character.clone();
        let added = add_missing_automatic_feats(&mut character, &catalog);
        prop_assert!(added.is_empty());
        prop_assert_eq!(&character, &once);
        let expected = automatic_feats(&character, &catalog);
        prop_assert!(expected.iter().all(|f| character.has_feat(f)));
    }
}

//! Bundled rule tables.
//!
//! Seven races, eleven base classes, a handful of prestige classes with their
//! requirement overlays, and enough feats and skills to exercise every rule.
//! Callers with their own data load it through [`Catalog::from_json`] instead.

use crate::catalog::{
    BabProgression, BonusFeatGrant, CastingKind, Catalog, ClassData, Feat, HitDie, OverlayCheck,
    Race, RequirementOverlay, Requirements, Save, Skill, SlotKind,
};
use crate::character::Attribute;
use std::collections::BTreeMap;
use std::sync::Arc;

lazy_static::lazy_static! {
    static ref STANDARD_CATALOG: Arc<Catalog> = Arc::new(build_standard_catalog());
}

impl Catalog {
    /// The bundled rule tables.
    pub fn standard() -> Arc<Catalog> {
        Arc::clone(&STANDARD_CATALOG)
    }
}

fn build_standard_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    for race in standard_races() {
        catalog = catalog.with_race(race);
    }
    for class in base_classes().into_iter().chain(prestige_classes()) {
        catalog = catalog.with_class(class);
    }
    for feat in standard_feats() {
        catalog = catalog.with_feat(feat);
    }
    for skill in standard_skills() {
        catalog = catalog.with_skill(skill);
    }
    for overlay in standard_overlays() {
        catalog = catalog.with_overlay(overlay);
    }
    catalog
}

// ============================================================================
// Races
// ============================================================================

fn standard_races() -> Vec<Race> {
    vec![
        Race::new("human", "Human").generalist(),
        Race::new("elf", "Elf")
            .with_bonus(Attribute::Dexterity, 2)
            .with_bonus(Attribute::Constitution, -2)
            .with_racial_feats(&["keen_sense", "hardiness_vs_enchantments"])
            .with_skill_bonus("listen", 2)
            .with_skill_bonus("spot", 2)
            .with_skill_bonus("search", 2),
        Race::new("dwarf", "Dwarf")
            .with_bonus(Attribute::Constitution, 2)
            .with_bonus(Attribute::Charisma, -2)
            .with_racial_feats(&["darkvision", "hardiness_vs_poisons", "hardiness_vs_spells"])
            .with_skill_bonus("lore", 2),
        Race::new("halfling", "Halfling")
            .with_bonus(Attribute::Dexterity, 2)
            .with_bonus(Attribute::Strength, -2)
            .with_racial_feats(&["good_aim", "lucky"])
            .with_skill_bonus("hide", 4)
            .with_skill_bonus("listen", 2),
        // Half-elves pick their bonus; see `final_attributes_with`.
        Race::new("half_elf", "Half-Elf")
            .with_racial_feats(&["hardiness_vs_enchantments"])
            .with_skill_bonus("listen", 1)
            .with_skill_bonus("spot", 1)
            .with_skill_bonus("persuade", 2)
            .with_skill_bonus("bluff", 2),
        Race::new("half_orc", "Half-Orc")
            .with_bonus(Attribute::Strength, 2)
            .with_bonus(Attribute::Intelligence, -2)
            .with_bonus(Attribute::Charisma, -2),
        Race::new("gnome", "Gnome")
            .with_bonus(Attribute::Constitution, 2)
            .with_bonus(Attribute::Strength, -2)
            .with_racial_feats(&["small_stature", "hardiness_vs_illusions"])
            .with_skill_bonus("concentration", 2)
            .with_skill_bonus("lore", 2)
            .with_skill_bonus("alchemy", 2),
    ]
}

// ============================================================================
// Classes
// ============================================================================

fn base_classes() -> Vec<ClassData> {
    vec![
        ClassData::new("barbarian", "Barbarian", HitDie::D12)
            .with_skill_points(4)
            .with_bab(BabProgression::Full)
            .with_saves(&[Save::Fortitude])
            .with_weapons(&["simple", "martial"])
            .with_armor(&["light", "medium"])
            .with_shields()
            .with_skills(&["animal_empathy", "discipline", "intimidate", "listen", "lore", "parry", "taunt"])
            .with_alignment_restriction("non-lawful"),
        ClassData::new("bard", "Bard", HitDie::D6)
            .with_skill_points(4)
            .with_saves(&[Save::Reflex, Save::Will])
            .with_weapons(&["simple"])
            .with_armor(&["light"])
            .with_shields()
            .with_spellcasting(CastingKind::Arcane, Attribute::Charisma)
            .with_skills(&[
                "appraise", "bluff", "concentration", "hide", "listen", "lore", "move_silently",
                "parry", "perform", "persuade", "spellcraft", "taunt", "tumble", "use_magic_device",
            ])
            .with_alignment_restriction("non-lawful"),
        ClassData::new("cleric", "Cleric", HitDie::D8)
            .with_skill_points(2)
            .with_saves(&[Save::Fortitude, Save::Will])
            .with_weapons(&["simple"])
            .with_armor(&["light", "medium", "heavy"])
            .with_shields()
            .with_spellcasting(CastingKind::Divine, Attribute::Wisdom)
            .with_skills(&["concentration", "craft_armor", "craft_weapon", "heal", "lore", "persuade", "spellcraft"]),
        ClassData::new("druid", "Druid", HitDie::D8)
            .with_skill_points(4)
            .with_saves(&[Save::Fortitude, Save::Will])
            .without_simple_weapons()
            .with_armor(&["light", "medium"])
            .with_shields()
            .with_spellcasting(CastingKind::Divine, Attribute::Wisdom)
            .with_wild_shape()
            .with_skills(&["animal_empathy", "concentration", "heal", "listen", "lore", "spellcraft", "spot"])
            .with_alignment_restriction("neutral"),
        ClassData::new("fighter", "Fighter", HitDie::D10)
            .with_skill_points(2)
            .with_bab(BabProgression::Full)
            .with_saves(&[Save::Fortitude])
            .with_weapons(&["simple", "martial"])
            .with_armor(&["light", "medium", "heavy"])
            .with_shields()
            .with_skills(&["craft_armor", "craft_weapon", "discipline", "intimidate", "parry", "taunt"])
            .with_bonus_feats(BonusFeatGrant {
                levels: vec![1, 2, 4, 6, 8, 10, 12, 14, 16, 18, 20],
                kind: SlotKind::Bonus,
                restrictions: vec!["fighter".to_string()],
            }),
        ClassData::new("monk", "Monk", HitDie::D8)
            .with_skill_points(4)
            .with_saves(&[Save::Fortitude, Save::Reflex, Save::Will])
            .without_simple_weapons()
            .with_skills(&[
                "concentration", "discipline", "hide", "listen", "lore", "move_silently", "parry",
                "persuade", "spot", "tumble",
            ])
            .with_alignment_restriction("lawful"),
        ClassData::new("paladin", "Paladin", HitDie::D10)
            .with_skill_points(2)
            .with_bab(BabProgression::Full)
            .with_saves(&[Save::Fortitude])
            .with_weapons(&["simple", "martial"])
            .with_armor(&["light", "medium", "heavy"])
            .with_shields()
            .with_spellcasting(CastingKind::Divine, Attribute::Wisdom)
            .with_skills(&["concentration", "discipline", "heal", "lore", "persuade"])
            .with_alignment_restriction("lawful good"),
        ClassData::new("ranger", "Ranger", HitDie::D8)
            .with_skill_points(4)
            .with_bab(BabProgression::Full)
            .with_saves(&[Save::Fortitude, Save::Reflex])
            .with_weapons(&["simple", "martial"])
            .with_armor(&["light"])
            .with_shields()
            .with_spellcasting(CastingKind::Divine, Attribute::Wisdom)
            .with_skills(&[
                "animal_empathy", "concentration", "disable_trap", "heal", "hide", "listen", "lore",
                "move_silently", "search", "set_trap", "spot",
            ]),
        ClassData::new("rogue", "Rogue", HitDie::D6)
            .with_skill_points(8)
            .with_saves(&[Save::Reflex])
            .without_simple_weapons()
            .with_armor(&["light"])
            .with_skills(&[
                "appraise", "bluff", "craft_trap", "disable_trap", "hide", "intimidate", "listen",
                "lore", "move_silently", "open_lock", "parry", "persuade", "pick_pocket", "search",
                "set_trap", "spot", "tumble", "use_magic_device",
            ]),
        ClassData::new("sorcerer", "Sorcerer", HitDie::D4)
            .with_skill_points(2)
            .with_bab(BabProgression::Low)
            .with_saves(&[Save::Will])
            .with_weapons(&["simple"])
            .with_spellcasting(CastingKind::Arcane, Attribute::Charisma)
            .with_skills(&["alchemy", "bluff", "concentration", "craft_armor", "craft_weapon", "lore", "spellcraft"]),
        ClassData::new("wizard", "Wizard", HitDie::D4)
            .with_skill_points(2)
            .with_bab(BabProgression::Low)
            .with_saves(&[Save::Will])
            .without_simple_weapons()
            .with_spellcasting(CastingKind::Arcane, Attribute::Intelligence)
            .with_skills(&["alchemy", "concentration", "craft_armor", "craft_weapon", "lore", "spellcraft"])
            .with_bonus_feats(BonusFeatGrant {
                levels: vec![5, 10, 15, 20],
                kind: SlotKind::Class,
                restrictions: vec!["metamagic".to_string()],
            }),
    ]
}

fn skills(entries: &[(&str, i32)]) -> BTreeMap<String, i32> {
    entries.iter().map(|(s, r)| (s.to_string(), *r)).collect()
}

fn names(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|e| e.to_string()).collect()
}

fn prestige_classes() -> Vec<ClassData> {
    vec![
        ClassData::new("pale_master", "Pale Master", HitDie::D6)
            .prestige()
            .with_skill_points(2)
            .with_bab(BabProgression::Low)
            .with_saves(&[Save::Fortitude, Save::Will])
            .with_skills(&["concentration", "lore", "spellcraft"])
            .with_requirements(Requirements {
                spellcasting: Some("arcane_level_3".to_string()),
                alignment: Some("non-good".to_string()),
                ..Default::default()
            }),
        ClassData::new("red_dragon_disciple", "Red Dragon Disciple", HitDie::D12)
            .prestige()
            .with_skill_points(2)
            .with_saves(&[Save::Fortitude, Save::Will])
            .with_skills(&["concentration", "lore", "spellcraft", "intimidate"])
            .with_alignment_restriction("non-lawful"),
        ClassData::new("shadowdancer", "Shadowdancer", HitDie::D8)
            .prestige()
            .with_skill_points(6)
            .with_saves(&[Save::Reflex])
            .with_skills(&["hide", "move_silently", "tumble", "spot", "listen", "search"])
            .with_requirements(Requirements {
                feats: names(&["dodge", "mobility"]),
                ..Default::default()
            }),
        ClassData::new("arcane_archer", "Arcane Archer", HitDie::D8)
            .prestige()
            .with_skill_points(4)
            .with_bab(BabProgression::Full)
            .with_saves(&[Save::Fortitude, Save::Reflex])
            .with_skills(&["hide", "listen", "move_silently", "spot"])
            .with_requirements(Requirements {
                base_attack_bonus: Some(6),
                feats: names(&["weapon_focus_longbow", "point_blank_shot"]),
                race: names(&["elf"]),
                spellcasting: Some("arcane_level_1".to_string()),
                ..Default::default()
            }),
        ClassData::new("assassin", "Assassin", HitDie::D6)
            .prestige()
            .with_skill_points(4)
            .with_saves(&[Save::Reflex])
            .with_skills(&["bluff", "hide", "move_silently", "search", "spot", "tumble", "disable_trap"])
            .with_requirements(Requirements {
                skills: skills(&[("hide", 8), ("move_silently", 8)]),
                alignment: Some("evil".to_string()),
                ..Default::default()
            }),
        ClassData::new("blackguard", "Blackguard", HitDie::D10)
            .prestige()
            .with_skill_points(2)
            .with_bab(BabProgression::Full)
            .with_saves(&[Save::Fortitude])
            .with_skills(&["concentration", "discipline", "hide", "intimidate"])
            .with_requirements(Requirements {
                base_attack_bonus: Some(6),
                skills: skills(&[("hide", 5)]),
                feats: names(&["cleave"]),
                alignment: Some("evil".to_string()),
                ..Default::default()
            }),
        ClassData::new("weapon_master", "Weapon Master", HitDie::D10)
            .prestige()
            .with_skill_points(2)
            .with_bab(BabProgression::Full)
            .with_saves(&[Save::Reflex])
            .with_skills(&["discipline", "intimidate", "parry", "taunt"])
            .with_requirements(Requirements {
                base_attack_bonus: Some(5),
                skills: skills(&[("intimidate", 4)]),
                feats: names(&["dodge", "mobility", "spring_attack", "combat_expertise", "whirlwind_attack", "weapon_focus"]),
                ..Default::default()
            }),
        ClassData::new("shifter", "Shifter", HitDie::D10)
            .prestige()
            .with_skill_points(4)
            .with_saves(&[Save::Fortitude, Save::Reflex])
            .with_skills(&["animal_empathy", "concentration", "listen", "lore", "spot"])
            .with_alignment_restriction("non-lawful")
            .with_requirements(Requirements {
                feats: names(&["alertness"]),
                special: Some("wild_shape_or_polymorph_spell_known".to_string()),
                ..Default::default()
            }),
        ClassData::new("harper_scout", "Harper Scout", HitDie::D6)
            .prestige()
            .with_skill_points(4)
            .with_saves(&[Save::Reflex, Save::Will])
            .with_skills(&["discipline", "hide", "lore", "persuade", "search", "spot"])
            .with_requirements(Requirements {
                skills: skills(&[("discipline", 4), ("lore", 6), ("persuade", 8), ("search", 4)]),
                feats: names(&["alertness", "iron_will"]),
                alignment: Some("non-evil".to_string()),
                ..Default::default()
            }),
        ClassData::new("artificier", "Artificer", HitDie::D6)
            .prestige()
            .with_skill_points(4)
            .with_bab(BabProgression::Low)
            .with_saves(&[Save::Will])
            .with_skills(&["alchemy", "craft_armor", "craft_weapon", "lore", "spellcraft"]),
        ClassData::new("chasseur_nocturne", "Night Hunter", HitDie::D8)
            .prestige()
            .with_skill_points(6)
            .with_saves(&[Save::Reflex])
            .with_skills(&["hide", "listen", "lore", "move_silently", "spot"]),
        ClassData::new("chevalier", "Knight", HitDie::D10)
            .prestige()
            .with_skill_points(2)
            .with_bab(BabProgression::Full)
            .with_saves(&[Save::Fortitude, Save::Will])
            .with_skills(&["discipline", "intimidate", "listen", "persuade", "spot"])
            .with_requirements(Requirements {
                base_attack_bonus: Some(6),
                feats: names(&["alertness", "toughness"]),
                ..Default::default()
            }),
        ClassData::new("danseur_de_guerre", "War Dancer", HitDie::D8)
            .prestige()
            .with_skill_points(4)
            .with_bab(BabProgression::Full)
            .with_saves(&[Save::Reflex])
            .with_skills(&["discipline", "perform", "persuade", "tumble"])
            .with_requirements(Requirements {
                base_attack_bonus: Some(5),
                feats: names(&["dodge", "mobility"]),
                ..Default::default()
            }),
        ClassData::new("magelame", "Spellblade", HitDie::D8)
            .prestige()
            .with_skill_points(2)
            .with_saves(&[Save::Fortitude, Save::Will])
            .with_skills(&["concentration", "discipline", "spellcraft", "tumble"])
            .with_requirements(Requirements {
                feats: names(&["combat_expertise"]),
                ..Default::default()
            }),
    ]
}

// ============================================================================
// Overlays
// ============================================================================

const ARCANE_CLASSES: [&str; 3] = ["wizard", "sorcerer", "bard"];
const CASTER_CLASSES: [&str; 7] = ["sorcerer", "wizard", "bard", "cleric", "druid", "paladin", "ranger"];

fn classes(ids: &[&str]) -> Vec<String> {
    names(ids)
}

fn skill_check(skill: &str, ranks: i32, label: &str) -> OverlayCheck {
    OverlayCheck::MinSkillRanks {
        skill: skill.to_string(),
        ranks,
        label: label.to_string(),
    }
}

fn standard_overlays() -> Vec<RequirementOverlay> {
    vec![
        RequirementOverlay::new("pale_master")
            .check(OverlayCheck::MinTotalLevel {
                level: 5,
                message: "Able to cast 3rd-level spells".to_string(),
            })
            .describe("Necromancy specialization (recommended)"),
        RequirementOverlay::new("red_dragon_disciple")
            .check(OverlayCheck::AnyClassLevel {
                classes: classes(&["sorcerer", "bard"]),
                message: "Draconic bloodline (sorcerer or bard)".to_string(),
            })
            .check(skill_check("lore", 8, "Lore"))
            .check(OverlayCheck::AnyClassLevel {
                classes: classes(&CASTER_CLASSES),
                message: "Able to cast spells (caster class)".to_string(),
            }),
        RequirementOverlay::new("shadowdancer")
            .check(skill_check("hide", 10, "Hide"))
            .check(skill_check("move_silently", 8, "Move Silently")),
        RequirementOverlay::new("shifter")
            .describe("Lore (nature) 4 ranks")
            .describe("Wild shape ability"),
        RequirementOverlay::new("harper_scout").describe("One Skill Focus feat of choice"),
        RequirementOverlay::new("arcane_archer").describe("Able to cast 1st-level arcane spells"),
        RequirementOverlay::new("assassin").describe("Sneak attack +2d6"),
        RequirementOverlay::new("blackguard").describe("Intimidate 2 ranks"),
        RequirementOverlay::new("weapon_master").describe("Weapon Specialization (one weapon)"),
        RequirementOverlay::new("artificier")
            .check(OverlayCheck::AnyClassLevel {
                classes: classes(&ARCANE_CLASSES),
                message: "Able to cast arcane spells".to_string(),
            })
            .describe("Lore (engineering or alchemy) 8 ranks")
            .describe("Feat: Craft Wondrous Item"),
        RequirementOverlay::new("chasseur_nocturne")
            .check(OverlayCheck::AlignmentExcludes {
                terms: names(&["good", "bon"]),
                message: "Alignment: cannot be good".to_string(),
            })
            .check(skill_check("hide", 8, "Hide"))
            .check(skill_check("move_silently", 8, "Move Silently"))
            .check(skill_check("lore", 6, "Lore")),
        RequirementOverlay::new("chevalier")
            .check(OverlayCheck::AlignmentIncludes {
                terms: names(&["lawful", "loyal"]),
                message: "Alignment: must be lawful".to_string(),
            })
            .check(skill_check("discipline", 8, "Discipline"))
            .describe("Spot 3 ranks, Intimidate 3 ranks, Listen 3 ranks, Persuade 3 ranks"),
        RequirementOverlay::new("danseur_de_guerre")
            .check(OverlayCheck::AlignmentExcludes {
                terms: names(&["lawful", "loyal"]),
                message: "Alignment: cannot be lawful".to_string(),
            })
            .check(skill_check("tumble", 5, "Tumble"))
            .describe("Discipline 5 ranks, Persuade 5 ranks"),
        RequirementOverlay::new("magelame")
            .check(OverlayCheck::MinLevelWithClass {
                level: 5,
                classes: classes(&ARCANE_CLASSES),
                message: "Able to cast 3rd-level arcane spells".to_string(),
            })
            .check(skill_check("concentration", 5, "Concentration"))
            .describe("Feats: Still Spell, Combat Casting"),
    ]
}

// ============================================================================
// Feats
// ============================================================================

fn standard_feats() -> Vec<Feat> {
    vec![
        // Proficiencies
        Feat::new("simple_weapon_proficiency", "Weapon Proficiency (Simple)", "General, Proficiency"),
        Feat::new("martial_weapon_proficiency", "Weapon Proficiency (Martial)", "General, Proficiency"),
        Feat::new("exotic_weapon_proficiency", "Weapon Proficiency (Exotic)", "General, Fighter, Proficiency")
            .with_required_feats(&["martial_weapon_proficiency"]),
        Feat::new("light_armor_proficiency", "Armor Proficiency (Light)", "General, Proficiency"),
        Feat::new("medium_armor_proficiency", "Armor Proficiency (Medium)", "General, Proficiency")
            .with_required_feats(&["light_armor_proficiency"]),
        Feat::new("heavy_armor_proficiency", "Armor Proficiency (Heavy)", "General, Proficiency")
            .with_required_feats(&["medium_armor_proficiency"]),
        Feat::new("shield_proficiency", "Shield Proficiency", "General, Proficiency"),
        // General and fighter
        Feat::new("alertness", "Alertness", "General"),
        Feat::new("iron_will", "Iron Will", "General"),
        Feat::new("toughness", "Toughness", "General").repeatable(),
        Feat::new("dodge", "Dodge", "General, Fighter").with_minimum(Attribute::Dexterity, 13),
        Feat::new("mobility", "Mobility", "General, Fighter")
            .with_minimum(Attribute::Dexterity, 13)
            .with_required_feats(&["dodge"]),
        Feat::new("spring_attack", "Spring Attack", "General, Fighter")
            .with_minimum(Attribute::Dexterity, 13)
            .with_required_feats(&["dodge", "mobility"])
            .with_level_range(Some(4), None),
        Feat::new("combat_expertise", "Combat Expertise", "General, Fighter")
            .with_minimum(Attribute::Intelligence, 13),
        Feat::new("whirlwind_attack", "Whirlwind Attack", "General, Fighter")
            .with_minimum(Attribute::Dexterity, 13)
            .with_minimum(Attribute::Intelligence, 13)
            .with_required_feats(&["dodge", "mobility", "spring_attack", "combat_expertise"]),
        Feat::new("power_attack", "Power Attack", "General, Fighter").with_minimum(Attribute::Strength, 13),
        Feat::new("cleave", "Cleave", "General, Fighter")
            .with_minimum(Attribute::Strength, 13)
            .with_required_feats(&["power_attack"]),
        Feat::new("weapon_focus", "Weapon Focus", "General, Fighter"),
        Feat::new("weapon_focus_longbow", "Weapon Focus (Longbow)", "General, Fighter"),
        Feat::new("point_blank_shot", "Point Blank Shot", "General, Fighter"),
        Feat::new("weapon_specialization", "Weapon Specialization", "Fighter")
            .with_required_feats(&["weapon_focus"])
            .with_level_range(Some(4), None),
        Feat::new("skill_focus_hide", "Skill Focus (Hide)", "General"),
        Feat::new("luck_of_heroes", "Luck of Heroes", "General").first_level_only(),
        Feat::new("blooded", "Blooded", "General").first_level_only(),
        Feat::new("combat_casting", "Combat Casting", "General"),
        Feat::new("spell_focus_necromancy", "Spell Focus (Necromancy)", "General, Wizard"),
        // Metamagic
        Feat::new("empower_spell", "Empower Spell", "Metamagic"),
        Feat::new("extend_spell", "Extend Spell", "Metamagic"),
        Feat::new("still_spell", "Still Spell", "Metamagic"),
        Feat::new("maximize_spell", "Maximize Spell", "Metamagic").with_level_range(Some(9), None),
        // Epic
        Feat::new("epic_toughness", "Epic Toughness", "Epic")
            .epic()
            .repeatable()
            .with_required_feats(&["toughness"]),
        Feat::new("great_strength", "Great Strength", "Epic")
            .epic()
            .with_minimum(Attribute::Strength, 21),
        Feat::new("epic_dodge", "Epic Dodge", "Epic, Fighter")
            .epic()
            .with_minimum(Attribute::Dexterity, 25)
            .with_required_feats(&["dodge"]),
    ]
}

// ============================================================================
// Skills
// ============================================================================

fn standard_skills() -> Vec<Skill> {
    use Attribute::*;
    vec![
        Skill::new("alchemy", "Alchemy", Intelligence).trained_only().with_aliases(&["alchimie"]),
        Skill::new("animal_empathy", "Animal Empathy", Charisma).trained_only().with_aliases(&["dressage"]),
        Skill::new("appraise", "Appraise", Intelligence).with_aliases(&["estimation"]),
        Skill::new("bluff", "Bluff", Charisma),
        Skill::new("concentration", "Concentration", Constitution),
        Skill::new("craft_armor", "Craft Armor", Intelligence).trained_only().with_aliases(&["creation_armure"]),
        Skill::new("craft_trap", "Craft Trap", Intelligence).trained_only().with_aliases(&["creation_piege"]),
        Skill::new("craft_weapon", "Craft Weapon", Intelligence).trained_only().with_aliases(&["creation_arme"]),
        Skill::new("disable_trap", "Disable Trap", Intelligence).trained_only().with_aliases(&["desamorcage"]),
        Skill::new("discipline", "Discipline", Strength),
        Skill::new("heal", "Heal", Wisdom).with_aliases(&["premiers_secours"]),
        Skill::new("hide", "Hide", Dexterity).with_aliases(&["discretion"]),
        Skill::new("intimidate", "Intimidate", Charisma).with_aliases(&["intimidation"]),
        Skill::new("listen", "Listen", Wisdom).with_aliases(&["perception_auditive"]),
        Skill::new("lore", "Lore", Intelligence).trained_only().with_aliases(&["savoir", "connaissances"]),
        Skill::new("move_silently", "Move Silently", Dexterity).with_aliases(&["deplacement_silencieux"]),
        Skill::new("open_lock", "Open Lock", Dexterity).trained_only().with_aliases(&["crochetage"]),
        Skill::new("parry", "Parry", Dexterity).with_aliases(&["parade"]),
        Skill::new("perform", "Perform", Charisma).trained_only().with_aliases(&["representation"]),
        Skill::new("persuade", "Persuade", Charisma).with_aliases(&["persuasion", "diplomatie"]),
        Skill::new("pick_pocket", "Pick Pocket", Dexterity).trained_only().with_aliases(&["vol_a_la_tire"]),
        Skill::new("search", "Search", Intelligence).with_aliases(&["recherche", "fouille"]),
        Skill::new("set_trap", "Set Trap", Dexterity).trained_only().with_aliases(&["pose_de_piege"]),
        Skill::new("spellcraft", "Spellcraft", Intelligence).trained_only().with_aliases(&["connaissance_des_sorts"]),
        Skill::new("spot", "Spot", Wisdom).with_aliases(&["perception_visuelle"]),
        Skill::new("taunt", "Taunt", Charisma).with_aliases(&["raillerie"]),
        Skill::new("tumble", "Tumble", Dexterity).trained_only().with_aliases(&["acrobatie"]),
        Skill::new("use_magic_device", "Use Magic Device", Charisma)
            .trained_only()
            .with_aliases(&["utilisation_objets_magiques"]),
    ]
}

//! Character progression rules engine for a d20 builder.
//!
//! This crate provides:
//! - Point-buy attribute math, skill budgets and feat slots
//! - Prestige class prerequisites and whole-character validation
//! - A Command/Effect state machine for deterministic builder state
//! - Character persistence behind an async store
//!
//! # Quick Start
//!
//! ```ignore
//! use charbuild_core::{Attribute, AttributePatch, CharacterSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = CharacterSession::in_memory();
//!     session.create_character("Aria", "elf");
//!     session.update_attributes(AttributePatch::new().set(Attribute::Intelligence, 16));
//!     session.add_level_checked("wizard", 4)?;
//!
//!     println!("{} skill points", session.skill_points(1)?.total_points);
//!     session.save().await?;
//!     Ok(())
//! }
//! ```

pub mod attributes;
pub mod catalog;
pub mod character;
pub mod character_builder;
pub mod class_data;
pub mod config;
pub mod error;
pub mod feats;
pub mod persist;
pub mod progression;
pub mod requirements;
pub mod rules;
pub mod session;
pub mod skills;
pub mod testing;
pub mod validation;

// Primary public API
pub use catalog::{Catalog, CatalogError, ClassData, Feat, HitDie, Race, Skill};
pub use character::{Attribute, AttributePatch, Attributes, Character, CharacterId, LevelEntry, ValidationResult};
pub use character_builder::{BuilderError, CharacterBuilder};
pub use config::EngineConfig;
pub use error::RulesError;
pub use persist::{CharacterStore, JsonFileStore, MemoryStore, PersistError};
pub use rules::{BuilderState, Command, Effect, Phase, Resolution, RulesEngine};
pub use session::{CharacterSession, SessionError};
pub use testing::TestHarness;

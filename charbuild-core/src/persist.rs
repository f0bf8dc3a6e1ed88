//! Character persistence.
//!
//! Every stored character lives in one JSON document keyed by character id,
//! wrapped in a versioned envelope. [`JsonFileStore`] keeps the document in a
//! file, [`MemoryStore`] keeps the serialized text in memory.

use crate::character::{Character, CharacterId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::info;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Character not found: {0}")]
    NotFound(CharacterId),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current store document version.
pub const STORE_VERSION: u32 = 1;

/// File name used by [`JsonFileStore::in_dir`].
pub const DEFAULT_STORE_FILE: &str = "nwn_characters.json";

/// The stored document: every saved character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDocument {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub characters: Vec<Character>,
}

/// Listing entry for a stored character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub id: CharacterId,
    pub name: String,
    pub race_id: String,
    pub total_level: u8,
    pub modified_at: DateTime<Utc>,
}

impl From<&Character> for CharacterSummary {
    fn from(character: &Character) -> Self {
        Self {
            id: character.id,
            name: character.name.clone(),
            race_id: character.race_id.clone(),
            total_level: character.total_level,
            modified_at: character.modified_at,
        }
    }
}

impl CharacterDocument {
    pub fn new() -> Self {
        Self {
            version: STORE_VERSION,
            saved_at: Utc::now(),
            characters: Vec::new(),
        }
    }

    /// Parse a document. Blank input is an empty document.
    pub fn from_json(content: &str) -> Result<Self, PersistError> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        #[derive(Deserialize)]
        struct Envelope {
            version: u32,
        }

        let envelope: Envelope = serde_json::from_str(content)?;
        if envelope.version != STORE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: STORE_VERSION,
                found: envelope.version,
            });
        }
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Insert or replace by id. Returns `true` when an entry was replaced.
    pub fn upsert(&mut self, character: Character) -> bool {
        self.saved_at = Utc::now();
        match self.characters.iter_mut().find(|c| c.id == character.id) {
            Some(existing) => {
                *existing = character;
                true
            }
            None => {
                self.characters.push(character);
                false
            }
        }
    }

    pub fn find(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == *id)
    }

    pub fn remove(&mut self, id: &CharacterId) -> Option<Character> {
        let index = self.characters.iter().position(|c| c.id == *id)?;
        self.saved_at = Utc::now();
        Some(self.characters.remove(index))
    }

    /// Summaries sorted by name.
    pub fn summaries(&self) -> Vec<CharacterSummary> {
        let mut summaries: Vec<CharacterSummary> =
            self.characters.iter().map(CharacterSummary::from).collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }
}

impl Default for CharacterDocument {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Store port
// ============================================================================

/// Async storage for characters.
#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// Insert or replace a character by id.
    async fn save(&self, character: &Character) -> Result<(), PersistError>;

    async fn load(&self, id: &CharacterId) -> Result<Character, PersistError>;

    async fn list(&self) -> Result<Vec<CharacterSummary>, PersistError>;

    /// Remove a character. Missing ids are an error.
    async fn delete(&self, id: &CharacterId) -> Result<(), PersistError>;
}

// ============================================================================
// JSON file store
// ============================================================================

/// A store backed by a single JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at [`DEFAULT_STORE_FILE`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_STORE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<CharacterDocument, PersistError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => CharacterDocument::from_json(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(CharacterDocument::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_document(&self, document: &CharacterDocument) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let temp_path = self.temp_path();
        fs::write(&temp_path, document.to_json()?).await?;

        // Atomic rename
        if let Err(err) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(err.into());
        }
        Ok(())
    }

    /// Sibling of the store file that writes go through first.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CharacterStore for JsonFileStore {
    async fn save(&self, character: &Character) -> Result<(), PersistError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        let replaced = document.upsert(character.clone());
        self.write_document(&document).await?;
        info!(
            id = %character.id,
            name = %character.name,
            replaced,
            path = %self.path.display(),
            "Saved character"
        );
        Ok(())
    }

    async fn load(&self, id: &CharacterId) -> Result<Character, PersistError> {
        let _guard = self.lock.lock().await;
        self.read_document()
            .await?
            .find(id)
            .cloned()
            .ok_or(PersistError::NotFound(*id))
    }

    async fn list(&self) -> Result<Vec<CharacterSummary>, PersistError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.summaries())
    }

    async fn delete(&self, id: &CharacterId) -> Result<(), PersistError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        document.remove(id).ok_or(PersistError::NotFound(*id))?;
        self.write_document(&document).await?;
        info!(id = %id, path = %self.path.display(), "Deleted character");
        Ok(())
    }
}

// ============================================================================
// Memory store
// ============================================================================

/// A store holding the serialized document in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw serialized document.
    pub async fn snapshot(&self) -> String {
        self.document.lock().await.clone()
    }
}

#[async_trait]
impl CharacterStore for MemoryStore {
    async fn save(&self, character: &Character) -> Result<(), PersistError> {
        let mut raw = self.document.lock().await;
        let mut document = CharacterDocument::from_json(&raw)?;
        document.upsert(character.clone());
        *raw = document.to_json()?;
        info!(id = %character.id, name = %character.name, "Saved character in memory");
        Ok(())
    }

    async fn load(&self, id: &CharacterId) -> Result<Character, PersistError> {
        let raw = self.document.lock().await;
        CharacterDocument::from_json(&raw)?
            .find(id)
            .cloned()
            .ok_or(PersistError::NotFound(*id))
    }

    async fn list(&self) -> Result<Vec<CharacterSummary>, PersistError> {
        let raw = self.document.lock().await;
        Ok(CharacterDocument::from_json(&raw)?.summaries())
    }

    async fn delete(&self, id: &CharacterId) -> Result<(), PersistError> {
        let mut raw = self.document.lock().await;
        let mut document = CharacterDocument::from_json(&raw)?;
        document.remove(id).ok_or(PersistError::NotFound(*id))?;
        *raw = document.to_json()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::character_with_levels;
    use tempfile::TempDir;

    #[test]
    fn test_document_upsert_replaces_by_id() {
        let mut document = CharacterDocument::new();
        let mut character = character_with_levels("human", &["fighter"]);
        assert!(!document.upsert(character.clone()));
        character.name = "Renamed".to_string();
        assert!(document.upsert(character.clone()));
        assert_eq!(document.characters.len(), 1);
        assert_eq!(document.find(&character.id).unwrap().name, "Renamed");
    }

    #[test]
    fn test_document_version_mismatch() {
        let content = r#"{"version": 7, "saved_at": "2024-01-01T00:00:00Z", "characters": []}"#;
        let err = CharacterDocument::from_json(content).unwrap_err();
        assert!(matches!(
            err,
            PersistError::VersionMismatch { expected: 1, found: 7 }
        ));
    }

    #[test]
    fn test_blank_document_is_empty() {
        assert!(CharacterDocument::from_json("  ").unwrap().characters.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_save_and_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::in_dir(temp_dir.path().join("saves"));

        let mut character = character_with_levels("elf", &["wizard", "wizard"]);
        character.alignment = Some("chaotic good".to_string());
        store.save(&character).await.expect("Save should succeed");
        assert!(store.path().exists());

        let loaded = store.load(&character.id).await.expect("Load should succeed");
        assert_eq!(loaded, character);
    }

    #[tokio::test]
    async fn test_file_store_writes_through_temp_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::in_dir(temp_dir.path());
        let first = character_with_levels("human", &["fighter"]);
        store.save(&first).await.unwrap();
        store.save(&character_with_levels("dwarf", &["cleric"])).await.unwrap();

        assert!(!store.temp_path().exists());
        let entries = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
        assert_eq!(store.list().await.unwrap().len(), 2);
        assert_eq!(store.load(&first.id).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_file_store_failed_replace_cleans_up() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        // A non-empty directory where the store file should be cannot be replaced.
        let path = temp_dir.path().join("blocked.json");
        std::fs::create_dir_all(path.join("inner")).unwrap();
        let store = JsonFileStore::new(&path);

        let result = store.write_document(&CharacterDocument::new()).await;
        assert!(matches!(result, Err(PersistError::Io(_))));
        assert!(!store.temp_path().exists());
        assert!(path.join("inner").exists());
    }

    #[tokio::test]
    async fn test_file_store_missing_file_lists_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::new(temp_dir.path().join("none.json"));
        assert!(store.list().await.unwrap().is_empty());
        let missing = store.load(&CharacterId::new()).await;
        assert!(matches!(missing, Err(PersistError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_file_store_list_and_delete() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::in_dir(temp_dir.path());

        let mut ids = Vec::new();
        for name in ["Charlie", "Alpha", "Beta"] {
            let mut character = character_with_levels("human", &["rogue"]);
            character.name = name.to_string();
            ids.push(character.id);
            store.save(&character).await.unwrap();
        }

        let names: Vec<String> = store.list().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Charlie"]);

        store.delete(&ids[0]).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);
        assert!(matches!(
            store.delete(&ids[0]).await,
            Err(PersistError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let character = character_with_levels("dwarf", &["fighter", "cleric"]);
        store.save(&character).await.unwrap();
        assert_eq!(store.load(&character.id).await.unwrap(), character);
        assert!(store.snapshot().await.contains("\"version\": 1"));
    }
}

//! Character data loading.
//!
//! This module provides:
//! - Loading player and enemy records from a versioned TOML file
//! - Schema version checks
//! - Record validation on load

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use duskblade_common::{DuskbladeError, SchemaVersion};
use duskblade_gameplay::{EnemyData, GameplayError, PlayerData};

/// Default asset path for character data.
pub const DEFAULT_DATA_PATH: &str = "assets/data/characters.toml";

/// Errors that can occur during character data loading.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File not found.
    #[error("Character data file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read character data file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse character data TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The file was written by an incompatible schema.
    #[error(transparent)]
    Version(#[from] DuskbladeError),

    /// A record failed validation.
    #[error("Character data validation error: {0}")]
    Validation(#[from] GameplayError),
}

/// Result type for data loading operations.
pub type DataLoadResult<T> = Result<T, DataLoadError>;

/// Contents of a character data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDataFile {
    /// Schema the file was written against
    pub schema_version: SchemaVersion,
    /// Player tuning
    #[serde(default)]
    pub player: PlayerData,
    /// Enemy tuning by type name
    #[serde(default)]
    pub enemies: BTreeMap<String, EnemyData>,
}

impl Default for CharacterDataFile {
    fn default() -> Self {
        let mut enemies = BTreeMap::new();
        enemies.insert("grunt".to_owned(), EnemyData::default());
        Self {
            schema_version: SchemaVersion::CHARACTER_DATA,
            player: PlayerData::default(),
            enemies,
        }
    }
}

impl CharacterDataFile {
    /// Check the schema version and every record.
    pub fn validate(&self) -> DataLoadResult<()> {
        if !SchemaVersion::CHARACTER_DATA.can_read(&self.schema_version) {
            return Err(DuskbladeError::VersionMismatch {
                expected: SchemaVersion::CHARACTER_DATA,
                actual: self.schema_version,
            }
            .into());
        }
        self.player.validate()?;
        for (name, enemy) in &self.enemies {
            debug!("Validating enemy type {name}");
            enemy.validate()?;
        }
        Ok(())
    }
}

/// Loads character data files.
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Data file path.
    path: PathBuf,
}

impl DataLoader {
    /// Creates a loader for the given file.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads and validates the data file.
    pub fn load(&self) -> DataLoadResult<CharacterDataFile> {
        if !self.path.exists() {
            return Err(DataLoadError::NotFound(self.path.clone()));
        }
        let content = fs::read_to_string(&self.path)?;
        let data = Self::parse(&content)?;
        info!(
            "Loaded character data {} ({} enemy types) from {}",
            data.schema_version,
            data.enemies.len(),
            self.path.display()
        );
        Ok(data)
    }

    /// Parses and validates data file contents.
    pub fn parse(content: &str) -> DataLoadResult<CharacterDataFile> {
        let data: CharacterDataFile = toml::from_str(content)?;
        data.validate()?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[schema_version]
major = 1
minor = 0
patch = 0

[player]
max_health = 12
max_combo_count = 4

[player.normal_attack]
damage_tiers = [1, 2, 3, 5]
speed_modifier = 0.0
gravity_scale = 1.0

[enemies.grunt]
max_health = 8
disposition = "hostile"

[enemies.brute]
max_health = 30
stagger_threshold = 12
"#;

    #[test]
    fn test_parse_sample() {
        let data = DataLoader::parse(SAMPLE).unwrap();

        assert_eq!(data.player.max_health, 12);
        assert_eq!(data.player.normal_attack.damage_for(4), 5);
        // Unlisted fields fall back to defaults
        assert_eq!(data.player.move_speed, PlayerData::default().move_speed);

        let grunt = data.enemies.get("grunt").unwrap();
        assert_eq!(grunt.max_health, 8);
        assert_eq!(grunt.disposition, duskblade_gameplay::Disposition::Hostile);
        assert_eq!(data.enemies.get("brute").unwrap().stagger_threshold, 12);
        assert!(data.enemies.get("dragon").is_none());
    }

    #[test]
    fn test_rejects_future_major_version() {
        let content = SAMPLE.replace("major = 1", "major = 2");
        let err = DataLoader::parse(&content).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::Version(DuskbladeError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_record() {
        let content = SAMPLE.replace("max_health = 8", "max_health = 0");
        let err = DataLoader::parse(&content).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::Validation(GameplayError::InvalidData { record: "enemy", .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = DataLoader::parse("schema_version = [").unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("characters.toml");
        fs::write(&path, SAMPLE).expect("Failed to write");

        let data = DataLoader::new(&path).load().unwrap();
        assert_eq!(data.enemies.len(), 2);
    }

    #[test]
    fn test_shipped_data_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/data/characters.toml");
        let data = DataLoader::new(path).load().unwrap();

        assert_eq!(data.schema_version, SchemaVersion::CHARACTER_DATA);
        assert!(data.enemies.contains_key("ghoul"));
        assert!(data.enemies.contains_key("hound"));
    }

    #[test]
    fn test_missing_file() {
        let loader = DataLoader::new("/nonexistent/characters.toml");
        assert!(matches!(loader.load(), Err(DataLoadError::NotFound(_))));
    }

    #[test]
    fn test_default_file_round_trips() {
        let data = CharacterDataFile::default();
        let text = toml::to_string_pretty(&data).expect("serialize");
        assert_eq!(DataLoader::parse(&text).unwrap(), data);
    }
}

//! Validator configuration.
//!
//! Defines the YAML-serializable configuration that says where schema
//! definitions live and which options a validation pass uses.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! options:
//!   abort_early: false
//!   allow_unknown: true
//!   context:
//!     tier: premium
//! sources:
//!   directories:
//!     - schemas/
//!   bundles:
//!     - dist/schemas.json
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use value_schema_core::ValidationOptions;

use crate::error::Result;
use crate::loader::DatabaseBuilder;

/// Locations schema definitions are loaded from, in fallback order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Directories of definition files, tried first.
    pub directories: Vec<PathBuf>,
    /// Package bundle files, tried after the directories.
    pub bundles: Vec<PathBuf>,
}

impl SourcesConfig {
    /// Returns `true` if no source is configured.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.bundles.is_empty()
    }
}

/// Top-level validator configuration.
///
/// # Examples
///
/// ```
/// use value_schema_db::ValidatorConfig;
///
/// let yaml = r#"
/// version: "1.0"
/// options:
///   abort_early: false
/// sources:
///   directories: [schemas]
/// "#;
/// let config: ValidatorConfig = serde_yaml::from_str(yaml).unwrap();
/// assert!(!config.options.abort_early);
/// assert!(config.options.convert);
/// assert_eq!(config.sources.directories.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Options for every validation pass.
    #[serde(default)]
    pub options: ValidationOptions,
    /// Where definitions are loaded from.
    #[serde(default)]
    pub sources: SourcesConfig,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            options: ValidationOptions::default(),
            sources: SourcesConfig::default(),
        }
    }
}

impl ValidatorConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::DatabaseError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::DatabaseError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns a builder with every configured source, directories first.
    pub fn database_builder(&self) -> DatabaseBuilder {
        let builder = self
            .sources
            .directories
            .iter()
            .fold(DatabaseBuilder::new(), |builder, dir| builder.from_dir(dir));
        self.sources
            .bundles
            .iter()
            .fold(builder, |builder, bundle| builder.from_bundle(bundle))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use value_schema_core::Presence;

    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
options:
  abort_early: false
  convert: false
  strip_unknown: true
  presence: required
  context:
    tier: premium
sources:
  directories:
    - schemas
    - more-schemas
  bundles:
    - dist/schemas.json
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: ValidatorConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert!(!config.options.abort_early);
        assert!(!config.options.convert);
        assert!(config.options.strip_unknown);
        assert!(!config.options.allow_unknown);
        assert_eq!(config.options.presence, Presence::Required);
        assert_eq!(config.options.context.get("tier"), Some(&json!("premium")));
        assert_eq!(
            config.sources.directories,
            vec![PathBuf::from("schemas"), PathBuf::from("more-schemas")]
        );
        assert_eq!(config.sources.bundles, vec![PathBuf::from("dist/schemas.json")]);
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: ValidatorConfig = serde_yaml::from_str("version: \"1.0\"\n").unwrap();
        assert_eq!(config.options, ValidationOptions::default());
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_builder_without_sources_fails() {
        let config = ValidatorConfig::default();
        assert!(config.database_builder().build().is_err());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = std::env::temp_dir().join("vs_db_test_config_rt");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("validator.yml");

        let original: ValidatorConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = ValidatorConfig::load(&path).unwrap();
        assert_eq!(loaded, original);

        std::fs::remove_dir_all(&dir).ok();
    }
}

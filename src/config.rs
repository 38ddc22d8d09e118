//! Configuration management for card validation and export
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (card-schemas.toml)
//! - Environment variables (CARD_SCHEMAS__*)
//!
//! ## Example config file (card-schemas.toml):
//! ```toml
//! [validation]
//! id_prefix = "IMT"
//! idol_names = "strict"
//! subjects = ["everyone", "producer"]
//! deny_unknown_fields = false
//!
//! [files]
//! card_key = "card"
//! extension = "toml"
//!
//! [export]
//! output = "dist/card_data.json"
//! output_format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardsConfig {
    /// Card rule settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Data file layout
    #[serde(default)]
    pub files: FilesConfig,

    /// Bulk export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// How single-token idol names are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdolNamePolicy {
    /// At least two whitespace-separated tokens
    #[default]
    Strict,
    /// A single token is also accepted
    AllowSingle,
}

/// Validation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Required id prefix (e.g. "IMT"); any prefix of two or more letters when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_prefix: Option<String>,

    #[serde(default)]
    pub idol_names: IdolNamePolicy,

    /// Closed set of audience tags; any non-empty subject when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<String>>,

    /// Report keys that no card schema declares
    #[serde(default)]
    pub deny_unknown_fields: bool,
}

/// Data file layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Top-level key holding the array of cards
    #[serde(default = "default_card_key")]
    pub card_key: String,

    /// Extension of card data files when walking directories
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output file for the merged card list
    #[serde(default = "default_export_output")]
    pub output: PathBuf,

    /// Output format (pretty or compact)
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_card_key() -> String {
    "card".to_string()
}

fn default_extension() -> String {
    "toml".to_string()
}

fn default_export_output() -> PathBuf {
    PathBuf::from("dist/card_data.json")
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            card_key: default_card_key(),
            extension: default_extension(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: default_export_output(),
            output_format: OutputFormat::Pretty,
        }
    }
}

impl CardsConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally adding a required config file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "card-schemas.toml",
            ".card-schemas.toml",
            "config/card-schemas.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "cards", "card-schemas") {
            let xdg_config = config_dir.config_dir().join("card-schemas.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("CARD_SCHEMAS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

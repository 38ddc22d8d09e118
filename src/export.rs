//! Bulk export of card data
//!
//! Merges every card file in a directory into one JSON document of the form
//! `{"data": [...]}`, sorted by card id. Only fully valid data is exported,
//! and ids must be unique across the whole directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::card::Card;
use crate::config::OutputFormat;
use crate::error::{CardError, Result};
use crate::schema;
use crate::validate::CardValidator;

/// Merged card list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardExport {
    pub data: Vec<Card>,
}

/// Collect, validate and merge the card files directly inside `dir`
pub fn export_directory(
    dir: &Path,
    validator: &CardValidator,
    extension: &str,
) -> Result<CardExport> {
    if !dir.is_dir() {
        return Err(CardError::NoInput(dir.to_path_buf()));
    }

    let mut cards = Vec::new();
    let mut origins: HashMap<String, PathBuf> = HashMap::new();

    for entry in walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map(|x| x == extension).unwrap_or(false))
    {
        let path = entry.path();
        debug!(file = %path.display(), "reading card file");

        let content = fs::read_to_string(path)?;
        let document: toml::Value = toml::from_str(&content)?;

        let report = validator.validate_document(path, &document);
        if !report.is_clean() {
            return Err(CardError::InvalidCards {
                file: path.to_path_buf(),
                count: report.errors.len(),
            });
        }

        let records = document
            .get(validator.card_key())
            .and_then(toml::Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for table in records.iter().filter_map(toml::Value::as_table) {
            let card = Card::from_table(table)?;
            let dropped = dropped_fields(table);
            if !dropped.is_empty() {
                warn!(
                    file = %path.display(),
                    id = %card.id,
                    fields = ?dropped,
                    "fields outside the card schema are not exported"
                );
            }
            if let Some(first) = origins.get(&card.id) {
                return Err(CardError::DuplicateAcrossCorpus {
                    id: card.id,
                    first: first.clone(),
                    second: path.to_path_buf(),
                });
            }
            origins.insert(card.id.clone(), path.to_path_buf());
            cards.push(card);
        }
    }

    cards.sort_by(|a, b| a.id.cmp(&b.id));
    info!(dir = %dir.display(), cards = cards.len(), "merged card data");

    Ok(CardExport { data: cards })
}

/// Keys of a record that the typed card model does not carry
fn dropped_fields(table: &toml::Table) -> Vec<&str> {
    table
        .keys()
        .map(String::as_str)
        .filter(|key| !schema::is_known_field(key))
        .collect()
}

/// Write the merged card list as JSON, creating parent directories
pub fn write_export(export: &CardExport, path: &Path, format: OutputFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let content = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(export)?,
        OutputFormat::Compact => serde_json::to_string(export)?,
    };
    fs::write(path, content)?;

    info!(file = %path.display(), cards = export.data.len(), "wrote card export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COSTUME: &str = r#"
[[card]]
id = "IMT-01-002"
name = "Stage Dress"
idol = "Haruka Amami"
rarity = "SSR"
text = ""
type = "costume"
subject = "everyone"
appeal = { vocal = 100, dance = 80, visual = 120 }

[[card]]
id = "IMT-01-001"
name = "Casual Wear"
idol = "Haruka Amami"
rarity = "N"
text = ""
type = "costume"
subject = "everyone"
appeal = { vocal = 10, dance = 10, visual = 10 }
"#;

    const ACCESSORY: &str = r#"
[[card]]
id = "IMT-00-500"
name = "Ribbon"
idol = "Yayoi Takatsuki"
rarity = "R"
text = ""
type = "accessory"
subject = "everyone"
body_part = "head"
"#;

    #[test]
    fn test_export_sorted_by_id() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("costume.toml"), COSTUME).unwrap();
        fs::write(dir.path().join("accessory.toml"), ACCESSORY).unwrap();
        fs::write(dir.path().join("README.md"), "not cards").unwrap();

        let export = export_directory(dir.path(), &CardValidator::default(), "toml").unwrap();
        let ids: Vec<_> = export.data.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["IMT-00-500", "IMT-01-001", "IMT-01-002"]);
    }

    #[test]
    fn test_export_rejects_cross_file_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.toml"), ACCESSORY).unwrap();
        fs::write(dir.path().join("b.toml"), ACCESSORY).unwrap();

        let err = export_directory(dir.path(), &CardValidator::default(), "toml").unwrap_err();
        match err {
            CardError::DuplicateAcrossCorpus { id, first, second } => {
                assert_eq!(id, "IMT-00-500");
                assert_eq!(first, dir.path().join("a.toml"));
                assert_eq!(second, dir.path().join("b.toml"));
            }
            other => panic!("Expected DuplicateAcrossCorpus, got {:?}", other),
        }
    }

    #[test]
    fn test_export_rejects_invalid_cards() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("bad.toml"),
            ACCESSORY.replace("body_part = \"head\"", "body_part = \"tail\""),
        )
        .unwrap();

        let err = export_directory(dir.path(), &CardValidator::default(), "toml").unwrap_err();
        assert!(matches!(err, CardError::InvalidCards { count: 1, .. }));
    }

    #[test]
    fn test_export_drops_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let content = ACCESSORY.replace(
            "body_part = \"head\"",
            "body_part = \"head\"\nillustrator = \"Ritsuko\"",
        );
        fs::write(dir.path().join("accessory.toml"), &content).unwrap();

        let document: toml::Table = content.parse().unwrap();
        let records = document.get("card").and_then(toml::Value::as_array).unwrap();
        let record = records[0].as_table().unwrap();
        assert_eq!(dropped_fields(record), vec!["illustrator"]);

        let export = export_directory(dir.path(), &CardValidator::default(), "toml").unwrap();
        let json = serde_json::to_value(&export).unwrap();
        assert!(json["data"][0].get("illustrator").is_none());
    }

    #[test]
    fn test_export_rejects_values_validation_rejects() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("costume.toml"),
            COSTUME.replace("vocal = 100", "vocal = 5000000000"),
        )
        .unwrap();

        let err = export_directory(dir.path(), &CardValidator::default(), "toml").unwrap_err();
        assert!(matches!(err, CardError::InvalidCards { count: 1, .. }));
    }

    #[test]
    fn test_export_missing_dir() {
        let err = export_directory(
            Path::new("/definitely/not/here"),
            &CardValidator::default(),
            "toml",
        )
        .unwrap_err();
        assert!(matches!(err, CardError::NoInput(_)));
    }

    #[test]
    fn test_write_export() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("accessory.toml"), ACCESSORY).unwrap();
        let export = export_directory(dir.path(), &CardValidator::default(), "toml").unwrap();

        let output = dir.path().join("dist/card_data.json");
        write_export(&export, &output, OutputFormat::Compact).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["data"][0]["id"], "IMT-00-500");
        assert_eq!(written["data"][0]["body_part"], "head");

        let round: CardExport = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(round, export);
    }
}

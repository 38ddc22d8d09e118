//! Card file validation
//!
//! [`CardValidator`] holds the compiled rules and is shared read-only
//! across any number of files. Validation never fails: every problem,
//! including unreadable or undecodable files, comes back as a
//! [`ValidationError`] in a [`FileReport`].
//!
//! ## Pipeline
//!
//! ```text
//! path ──read──▶ text ──toml──▶ document ──file──▶ record ──registry──▶ payload
//!   │              │               │                 │
//!   FileNotFound   DecodeError     structural        field / identity
//! ```

mod file;
mod record;

use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::{CardsConfig, IdolNamePolicy};
use crate::error::Result;
use crate::report::{ErrorKind, FileReport, Location, ValidationError};

/// Id prefix accepted when no prefix is configured
const ANY_PREFIX: &str = "[A-Z]{2,}";

/// Validator for card records and card files
#[derive(Debug, Clone)]
pub struct CardValidator {
    /// Case-insensitive, ASCII-only `PREFIX-NN-NNN`; case is checked separately
    id_pattern: Regex,
    idol_names: IdolNamePolicy,
    subjects: Option<Vec<String>>,
    deny_unknown_fields: bool,
    card_key: String,
}

impl Default for CardValidator {
    fn default() -> Self {
        Self::new(&CardsConfig::default()).expect("default id pattern is valid")
    }
}

impl CardValidator {
    pub fn new(config: &CardsConfig) -> Result<Self> {
        let prefix = config
            .validation
            .id_prefix
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(regex::escape)
            .unwrap_or_else(|| ANY_PREFIX.to_string());
        let id_pattern = Regex::new(&format!("(?i-u)^{}-[0-9]{{2}}-[0-9]{{3}}$", prefix))?;

        Ok(Self {
            id_pattern,
            idol_names: config.validation.idol_names,
            subjects: config.validation.subjects.clone(),
            deny_unknown_fields: config.validation.deny_unknown_fields,
            card_key: config.files.card_key.clone(),
        })
    }

    /// Top-level key that holds the card array
    pub fn card_key(&self) -> &str {
        &self.card_key
    }

    /// Read, decode and validate one file
    pub fn validate_file(&self, path: &Path) -> FileReport {
        debug!(file = %path.display(), "validating card file");

        if !path.is_file() {
            warn!(file = %path.display(), "card file not found");
            return FileReport::rejected(
                path,
                Location::Document,
                ErrorKind::FileNotFound {
                    reason: "no such file".to_string(),
                },
            );
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "card file not readable");
                return FileReport::rejected(
                    path,
                    Location::Document,
                    ErrorKind::FileNotFound {
                        reason: e.to_string(),
                    },
                );
            }
        };

        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "card file is not valid UTF-8");
                let offset = e.utf8_error().valid_up_to();
                return FileReport::rejected(
                    path,
                    Location::Line(line_of(e.as_bytes(), offset)),
                    ErrorKind::DecodeError {
                        message: e.utf8_error().to_string(),
                    },
                );
            }
        };

        match toml::from_str::<toml::Value>(&content) {
            Ok(document) => self.validate_document(path, &document),
            Err(e) => {
                warn!(file = %path.display(), error = %e.message(), "card file is not valid TOML");
                let location = e
                    .span()
                    .map(|span| Location::Line(line_of(content.as_bytes(), span.start)))
                    .unwrap_or(Location::Document);
                FileReport::rejected(
                    path,
                    location,
                    ErrorKind::DecodeError {
                        message: e.message().to_string(),
                    },
                )
            }
        }
    }

    /// Validate every path in order, one report per path
    pub fn validate_paths<I, P>(&self, paths: I) -> Vec<FileReport>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .map(|path| self.validate_file(path.as_ref()))
            .collect()
    }

    /// Validate every path, keyed by path
    pub fn validate_files<I, P>(&self, paths: I) -> BTreeMap<PathBuf, Vec<ValidationError>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut results: BTreeMap<PathBuf, Vec<ValidationError>> = BTreeMap::new();
        for report in self.validate_paths(paths) {
            results.entry(report.file).or_default().extend(report.errors);
        }
        results
    }
}

/// Expand directories into the card files beneath them.
///
/// Files are passed through untouched (missing ones are reported later as
/// `FileNotFound`). Directory contents are sorted for stable output.
pub fn discover_files(paths: &[PathBuf], extension: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        for entry in walkdir::WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().map(|x| x == extension).unwrap_or(false))
        {
            files.push(entry.into_path());
        }
    }

    files
}

fn line_of(content: &[u8], offset: usize) -> usize {
    let end = offset.min(content.len());
    content[..end].iter().filter(|b| **b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;

    #[test]
    fn test_configured_prefix() {
        let config = CardsConfig {
            validation: ValidationConfig {
                id_prefix: Some("IMT".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let validator = CardValidator::new(&config).unwrap();
        assert!(validator.id_pattern.is_match("IMT-01-001"));
        assert!(validator.id_pattern.is_match("imt-01-001"));
        assert!(!validator.id_pattern.is_match("ABC-01-001"));
    }

    #[test]
    fn test_default_prefix() {
        let validator = CardValidator::default();
        assert!(validator.id_pattern.is_match("IMT-01-001"));
        assert!(validator.id_pattern.is_match("SC-12-345"));
        assert!(!validator.id_pattern.is_match("X-01-001"));
        assert!(!validator.id_pattern.is_match("IMT-1-001"));
        assert!(!validator.id_pattern.is_match("IMT-01-0010"));
    }

    #[test]
    fn test_ascii_only_prefix() {
        let validator = CardValidator::default();
        assert!(!validator.id_pattern.is_match("\u{212A}\u{212A}-01-001"));
        assert!(!validator.id_pattern.is_match("\u{17F}C-01-001"));
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.toml");
        fs::write(&path, b"# cards\ncard = [\xff]\n").unwrap();

        let report = CardValidator::default().validate_file(&path);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind.code(), "DECODE_ERROR");
        assert_eq!(report.errors[0].location, Location::Line(2));
    }

    #[test]
    fn test_line_of() {
        let content = b"a = 1\nb = \nc = 3\n";
        assert_eq!(line_of(content, 0), 1);
        assert_eq!(line_of(content, 8), 2);
        assert_eq!(line_of(content, 1000), 4);
    }

    #[test]
    fn test_discover_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.toml"), "card = []").unwrap();
        fs::write(dir.path().join("a.toml"), "card = []").unwrap();
        fs::write(dir.path().join("notes.md"), "# notes").unwrap();
        let missing = dir.path().join("missing.toml");

        let files = discover_files(&[dir.path().to_path_buf(), missing.clone()], "toml");
        assert_eq!(
            files,
            vec![dir.path().join("a.toml"), dir.path().join("b.toml"), missing]
        );
    }
}

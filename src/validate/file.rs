//! Document-level validation
//!
//! Checks the document shape, walks the card array in order, tracks ids for
//! duplicate detection, and annotates record findings with file, position
//! and card id.

use std::collections::HashMap;
use std::path::Path;
use toml::Value;
use tracing::{debug, info};

use super::CardValidator;
use crate::report::{DocumentOutcome, ErrorKind, FileReport, Location, ValidationError};
use crate::schema::ID_FIELD;

impl CardValidator {
    /// Validate a decoded document.
    ///
    /// `file` is only used to label findings; nothing is read from disk.
    pub fn validate_document(&self, file: &Path, document: &Value) -> FileReport {
        let mut report = FileReport::new(file);

        let Some(root) = document.as_table() else {
            report.errors.push(ValidationError::document(
                file,
                Location::Document,
                ErrorKind::RootNotATable {
                    actual: document.type_str().to_string(),
                },
            ));
            return report;
        };

        let Some(records) = root.get(&self.card_key).and_then(Value::as_array) else {
            report.errors.push(ValidationError::document(
                file,
                Location::Document,
                ErrorKind::MissingCardArray {
                    key: self.card_key.clone(),
                    found_keys: root.keys().cloned().collect(),
                },
            ));
            return report;
        };

        if records.is_empty() {
            info!(file = %file.display(), "no cards declared");
            report.outcome = DocumentOutcome::Empty;
            return report;
        }

        // id -> 1-based position of its first occurrence
        let mut seen: HashMap<&str, usize> = HashMap::new();

        for (index, entry) in records.iter().enumerate() {
            let location = Location::Record(index + 1);

            let Some(record) = entry.as_table() else {
                report.errors.push(ValidationError::document(
                    file,
                    location,
                    ErrorKind::InvalidRecordShape {
                        actual: entry.type_str().to_string(),
                    },
                ));
                continue;
            };

            let card_id = record.get(ID_FIELD).and_then(Value::as_str);
            debug!(file = %file.display(), %location, id = ?card_id, "validating card");

            if let Some(id) = card_id {
                if let Some(&first_seen) = seen.get(id) {
                    report.errors.push(ValidationError {
                        file: file.to_path_buf(),
                        location,
                        card_id: Some(id.to_string()),
                        field: Some(ID_FIELD.to_string()),
                        kind: ErrorKind::DuplicateCardId {
                            id: id.to_string(),
                            first_seen,
                        },
                    });
                } else {
                    seen.insert(id, index + 1);
                }
            }

            report
                .errors
                .extend(self.validate_card(record).into_iter().map(|error| ValidationError {
                    file: file.to_path_buf(),
                    location,
                    card_id: card_id.map(String::from),
                    field: error.field,
                    kind: error.kind,
                }));
        }

        report.outcome = DocumentOutcome::Records(records.len());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(src: &str) -> Value {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn test_root_not_a_table() {
        let report = CardValidator::default()
            .validate_document(Path::new("x.toml"), &Value::Array(Vec::new()));
        assert_eq!(report.outcome, DocumentOutcome::Rejected);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].kind,
            ErrorKind::RootNotATable {
                actual: "array".into()
            }
        );
    }

    #[test]
    fn test_missing_card_array_lists_keys() {
        let doc = document("title = \"set 1\"\n[[cards]]\nid = \"IMT-01-001\"\n");
        let report = CardValidator::default().validate_document(Path::new("x.toml"), &doc);
        assert_eq!(report.outcome, DocumentOutcome::Rejected);
        assert_eq!(
            report.errors[0].kind,
            ErrorKind::MissingCardArray {
                key: "card".into(),
                found_keys: vec!["cards".into(), "title".into()],
            }
        );
    }

    #[test]
    fn test_card_key_not_an_array() {
        let doc = document("card = \"nope\"\n");
        let report = CardValidator::default().validate_document(Path::new("x.toml"), &doc);
        assert_eq!(report.errors[0].kind.code(), "MISSING_CARD_ARRAY");
    }

    #[test]
    fn test_empty_card_array() {
        let doc = document("card = []\n");
        let report = CardValidator::default().validate_document(Path::new("x.toml"), &doc);
        assert!(report.is_clean());
        assert_eq!(report.outcome, DocumentOutcome::Empty);
    }

    #[test]
    fn test_non_table_entries_skipped() {
        let doc = document("card = [1, \"two\"]\n");
        let report = CardValidator::default().validate_document(Path::new("x.toml"), &doc);
        assert_eq!(report.outcome, DocumentOutcome::Records(2));
        let locations: Vec<_> = report.errors.iter().map(|e| e.location).collect();
        assert_eq!(locations, vec![Location::Record(1), Location::Record(2)]);
        assert!(report
            .errors
            .iter()
            .all(|e| e.kind.code() == "INVALID_RECORD_SHAPE"));
    }

    #[test]
    fn test_missing_id_still_validated() {
        let doc = document(
            r#"
            [[card]]
            name = "Stage Dress"
            idol = "Haruka Amami"
            rarity = "SSR"
            text = ""
            type = "costume"
            subject = "everyone"
            "#,
        );
        let report = CardValidator::default().validate_document(Path::new("x.toml"), &doc);
        let codes: Vec<_> = report.errors.iter().map(|e| e.kind.code()).collect();
        assert_eq!(codes, vec!["MISSING_ID_FIELD", "MISSING_FIELD"]);
        assert!(report.errors.iter().all(|e| e.card_id.is_none()));
    }
}

//! Validation findings
//!
//! Every problem found in a card file becomes a [`ValidationError`] value.
//! Nothing is thrown across record or file boundaries.

use serde_json::json;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::schema::CardType;

/// Broad class of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Document shape is wrong; the file or record was not checked further
    Structural,
    /// Card identifier problems
    Identity,
    /// Field presence, type and value problems
    Field,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Structural => "structural",
            ErrorCategory::Identity => "identity",
            ErrorCategory::Field => "field",
        }
    }
}

/// Which half of the id rule was broken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdViolation {
    /// Does not match `PREFIX-NN-NNN`
    Pattern,
    /// Not entirely uppercase
    Case,
}

impl IdViolation {
    fn describe(&self) -> &'static str {
        match self {
            IdViolation::Pattern => "does not match PREFIX-NN-NNN",
            IdViolation::Case => "must be uppercase",
        }
    }
}

/// What went wrong
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("document root must be a table, got {actual}")]
    RootNotATable { actual: String },

    #[error("no array of cards under '{key}' (top-level keys: [{}])", .found_keys.join(", "))]
    MissingCardArray { key: String, found_keys: Vec<String> },

    #[error("card entry must be a table, got {actual}")]
    InvalidRecordShape { actual: String },

    #[error("could not decode file: {message}")]
    DecodeError { message: String },

    #[error("file not found or not readable: {reason}")]
    FileNotFound { reason: String },

    #[error("card has no 'id' field")]
    MissingIdField,

    #[error("card id '{id}' {}", .violation.describe())]
    InvalidIdFormat {
        id: String,
        violation: IdViolation,
    },

    #[error("card id '{id}' is already used by card #{first_seen}")]
    DuplicateCardId { id: String, first_seen: usize },

    #[error("required field is missing")]
    MissingField,

    #[error("expected {expected}, got '{actual}'")]
    InvalidValue { expected: String, actual: String },

    #[error("field is not allowed on {card_type} cards")]
    DisallowedField { card_type: CardType },

    #[error("idol name '{value}' must be 'FirstName LastName'")]
    InvalidIdolNameFormat { value: String },

    #[error("unknown card type '{value}'")]
    UnknownCardType { value: String },

    #[error("card has no 'type' field")]
    MissingTypeField,

    #[error("field is not part of any card schema")]
    UnknownField,
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::RootNotATable { .. }
            | ErrorKind::MissingCardArray { .. }
            | ErrorKind::InvalidRecordShape { .. }
            | ErrorKind::DecodeError { .. }
            | ErrorKind::FileNotFound { .. } => ErrorCategory::Structural,
            ErrorKind::MissingIdField
            | ErrorKind::InvalidIdFormat { .. }
            | ErrorKind::DuplicateCardId { .. } => ErrorCategory::Identity,
            _ => ErrorCategory::Field,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::RootNotATable { .. } => "ROOT_NOT_A_TABLE",
            ErrorKind::MissingCardArray { .. } => "MISSING_CARD_ARRAY",
            ErrorKind::InvalidRecordShape { .. } => "INVALID_RECORD_SHAPE",
            ErrorKind::DecodeError { .. } => "DECODE_ERROR",
            ErrorKind::FileNotFound { .. } => "FILE_NOT_FOUND",
            ErrorKind::MissingIdField => "MISSING_ID_FIELD",
            ErrorKind::InvalidIdFormat { violation: IdViolation::Pattern, .. } => "INVALID_ID_FORMAT",
            ErrorKind::InvalidIdFormat { violation: IdViolation::Case, .. } => "ID_NOT_UPPERCASE",
            ErrorKind::DuplicateCardId { .. } => "DUPLICATE_CARD_ID",
            ErrorKind::MissingField => "MISSING_FIELD",
            ErrorKind::InvalidValue { .. } => "INVALID_VALUE",
            ErrorKind::DisallowedField { .. } => "DISALLOWED_FIELD",
            ErrorKind::InvalidIdolNameFormat { .. } => "INVALID_IDOL_NAME_FORMAT",
            ErrorKind::UnknownCardType { .. } => "UNKNOWN_CARD_TYPE",
            ErrorKind::MissingTypeField => "MISSING_TYPE_FIELD",
            ErrorKind::UnknownField => "UNKNOWN_FIELD",
        }
    }

    /// The offending value, when the finding has one
    pub fn value(&self) -> Option<&str> {
        match self {
            ErrorKind::RootNotATable { actual }
            | ErrorKind::InvalidRecordShape { actual }
            | ErrorKind::InvalidValue { actual, .. } => Some(actual.as_str()),
            ErrorKind::InvalidIdFormat { id, .. } | ErrorKind::DuplicateCardId { id, .. } => {
                Some(id.as_str())
            }
            ErrorKind::InvalidIdolNameFormat { value } | ErrorKind::UnknownCardType { value } => {
                Some(value.as_str())
            }
            _ => None,
        }
    }
}

/// Where in a file a finding was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// The file as a whole
    Document,
    /// 1-based source line (decode failures)
    Line(usize),
    /// 1-based position in the card array
    Record(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Document => write!(f, "document"),
            Location::Line(line) => write!(f, "line {}", line),
            Location::Record(index) => write!(f, "card #{}", index),
        }
    }
}

/// A finding from the record validator, before file annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted field path, e.g. `appeal.vocal` or `support_skill.live_type[1]`
    pub field: Option<String>,
    pub kind: ErrorKind,
}

impl FieldError {
    pub fn new(field: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            field: Some(field.into()),
            kind,
        }
    }
}

/// A fully annotated finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub file: PathBuf,
    pub location: Location,
    pub card_id: Option<String>,
    pub field: Option<String>,
    pub kind: ErrorKind,
}

impl ValidationError {
    /// A finding about the file itself
    pub fn document(file: &Path, location: Location, kind: ErrorKind) -> Self {
        Self {
            file: file.to_path_buf(),
            location,
            card_id: None,
            field: None,
            kind,
        }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "code": self.kind.code(),
            "category": self.kind.category().as_str(),
            "file": self.file.display().to_string(),
            "location": self.location.to_string(),
            "card_id": self.card_id,
            "field": self.field,
            "message": self.message(),
            "value": self.kind.value(),
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.file.display(), self.location)?;
        if let Some(id) = &self.card_id {
            write!(f, ", {}", id)?;
        }
        if let Some(field) = &self.field {
            write!(f, ", {}", field)?;
        }
        write!(f, ": {}", self.kind)
    }
}

/// How far validation of a document got
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// The card array was walked; holds the number of entries
    Records(usize),
    /// The card array exists but is empty
    Empty,
    /// The file could not be read, decoded, or has the wrong shape
    Rejected,
}

/// Result of validating one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file: PathBuf,
    pub outcome: DocumentOutcome,
    pub errors: Vec<ValidationError>,
}

impl FileReport {
    pub fn new(file: &Path) -> Self {
        Self {
            file: file.to_path_buf(),
            outcome: DocumentOutcome::Rejected,
            errors: Vec::new(),
        }
    }

    /// A report holding a single structural finding
    pub fn rejected(file: &Path, location: Location, kind: ErrorKind) -> Self {
        let mut report = Self::new(file);
        report
            .errors
            .push(ValidationError::document(file, location, kind));
        report
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let (outcome, records) = match self.outcome {
            DocumentOutcome::Records(n) => ("validated", n),
            DocumentOutcome::Empty => ("empty", 0),
            DocumentOutcome::Rejected => ("rejected", 0),
        };
        json!({
            "file": self.file.display().to_string(),
            "outcome": outcome,
            "records": records,
            "errors": self.errors.iter().map(ValidationError::to_json).collect::<Vec<_>>(),
        })
    }
}

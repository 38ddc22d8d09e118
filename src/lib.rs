//! Card Schemas
//!
//! Schema validation for trading-card data files. Each TOML file declares
//! cards under an array of tables; every card is checked against the schema
//! for its `type`, and every violation is reported rather than just the
//! first.
//!
//! ## Features
//!
//! - **Schema Registry**: static field contract per card type
//! - **Record Validation**: base fields, id format, idol names, typed payloads
//! - **File Validation**: document shape, duplicate ids, annotated findings
//! - **Bulk Export**: merge validated files into one sorted JSON document
//!
//! ## Data layout
//!
//! ```text
//! card_data/
//! ├── costume.toml      [[card]] id = "IMT-01-001" type = "costume" ...
//! ├── accessory.toml
//! ├── support.toml
//! └── sp_appeal.toml
//! dist/
//! └── card_data.json    {"data": [...]}
//! ```

pub mod card;
pub mod config;
pub mod error;
pub mod export;
pub mod report;
pub mod schema;
pub mod validate;

pub use card::{Card, CardKind};
pub use config::{CardsConfig, IdolNamePolicy, OutputFormat};
pub use error::{CardError, Result};
pub use export::{export_directory, write_export, CardExport};
pub use report::{
    DocumentOutcome, ErrorCategory, ErrorKind, FieldError, FileReport, Location, ValidationError,
};
pub use schema::{CardSchema, CardType};
pub use validate::{discover_files, CardValidator};

//! Card schema registry
//!
//! A static table mapping each card type discriminant to its field
//! contract. Validators interpret [`Rule`] trees generically, so adding a
//! card type means adding a [`CardType`] variant, its match arm in
//! [`CardType::schema`], and a payload rule. Forbidden fields are derived
//! from the other types' payloads and never listed by hand.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the discriminant field on every card
pub const TYPE_FIELD: &str = "type";

/// Name of the identifier field on every card
pub const ID_FIELD: &str = "id";

/// Name of the idol (owner) field on every card
pub const IDOL_FIELD: &str = "idol";

/// Name of the audience field on every card
pub const SUBJECT_FIELD: &str = "subject";

pub const RARITIES: &[&str] = &["N", "R", "SR", "SSR"];
pub const BODY_PARTS: &[&str] = &["head", "face", "hand", "body", "waist", "leg"];
pub const LIVE_TYPES: &[&str] = &["rhythm", "create"];

/// Value constraint for a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Any string
    Text,
    /// String with at least one non-whitespace character
    NonEmptyText,
    /// Integer that fits a `u32`
    UInt,
    /// String drawn from a closed set
    OneOf(&'static [&'static str]),
    /// Array whose elements all satisfy `item`
    List {
        item: &'static Rule,
        non_empty: bool,
    },
    /// Nested table with required fields
    Table(&'static [FieldSpec]),
}

impl Rule {
    /// Human-readable description used as the "expected" side of errors
    pub fn describe(&self) -> String {
        match self {
            Rule::Text => "string".to_string(),
            Rule::NonEmptyText => "non-empty string".to_string(),
            Rule::UInt => format!("integer in 0..={}", u32::MAX),
            Rule::OneOf(allowed) => format!("one of [{}]", allowed.join(", ")),
            Rule::List { item, non_empty: true } => {
                format!("non-empty array of {}", item.describe())
            }
            Rule::List { item, non_empty: false } => format!("array of {}", item.describe()),
            Rule::Table(_) => "table".to_string(),
        }
    }
}

/// A named field and its rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rule: Rule,
}

impl FieldSpec {
    pub const fn new(name: &'static str, rule: Rule) -> Self {
        Self { name, rule }
    }
}

/// Fields every card carries regardless of type.
///
/// `type` is excluded; it is resolved separately through [`resolve`].
pub const BASE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(ID_FIELD, Rule::Text),
    FieldSpec::new("name", Rule::NonEmptyText),
    FieldSpec::new(IDOL_FIELD, Rule::Text),
    FieldSpec::new("rarity", Rule::OneOf(RARITIES)),
    FieldSpec::new("text", Rule::Text),
    FieldSpec::new(SUBJECT_FIELD, Rule::NonEmptyText),
];

const APPEAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("vocal", Rule::UInt),
    FieldSpec::new("dance", Rule::UInt),
    FieldSpec::new("visual", Rule::UInt),
];

const SUPPORT_SKILL_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "live_type",
        Rule::List {
            item: &Rule::OneOf(LIVE_TYPES),
            non_empty: true,
        },
    ),
    FieldSpec::new(
        "description",
        Rule::List {
            item: &Rule::Text,
            non_empty: true,
        },
    ),
];

const SP_APPEAL_FIELDS: &[FieldSpec] = &[FieldSpec::new(
    "effect",
    Rule::List {
        item: &Rule::Text,
        non_empty: true,
    },
)];

static COSTUME: CardSchema = CardSchema {
    card_type: CardType::Costume,
    required: &[FieldSpec::new("appeal", Rule::Table(APPEAL_FIELDS))],
};

static ACCESSORY: CardSchema = CardSchema {
    card_type: CardType::Accessory,
    required: &[FieldSpec::new("body_part", Rule::OneOf(BODY_PARTS))],
};

static SUPPORT: CardSchema = CardSchema {
    card_type: CardType::Support,
    required: &[FieldSpec::new(
        "support_skill",
        Rule::Table(SUPPORT_SKILL_FIELDS),
    )],
};

static SP_APPEAL: CardSchema = CardSchema {
    card_type: CardType::SpAppeal,
    required: &[FieldSpec::new("sp_appeal", Rule::Table(SP_APPEAL_FIELDS))],
};

/// Card type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Costume,
    Accessory,
    Support,
    SpAppeal,
}

impl CardType {
    /// Every registered card type
    pub const ALL: [CardType; 4] = [
        CardType::Costume,
        CardType::Accessory,
        CardType::Support,
        CardType::SpAppeal,
    ];

    /// The tag as written in data files
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Costume => "costume",
            CardType::Accessory => "accessory",
            CardType::Support => "support",
            CardType::SpAppeal => "sp_appeal",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// The field contract for this type
    pub fn schema(&self) -> &'static CardSchema {
        match self {
            CardType::Costume => &COSTUME,
            CardType::Accessory => &ACCESSORY,
            CardType::Support => &SUPPORT,
            CardType::SpAppeal => &SP_APPEAL,
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field contract for one card type
#[derive(Debug, PartialEq, Eq)]
pub struct CardSchema {
    pub card_type: CardType,
    /// Type-specific fields that must be present
    pub required: &'static [FieldSpec],
}

impl CardSchema {
    pub fn requires(&self, field: &str) -> bool {
        self.required.iter().any(|f| f.name == field)
    }

    /// Payload fields of every other type, which must be absent here
    pub fn forbidden_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        CardType::ALL
            .into_iter()
            .filter(move |t| *t != self.card_type)
            .flat_map(|t| t.schema().required.iter().map(|f| f.name))
            .filter(move |name| !self.requires(name))
    }
}

/// Why a record's discriminant could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeResolution {
    /// `type` absent or blank
    Missing,
    /// `type` present but not a registered tag
    Unknown(String),
}

/// Resolve a record's `type` value against the registry
pub fn resolve(value: Option<&toml::Value>) -> Result<&'static CardSchema, TypeResolution> {
    match value {
        None => Err(TypeResolution::Missing),
        Some(toml::Value::String(tag)) if tag.trim().is_empty() => Err(TypeResolution::Missing),
        Some(toml::Value::String(tag)) => CardType::from_tag(tag)
            .map(|t| t.schema())
            .ok_or_else(|| TypeResolution::Unknown(tag.clone())),
        Some(other) => Err(TypeResolution::Unknown(other.to_string())),
    }
}

/// Whether `field` is declared anywhere in the registry
pub fn is_known_field(field: &str) -> bool {
    field == TYPE_FIELD
        || BASE_FIELDS.iter().any(|f| f.name == field)
        || CardType::ALL.iter().any(|t| t.schema().requires(field))
}

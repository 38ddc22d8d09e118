//! Typed card model
//!
//! [`CardKind`] is internally tagged on `type`, and each variant carries only
//! its own payload. A decoded [`Card`] therefore cannot hold another type's
//! field. Decode records into this model only after they pass validation;
//! validation is what reports every problem with a raw record.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::CardType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rarity {
    N,
    R,
    #[serde(rename = "SR")]
    Sr,
    #[serde(rename = "SSR")]
    Ssr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyPart {
    Head,
    Face,
    Hand,
    Body,
    Waist,
    Leg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveType {
    Rhythm,
    Create,
}

/// Stat block for costume cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appeal {
    pub vocal: u32,
    pub dance: u32,
    pub visual: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportSkill {
    pub live_type: Vec<LiveType>,
    pub description: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpAppealEffect {
    pub effect: Vec<String>,
}

/// Type discriminant plus the matching payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardKind {
    Costume { appeal: Appeal },
    Accessory { body_part: BodyPart },
    Support { support_skill: SupportSkill },
    SpAppeal { sp_appeal: SpAppealEffect },
}

/// A single card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub idol: String,
    pub rarity: Rarity,
    pub text: String,
    pub subject: String,
    #[serde(flatten)]
    pub kind: CardKind,
}

impl Card {
    /// Decode a record that has already passed validation
    pub fn from_table(table: &toml::Table) -> Result<Self> {
        let card: Card = toml::Value::Table(table.clone()).try_into()?;
        Ok(card)
    }

    pub fn card_type(&self) -> CardType {
        match self.kind {
            CardKind::Costume { .. } => CardType::Costume,
            CardKind::Accessory { .. } => CardType::Accessory,
            CardKind::Support { .. } => CardType::Support,
            CardKind::SpAppeal { .. } => CardType::SpAppeal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> toml::Table {
        src.parse().unwrap()
    }

    #[test]
    fn test_decode_costume() {
        let card = Card::from_table(&table(
            r#"
            id = "IMT-01-001"
            name = "Stage Dress"
            idol = "Haruka Amami"
            rarity = "SSR"
            text = "..."
            type = "costume"
            subject = "everyone"
            appeal = { vocal = 100, dance = 80, visual = 120 }
            "#,
        ))
        .unwrap();

        assert_eq!(card.card_type(), CardType::Costume);
        assert_eq!(card.rarity, Rarity::Ssr);
        assert_eq!(
            card.kind,
            CardKind::Costume {
                appeal: Appeal { vocal: 100, dance: 80, visual: 120 }
            }
        );
    }

    #[test]
    fn test_decode_support() {
        let card = Card::from_table(&table(
            r#"
            id = "IMT-02-010"
            name = "Cheer"
            idol = "Chihaya Kisaragi"
            rarity = "R"
            text = ""
            type = "support"
            subject = "everyone"
            [support_skill]
            live_type = ["rhythm", "create"]
            description = ["Boosts rhythm"]
            "#,
        ))
        .unwrap();

        match card.kind {
            CardKind::Support { support_skill } => {
                assert_eq!(support_skill.live_type, vec![LiveType::Rhythm, LiveType::Create]);
            }
            other => panic!("Expected Support, got {:?}", other),
        }
    }

    #[test]
    fn test_json_shape_is_flat() {
        let card = Card {
            id: "IMT-01-003".into(),
            name: "Ribbon".into(),
            idol: "Yayoi Takatsuki".into(),
            rarity: Rarity::N,
            text: String::new(),
            subject: "everyone".into(),
            kind: CardKind::Accessory { body_part: BodyPart::Head },
        };
        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["type"], "accessory");
        assert_eq!(value["body_part"], "head");
        assert!(value.get("appeal").is_none());
    }

    #[test]
    fn test_decode_rejects_wrong_payload() {
        let result = Card::from_table(&table(
            r#"
            id = "IMT-01-004"
            name = "Boots"
            idol = "Makoto Kikuchi"
            rarity = "SR"
            text = ""
            type = "accessory"
            subject = "everyone"
            "#,
        ));
        assert!(result.is_err());
    }
}

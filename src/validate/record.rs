//! Record validation against the schema registry

use toml::Value;

use super::CardValidator;
use crate::config::IdolNamePolicy;
use crate::report::{ErrorKind, FieldError, IdViolation};
use crate::schema::{
    self, CardSchema, Rule, TypeResolution, BASE_FIELDS, ID_FIELD, IDOL_FIELD, SUBJECT_FIELD,
    TYPE_FIELD,
};

impl CardValidator {
    /// Validate one decoded card record.
    ///
    /// Base fields, id shape and idol name are always checked. Type-specific
    /// fields are checked only when `type` resolves to a registered schema.
    pub fn validate_card(&self, record: &toml::Table) -> Vec<FieldError> {
        let mut errors = Vec::new();

        self.check_base_fields(record, &mut errors);

        if let Some(Value::String(id)) = record.get(ID_FIELD) {
            self.check_id(id, &mut errors);
        }

        if let Some(Value::String(idol)) = record.get(IDOL_FIELD) {
            self.check_idol(idol, &mut errors);
        }

        match schema::resolve(record.get(TYPE_FIELD)) {
            Ok(schema) => {
                check_payload(schema, record, &mut errors);
                if self.deny_unknown_fields {
                    check_unknown_fields(record, &mut errors);
                }
            }
            Err(TypeResolution::Missing) => {
                errors.push(FieldError::new(TYPE_FIELD, ErrorKind::MissingTypeField));
            }
            Err(TypeResolution::Unknown(value)) => {
                errors.push(FieldError::new(
                    TYPE_FIELD,
                    ErrorKind::UnknownCardType { value },
                ));
            }
        }

        errors
    }

    fn check_base_fields(&self, record: &toml::Table, errors: &mut Vec<FieldError>) {
        for field in BASE_FIELDS {
            match record.get(field.name) {
                None if field.name == ID_FIELD => {
                    errors.push(FieldError::new(ID_FIELD, ErrorKind::MissingIdField));
                }
                None => errors.push(FieldError::new(field.name, ErrorKind::MissingField)),
                Some(value) => check_value(field.name, &field.rule, value, errors),
            }
        }

        if let (Some(allowed), Some(Value::String(subject))) =
            (&self.subjects, record.get(SUBJECT_FIELD))
        {
            if !subject.trim().is_empty() && !allowed.iter().any(|s| s == subject) {
                errors.push(FieldError::new(
                    SUBJECT_FIELD,
                    ErrorKind::InvalidValue {
                        expected: format!("one of [{}]", allowed.join(", ")),
                        actual: subject.clone(),
                    },
                ));
            }
        }
    }

    /// Pattern and case are independent; both may fire
    fn check_id(&self, id: &str, errors: &mut Vec<FieldError>) {
        if !self.id_pattern.is_match(id) {
            errors.push(FieldError::new(
                ID_FIELD,
                ErrorKind::InvalidIdFormat {
                    id: id.to_string(),
                    violation: IdViolation::Pattern,
                },
            ));
        }
        if id != id.to_uppercase() {
            errors.push(FieldError::new(
                ID_FIELD,
                ErrorKind::InvalidIdFormat {
                    id: id.to_string(),
                    violation: IdViolation::Case,
                },
            ));
        }
    }

    fn check_idol(&self, idol: &str, errors: &mut Vec<FieldError>) {
        let tokens = idol.split_whitespace().count();
        let accepted = match self.idol_names {
            IdolNamePolicy::Strict => tokens >= 2,
            IdolNamePolicy::AllowSingle => tokens >= 1,
        };
        if !accepted {
            errors.push(FieldError::new(
                IDOL_FIELD,
                ErrorKind::InvalidIdolNameFormat {
                    value: idol.to_string(),
                },
            ));
        }
    }
}

fn check_payload(schema: &CardSchema, record: &toml::Table, errors: &mut Vec<FieldError>) {
    for field in schema.required {
        match record.get(field.name) {
            None => errors.push(FieldError::new(field.name, ErrorKind::MissingField)),
            Some(value) => check_value(field.name, &field.rule, value, errors),
        }
    }

    for field in schema.forbidden_fields() {
        if record.contains_key(field) {
            errors.push(FieldError::new(
                field,
                ErrorKind::DisallowedField {
                    card_type: schema.card_type,
                },
            ));
        }
    }
}

fn check_unknown_fields(record: &toml::Table, errors: &mut Vec<FieldError>) {
    for key in record.keys() {
        if !schema::is_known_field(key) {
            errors.push(FieldError::new(key.as_str(), ErrorKind::UnknownField));
        }
    }
}

fn check_value(path: &str, rule: &Rule, value: &Value, errors: &mut Vec<FieldError>) {
    match (rule, value) {
        (Rule::Text, Value::String(_)) => {}
        (Rule::NonEmptyText, Value::String(s)) if !s.trim().is_empty() => {}
        (Rule::UInt, Value::Integer(n)) if u32::try_from(*n).is_ok() => {}
        (Rule::OneOf(allowed), Value::String(s)) if allowed.iter().any(|a| *a == s.as_str()) => {}
        (Rule::List { item, non_empty }, Value::Array(items)) => {
            if *non_empty && items.is_empty() {
                errors.push(invalid(path, rule, value));
            }
            for (i, element) in items.iter().enumerate() {
                check_value(&format!("{}[{}]", path, i), item, element, errors);
            }
        }
        (Rule::Table(fields), Value::Table(table)) => {
            for field in fields.iter() {
                let child = format!("{}.{}", path, field.name);
                match table.get(field.name) {
                    None => errors.push(FieldError::new(child, ErrorKind::MissingField)),
                    Some(v) => check_value(&child, &field.rule, v, errors),
                }
            }
        }
        _ => errors.push(invalid(path, rule, value)),
    }
}

fn invalid(path: &str, rule: &Rule, value: &Value) -> FieldError {
    FieldError::new(
        path,
        ErrorKind::InvalidValue {
            expected: rule.describe(),
            actual: render_value(value),
        },
    )
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

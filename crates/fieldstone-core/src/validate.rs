use crate::{schema::Field, value::ValueList};
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

///
/// ValidationFailed
///
/// Outcome of a failed required-field check: one message per offending
/// field key, ready for re-display next to the inputs. Blocks
/// persistence entirely; nothing is written when this is returned.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationFailed {
    errors: BTreeMap<String, String>,
}

impl ValidationFailed {
    #[must_use]
    pub const fn new(errors: BTreeMap<String, String>) -> Self {
        Self { errors }
    }

    #[must_use]
    pub const fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    #[must_use]
    pub fn message_for(&self, field_key: &str) -> Option<&str> {
        self.errors.get(field_key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Display for ValidationFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.errors.keys().map(String::as_str).collect();
        write!(
            f,
            "validation failed for {} field(s): {}",
            self.errors.len(),
            keys.join(", ")
        )
    }
}

impl std::error::Error for ValidationFailed {}

/// Check every required field for presence in the submitted data.
///
/// Presence only: a missing key, an empty list, and a sole blank element
/// all fail; `["0"]` passes. Type-specific correctness (email syntax,
/// number ranges) is deliberately left to the caller's input layer.
pub fn validate_submission(
    fields: &[&Field],
    data: &BTreeMap<String, ValueList>,
) -> Result<(), ValidationFailed> {
    let mut errors = BTreeMap::new();

    for field in fields {
        if !field.required {
            continue;
        }

        let present = data.get(&field.key).is_some_and(ValueList::is_present);
        if !present {
            errors.insert(field.key.clone(), format!("{} is required", field.label));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailed::new(errors))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        schema::{FieldDraft, FieldType},
        types::{FieldId, GroupId},
        value::Value,
    };

    fn required_field(key: &str, label: &str) -> Field {
        FieldDraft {
            required: true,
            ..FieldDraft::new(label, key, FieldType::Text)
        }
        .into_field(FieldId::new(1), GroupId::new(1), 0)
    }

    #[test]
    fn missing_empty_and_blank_all_fail() {
        let field = required_field("price", "Price");
        let fields = vec![&field];

        for data in [
            BTreeMap::new(),
            BTreeMap::from([("price".to_string(), ValueList::from_vec(vec![]))]),
            BTreeMap::from([("price".to_string(), ValueList::from_scalar(""))]),
            BTreeMap::from([(
                "price".to_string(),
                ValueList::from_vec(vec![Value::Null]),
            )]),
        ] {
            let err = validate_submission(&fields, &data).unwrap_err();
            assert_eq!(err.message_for("price"), Some("Price is required"));
        }
    }

    #[test]
    fn falsy_looking_values_pass() {
        let field = required_field("price", "Price");
        let fields = vec![&field];

        for value in [
            ValueList::from_scalar("0"),
            ValueList::from_scalar(0),
            ValueList::from_scalar(false),
        ] {
            let data = BTreeMap::from([("price".to_string(), value)]);
            assert!(validate_submission(&fields, &data).is_ok());
        }
    }

    #[test]
    fn optional_fields_never_fail() {
        let field = FieldDraft::new("Note", "note", FieldType::Textarea)
            .into_field(FieldId::new(2), GroupId::new(1), 1);
        let fields = vec![&field];

        assert!(validate_submission(&fields, &BTreeMap::new()).is_ok());
    }

    #[test]
    fn every_offending_field_is_reported() {
        let price = required_field("price", "Price");
        let name = required_field("name", "Name");
        let fields = vec![&price, &name];

        let err = validate_submission(&fields, &BTreeMap::new()).unwrap_err();
        assert_eq!(err.len(), 2);
        assert!(err.to_string().contains("name"));
        assert!(err.to_string().contains("price"));
    }
}

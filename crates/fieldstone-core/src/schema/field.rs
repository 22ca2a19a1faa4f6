use crate::{
    types::{FieldId, GroupId},
    value::ValueList,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

///
/// FieldType
///
/// Closed set of input kinds the dispatcher knows how to render and
/// validate. Anything outside the special-cased arms falls through to the
/// default join formatting.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Email,
    Url,
    Password,
    Select,
    Checkbox,
    Radio,
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    Time,
    Color,
    TrueFalse,
    Model,
}

impl FieldType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Email => "email",
            Self::Url => "url",
            Self::Password => "password",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Color => "color",
            Self::TrueFalse => "true_false",
            Self::Model => "model",
        }
    }

    /// Field types whose raw values map through the choices table.
    #[must_use]
    pub const fn uses_choices(self) -> bool {
        matches!(self, Self::Select | Self::Checkbox | Self::Radio)
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// Choices
///
/// Ordered key → label pairs for select/checkbox/radio fields. Order is
/// the admin-defined render order; lookup is first match.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Choices(Vec<(String, String)>);

impl Choices {
    #[must_use]
    pub fn new<K, L>(entries: impl IntoIterator<Item = (K, L)>) -> Self
    where
        K: Into<String>,
        L: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(|(k, l)| (k.into(), l.into()))
                .collect(),
        )
    }

    /// Label for a raw choice key, if the key is known.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, l)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, l)| (k.as_str(), l.as_str()))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

///
/// ConditionalLogic
///
/// Display rule attached to a field: show the field when the referenced
/// sibling values match. The engine carries and evaluates this; hiding
/// is a render concern and never relaxes required-field validation.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ConditionalLogic {
    #[serde(rename = "match")]
    pub mode: MatchMode,
    pub rules: Vec<ConditionRule>,
}

impl ConditionalLogic {
    /// Evaluate against a submitted value map.
    ///
    /// A rule compares the display form of the first element under its
    /// field key; a missing key compares as the empty string.
    #[must_use]
    pub fn is_satisfied(&self, values: &BTreeMap<String, ValueList>) -> bool {
        let check = |rule: &ConditionRule| {
            let current = values
                .get(&rule.field_key)
                .and_then(ValueList::first)
                .map(ToString::to_string)
                .unwrap_or_default();

            match rule.op {
                RuleOp::Eq => current == rule.value,
                RuleOp::Ne => current != rule.value,
            }
        };

        match self.mode {
            MatchMode::All => self.rules.iter().all(check),
            MatchMode::Any => self.rules.iter().any(check),
        }
    }
}

///
/// MatchMode
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    All,
    Any,
}

///
/// RuleOp
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOp {
    Eq,
    Ne,
}

///
/// ConditionRule
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ConditionRule {
    pub field_key: String,
    pub op: RuleOp,
    pub value: String,
}

///
/// Wrapper
/// Display hints for the rendered input container.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Wrapper {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

///
/// Field
///
/// A single typed, orderable, optionally-required entry within a group.
/// `key` is globally unique across all fields; `order` drives render
/// sequence within the owning group.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Field {
    pub id: FieldId,
    pub group_id: GroupId,
    pub label: String,
    pub name: String,
    pub key: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ValueList>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Choices>,

    pub multiple: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_logic: Option<ConditionalLogic>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapper: Option<Wrapper>,

    pub order: u32,
}

///
/// FieldDraft
///
/// Caller-supplied attributes for creating or replacing a field. Ids and
/// group ownership are assigned by the store; `order: None` appends at
/// the end of the group.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FieldDraft {
    pub label: String,
    pub name: String,
    pub key: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub instructions: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub default_value: Option<ValueList>,

    #[serde(default)]
    pub placeholder: Option<String>,

    #[serde(default)]
    pub choices: Option<Choices>,

    #[serde(default)]
    pub multiple: bool,

    #[serde(default)]
    pub model_type: Option<String>,

    #[serde(default)]
    pub conditional_logic: Option<ConditionalLogic>,

    #[serde(default)]
    pub wrapper: Option<Wrapper>,

    #[serde(default)]
    pub order: Option<u32>,
}

impl FieldDraft {
    /// A draft with the given label, key, and type; the input `name`
    /// defaults to the key and everything else is off/empty.
    pub fn new(label: impl Into<String>, key: impl Into<String>, field_type: FieldType) -> Self {
        let key = key.into();

        Self {
            label: label.into(),
            name: key.clone(),
            key,
            field_type,
            instructions: None,
            required: false,
            default_value: None,
            placeholder: None,
            choices: None,
            multiple: false,
            model_type: None,
            conditional_logic: None,
            wrapper: None,
            order: None,
        }
    }

    pub(crate) fn into_field(self, id: FieldId, group_id: GroupId, order: u32) -> Field {
        Field {
            id,
            group_id,
            label: self.label,
            name: self.name,
            key: self.key,
            field_type: self.field_type,
            instructions: self.instructions,
            required: self.required,
            default_value: self.default_value,
            placeholder: self.placeholder,
            choices: self.choices,
            multiple: self.multiple,
            model_type: self.model_type,
            conditional_logic: self.conditional_logic,
            wrapper: self.wrapper,
            order,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn field_type_serde_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&FieldType::TrueFalse).unwrap(),
            r#""true_false""#
        );
        assert_eq!(
            serde_json::to_string(&FieldType::DateTime).unwrap(),
            r#""datetime""#
        );
        let parsed: FieldType = serde_json::from_str(r#""datetime""#).unwrap();
        assert_eq!(parsed, FieldType::DateTime);
    }

    #[test]
    fn choices_preserve_order_and_first_match() {
        let choices = Choices::new([("red", "Red"), ("blue", "Blue")]);
        assert_eq!(choices.label("blue"), Some("Blue"));
        assert_eq!(choices.label("green"), None);
        assert_eq!(
            choices.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            vec!["red", "blue"]
        );
    }

    #[test]
    fn conditional_logic_all_and_any() {
        let logic = ConditionalLogic {
            mode: MatchMode::All,
            rules: vec![
                ConditionRule {
                    field_key: "kind".to_string(),
                    op: RuleOp::Eq,
                    value: "other".to_string(),
                },
                ConditionRule {
                    field_key: "active".to_string(),
                    op: RuleOp::Ne,
                    value: "false".to_string(),
                },
            ],
        };

        let mut values = BTreeMap::new();
        values.insert("kind".to_string(), ValueList::from_scalar("other"));
        values.insert("active".to_string(), ValueList::from_scalar("true"));
        assert!(logic.is_satisfied(&values));

        values.insert("active".to_string(), ValueList::from_scalar("false"));
        assert!(!logic.is_satisfied(&values));

        let any = ConditionalLogic {
            mode: MatchMode::Any,
            rules: logic.rules.clone(),
        };
        assert!(any.is_satisfied(&values));
    }

    #[test]
    fn missing_rule_key_compares_as_empty() {
        let logic = ConditionalLogic {
            mode: MatchMode::All,
            rules: vec![ConditionRule {
                field_key: "absent".to_string(),
                op: RuleOp::Eq,
                value: String::new(),
            }],
        };
        assert!(logic.is_satisfied(&BTreeMap::new()));
    }

    #[test]
    fn draft_defaults_name_to_key() {
        let draft = FieldDraft::new("Favorite Color", "color", FieldType::Select);
        assert_eq!(draft.name, "color");
        assert!(!draft.required);
    }

    #[test]
    fn field_serde_renames_type() {
        let field = FieldDraft {
            default_value: Some(ValueList::from_vec(vec![Value::Text("red".into())])),
            ..FieldDraft::new("Favorite Color", "color", FieldType::Select)
        }
        .into_field(FieldId::new(1), GroupId::new(1), 0);

        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "select");
        assert_eq!(json["default_value"], serde_json::json!(["red"]));
    }
}

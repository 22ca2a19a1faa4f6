use crate::{
    resolver::EntityResolver,
    schema::{Choices, Field, FieldType},
    value::{Value, ValueList},
};
use std::sync::OnceLock;
use time::{Date, PrimitiveDateTime, format_description::FormatItem};

static DATE_INPUT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();
static DATE_OUTPUT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();
static DATETIME_INPUTS: OnceLock<Vec<Vec<FormatItem<'static>>>> = OnceLock::new();
static DATETIME_OUTPUT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();
static TIMESTAMP_OUTPUT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();

fn date_input() -> &'static [FormatItem<'static>] {
    DATE_INPUT
        .get_or_init(|| time::format_description::parse("[year]-[month]-[day]").unwrap())
}

fn date_output() -> &'static [FormatItem<'static>] {
    DATE_OUTPUT.get_or_init(|| {
        time::format_description::parse("[month repr:short] [day], [year]").unwrap()
    })
}

fn datetime_inputs() -> &'static [Vec<FormatItem<'static>>] {
    DATETIME_INPUTS.get_or_init(|| {
        [
            "[year]-[month]-[day]T[hour]:[minute]:[second]",
            "[year]-[month]-[day]T[hour]:[minute]",
            "[year]-[month]-[day] [hour]:[minute]:[second]",
            "[year]-[month]-[day] [hour]:[minute]",
        ]
        .into_iter()
        .map(|desc| time::format_description::parse(desc).unwrap())
        .collect()
    })
}

fn datetime_output() -> &'static [FormatItem<'static>] {
    DATETIME_OUTPUT.get_or_init(|| {
        time::format_description::parse(
            "[month repr:short] [day], [year] [hour repr:12 padding:none]:[minute] [period]",
        )
        .unwrap()
    })
}

fn timestamp_output() -> &'static [FormatItem<'static>] {
    TIMESTAMP_OUTPUT.get_or_init(|| {
        time::format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]").unwrap()
    })
}

/// Render a stored value list for display or export.
///
/// Pure function of (field definition, value): dispatch is by field
/// type, anything unmatched falls through to a `", "` join of the raw
/// elements. Formatting never fails: unparseable payloads render as
/// their raw text.
#[must_use]
pub fn format(field: &Field, values: &ValueList, resolver: &dyn EntityResolver) -> String {
    if values.is_empty() {
        return String::new();
    }

    match field.field_type {
        ft if ft.uses_choices() => match &field.choices {
            Some(choices) if !choices.is_empty() => format_choices(choices, values),
            _ => join_raw(values),
        },
        FieldType::TrueFalse => {
            if values.is_truthy() {
                "Yes".to_string()
            } else {
                "No".to_string()
            }
        }
        FieldType::Date => format_first(values, format_date),
        FieldType::DateTime => format_first(values, format_datetime),
        FieldType::Url => format_first(values, |raw| {
            let escaped = escape_html(raw);
            format!(r#"<a href="{escaped}" target="_blank">{escaped}</a>"#)
        }),
        FieldType::Email => format_first(values, |raw| {
            let escaped = escape_html(raw);
            format!(r#"<a href="mailto:{escaped}">{escaped}</a>"#)
        }),
        FieldType::Model => format_model(field, values, resolver),
        _ => join_raw(values),
    }
}

/// Timestamp rendering shared with the export surface (`YYYY-MM-DD
/// HH:MM:SS`).
#[must_use]
pub fn format_timestamp(at: PrimitiveDateTime) -> String {
    at.format(timestamp_output())
        .unwrap_or_else(|_| at.to_string())
}

pub(crate) fn join_raw(values: &ValueList) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_choices(choices: &Choices, values: &ValueList) -> String {
    values
        .iter()
        .map(|value| {
            let raw = value.to_string();
            choices.label(&raw).map_or(raw, ToString::to_string)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_first(values: &ValueList, render: impl Fn(&str) -> String) -> String {
    let raw = values.first().map(ToString::to_string).unwrap_or_default();
    if raw.is_empty() {
        return raw;
    }
    render(&raw)
}

fn format_date(raw: &str) -> String {
    Date::parse(raw, date_input())
        .ok()
        .and_then(|date| date.format(date_output()).ok())
        .unwrap_or_else(|| raw.to_string())
}

fn format_datetime(raw: &str) -> String {
    datetime_inputs()
        .iter()
        .find_map(|input| PrimitiveDateTime::parse(raw, input.as_slice()).ok())
        .and_then(|at| at.format(datetime_output()).ok())
        .unwrap_or_else(|| raw.to_string())
}

fn format_model(field: &Field, values: &ValueList, resolver: &dyn EntityResolver) -> String {
    let Some(model_type) = field.model_type.as_deref() else {
        return join_raw(values);
    };

    let raw = values.first().map(ToString::to_string).unwrap_or_default();
    let id = match values.first() {
        Some(Value::Int(i)) => u64::try_from(*i).ok(),
        Some(Value::Text(s)) => s.parse().ok(),
        _ => None,
    };

    id.and_then(|id| resolver.resolve(model_type, id))
        .map_or_else(|| format!("{model_type} #{raw}"), |resolved| resolved.name)
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        resolver::{ModelOption, NullResolver, ResolvedEntity},
        schema::FieldDraft,
        types::{FieldId, GroupId},
    };

    fn field(field_type: FieldType) -> Field {
        FieldDraft::new("Sample", "sample", field_type)
            .into_field(FieldId::new(1), GroupId::new(1), 0)
    }

    fn fmt(f: &Field, values: ValueList) -> String {
        format(f, &values, &NullResolver)
    }

    #[test]
    fn empty_list_renders_empty() {
        assert_eq!(fmt(&field(FieldType::Text), ValueList::from_vec(vec![])), "");
    }

    #[test]
    fn select_maps_through_choices_and_passes_unknown_keys() {
        let f = Field {
            choices: Some(Choices::new([("red", "Red"), ("blue", "Blue")])),
            ..field(FieldType::Select)
        };

        let values = ValueList::from_vec(vec![
            Value::Text("red".into()),
            Value::Text("green".into()),
            Value::Text("blue".into()),
        ]);
        assert_eq!(fmt(&f, values), "Red, green, Blue");
    }

    #[test]
    fn select_without_choices_joins_raw() {
        let values = ValueList::from_vec(vec![Value::Text("a".into()), Value::Text("b".into())]);
        assert_eq!(fmt(&field(FieldType::Select), values), "a, b");
    }

    #[test]
    fn true_false_renders_yes_no() {
        let f = field(FieldType::TrueFalse);
        assert_eq!(fmt(&f, ValueList::from_scalar(true)), "Yes");
        assert_eq!(fmt(&f, ValueList::from_scalar("true")), "Yes");
        assert_eq!(fmt(&f, ValueList::from_scalar(false)), "No");
        assert_eq!(fmt(&f, ValueList::from_scalar("yes")), "No");
    }

    #[test]
    fn date_renders_short_month() {
        let f = field(FieldType::Date);
        assert_eq!(fmt(&f, ValueList::from_scalar("2025-10-26")), "Oct 26, 2025");
        assert_eq!(fmt(&f, ValueList::from_scalar("2025-01-05")), "Jan 05, 2025");
        // unparseable input degrades to the raw text
        assert_eq!(fmt(&f, ValueList::from_scalar("soon")), "soon");
    }

    #[test]
    fn datetime_renders_twelve_hour_clock() {
        let f = field(FieldType::DateTime);
        assert_eq!(
            fmt(&f, ValueList::from_scalar("2025-10-26T14:30")),
            "Oct 26, 2025 2:30 PM"
        );
        assert_eq!(
            fmt(&f, ValueList::from_scalar("2025-10-26 09:05:00")),
            "Oct 26, 2025 9:05 AM"
        );
    }

    #[test]
    fn url_and_email_render_escaped_anchors() {
        assert_eq!(
            fmt(
                &field(FieldType::Url),
                ValueList::from_scalar("https://example.com?a=1&b=2")
            ),
            r#"<a href="https://example.com?a=1&amp;b=2" target="_blank">https://example.com?a=1&amp;b=2</a>"#
        );
        assert_eq!(
            fmt(&field(FieldType::Email), ValueList::from_scalar("a@b.io")),
            r#"<a href="mailto:a@b.io">a@b.io</a>"#
        );
    }

    struct OneSchool;

    impl EntityResolver for OneSchool {
        fn options(&self, _model_type: &str) -> Vec<ModelOption> {
            Vec::new()
        }

        fn resolve(&self, model_type: &str, id: u64) -> Option<ResolvedEntity> {
            (model_type == "School" && id == 3).then(|| ResolvedEntity {
                id,
                name: "Westside High".to_string(),
                entity_type: model_type.to_string(),
            })
        }
    }

    #[test]
    fn model_resolves_or_falls_back_to_raw_id() {
        let f = Field {
            model_type: Some("School".to_string()),
            ..field(FieldType::Model)
        };

        assert_eq!(
            format(&f, &ValueList::from_scalar(3), &OneSchool),
            "Westside High"
        );
        assert_eq!(
            format(&f, &ValueList::from_scalar(99), &OneSchool),
            "School #99"
        );
        assert_eq!(
            format(&f, &ValueList::from_scalar(3), &NullResolver),
            "School #3"
        );
    }

    #[test]
    fn model_without_configured_type_joins_raw() {
        assert_eq!(fmt(&field(FieldType::Model), ValueList::from_scalar(3)), "3");
    }

    #[test]
    fn default_join_for_plain_types() {
        let values = ValueList::from_vec(vec![Value::Int(1), Value::Text("two".into())]);
        assert_eq!(fmt(&field(FieldType::Number), values), "1, two");
    }
}

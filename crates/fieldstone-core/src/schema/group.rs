use crate::types::GroupId;
use serde::{Deserialize, Serialize};

///
/// FieldGroup
///
/// A named, ordered collection of fields. Groups attach to domain
/// entities or are exposed as public forms; `location` carries the
/// entity-kind names the group is intended for and is never interpreted
/// by the engine.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FieldGroup {
    pub id: GroupId,
    pub key: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub location: Vec<String>,

    pub position: i32,
    pub active: bool,
}

///
/// GroupDraft
///
/// Caller-supplied attributes for creating or replacing a group.
/// Ids are store-assigned; a draft never carries one.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct GroupDraft {
    pub key: String,
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub location: Vec<String>,

    #[serde(default)]
    pub position: i32,

    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl GroupDraft {
    /// A draft with the given key and title; everything else defaulted,
    /// active on.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            description: None,
            location: Vec::new(),
            position: 0,
            active: true,
        }
    }

    pub(crate) fn into_group(self, id: GroupId) -> FieldGroup {
        FieldGroup {
            id,
            key: self.key,
            title: self.title,
            description: self.description,
            location: self.location,
            position: self.position,
            active: self.active,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_defaults_are_active() {
        let draft = GroupDraft::new("contact", "Contact Form");
        assert!(draft.active);
        assert_eq!(draft.position, 0);
    }

    #[test]
    fn draft_json_defaults_match_constructor() {
        let draft: GroupDraft =
            serde_json::from_str(r#"{"key": "contact", "title": "Contact Form"}"#).unwrap();
        assert_eq!(draft, GroupDraft::new("contact", "Contact Form"));
    }
}

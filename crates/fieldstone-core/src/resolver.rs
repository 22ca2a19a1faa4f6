use serde::{Deserialize, Serialize};

///
/// ModelOption
/// One selectable row when populating a `model` field's option list.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ModelOption {
    pub id: u64,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

///
/// ResolvedEntity
/// Display resolution of one foreign reference on a `model` field.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ResolvedEntity {
    pub id: u64,
    pub name: String,
    pub entity_type: String,
}

///
/// EntityResolver
///
/// Boundary to whatever owns the referenced domain entities. The engine
/// only ever asks for display names and option lists; a failed lookup is
/// soft: rendering degrades to the raw id, it never fails the caller's
/// operation.
///
/// Implementors are expected to build `name` with the usual fallback
/// chain (name, then title, then `Item #<id>`).
///

pub trait EntityResolver {
    /// Selectable rows for a model type, e.g. to populate a public
    /// form's dropdown. Unknown types return an empty list.
    fn options(&self, model_type: &str) -> Vec<ModelOption>;

    /// Resolve one reference for display. `None` when the type or id is
    /// unknown.
    fn resolve(&self, model_type: &str, id: u64) -> Option<ResolvedEntity>;
}

///
/// NullResolver
/// Resolves nothing; every `model` render falls back to raw-id display.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NullResolver;

impl EntityResolver for NullResolver {
    fn options(&self, _model_type: &str) -> Vec<ModelOption> {
        Vec::new()
    }

    fn resolve(&self, _model_type: &str, _id: u64) -> Option<ResolvedEntity> {
        None
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_resolver_resolves_nothing() {
        assert!(NullResolver.options("School").is_empty());
        assert!(NullResolver.resolve("School", 1).is_none());
    }

    #[test]
    fn option_serde_omits_empty_description() {
        let option = ModelOption {
            id: 3,
            name: "Westside High".to_string(),
            description: None,
        };
        let json = serde_json::to_value(&option).unwrap();
        assert!(json.get("description").is_none());
    }
}

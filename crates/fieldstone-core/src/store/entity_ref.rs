use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// EntityKind
///
/// Compile-time declaration that an entity type participates in custom
/// fields. Conforming types get the typed [`EntityRef::of`] constructor,
/// and the engine registers their `ENTITY_TYPE` at construction so the
/// string-typed boundary can fail fast on everything else.
///

pub trait EntityKind {
    /// Stable type name used in storage keys. Must be unique per type.
    const ENTITY_TYPE: &'static str;
}

///
/// EntityRef
///
/// Tagged (type, id) pair naming an addressable external entity. The
/// reference is weak: the engine never dereferences it, only passes it
/// through to storage keys.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct EntityRef {
    entity_type: String,
    entity_id: u64,
}

impl EntityRef {
    #[must_use]
    pub fn new(entity_type: impl Into<String>, entity_id: u64) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id,
        }
    }

    /// Build a reference for a conforming entity type.
    #[must_use]
    pub fn of<E: EntityKind>(entity_id: u64) -> Self {
        Self {
            entity_type: E::ENTITY_TYPE.to_string(),
            entity_id,
        }
    }

    #[must_use]
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    #[must_use]
    pub const fn entity_id(&self) -> u64 {
        self.entity_id
    }
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.entity_type, self.entity_id)
    }
}

///
/// TESTS
///

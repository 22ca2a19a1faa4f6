use crate::{store::EntityRef, types::FieldId, value::ValueList};
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// ValueKey
///
/// Composite key for one stored answer: (entity, field). Keys order by
/// entity first, so all rows for one entity form a contiguous range.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ValueKey {
    entity: EntityRef,
    field: FieldId,
}

impl ValueKey {
    #[must_use]
    pub const fn new(entity: EntityRef, field: FieldId) -> Self {
        Self { entity, field }
    }

    #[must_use]
    pub fn lower_bound(entity: EntityRef) -> Self {
        Self {
            entity,
            field: FieldId::MIN,
        }
    }

    #[must_use]
    pub fn upper_bound(entity: EntityRef) -> Self {
        Self {
            entity,
            field: FieldId::MAX,
        }
    }

    #[must_use]
    pub const fn entity(&self) -> &EntityRef {
        &self.entity
    }

    #[must_use]
    pub const fn field(&self) -> FieldId {
        self.field
    }
}

impl Display for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.entity, self.field)
    }
}

///
/// ValueStore
///
/// Polymorphic value persistence: one row per (entity, field), payload
/// always a [`ValueList`]. Rows are unique per key by construction;
/// writes are whole-list upserts, never merges.
///

#[derive(Debug, Default, Deref, DerefMut)]
pub struct ValueStore(std::collections::BTreeMap<ValueKey, ValueList>);

impl ValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or fully replace the row for this key. Returns the prior
    /// payload when one was replaced.
    pub fn upsert(&mut self, key: ValueKey, values: ValueList) -> Option<ValueList> {
        self.0.insert(key, values)
    }

    #[must_use]
    pub fn value(&self, key: &ValueKey) -> Option<&ValueList> {
        self.0.get(key)
    }

    /// All rows belonging to one entity, in field-id order.
    pub fn entity_rows(
        &self,
        entity: &EntityRef,
    ) -> impl Iterator<Item = (&ValueKey, &ValueList)> {
        self.0.range(
            ValueKey::lower_bound(entity.clone())..=ValueKey::upper_bound(entity.clone()),
        )
    }

    /// Remove every row for one entity. Returns the number removed.
    pub fn purge_entity(&mut self, entity: &EntityRef) -> usize {
        let keys: Vec<ValueKey> = self.entity_rows(entity).map(|(k, _)| k.clone()).collect();
        for key in &keys {
            self.0.remove(key);
        }
        keys.len()
    }

    /// Remove every row for one field across all entities (field
    /// deletion cascade). Returns the number removed.
    pub fn purge_field(&mut self, field: FieldId) -> usize {
        let before = self.0.len();
        self.0.retain(|key, _| key.field() != field);
        before - self.0.len()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn key(entity_type: &str, entity_id: u64, field: u64) -> ValueKey {
        ValueKey::new(EntityRef::new(entity_type, entity_id), FieldId::new(field))
    }

    #[test]
    fn upsert_replaces_whole_list() {
        let mut store = ValueStore::new();
        let k = key("School", 1, 10);

        assert!(store.upsert(k.clone(), ValueList::from_scalar("a")).is_none());
        let prior = store
            .upsert(k.clone(), ValueList::from_vec(vec![Value::Text("b".into())]))
            .unwrap();

        assert_eq!(prior, ValueList::from_scalar("a"));
        assert_eq!(store.value(&k), Some(&ValueList::from_scalar("b")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn entity_rows_are_isolated() {
        let mut store = ValueStore::new();
        store.upsert(key("School", 1, 10), ValueList::from_scalar("x"));
        store.upsert(key("School", 2, 10), ValueList::from_scalar("y"));
        store.upsert(key("Brand", 1, 10), ValueList::from_scalar("z"));

        let rows: Vec<_> = store
            .entity_rows(&EntityRef::new("School", 1))
            .collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, &ValueList::from_scalar("x"));
    }

    #[test]
    fn purge_entity_removes_only_that_entity() {
        let mut store = ValueStore::new();
        store.upsert(key("School", 1, 10), ValueList::from_scalar("x"));
        store.upsert(key("School", 1, 11), ValueList::from_scalar("y"));
        store.upsert(key("School", 2, 10), ValueList::from_scalar("z"));

        assert_eq!(store.purge_entity(&EntityRef::new("School", 1)), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn purge_field_sweeps_all_entities() {
        let mut store = ValueStore::new();
        store.upsert(key("School", 1, 10), ValueList::from_scalar("x"));
        store.upsert(key("Brand", 7, 10), ValueList::from_scalar("y"));
        store.upsert(key("Brand", 7, 11), ValueList::from_scalar("z"));

        assert_eq!(store.purge_field(FieldId::new(10)), 2);
        assert_eq!(store.len(), 1);
    }
}

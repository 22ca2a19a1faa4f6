use crate::{
    error::{Error, ErrorClass, ErrorOrigin},
    schema::{Field, FieldDraft, FieldGroup, GroupDraft},
    types::{FieldId, GroupId},
};
use thiserror::Error as ThisError;
use std::collections::BTreeMap;

///
/// DefinitionError
///

#[derive(Debug, ThisError)]
pub enum DefinitionError {
    #[error("field group not found: {0}")]
    GroupNotFound(String),

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("duplicate field group key: '{0}'")]
    DuplicateGroupKey(String),

    #[error("duplicate field key: '{0}'")]
    DuplicateFieldKey(String),
}

impl DefinitionError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::GroupNotFound(_) | Self::FieldNotFound(_) => ErrorClass::NotFound,
            Self::DuplicateGroupKey(_) | Self::DuplicateFieldKey(_) => ErrorClass::Conflict,
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        ErrorOrigin::Definition
    }
}

impl From<DefinitionError> for Error {
    fn from(err: DefinitionError) -> Self {
        Self::new(err.class(), err.origin(), err.to_string())
    }
}

///
/// DefinitionStore
///
/// Groups and fields in ordered maps with store-assigned monotonic ids.
/// Key uniqueness (group keys across groups, field keys across ALL
/// fields) is checked inside the same mutation that writes.
///
/// Deleting a group cascades to its fields here; the further cascade to
/// stored values is the engine's job, so `delete_*` hands the removed
/// rows back to the caller.
///

#[derive(Debug, Default)]
pub struct DefinitionStore {
    groups: BTreeMap<GroupId, FieldGroup>,
    fields: BTreeMap<FieldId, Field>,
    next_group_id: u64,
    next_field_id: u64,
}

impl DefinitionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// GROUPS
    ///

    pub fn create_group(&mut self, draft: GroupDraft) -> Result<&FieldGroup, DefinitionError> {
        self.ensure_group_key_free(&draft.key, None)?;

        self.next_group_id += 1;
        let id = GroupId::new(self.next_group_id);
        self.groups.insert(id, draft.into_group(id));

        Ok(&self.groups[&id])
    }

    pub fn update_group(
        &mut self,
        id: GroupId,
        draft: GroupDraft,
    ) -> Result<&FieldGroup, DefinitionError> {
        if !self.groups.contains_key(&id) {
            return Err(DefinitionError::GroupNotFound(id.to_string()));
        }
        self.ensure_group_key_free(&draft.key, Some(id))?;

        self.groups.insert(id, draft.into_group(id));

        Ok(&self.groups[&id])
    }

    /// Hard delete; cascades to the group's fields. Returns the removed
    /// group and fields so the caller can cascade further.
    pub fn delete_group(
        &mut self,
        id: GroupId,
    ) -> Result<(FieldGroup, Vec<Field>), DefinitionError> {
        let group = self
            .groups
            .remove(&id)
            .ok_or_else(|| DefinitionError::GroupNotFound(id.to_string()))?;

        let field_ids: Vec<FieldId> = self
            .fields
            .values()
            .filter(|f| f.group_id == id)
            .map(|f| f.id)
            .collect();

        let removed = field_ids
            .into_iter()
            .filter_map(|fid| self.fields.remove(&fid))
            .collect();

        Ok((group, removed))
    }

    #[must_use]
    pub fn group(&self, key: &str) -> Option<&FieldGroup> {
        self.groups.values().find(|g| g.key == key)
    }

    #[must_use]
    pub fn group_by_id(&self, id: GroupId) -> Option<&FieldGroup> {
        self.groups.get(&id)
    }

    #[must_use]
    pub fn group_exists(&self, key: &str) -> bool {
        self.group(key).is_some()
    }

    /// Groups ordered by `position` ascending, id as tiebreak.
    #[must_use]
    pub fn list_groups(&self, active_only: bool) -> Vec<&FieldGroup> {
        let mut groups: Vec<&FieldGroup> = self
            .groups
            .values()
            .filter(|g| !active_only || g.active)
            .collect();
        groups.sort_by_key(|g| (g.position, g.id));
        groups
    }

    ///
    /// FIELDS
    ///

    pub fn create_field(
        &mut self,
        group_id: GroupId,
        draft: FieldDraft,
    ) -> Result<&Field, DefinitionError> {
        if !self.groups.contains_key(&group_id) {
            return Err(DefinitionError::GroupNotFound(group_id.to_string()));
        }
        self.ensure_field_key_free(&draft.key, None)?;

        let order = draft
            .order
            .unwrap_or_else(|| self.next_order_in(group_id));

        self.next_field_id += 1;
        let id = FieldId::new(self.next_field_id);
        self.fields.insert(id, draft.into_field(id, group_id, order));

        Ok(&self.fields[&id])
    }

    pub fn update_field(
        &mut self,
        id: FieldId,
        draft: FieldDraft,
    ) -> Result<&Field, DefinitionError> {
        let (group_id, current_order) = match self.fields.get(&id) {
            Some(field) => (field.group_id, field.order),
            None => return Err(DefinitionError::FieldNotFound(id.to_string())),
        };
        self.ensure_field_key_free(&draft.key, Some(id))?;

        let order = draft.order.unwrap_or(current_order);
        self.fields.insert(id, draft.into_field(id, group_id, order));

        Ok(&self.fields[&id])
    }

    /// Hard delete. Returns the removed field so the caller can cascade
    /// its stored values.
    pub fn delete_field(&mut self, id: FieldId) -> Result<Field, DefinitionError> {
        self.fields
            .remove(&id)
            .ok_or_else(|| DefinitionError::FieldNotFound(id.to_string()))
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.values().find(|f| f.key == key)
    }

    #[must_use]
    pub fn field_by_id(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(&id)
    }

    #[must_use]
    pub fn field_exists(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    #[must_use]
    pub fn field_id_for_key(&self, key: &str) -> Option<FieldId> {
        self.field(key).map(|f| f.id)
    }

    /// Fields of a group ordered by `order` ascending, id as tiebreak.
    #[must_use]
    pub fn fields_of(&self, group_id: GroupId) -> Vec<&Field> {
        let mut fields: Vec<&Field> = self
            .fields
            .values()
            .filter(|f| f.group_id == group_id)
            .collect();
        fields.sort_by_key(|f| (f.order, f.id));
        fields
    }

    /// Rewrite `order` as the 0-based index of the submitted sequence.
    ///
    /// A full reassignment, not a swap: gaps and duplicates in the
    /// current numbering are normalized. Ids that are unknown or belong
    /// to another group are skipped.
    pub fn reorder_fields(
        &mut self,
        group_id: GroupId,
        ordered: &[FieldId],
    ) -> Result<(), DefinitionError> {
        if !self.groups.contains_key(&group_id) {
            return Err(DefinitionError::GroupNotFound(group_id.to_string()));
        }

        for (index, field_id) in ordered.iter().enumerate() {
            if let Some(field) = self.fields.get_mut(field_id) {
                if field.group_id == group_id {
                    field.order = u32::try_from(index).unwrap_or(u32::MAX);
                }
            }
        }

        Ok(())
    }

    ///
    /// INTERNAL
    ///

    fn ensure_group_key_free(
        &self,
        key: &str,
        exclude: Option<GroupId>,
    ) -> Result<(), DefinitionError> {
        let taken = self
            .groups
            .values()
            .any(|g| g.key == key && Some(g.id) != exclude);

        if taken {
            return Err(DefinitionError::DuplicateGroupKey(key.to_string()));
        }
        Ok(())
    }

    fn ensure_field_key_free(
        &self,
        key: &str,
        exclude: Option<FieldId>,
    ) -> Result<(), DefinitionError> {
        let taken = self
            .fields
            .values()
            .any(|f| f.key == key && Some(f.id) != exclude);

        if taken {
            return Err(DefinitionError::DuplicateFieldKey(key.to_string()));
        }
        Ok(())
    }

    fn next_order_in(&self, group_id: GroupId) -> u32 {
        self.fields
            .values()
            .filter(|f| f.group_id == group_id)
            .map(|f| f.order)
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }
}

///
/// TESTS
///

use crate::{
    error::Error,
    export, format,
    obs::{self, OpKind},
    resolver::{EntityResolver, ModelOption},
    schema::{Field, FieldDraft, FieldGroup, FieldType, GroupDraft},
    store::{
        DefinitionStore, EntityKind, EntityRef, FormSubmission, Provenance, SubmissionStore,
        ValueKey, ValueStore,
    },
    types::{FieldId, GroupId, SubmissionId},
    validate,
    value::ValueList,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

///
/// FormSchema
///
/// Render payload for one public form: the active group, its ordered
/// fields, and per-field option lists for `model` fields.
///

#[derive(Clone, Debug, Serialize)]
pub struct FormSchema {
    pub group: FieldGroup,
    pub fields: Vec<Field>,
    pub model_options: BTreeMap<String, Vec<ModelOption>>,
}

///
/// GroupWithFields
///

#[derive(Clone, Debug, Serialize)]
pub struct GroupWithFields {
    pub group: FieldGroup,
    pub fields: Vec<Field>,
}

///
/// FormContext
///
/// Render payload for an entity's edit form: every active group with
/// its ordered fields, plus the entity's current values keyed by field
/// key.
///

#[derive(Clone, Debug, Serialize)]
pub struct FormContext {
    pub groups: Vec<GroupWithFields>,
    pub values: BTreeMap<String, ValueList>,
}

///
/// Engine
///
/// Entry point binding the definition, value, and submission stores.
/// One logical operation per call; the caller provides exterior
/// synchronization, concurrency lives in whatever wraps the engine.
///
/// Entity types must be registered before their values can be touched;
/// operations against anything else fail fast instead of silently
/// no-opping.
///

#[derive(Debug, Default)]
pub struct Engine {
    definitions: DefinitionStore,
    values: ValueStore,
    submissions: SubmissionStore,
    entity_types: BTreeSet<String>,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `E` participates in custom fields.
    pub fn register_entity<E: EntityKind>(&mut self) -> &mut Self {
        self.entity_types.insert(E::ENTITY_TYPE.to_string());
        self
    }

    #[must_use]
    pub fn supports_entity_type(&self, entity_type: &str) -> bool {
        self.entity_types.contains(entity_type)
    }

    ///
    /// DEFINITIONS
    ///

    pub fn create_group(&mut self, draft: GroupDraft) -> Result<FieldGroup, Error> {
        obs::track(
            OpKind::DefinitionWrite,
            self.definitions
                .create_group(draft)
                .map(Clone::clone)
                .map_err(Error::from),
        )
    }

    pub fn update_group(&mut self, id: GroupId, draft: GroupDraft) -> Result<FieldGroup, Error> {
        obs::track(
            OpKind::DefinitionWrite,
            self.definitions
                .update_group(id, draft)
                .map(Clone::clone)
                .map_err(Error::from),
        )
    }

    /// Hard delete; cascades to the group's fields and their stored
    /// values. Historical submissions keep their blobs.
    pub fn delete_group(&mut self, id: GroupId) -> Result<(), Error> {
        obs::track(OpKind::DefinitionWrite, self.try_delete_group(id))
    }

    pub fn create_field(&mut self, group_id: GroupId, draft: FieldDraft) -> Result<Field, Error> {
        obs::track(
            OpKind::DefinitionWrite,
            self.definitions
                .create_field(group_id, draft)
                .map(Clone::clone)
                .map_err(Error::from),
        )
    }

    pub fn update_field(&mut self, id: FieldId, draft: FieldDraft) -> Result<Field, Error> {
        obs::track(
            OpKind::DefinitionWrite,
            self.definitions
                .update_field(id, draft)
                .map(Clone::clone)
                .map_err(Error::from),
        )
    }

    /// Hard delete; cascades to every stored value referencing the
    /// field. Historical submissions keep their blobs.
    pub fn delete_field(&mut self, id: FieldId) -> Result<(), Error> {
        obs::track(OpKind::DefinitionWrite, self.try_delete_field(id))
    }

    pub fn reorder_fields(&mut self, group_id: GroupId, ordered: &[FieldId]) -> Result<(), Error> {
        obs::track(
            OpKind::DefinitionWrite,
            self.definitions
                .reorder_fields(group_id, ordered)
                .map_err(Error::from),
        )
    }

    #[must_use]
    pub fn list_groups(&self, active_only: bool) -> Vec<&FieldGroup> {
        self.definitions.list_groups(active_only)
    }

    #[must_use]
    pub fn group(&self, key: &str) -> Option<&FieldGroup> {
        self.definitions.group(key)
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.definitions.field(key)
    }

    #[must_use]
    pub fn fields_of(&self, group_id: GroupId) -> Vec<&Field> {
        self.definitions.fields_of(group_id)
    }

    #[must_use]
    pub const fn definitions(&self) -> &DefinitionStore {
        &self.definitions
    }

    ///
    /// VALUES
    ///

    /// Current value for one field key, or `None` when the key or the
    /// row is absent.
    pub fn value(&self, entity: &EntityRef, field_key: &str) -> Result<Option<ValueList>, Error> {
        obs::track(OpKind::ValueRead, self.try_value(entity, field_key))
    }

    /// All stored values for one entity, keyed by field key.
    pub fn values_for(&self, entity: &EntityRef) -> Result<BTreeMap<String, ValueList>, Error> {
        obs::track(OpKind::ValueRead, self.try_values_for(entity))
    }

    /// Upsert one value. Strict contract: an unknown field key fails
    /// with NotFound; compare [`Self::set_values`].
    pub fn set_value(
        &mut self,
        entity: &EntityRef,
        field_key: &str,
        values: impl Into<ValueList>,
    ) -> Result<(), Error> {
        obs::track(
            OpKind::ValueWrite,
            self.try_set_value(entity, field_key, values.into()),
        )
    }

    /// Bulk upsert, atomic per entity. Lenient contract: unknown field
    /// keys are silently skipped so partial/versioned payloads can be
    /// replayed; compare [`Self::set_value`]. Returns the number of
    /// rows written.
    pub fn set_values(
        &mut self,
        entity: &EntityRef,
        data: BTreeMap<String, ValueList>,
    ) -> Result<usize, Error> {
        obs::track(OpKind::ValueWrite, self.try_set_values(entity, data))
    }

    /// Remove every stored value for one entity. Returns the number of
    /// rows removed.
    pub fn delete_values(&mut self, entity: &EntityRef) -> Result<usize, Error> {
        obs::track(OpKind::ValueDelete, self.try_delete_values(entity))
    }

    /// Copy every stored value from `source` to `target`. The copies
    /// are independent rows; mutating the source afterwards leaves the
    /// target untouched.
    pub fn clone_values(
        &mut self,
        source: &EntityRef,
        target: &EntityRef,
    ) -> Result<usize, Error> {
        obs::track(OpKind::ValueWrite, self.try_clone_values(source, target))
    }

    /// Display form of one stored value, dispatched by field type.
    /// Empty when nothing is stored.
    pub fn formatted_value(
        &self,
        entity: &EntityRef,
        field_key: &str,
        resolver: &dyn EntityResolver,
    ) -> Result<String, Error> {
        let Some(values) = self.value(entity, field_key)? else {
            return Ok(String::new());
        };
        if values.is_empty() {
            return Ok(String::new());
        }

        Ok(match self.definitions.field(field_key) {
            Some(field) => format::format(field, &values, resolver),
            None => format::join_raw(&values),
        })
    }

    ///
    /// SUBMISSIONS
    ///

    /// Anonymous submission path: validate the answer set against the
    /// group's required fields and append one immutable snapshot.
    /// Nothing persists when validation fails.
    pub fn submit(
        &mut self,
        group_key: &str,
        data: BTreeMap<String, ValueList>,
        provenance: Provenance,
    ) -> Result<FormSubmission, Error> {
        obs::track(
            OpKind::SubmissionWrite,
            self.try_submit(group_key, data, provenance),
        )
    }

    /// A group's submissions in storage (creation) order.
    pub fn submissions(&self, group_id: GroupId) -> Result<Vec<&FormSubmission>, Error> {
        self.ensure_group_exists(group_id)?;
        Ok(self.submissions.for_group(group_id).collect())
    }

    /// One submission, scoped to its group: a submission fetched
    /// through the wrong group is NotFound.
    pub fn submission(
        &self,
        group_id: GroupId,
        id: SubmissionId,
    ) -> Result<&FormSubmission, Error> {
        self.ensure_group_exists(group_id)?;

        self.submissions
            .get(id)
            .filter(|s| s.group_id == group_id)
            .ok_or_else(|| Error::submission_not_found(format!("submission not found: {id}")))
    }

    /// Full deletion, the only mutation submissions support.
    pub fn delete_submission(
        &mut self,
        group_id: GroupId,
        id: SubmissionId,
    ) -> Result<FormSubmission, Error> {
        obs::track(
            OpKind::SubmissionDelete,
            self.try_delete_submission(group_id, id),
        )
    }

    /// CSV projection of a group's submissions.
    pub fn export_csv(&self, group_id: GroupId) -> Result<String, Error> {
        obs::track(OpKind::Export, self.try_export_csv(group_id))
    }

    ///
    /// RENDERING
    ///

    /// Schema for a public form: the active group, ordered fields, and
    /// option lists for `model` fields. Resolver failures degrade to
    /// empty option lists; rendering never hard-fails.
    pub fn form_schema(
        &self,
        group_key: &str,
        resolver: &dyn EntityResolver,
    ) -> Result<FormSchema, Error> {
        let group = self
            .active_group(group_key)
            .ok_or_else(|| {
                Error::definition_not_found(format!(
                    "field group not found or inactive: '{group_key}'"
                ))
            })?
            .clone();

        let fields: Vec<Field> = self
            .definitions
            .fields_of(group.id)
            .into_iter()
            .cloned()
            .collect();

        let mut model_options = BTreeMap::new();
        for field in &fields {
            if field.field_type == FieldType::Model {
                if let Some(model_type) = field.model_type.as_deref() {
                    model_options.insert(field.key.clone(), resolver.options(model_type));
                }
            }
        }

        Ok(FormSchema {
            group,
            fields,
            model_options,
        })
    }

    /// Context for an entity's edit form: all active groups with
    /// ordered fields, plus the entity's current values.
    pub fn form_context(&self, entity: &EntityRef) -> Result<FormContext, Error> {
        let values = self.values_for(entity)?;

        let groups = self
            .definitions
            .list_groups(true)
            .into_iter()
            .map(|group| GroupWithFields {
                group: group.clone(),
                fields: self
                    .definitions
                    .fields_of(group.id)
                    .into_iter()
                    .cloned()
                    .collect(),
            })
            .collect();

        Ok(FormContext { groups, values })
    }

    ///
    /// INTERNAL
    ///

    fn ensure_supported(&self, entity: &EntityRef) -> Result<(), Error> {
        if self.supports_entity_type(entity.entity_type()) {
            Ok(())
        } else {
            Err(Error::unsupported_entity_type(entity.entity_type()))
        }
    }

    fn ensure_group_exists(&self, group_id: GroupId) -> Result<(), Error> {
        if self.definitions.group_by_id(group_id).is_some() {
            Ok(())
        } else {
            Err(Error::definition_not_found(format!(
                "field group not found: {group_id}"
            )))
        }
    }

    fn active_group(&self, key: &str) -> Option<&FieldGroup> {
        self.definitions.group(key).filter(|g| g.active)
    }

    fn try_delete_group(&mut self, id: GroupId) -> Result<(), Error> {
        let (_, removed_fields) = self.definitions.delete_group(id)?;
        for field in removed_fields {
            self.values.purge_field(field.id);
        }
        Ok(())
    }

    fn try_delete_field(&mut self, id: FieldId) -> Result<(), Error> {
        let field = self.definitions.delete_field(id)?;
        self.values.purge_field(field.id);
        Ok(())
    }

    fn try_value(
        &self,
        entity: &EntityRef,
        field_key: &str,
    ) -> Result<Option<ValueList>, Error> {
        self.ensure_supported(entity)?;

        let Some(field_id) = self.definitions.field_id_for_key(field_key) else {
            return Ok(None);
        };

        Ok(self
            .values
            .value(&ValueKey::new(entity.clone(), field_id))
            .cloned())
    }

    fn try_values_for(&self, entity: &EntityRef) -> Result<BTreeMap<String, ValueList>, Error> {
        self.ensure_supported(entity)?;

        let mut result = BTreeMap::new();
        for (key, values) in self.values.entity_rows(entity) {
            if let Some(field) = self.definitions.field_by_id(key.field()) {
                result.insert(field.key.clone(), values.clone());
            }
        }
        Ok(result)
    }

    fn try_set_value(
        &mut self,
        entity: &EntityRef,
        field_key: &str,
        values: ValueList,
    ) -> Result<(), Error> {
        self.ensure_supported(entity)?;

        let field_id = self
            .definitions
            .field_id_for_key(field_key)
            .ok_or_else(|| Error::value_not_found(format!("unknown field key: '{field_key}'")))?;

        self.values
            .upsert(ValueKey::new(entity.clone(), field_id), values);
        Ok(())
    }

    fn try_set_values(
        &mut self,
        entity: &EntityRef,
        data: BTreeMap<String, ValueList>,
    ) -> Result<usize, Error> {
        self.ensure_supported(entity)?;

        // Stage every resolvable write first so the commit below cannot
        // leave a partially-updated entity.
        let staged: Vec<(FieldId, ValueList)> = data
            .into_iter()
            .filter_map(|(key, values)| {
                self.definitions
                    .field_id_for_key(&key)
                    .map(|field_id| (field_id, values))
            })
            .collect();

        let written = staged.len();
        for (field_id, values) in staged {
            self.values
                .upsert(ValueKey::new(entity.clone(), field_id), values);
        }
        Ok(written)
    }

    fn try_delete_values(&mut self, entity: &EntityRef) -> Result<usize, Error> {
        self.ensure_supported(entity)?;
        Ok(self.values.purge_entity(entity))
    }

    fn try_clone_values(
        &mut self,
        source: &EntityRef,
        target: &EntityRef,
    ) -> Result<usize, Error> {
        self.ensure_supported(source)?;
        self.ensure_supported(target)?;

        let rows: Vec<(FieldId, ValueList)> = self
            .values
            .entity_rows(source)
            .map(|(key, values)| (key.field(), values.clone()))
            .collect();

        let copied = rows.len();
        for (field_id, values) in rows {
            self.values
                .upsert(ValueKey::new(target.clone(), field_id), values);
        }
        Ok(copied)
    }

    fn try_submit(
        &mut self,
        group_key: &str,
        data: BTreeMap<String, ValueList>,
        provenance: Provenance,
    ) -> Result<FormSubmission, Error> {
        let group_id = self
            .active_group(group_key)
            .ok_or_else(|| {
                Error::submission_not_found(format!(
                    "field group not found or inactive: '{group_key}'"
                ))
            })?
            .id;

        let fields = self.definitions.fields_of(group_id);
        validate::validate_submission(&fields, &data).map_err(Error::validation_failed)?;

        Ok(self.submissions.append(group_id, data, provenance).clone())
    }

    fn try_delete_submission(
        &mut self,
        group_id: GroupId,
        id: SubmissionId,
    ) -> Result<FormSubmission, Error> {
        // scope check first; a mismatched pair must not delete anything
        self.submission(group_id, id)?;

        self.submissions
            .remove(id)
            .ok_or_else(|| Error::submission_not_found(format!("submission not found: {id}")))
    }

    fn try_export_csv(&self, group_id: GroupId) -> Result<String, Error> {
        self.ensure_group_exists(group_id)?;

        let fields = self.definitions.fields_of(group_id);
        let submissions: Vec<&FormSubmission> = self.submissions.for_group(group_id).collect();

        export::render_csv(&fields, &submissions).map_err(Error::from)
    }
}

///
/// TESTS
///

use crate::{
    types::{GroupId, SubmissionId},
    value::ValueList,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::PrimitiveDateTime;

///
/// Provenance
/// Request metadata captured alongside an anonymous submission.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Provenance {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub submitted_at: PrimitiveDateTime,
}

impl Provenance {
    #[must_use]
    pub const fn new(
        ip_address: Option<String>,
        user_agent: Option<String>,
        submitted_at: PrimitiveDateTime,
    ) -> Self {
        Self {
            ip_address,
            user_agent,
            submitted_at,
        }
    }
}

///
/// FormSubmission
///
/// Immutable snapshot of one public-form submission: the entire answer
/// set as a single blob plus request provenance. Never updated after
/// insert; deletion is the only mutation.
///
/// Decoupled from field lifecycle on purpose: deleting a field later
/// does not rewrite historical submissions.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FormSubmission {
    pub id: SubmissionId,
    pub group_id: GroupId,
    pub data: BTreeMap<String, ValueList>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: PrimitiveDateTime,
}

impl FormSubmission {
    /// Stored answer for one field key, if the submission carried it.
    #[must_use]
    pub fn value(&self, field_key: &str) -> Option<&ValueList> {
        self.data.get(field_key)
    }
}

///
/// SubmissionStore
///
/// Append-only store of submission snapshots with monotonic ids.
/// Natural iteration order is id order, which equals creation order.
///

#[derive(Debug, Default)]
pub struct SubmissionStore {
    rows: BTreeMap<SubmissionId, FormSubmission>,
    next_id: u64,
}

impl SubmissionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one immutable snapshot and return it.
    pub fn append(
        &mut self,
        group_id: GroupId,
        data: BTreeMap<String, ValueList>,
        provenance: Provenance,
    ) -> &FormSubmission {
        self.next_id += 1;
        let id = SubmissionId::new(self.next_id);

        self.rows.insert(
            id,
            FormSubmission {
                id,
                group_id,
                data,
                ip_address: provenance.ip_address,
                user_agent: provenance.user_agent,
                created_at: provenance.submitted_at,
            },
        );

        &self.rows[&id]
    }

    #[must_use]
    pub fn get(&self, id: SubmissionId) -> Option<&FormSubmission> {
        self.rows.get(&id)
    }

    /// Submissions for one group, in storage (creation) order.
    pub fn for_group(&self, group_id: GroupId) -> impl Iterator<Item = &FormSubmission> {
        self.rows.values().filter(move |s| s.group_id == group_id)
    }

    /// Full deletion, the only mutation submissions support.
    pub fn remove(&mut self, id: SubmissionId) -> Option<FormSubmission> {
        self.rows.remove(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month, Time};

    fn at(hour: u8, minute: u8) -> PrimitiveDateTime {
        PrimitiveDateTime::new(
            Date::from_calendar_date(2026, Month::March, 14).unwrap(),
            Time::from_hms(hour, minute, 0).unwrap(),
        )
    }

    fn provenance() -> Provenance {
        Provenance::new(Some("203.0.113.9".to_string()), None, at(9, 30))
    }

    #[test]
    fn append_assigns_monotonic_ids() {
        let mut store = SubmissionStore::new();
        let group = GroupId::new(1);

        let first = store.append(group, BTreeMap::new(), provenance()).id;
        let second = store.append(group, BTreeMap::new(), provenance()).id;

        assert!(first < second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn for_group_filters_and_preserves_order() {
        let mut store = SubmissionStore::new();
        let a = GroupId::new(1);
        let b = GroupId::new(2);

        let first = store.append(a, BTreeMap::new(), provenance()).id;
        store.append(b, BTreeMap::new(), provenance());
        let third = store.append(a, BTreeMap::new(), provenance()).id;

        let ids: Vec<SubmissionId> = store.for_group(a).map(|s| s.id).collect();
        assert_eq!(ids, vec![first, third]);
    }

    #[test]
    fn remove_is_the_only_mutation() {
        let mut store = SubmissionStore::new();
        let group = GroupId::new(1);
        let mut data = BTreeMap::new();
        data.insert("color".to_string(), ValueList::from_scalar("red"));

        let id = store.append(group, data, provenance()).id;
        let removed = store.remove(id).unwrap();

        assert_eq!(
            removed.value("color"),
            Some(&ValueList::from_scalar("red"))
        );
        assert!(store.is_empty());
    }
}

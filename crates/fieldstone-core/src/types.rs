use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// GroupId
/// Store-assigned identifier for a [`crate::schema::FieldGroup`].
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
pub struct GroupId(u64);

impl GroupId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

///
/// FieldId
/// Store-assigned identifier for a [`crate::schema::Field`].
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
pub struct FieldId(u64);

impl FieldId {
    pub const MIN: Self = Self(u64::MIN);
    pub const MAX: Self = Self(u64::MAX);

    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

///
/// SubmissionId
/// Store-assigned identifier for a [`crate::store::FormSubmission`].
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
pub struct SubmissionId(u64);

impl SubmissionId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

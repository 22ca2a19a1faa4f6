//! Core runtime for Fieldstone: field-group definitions, polymorphic
//! value storage, per-type display dispatch, and the form/submission
//! engine, with the ergonomics exported via the `prelude`.

pub mod engine;
pub mod error;
pub mod export;
pub mod format;
pub mod obs;
pub mod resolver;
pub mod schema;
pub mod store;
pub mod types;
pub mod validate;
pub mod value;

///
/// CONSTANTS
///

/// Maximum number of elements accepted in one stored value list.
///
/// This bounds JSON-boundary ingest so a single multi-select payload
/// cannot balloon a row; typed construction inside the crate is not
/// gated.
pub const MAX_VALUE_LIST_LEN: usize = 1024;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, formatters, exporters, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        engine::Engine,
        schema::{Field, FieldDraft, FieldGroup, FieldType, GroupDraft},
        store::{EntityKind, EntityRef, FormSubmission, Provenance},
        types::{FieldId, GroupId, SubmissionId},
        value::{Value, ValueList},
    };
}

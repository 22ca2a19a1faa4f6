//! Fieldstone: dynamic custom fields for arbitrary domain entities.
//!
//! Administrators define reusable groups of typed fields; the engine
//! persists and validates values against those definitions, attached
//! either to addressable entities or to anonymous public-form
//! submissions.
//!
//! ## Crate layout
//! - `core`: runtime engine. Definitions, value storage, per-type
//!   dispatch, submissions, export, and observability.
//!
//! The `prelude` module mirrors the surface used by application code.

pub use fieldstone_core as core;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::{engine::Engine, error::Error};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        engine::{Engine, FormContext, FormSchema, GroupWithFields},
        error::{Error, ErrorClass, ErrorOrigin},
        resolver::{EntityResolver, ModelOption, NullResolver, ResolvedEntity},
        schema::{
            Choices, ConditionRule, ConditionalLogic, Field, FieldDraft, FieldGroup, FieldType,
            GroupDraft, MatchMode, RuleOp, Wrapper,
        },
        store::{EntityKind, EntityRef, FormSubmission, Provenance},
        types::{FieldId, GroupId, SubmissionId},
        validate::ValidationFailed,
        value::{Value, ValueList},
    };
    pub use serde::{Deserialize, Serialize};
}

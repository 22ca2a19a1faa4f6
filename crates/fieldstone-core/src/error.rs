use crate::validate::ValidationFailed;
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Structured runtime error with a stable classification.
/// Every fallible engine operation surfaces one of these; the
/// (class, origin) pair is the contract, the message is diagnostic text.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `class`.
    pub detail: Option<ErrorDetail>,
}

impl Error {
    /// Construct an error with no structured detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a definition-origin not-found error.
    pub(crate) fn definition_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, ErrorOrigin::Definition, message)
    }

    /// Construct a value-origin not-found error.
    pub(crate) fn value_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, ErrorOrigin::Value, message)
    }

    /// Construct a standardized unsupported-entity-type error.
    pub fn unsupported_entity_type(entity_type: impl Into<String>) -> Self {
        let entity_type = entity_type.into();

        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Value,
            format!("entity type '{entity_type}' does not support custom fields"),
        )
    }

    /// Construct a submission-origin not-found error.
    pub(crate) fn submission_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, ErrorOrigin::Submission, message)
    }

    /// Wrap a failed required-field check.
    ///
    /// The per-field messages ride along as structured detail so callers
    /// can re-display them next to the offending inputs.
    pub fn validation_failed(failed: ValidationFailed) -> Self {
        Self {
            class: ErrorClass::Validation,
            origin: ErrorOrigin::Submission,
            message: failed.to_string(),
            detail: Some(ErrorDetail::Validation(failed)),
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self.class, ErrorClass::Conflict)
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.class, ErrorClass::Unsupported)
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.class, ErrorClass::Validation)
    }

    /// Per-field validation messages, when this is a validation error.
    #[must_use]
    pub const fn validation_detail(&self) -> Option<&ValidationFailed> {
        match &self.detail {
            Some(ErrorDetail::Validation(failed)) => Some(failed),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, class-specific error detail carried by [`Error`].
/// This enum is intentionally extensible.
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Validation(ValidationFailed),
}

///
/// ErrorClass
/// Error taxonomy for caller-facing classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Conflict,
    Unsupported,
    Validation,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Unsupported => "unsupported",
            Self::Validation => "validation",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Origin taxonomy identifying the component that raised the error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Definition,
    Value,
    Submission,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Definition => "definition",
            Self::Value => "value",
            Self::Submission => "submission",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn class_predicates_match_constructors() {
        let conflict = Error::new(ErrorClass::Conflict, ErrorOrigin::Definition, "x");

        assert!(Error::definition_not_found("x").is_not_found());
        assert!(conflict.is_conflict());
        assert!(!conflict.is_not_found());
        assert!(Error::unsupported_entity_type("Widget").is_unsupported());
    }

    #[test]
    fn validation_error_carries_field_messages() {
        let mut errors = BTreeMap::new();
        errors.insert("price".to_string(), "Price is required".to_string());
        let err = Error::validation_failed(ValidationFailed::new(errors));

        assert!(err.is_validation());
        let detail = err.validation_detail().expect("validation detail");
        assert_eq!(
            detail.errors().get("price").map(String::as_str),
            Some("Price is required")
        );
    }

    #[test]
    fn display_with_class_includes_origin_and_class() {
        let err = Error::unsupported_entity_type("Widget");
        let text = err.display_with_class();
        assert!(text.starts_with("value:unsupported:"), "got: {text}");
    }
}

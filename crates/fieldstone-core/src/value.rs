use crate::{
    MAX_VALUE_LIST_LEN,
    error::{Error, ErrorClass, ErrorOrigin},
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use thiserror::Error as ThisError;

///
/// ValueError
///

#[derive(Debug, ThisError)]
pub enum ValueError {
    #[error("value payload must be a scalar or a list of scalars")]
    NonScalarPayload,

    #[error("list element at index {index} is not a scalar")]
    NonScalarElement { index: usize },

    #[error("value list exceeds max length: {len} elements (limit {MAX_VALUE_LIST_LEN})")]
    TooManyElements { len: usize },
}

impl ValueError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::Unsupported
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        ErrorOrigin::Value
    }
}

impl From<ValueError> for Error {
    fn from(err: ValueError) -> Self {
        Self::new(err.class(), err.origin(), err.to_string())
    }
}

///
/// Value
///
/// A single stored scalar. The closed set mirrors what the JSON boundary
/// can carry for a form input. Collections never nest: multi-valued
/// fields are a [`ValueList`] of these.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Map a JSON scalar into a stored scalar.
    ///
    /// Arrays and objects are rejected; list shaping happens one level up
    /// in [`ValueList::from_json`].
    pub fn try_from_scalar(json: serde_json::Value) -> Result<Self, ValueError> {
        match json {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::Bool(b) => Ok(Self::Bool(b)),
            serde_json::Value::Number(n) => n.as_i64().map_or_else(
                || {
                    n.as_f64()
                        .map(Self::Float)
                        .ok_or(ValueError::NonScalarPayload)
                },
                |i| Ok(Self::Int(i)),
            ),
            serde_json::Value::String(s) => Ok(Self::Text(s)),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Err(ValueError::NonScalarPayload)
            }
        }
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    /// Returns true for the payloads a presence check treats as absent:
    /// `Null` and the empty string.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

#[macro_export]
macro_rules! impl_from_for {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for! {
    bool   => Bool,
    i8     => Int,
    i16    => Int,
    i32    => Int,
    i64    => Int,
    u8     => Int,
    u16    => Int,
    u32    => Int,
    f32    => Float,
    f64    => Float,
    &str   => Text,
    String => Text,
}

///
/// ValueList
///
/// The one bit-exact storage contract: a stored payload is always a list,
/// even when the field holds a single scalar. Consumers must never assume
/// a bare scalar.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValueList(Vec<Value>);

impl ValueList {
    /// Wrap a single scalar as `[v]`.
    pub fn from_scalar(value: impl Into<Value>) -> Self {
        Self(vec![value.into()])
    }

    /// Take a list payload through unchanged.
    #[must_use]
    pub const fn from_vec(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Normalize a raw JSON payload into the stored list shape.
    ///
    /// A scalar wraps to a single-element list; an array of scalars passes
    /// through unchanged. Nested arrays and objects are rejected.
    pub fn from_json(json: serde_json::Value) -> Result<Self, ValueError> {
        match json {
            serde_json::Value::Array(items) => {
                if items.len() > MAX_VALUE_LIST_LEN {
                    return Err(ValueError::TooManyElements { len: items.len() });
                }

                let values = items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| {
                        Value::try_from_scalar(item)
                            .map_err(|_| ValueError::NonScalarElement { index })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(Self(values))
            }
            scalar => Ok(Self(vec![Value::try_from_scalar(scalar)?])),
        }
    }

    #[must_use]
    pub fn first(&self) -> Option<&Value> {
        self.0.first()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.0.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Presence check used by required-field validation.
    ///
    /// An empty list is absent; a sole blank element (`Null` or `""`) is
    /// absent. `["0"]` is present; this is a presence check, not a
    /// truthiness check.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self.0.as_slice() {
            [] => false,
            [only] => !only.is_blank(),
            _ => true,
        }
    }

    /// Truthiness for `true_false` rendering: the first element equals
    /// boolean `true` or the string `"true"`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self.first() {
            Some(Value::Bool(b)) => *b,
            Some(Value::Text(s)) => s == "true",
            _ => false,
        }
    }
}

impl From<Value> for ValueList {
    fn from(value: Value) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<Value>> for ValueList {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl<'a> IntoIterator for &'a ValueList {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

///
/// TESTS
///

use serde::{Deserialize, Serialize};
use std::fmt;

///
/// FieldModel
/// Static metadata for one form field.
///

#[derive(Debug)]
pub struct FieldModel {
    /// Field name; doubles as the parameter key on the wire.
    pub name: &'static str,
    /// Scalar kind raw parameter text is coerced into.
    pub kind: FieldKind,
    /// An absent value is legal after validation.
    pub nullable: bool,
    /// Virtual fields (false) validate but never reach the store.
    pub persisted: bool,
    /// Allow-list membership; only assignable fields read params.
    pub assignable: bool,
}

///
/// FieldKind
///
/// Scalar type surface forms can carry. Collections and references are
/// entity territory, not form input.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum FieldKind {
    Bool,
    Date,
    Float,
    Int,
    Text,
    Timestamp,
    Uint,
}

impl FieldKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Date => "date",
            Self::Float => "float",
            Self::Int => "int",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Uint => "uint",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

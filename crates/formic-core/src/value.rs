use crate::model::field::FieldKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;
use time::{
    Date, OffsetDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

///
/// CoercionError
/// Raw parameter text that does not parse as the field's declared kind.
/// Recorded on the field; never aborts binding of other fields.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("cannot parse '{raw}' as {kind}")]
pub struct CoercionError {
    pub kind: FieldKind,
    pub raw: String,
}

///
/// Value
///
/// Typed scalar carried by one field. One variant per `FieldKind`.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Bool(bool),
    Date(Date),
    Float(f64),
    Int(i64),
    Text(String),
    Timestamp(OffsetDateTime),
    Uint(u64),
}

impl Value {
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::Date(_) => FieldKind::Date,
            Self::Float(_) => FieldKind::Float,
            Self::Int(_) => FieldKind::Int,
            Self::Text(_) => FieldKind::Text,
            Self::Timestamp(_) => FieldKind::Timestamp,
            Self::Uint(_) => FieldKind::Uint,
        }
    }

    /// Parse raw parameter text into a typed value.
    ///
    /// This is the only conversion from wire text to `Value`; everything
    /// the allow-list binds goes through here.
    pub fn coerce(kind: FieldKind, raw: &str) -> Result<Self, CoercionError> {
        let fail = || CoercionError {
            kind,
            raw: raw.to_string(),
        };
        let trimmed = raw.trim();

        match kind {
            FieldKind::Bool => match trimmed {
                "true" | "1" | "on" => Ok(Self::Bool(true)),
                "false" | "0" | "off" => Ok(Self::Bool(false)),
                _ => Err(fail()),
            },
            FieldKind::Date => Date::parse(trimmed, DATE_FORMAT)
                .map(Self::Date)
                .map_err(|_| fail()),
            FieldKind::Float => trimmed.parse().map(Self::Float).map_err(|_| fail()),
            FieldKind::Int => trimmed.parse().map(Self::Int).map_err(|_| fail()),
            FieldKind::Text => Ok(Self::Text(raw.to_string())),
            FieldKind::Timestamp => OffsetDateTime::parse(trimmed, &Rfc3339)
                .map(Self::Timestamp)
                .map_err(|_| fail()),
            FieldKind::Uint => trimmed.parse().map(Self::Uint).map_err(|_| fail()),
        }
    }

    /// True for values the acceptance rule treats as affirmative.
    #[must_use]
    pub const fn is_affirmative(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    /// Present-but-blank check used by the required rule on text fields.
    #[must_use]
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric projection used by comparison validators.
    ///
    /// Lossy above 2^53 for the integer variants; comparison rules accept
    /// that in exchange for one shared numeric lane.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            #[allow(clippy::cast_precision_loss)]
            Self::Int(n) => Some(*n as f64),
            #[allow(clippy::cast_precision_loss)]
            Self::Uint(n) => Some(*n as f64),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Timestamp(t) => write!(f, "{t}"),
            Self::Uint(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_trimmed_numerics() {
        assert_eq!(
            Value::coerce(FieldKind::Int, " -42 ").unwrap(),
            Value::Int(-42)
        );
        assert_eq!(
            Value::coerce(FieldKind::Uint, "21").unwrap(),
            Value::Uint(21)
        );
        assert_eq!(
            Value::coerce(FieldKind::Float, "2.5").unwrap(),
            Value::Float(2.5)
        );
    }

    #[test]
    fn uint_rejects_negative_input() {
        let err = Value::coerce(FieldKind::Uint, "-1").unwrap_err();
        assert_eq!(err.kind, FieldKind::Uint);
        assert_eq!(err.raw, "-1");
    }

    #[test]
    fn bool_accepts_form_tokens_only() {
        assert_eq!(
            Value::coerce(FieldKind::Bool, "on").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            Value::coerce(FieldKind::Bool, "0").unwrap(),
            Value::Bool(false)
        );
        assert!(Value::coerce(FieldKind::Bool, "yes").is_err());
    }

    #[test]
    fn text_is_kept_verbatim() {
        assert_eq!(
            Value::coerce(FieldKind::Text, "  padded  ").unwrap(),
            Value::Text("  padded  ".to_string())
        );
    }

    #[test]
    fn date_parses_iso_only() {
        assert!(Value::coerce(FieldKind::Date, "2024-02-29").is_ok());
        assert!(Value::coerce(FieldKind::Date, "02/29/2024").is_err());
        assert!(Value::coerce(FieldKind::Date, "2023-02-29").is_err());
    }

    #[test]
    fn timestamp_parses_rfc3339() {
        assert!(Value::coerce(FieldKind::Timestamp, "2024-06-01T12:00:00Z").is_ok());
        assert!(Value::coerce(FieldKind::Timestamp, "2024-06-01 12:00").is_err());
    }

    #[test]
    fn coercion_error_message_names_kind_and_raw() {
        let err = Value::coerce(FieldKind::Int, "abc").unwrap_err();
        assert_eq!(err.to_string(), "cannot parse 'abc' as int");
    }

    #[test]
    fn values_round_trip_through_json() {
        let value = Value::Uint(21);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&json).unwrap(), value);
    }

    #[test]
    fn blank_text_detection() {
        assert!(Value::Text("   ".to_string()).is_blank_text());
        assert!(!Value::Text("x".to_string()).is_blank_text());
        assert!(!Value::Int(0).is_blank_text());
    }
}

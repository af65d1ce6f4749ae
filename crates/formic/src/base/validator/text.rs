use crate::core::{pipeline::Validator, value::Value};

///
/// NonEmpty
/// Text with at least one non-whitespace character.
///

pub struct NonEmpty;

impl Validator for NonEmpty {
    fn name(&self) -> &'static str {
        "text::non_empty"
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        match value {
            None => Ok(()),
            Some(Value::Text(s)) if s.trim().is_empty() => Err("must not be empty".to_string()),
            Some(Value::Text(_)) => Ok(()),
            Some(other) => Err(format!("expected text, found {}", other.kind())),
        }
    }
}

///
/// Ascii
/// this doesn't force printable; it uses `str::is_ascii`
///

pub struct Ascii;

impl Validator for Ascii {
    fn name(&self) -> &'static str {
        "text::ascii"
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        match value {
            None => Ok(()),
            Some(Value::Text(s)) if !s.is_ascii() => {
                Err("contains non-ascii characters".to_string())
            }
            Some(Value::Text(_)) => Ok(()),
            Some(other) => Err(format!("expected text, found {}", other.kind())),
        }
    }
}

///
/// Matches
/// Equality against a fixed expected value.
///

pub struct Matches {
    expected: Value,
}

impl Matches {
    #[must_use]
    pub const fn new(expected: Value) -> Self {
        Self { expected }
    }
}

impl Validator for Matches {
    fn name(&self) -> &'static str {
        "text::matches"
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        match value {
            None => Ok(()),
            Some(v) if *v == self.expected => Ok(()),
            Some(_) => Err(format!("must equal '{}'", self.expected)),
        }
    }
}

use crate::core::{pipeline::Validator, value::Value};

fn char_len(value: &Value) -> Result<usize, String> {
    match value {
        Value::Text(s) => Ok(s.chars().count()),
        other => Err(format!("expected text, found {}", other.kind())),
    }
}

///
/// MinLen
///

pub struct MinLen {
    min: usize,
}

impl MinLen {
    #[must_use]
    pub const fn new(min: usize) -> Self {
        Self { min }
    }
}

impl Validator for MinLen {
    fn name(&self) -> &'static str {
        "len::min"
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        let Some(value) = value else {
            return Ok(());
        };
        let len = char_len(value)?;
        if len < self.min {
            return Err(format!("must be at least {} characters", self.min));
        }

        Ok(())
    }
}

///
/// MaxLen
///

pub struct MaxLen {
    max: usize,
}

impl MaxLen {
    #[must_use]
    pub const fn new(max: usize) -> Self {
        Self { max }
    }
}

impl Validator for MaxLen {
    fn name(&self) -> &'static str {
        "len::max"
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        let Some(value) = value else {
            return Ok(());
        };
        let len = char_len(value)?;
        if len > self.max {
            return Err(format!("must be at most {} characters", self.max));
        }

        Ok(())
    }
}

///
/// LenRange
///

pub struct LenRange {
    min: usize,
    max: usize,
    error: Option<&'static str>,
}

impl LenRange {
    #[must_use]
    pub const fn new(min: usize, max: usize) -> Self {
        let error = if min <= max {
            None
        } else {
            Some("length range requires min <= max")
        };

        Self { min, max, error }
    }
}

impl Validator for LenRange {
    fn name(&self) -> &'static str {
        "len::range"
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        if let Some(err) = self.error {
            return Err(err.to_string());
        }
        let Some(value) = value else {
            return Ok(());
        };
        let len = char_len(value)?;
        if len < self.min || len > self.max {
            return Err(format!(
                "must be between {} and {} characters",
                self.min, self.max
            ));
        }

        Ok(())
    }
}

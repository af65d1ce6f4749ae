use crate::core::{pipeline::Validator, value::Value};

/// Project a value into the shared numeric lane.
fn cast_num(value: &Value) -> Result<f64, String> {
    value
        .as_f64()
        .ok_or_else(|| format!("expected a number, found {}", value.kind()))
}

// ============================================================================
// Comparison validators
// ============================================================================

macro_rules! cmp_validator {
    ($name:ident, $rule:literal, $op:tt, $msg:expr) => {
        pub struct $name {
            target: f64,
        }

        impl $name {
            #[must_use]
            pub const fn new(target: f64) -> Self {
                Self { target }
            }
        }

        impl Validator for $name {
            fn name(&self) -> &'static str {
                $rule
            }

            fn validate(&self, value: Option<&Value>) -> Result<(), String> {
                let Some(value) = value else {
                    return Ok(());
                };

                let v = cast_num(value)?;
                if v $op self.target {
                    Ok(())
                } else {
                    Err(format!($msg, v, self.target))
                }
            }
        }
    };
}

cmp_validator!(Lt, "num::lt", <, "{} must be < {}");
cmp_validator!(Gt, "num::gt", >, "{} must be > {}");
cmp_validator!(Lte, "num::lte", <=, "{} must be <= {}");
cmp_validator!(Gte, "num::gte", >=, "{} must be >= {}");

// ============================================================================
// Range
// ============================================================================

pub struct Range {
    min: f64,
    max: f64,
    error: Option<&'static str>,
}

impl Range {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        let error = if min <= max {
            None
        } else {
            Some("range requires min <= max")
        };

        Self { min, max, error }
    }
}

impl Validator for Range {
    fn name(&self) -> &'static str {
        "num::range"
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        if let Some(err) = self.error {
            return Err(err.to_string());
        }
        let Some(value) = value else {
            return Ok(());
        };

        let v = cast_num(value)?;
        if v < self.min || v > self.max {
            return Err(format!("{} must be between {} and {}", v, self.min, self.max));
        }

        Ok(())
    }
}

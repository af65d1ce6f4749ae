use crate::{field::Field, value::Value};
use std::collections::{BTreeMap, BTreeSet};

/// Message shared by the required rule and the automatic pass, so the
/// by-field de-duplication below never produces two renderings of it.
pub const REQUIRED_MESSAGE: &str = "is required";

/// Rule name recorded for the automatic non-nullable pass.
const AUTO_REQUIRED_RULE: &str = "required(auto)";

///
/// Validator
///
/// One rule evaluated against a field's current value. Absent values are
/// requiredness territory; most rules return Ok for them so that optional
/// fields validate only when supplied.
///

pub trait Validator {
    /// Stable rule name recorded in the run trace.
    fn name(&self) -> &'static str;

    fn validate(&self, value: Option<&Value>) -> Result<(), String>;

    /// Required-type rules share the de-duplication set with the
    /// automatic non-nullable pass.
    fn is_required_rule(&self) -> bool {
        false
    }
}

///
/// Rule
/// Adapter turning a named closure into a `Validator`, for one-off rules
/// declared inline in `prepare`.
///

pub struct Rule<F> {
    name: &'static str,
    check: F,
}

impl<F> Rule<F>
where
    F: Fn(Option<&Value>) -> Result<(), String>,
{
    pub const fn new(name: &'static str, check: F) -> Self {
        Self { name, check }
    }
}

impl<F> Validator for Rule<F>
where
    F: Fn(Option<&Value>) -> Result<(), String>,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        (self.check)(value)
    }
}

// ============================================================================
// Built-in rules
// ============================================================================

///
/// Required
/// Present and, for text, non-blank.
///

pub(crate) struct Required;

impl Validator for Required {
    fn name(&self) -> &'static str {
        "required"
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        match value {
            None => Err(REQUIRED_MESSAGE.to_string()),
            Some(v) if v.is_blank_text() => Err(REQUIRED_MESSAGE.to_string()),
            Some(_) => Ok(()),
        }
    }

    fn is_required_rule(&self) -> bool {
        true
    }
}

///
/// Confirmation
/// Equality against another field's value, captured at registration time.
///

pub(crate) struct Confirmation {
    pub other_name: &'static str,
    pub other_value: Option<Value>,
}

impl Validator for Confirmation {
    fn name(&self) -> &'static str {
        "confirmation_of"
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        if value == self.other_value.as_ref() {
            Ok(())
        } else {
            Err(format!("does not match {}", self.other_name))
        }
    }
}

///
/// Acceptance
/// The affirmative boolean token; anything else fails, including absence.
///

pub(crate) struct Acceptance;

impl Validator for Acceptance {
    fn name(&self) -> &'static str {
        "acceptance_of"
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        match value {
            Some(v) if v.is_affirmative() => Ok(()),
            _ => Err("must be accepted".to_string()),
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

///
/// RuleRun
/// One recorded validator invocation, in declaration order.
///

#[derive(Clone, Copy, Debug)]
pub struct RuleRun {
    pub field: &'static str,
    pub rule: &'static str,
    pub failed: bool,
}

///
/// Pipeline
///
/// Ordered record of validator invocations for one submission. Rules are
/// evaluated immediately at registration; the trace preserves declaration
/// order for diagnostics. Registration is open only while `prepare` runs;
/// calls outside that window become configuration errors, which abort the
/// submission fatally rather than dropping a declared check.
///

#[derive(Debug, Default)]
pub(crate) struct Pipeline {
    runs: Vec<RuleRun>,
    required_noted: BTreeSet<&'static str>,
    config_errors: Vec<String>,
    open: bool,
}

impl Pipeline {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn open(&mut self) {
        self.open = true;
    }

    pub(crate) fn close(&mut self) {
        self.open = false;
    }

    /// Record a misconfiguration (unknown field, bad registration target).
    pub(crate) fn config_error(&mut self, message: impl Into<String>) {
        self.config_errors.push(message.into());
    }

    /// Evaluate one rule against one field, appending any failure message.
    /// Never short-circuits: later rules on the same field and rules on
    /// other fields still run.
    pub(crate) fn apply(&mut self, field: &mut Field, rule: &dyn Validator) {
        if !self.open {
            self.config_errors.push(format!(
                "validator '{}' for field '{}' registered outside prepare",
                rule.name(),
                field.param_key(),
            ));
            return;
        }

        let failed = match rule.validate(field.value()) {
            Ok(()) => false,
            Err(message) => {
                field.add_error(message);
                true
            }
        };

        if rule.is_required_rule() {
            self.required_noted.insert(field.param_key());
        }

        self.runs.push(RuleRun {
            field: field.param_key(),
            rule: rule.name(),
            failed,
        });
    }

    /// Automatic requiredness for non-nullable persisted fields left
    /// absent (or blank, for text) after `prepare`. Runs after every
    /// user-declared rule and before the aggregate flag is read; skips
    /// fields a required-type rule already covered (de-duplication is by
    /// field, not by message).
    pub(crate) fn apply_auto_required(&mut self, fields: &mut BTreeMap<&'static str, Field>) {
        for field in fields.values_mut() {
            let model = field.model();
            if model.nullable || !model.persisted {
                continue;
            }
            if Required.validate(field.value()).is_ok() {
                continue;
            }
            if self.required_noted.contains(field.param_key()) {
                continue;
            }

            field.add_error(REQUIRED_MESSAGE);
            self.required_noted.insert(field.param_key());
            self.runs.push(RuleRun {
                field: field.param_key(),
                rule: AUTO_REQUIRED_RULE,
                failed: true,
            });
        }
    }

    pub(crate) fn runs(&self) -> &[RuleRun] {
        &self.runs
    }

    pub(crate) fn config_errors(&self) -> &[String] {
        &self.config_errors
    }
}

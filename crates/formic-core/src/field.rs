use crate::{model::field::FieldModel, value::Value};

///
/// Field
///
/// Runtime holder for one attribute in one submission: typed value, raw
/// parameter text, accumulated error messages, and the assignment flag.
/// Exclusively owned by its form; external input reaches `value` only
/// through the allow-list binding path.
///

#[derive(Clone, Debug)]
pub struct Field {
    model: &'static FieldModel,
    value: Option<Value>,
    param_raw: Option<String>,
    errors: Vec<String>,
    was_assigned: bool,
}

impl Field {
    pub(crate) const fn new(model: &'static FieldModel) -> Self {
        Self {
            model,
            value: None,
            param_raw: None,
            errors: Vec::new(),
            was_assigned: false,
        }
    }

    // ======================================================================
    // Read API
    // ======================================================================

    #[must_use]
    pub const fn model(&self) -> &'static FieldModel {
        self.model
    }

    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn error_messages(&self) -> &[String] {
        &self.errors
    }

    /// Stable name correlating a rendered input with this field on
    /// resubmission.
    #[must_use]
    pub const fn param_key(&self) -> &'static str {
        self.model.name
    }

    #[must_use]
    pub fn param_raw(&self) -> Option<&str> {
        self.param_raw.as_deref()
    }

    #[must_use]
    pub const fn was_assigned(&self) -> bool {
        self.was_assigned
    }

    // ======================================================================
    // Mutation (crate-internal; callbacks go through the form)
    // ======================================================================

    pub(crate) fn set_value(&mut self, value: Value) {
        self.value = Some(value);
    }

    pub(crate) fn clear_value(&mut self) {
        self.value = None;
    }

    pub(crate) fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Accept one raw parameter through the allow-list boundary.
    ///
    /// A coercion failure records a message and leaves `value` absent,
    /// clearing anything previously seeded so the rejected raw text is
    /// never rendered next to a stale typed value; binding of other
    /// fields continues regardless.
    pub(crate) fn assign_from_param(&mut self, raw: &str) {
        self.param_raw = Some(raw.to_string());
        self.was_assigned = true;

        match Value::coerce(self.model.kind, raw) {
            Ok(value) => self.value = Some(value),
            Err(err) => {
                self.value = None;
                self.errors.push(err.to_string());
            }
        }
    }

    #[must_use]
    pub(crate) const fn view(&self) -> FieldView<'_> {
        FieldView { field: self }
    }
}

///
/// FieldView
///
/// Read-only projection handed to the markup layer: enough to render one
/// input element with its errors, nothing that can mutate form state.
///

#[derive(Clone, Copy, Debug)]
pub struct FieldView<'a> {
    field: &'a Field,
}

impl<'a> FieldView<'a> {
    #[must_use]
    pub const fn value(&self) -> Option<&'a Value> {
        self.field.value.as_ref()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.field.has_errors()
    }

    #[must_use]
    pub fn error_messages(&self) -> &'a [String] {
        &self.field.errors
    }

    #[must_use]
    pub const fn param_key(&self) -> &'static str {
        self.field.param_key()
    }

    /// Raw submitted text, for re-rendering a failed submission verbatim.
    #[must_use]
    pub fn param_raw(&self) -> Option<&'a str> {
        self.field.param_raw.as_deref()
    }
}

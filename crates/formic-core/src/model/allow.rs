use crate::{field::Field, model::form::FormModel, params::ParamMap};
use std::collections::BTreeMap;

///
/// AllowList
///
/// Immutable view of which fields may be assigned from external
/// parameters. Built from the form model at type definition; shared
/// read-only across any number of concurrent submissions.
///
/// Fields outside the list can never receive external input, only
/// programmatic values set inside `prepare`.
///

#[derive(Clone, Copy, Debug)]
pub struct AllowList {
    model: &'static FormModel,
}

impl AllowList {
    #[must_use]
    pub const fn of(model: &'static FormModel) -> Self {
        Self { model }
    }

    /// True when external input may populate the named field.
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        self.model.field(name).is_some_and(|f| f.assignable)
    }

    /// Build the fresh field set for one submission, one entry per
    /// descriptor, values absent.
    pub(crate) fn empty_fields(&self) -> BTreeMap<&'static str, Field> {
        self.model
            .fields
            .iter()
            .map(|model| (model.name, Field::new(model)))
            .collect()
    }

    /// Bind a raw parameter map onto the field set.
    ///
    /// This is the sole path from untrusted input to typed field state.
    /// Unknown keys are ignored without error; a parameter for a
    /// non-assignable field is dropped silently; a coercion failure records
    /// an error on its field and binding continues.
    pub(crate) fn bind(&self, fields: &mut BTreeMap<&'static str, Field>, params: &ParamMap) {
        for model in self.model.fields {
            if !model.assignable {
                continue;
            }
            let Some(raw) = params.get(model.name) else {
                continue;
            };
            if let Some(field) = fields.get_mut(model.name) {
                field.assign_from_param(raw);
            }
        }
    }
}

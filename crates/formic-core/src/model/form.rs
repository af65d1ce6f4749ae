use crate::model::field::FieldModel;

///
/// FormModel
/// Static runtime model for one form type. Built once at type definition,
/// never mutated, safe to read from any number of concurrent submissions.
///

#[derive(Debug)]
pub struct FormModel {
    /// Fully-qualified Rust type path (for diagnostics).
    pub path: &'static str,
    /// Stable external name.
    pub form_name: &'static str,
    /// Ordered field list (authoritative for binding and validation).
    pub fields: &'static [FieldModel],
}

impl FormModel {
    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

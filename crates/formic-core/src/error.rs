use thiserror::Error as ThisError;

///
/// FormError
///
/// Fatal submission failures. Everything mappable to a field (coercion,
/// validation, field-hinted store constraints) is recorded on the field
/// and reported through the returned form instead; this type is reserved
/// for conditions the caller must handle differently from "re-render with
/// inline errors".
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FormError {
    /// The store failed with no field mapping (e.g. connection loss).
    #[error("store failure: {message}")]
    Store { message: String },

    /// A required context value in scope for this operation was not
    /// supplied at the call site.
    #[error("missing required context value '{name}'")]
    MissingNeed { name: &'static str },

    /// The form type misused the pipeline (e.g. registered a validator
    /// outside `prepare`, or against an unknown field).
    #[error("invalid form configuration: {0}")]
    InvalidConfig(String),

    /// A store constraint hint named a field this form does not declare.
    #[error("store constraint hint names unknown field '{field}'")]
    UnknownConstraintField { field: String },
}

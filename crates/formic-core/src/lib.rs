//! Core runtime for Formic: field models, allow-list binding, the
//! validation pipeline, lifecycle callbacks, and the record-store boundary.
#![warn(unreachable_pub)]

pub mod error;
pub mod field;
pub mod form;
pub mod lifecycle;
pub mod model;
pub mod needs;
pub mod obs;
pub mod params;
pub mod pipeline;
pub mod store;
pub mod value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, or metrics plumbing is re-exported here.
///

pub mod prelude {
    pub use crate::{
        field::FieldView,
        form::{Form, Submission},
        lifecycle::{FormType, Op},
        model::{
            allow::AllowList,
            field::{FieldKind, FieldModel},
            form::FormModel,
        },
        needs::{NeedModel, NeedScope, Needs},
        params::ParamMap,
        pipeline::{RuleRun, Validator},
        value::Value,
    };
}

//! ## Crate layout
//! - `base`: builtin reusable validators (text, length, numeric).
//! - `core`: runtime field model, allow-list binding, validation pipeline,
//!   lifecycle callbacks, and the record-store boundary.
//!
//! The `prelude` module mirrors the surface used inside form-type code.

pub use formic_core as core;

pub mod base;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::error::FormError;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        field::FieldView,
        form::{Form, Submission},
        lifecycle::{FormState, FormType, Op},
        model::{
            allow::AllowList,
            field::{FieldKind, FieldModel},
            form::FormModel,
        },
        needs::{NeedModel, NeedScope, Needs},
        params::ParamMap,
        pipeline::{Rule, RuleRun, Validator as _},
        store::{Attributes, MemStore, Record, RecordId, RecordStore, StoreFailure},
        value::Value,
    };
}

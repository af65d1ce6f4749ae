use crate::{form::Form, model::form::FormModel, needs::NeedModel, store::Record};
use std::fmt;

///
/// Op
/// Which submission entry point is running.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Op {
    Create,
    Update,
}

impl Op {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// FormState
///
/// Linear submission lifecycle; no transition re-enters an earlier state.
/// `Invalid` is terminal: a form that failed validation (or a field-mapped
/// store constraint) is handed back for re-rendering, never re-driven.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormState {
    Constructed,
    Prepared,
    Validated,
    Invalid,
    Saving,
    Saved,
    AfterSaved,
}

///
/// FormType
///
/// A form type's static model, declared needs, and three-stage callback
/// chain. Stages default to no-ops; a concrete type overrides the stages
/// it uses. Shared behavior composes by explicit call (a form type's
/// `prepare` invokes a helper first, then adds its own rules) rather than
/// by override chains.
///

pub trait FormType: Sized {
    const MODEL: &'static FormModel;
    const NEEDS: &'static [NeedModel] = &[];

    /// Seed derived values and register validators.
    /// The only stage where the validation pipeline accepts rules.
    fn prepare(_form: &mut Form<Self>) {}

    /// Adjust values just before persistence; runs only when valid.
    fn before_save(_form: &mut Form<Self>) {}

    /// Observe the persisted record (store-assigned id and timestamps
    /// included); runs only after the store succeeded.
    fn after_save(_form: &mut Form<Self>, _record: &Record) {}
}

//! Builtin design-time helpers shared by form types.

pub mod validator;

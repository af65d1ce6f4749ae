//! Reusable validators for form `prepare` code.
//!
//! All rules skip absent values: requiredness is declared separately, so
//! an optional field validates only when supplied.

pub mod len;
pub mod num;
pub mod text;

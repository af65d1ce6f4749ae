pub mod allow;
pub mod field;
pub mod form;

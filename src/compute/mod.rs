//! The formula pipeline and the derived-field recompute pass.
//!
//! Formulas are tokenized, parsed into an expression tree, compiled to a small
//! stack program and executed by `Engine`. `recompute` drives that pipeline
//! for every derived field of a schema.
pub mod bytecode;
pub mod engine;
pub mod formula;
pub mod kernel;
pub mod lexer;
pub mod parser;
pub mod recompute;
pub mod value;

pub use formula::evaluate;
pub use recompute::{derive_field, derived_status, missing_parents, recompute, DerivedStatus};
pub use value::{FormulaError, Value};

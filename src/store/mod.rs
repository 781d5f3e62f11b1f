//! The form model: schemas, fields, rules and the values they hold.
pub mod registry;
pub mod types;

pub use registry::SchemaError;
pub use types::*;

// Core of the form builder: schema model, rule validation, derived-field
// computation and persistence of saved schemas.
//
// The engine is a set of stateless functions over explicit snapshots.
// `FillSession` wires them together for one schema being filled in.

pub mod analysis;
pub mod compute;
pub mod session;
pub mod storage;
pub mod store;
pub mod validation;

pub use analysis::{check_schema, SchemaIssue};
pub use compute::{evaluate, recompute, FormulaError};
pub use session::{FillSession, FormStateSink, SessionError};
pub use storage::{SchemaRepository, StorageConfig};
pub use store::{FieldDefinition, FieldType, FieldValue, FormSchema, ValidationRule, ValueMap};
pub use validation::{validate, Validator};

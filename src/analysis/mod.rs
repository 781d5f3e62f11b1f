//! Static analysis of schemas before they are filled.
pub mod topology;

pub use topology::{candidate_parents, check_schema, dependents_of, SchemaIssue};

//! The rule engine for field values.
//!
//! Rules are declarative and evaluated in declaration order; the first one
//! that fails decides the message shown for the field. Validation failures
//! are ordinary results, never errors.

pub use self::error::{into_error_map, ValidationError};
pub use self::validator::{validate, CustomPredicate, Validator};

mod error;
mod validator;
mod rules {
    pub mod length;
    pub mod pattern;
    pub mod presence;
}

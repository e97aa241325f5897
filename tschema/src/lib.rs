//! Typed field descriptors and collected-violation validation for model output.
//!
//! The same [`ObjectSchema`] describes both a tool's argument shape and an
//! agent's final result, so both are validated and rendered to JSON Schema
//! the same way.

mod candidate;
mod field;
mod output;
mod schema;
mod violation;

pub use candidate::parse_candidate;
pub use field::{FieldSpec, FieldType};
pub use output::{StructuredOutput, decode};
pub use schema::ObjectSchema;
pub use violation::{SchemaViolation, SchemaViolations};

pub mod prelude {
    pub use crate::{
        FieldSpec, FieldType, ObjectSchema, SchemaViolation, SchemaViolations, StructuredOutput,
        decode, parse_candidate,
    };
}

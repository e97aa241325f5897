//! Typed structured-output contract.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{ObjectSchema, SchemaViolation, SchemaViolations};

/// A result type an agent can coerce model output into.
///
/// ```rust
/// use serde::Deserialize;
/// use serde_json::json;
/// use tschema::{FieldSpec, ObjectSchema, StructuredOutput, decode};
///
/// #[derive(Debug, Deserialize)]
/// struct CityLocation {
///     city: String,
///     country: String,
/// }
///
/// impl StructuredOutput for CityLocation {
///     fn schema() -> ObjectSchema {
///         ObjectSchema::new()
///             .field(FieldSpec::string("city"))
///             .field(FieldSpec::string("country"))
///     }
/// }
///
/// let schema = CityLocation::schema();
/// let city: CityLocation = decode(&schema, &json!({"city": "London", "country": "United Kingdom"}))
///     .expect("candidate should decode");
/// assert_eq!(city.city, "London");
/// ```
pub trait StructuredOutput: DeserializeOwned + Send + 'static {
    fn schema() -> ObjectSchema;
}

/// Validates `candidate` against `schema`, then deserializes it into `O`.
pub fn decode<O>(schema: &ObjectSchema, candidate: &Value) -> Result<O, SchemaViolations>
where
    O: DeserializeOwned,
{
    let validated = schema.validate(candidate)?;
    serde_json::from_value(Value::Object(validated)).map_err(|err| {
        SchemaViolations::single(SchemaViolation::Undecodable {
            reason: err.to_string(),
        })
    })
}

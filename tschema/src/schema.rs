//! Object schemas built from field descriptors.
//!
//! ```rust
//! use serde_json::json;
//! use tschema::{FieldSpec, ObjectSchema};
//!
//! let schema = ObjectSchema::new()
//!     .field(FieldSpec::string("support_advice"))
//!     .field(FieldSpec::boolean("block_card"))
//!     .field(FieldSpec::integer("risk").range(0, 10));
//!
//! let violations = schema
//!     .validate(&json!({"support_advice": "ok", "risk": 15}))
//!     .expect_err("candidate should fail");
//!
//! assert_eq!(violations.len(), 2);
//! assert!(violations.is_missing("block_card"));
//! ```

use serde_json::{Map, Value, json};

use crate::field::json_type_name;
use crate::{FieldSpec, FieldType, SchemaViolation, SchemaViolations};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    fields: Vec<FieldSpec>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any earlier field with the same name in place.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        match self.fields.iter_mut().find(|field| field.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.fields.push(spec),
        }
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates `candidate`, collecting every violation rather than stopping
    /// at the first. Undeclared keys are ignored and kept in the returned map.
    pub fn validate(&self, candidate: &Value) -> Result<Map<String, Value>, SchemaViolations> {
        let Some(object) = candidate.as_object() else {
            return Err(SchemaViolations::single(SchemaViolation::NotAnObject {
                found: json_type_name(candidate).to_string(),
            }));
        };

        let mut validated = object.clone();
        let mut violations = SchemaViolations::default();
        for field in &self.fields {
            match object.get(&field.name) {
                None | Some(Value::Null) if field.required => {
                    violations.push(SchemaViolation::MissingField {
                        field: field.name.clone(),
                    });
                }
                None | Some(Value::Null) => {}
                Some(value) => {
                    let found = field.check(value);
                    if found.is_empty()
                        && field.field_type == FieldType::Integer
                        && value.is_f64()
                        && let Some(integral) = value.as_f64()
                    {
                        // Integral floats such as `3.0` are stored as integers.
                        validated.insert(field.name.clone(), Value::from(integral as i64));
                    }
                    for violation in found {
                        violations.push(violation);
                    }
                }
            }
        }

        if violations.is_empty() {
            Ok(validated)
        } else {
            Err(violations)
        }
    }

    /// Renders the schema as a JSON Schema object for tool catalogs.
    pub fn to_json_schema(&self) -> Value {
        let properties = self
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.json_schema()))
            .collect::<Map<String, Value>>();

        let required = self
            .fields
            .iter()
            .filter(|field| field.required)
            .map(|field| Value::String(field.name.clone()))
            .collect::<Vec<_>>();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

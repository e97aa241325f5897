//! Field descriptors: primitive type, presence, and inclusive numeric bounds.
//!
//! ```rust
//! use serde_json::json;
//! use tschema::FieldSpec;
//!
//! let risk = FieldSpec::integer("risk").describe("Risk level").range(0, 10);
//! assert!(risk.check(&json!(7)).is_empty());
//! assert_eq!(risk.check(&json!(15)).len(), 1);
//! ```

use std::fmt::{Display, Formatter};

use serde_json::{Map, Value, json};

use crate::SchemaViolation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
}

// Integral floats must fit in an i64 without saturating; 2^63 itself does not.
const I64_LOWER: f64 = i64::MIN as f64;
const I64_UPPER: f64 = -(i64::MIN as f64);

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Number => value.is_number(),
            Self::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|number| {
                        number.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(&number)
                    })
            }
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Number)
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names the JSON type of `value` the way violation messages report it.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub description: Option<String>,
    pub required: bool,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            description: None,
            required: true,
            minimum: None,
            maximum: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn minimum(mut self, minimum: impl Into<f64>) -> Self {
        self.minimum = Some(minimum.into());
        self
    }

    pub fn maximum(mut self, maximum: impl Into<f64>) -> Self {
        self.maximum = Some(maximum.into());
        self
    }

    /// Inclusive on both ends.
    pub fn range(self, minimum: impl Into<f64>, maximum: impl Into<f64>) -> Self {
        self.minimum(minimum).maximum(maximum)
    }

    /// Checks a present value against the declared type and bounds.
    ///
    /// Bounds are only checked once the type matches, so a single bad value
    /// yields at most one violation.
    pub fn check(&self, value: &Value) -> Vec<SchemaViolation> {
        if !self.field_type.accepts(value) {
            return vec![SchemaViolation::TypeMismatch {
                field: self.name.clone(),
                expected: self.field_type,
                found: json_type_name(value).to_string(),
            }];
        }

        if !self.field_type.is_numeric() {
            return Vec::new();
        }

        let Some(actual) = value.as_f64() else {
            return Vec::new();
        };

        let below = self.minimum.is_some_and(|minimum| actual < minimum);
        let above = self.maximum.is_some_and(|maximum| actual > maximum);
        if below || above {
            return vec![SchemaViolation::Range {
                field: self.name.clone(),
                minimum: self.minimum,
                maximum: self.maximum,
                actual,
            }];
        }

        Vec::new()
    }

    pub(crate) fn json_schema(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".to_string(), json!(self.field_type.as_str()));

        if let Some(description) = &self.description {
            property.insert("description".to_string(), json!(description));
        }

        if let Some(minimum) = self.minimum {
            property.insert("minimum".to_string(), bound_value(self.field_type, minimum));
        }

        if let Some(maximum) = self.maximum {
            property.insert("maximum".to_string(), bound_value(self.field_type, maximum));
        }

        Value::Object(property)
    }
}

fn bound_value(field_type: FieldType, bound: f64) -> Value {
    if field_type == FieldType::Integer && bound.fract() == 0.0 {
        json!(bound as i64)
    } else {
        json!(bound)
    }
}

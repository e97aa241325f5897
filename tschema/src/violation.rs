//! Schema violation values and the collected-violations error.

use crate::FieldType;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("field `{field}` is required but missing")]
    MissingField { field: String },

    #[error("field `{field}` expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        found: String,
    },

    #[error("field `{field}` {}", describe_bounds(.minimum, .maximum, .actual))]
    Range {
        field: String,
        minimum: Option<f64>,
        maximum: Option<f64>,
        actual: f64,
    },

    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: String },

    #[error("response is not valid JSON: {reason}")]
    InvalidJson { reason: String },

    #[error("validated value could not be decoded: {reason}")]
    Undecodable { reason: String },
}

impl SchemaViolation {
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field }
            | Self::TypeMismatch { field, .. }
            | Self::Range { field, .. } => Some(field.as_str()),
            Self::NotAnObject { .. } | Self::InvalidJson { .. } | Self::Undecodable { .. } => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::Range { .. } => "range",
            Self::NotAnObject { .. } => "not_an_object",
            Self::InvalidJson { .. } => "invalid_json",
            Self::Undecodable { .. } => "undecodable",
        }
    }
}

fn describe_bounds(minimum: &Option<f64>, maximum: &Option<f64>, actual: &f64) -> String {
    match (*minimum, *maximum) {
        (Some(minimum), Some(maximum)) => {
            format!("must be between {minimum} and {maximum}, got {actual}")
        }
        (Some(minimum), None) => format!("must be >= {minimum}, got {actual}"),
        (None, Some(maximum)) => format!("must be <= {maximum}, got {actual}"),
        (None, None) => format!("is out of range, got {actual}"),
    }
}

/// Every violation found in one candidate, in field declaration order.
#[derive(Debug, Clone, PartialEq, Default, thiserror::Error)]
#[error("{}", join_violations(.0))]
pub struct SchemaViolations(Vec<SchemaViolation>);

impl SchemaViolations {
    pub fn new(violations: Vec<SchemaViolation>) -> Self {
        Self(violations)
    }

    pub fn single(violation: SchemaViolation) -> Self {
        Self(vec![violation])
    }

    pub fn push(&mut self, violation: SchemaViolation) {
        self.0.push(violation);
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaViolation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<SchemaViolation> {
        self.0
    }

    pub fn is_missing(&self, field: &str) -> bool {
        self.0.iter().any(|violation| {
            matches!(violation, SchemaViolation::MissingField { field: missing } if missing == field)
        })
    }

    /// One violation per line, prefixed with `- `.
    pub fn to_bullets(&self) -> String {
        self.0
            .iter()
            .map(|violation| format!("- {violation}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<SchemaViolation> for SchemaViolations {
    fn from(value: SchemaViolation) -> Self {
        Self::single(value)
    }
}

impl IntoIterator for SchemaViolations {
    type Item = SchemaViolation;
    type IntoIter = std::vec::IntoIter<SchemaViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

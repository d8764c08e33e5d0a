use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single failed check, addressed by a dot-separated path
/// (`address.city`, `tags.0.name`). The root value has the empty path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    pub field_path: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            message: message.into(),
        }
    }
}

/// Aggregated validation failure.
///
/// Violations are kept in the order they were found: schema declaration
/// order across fields, rule declaration order within a field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation failed with {} violation(s)", .details.len())]
pub struct ValidationErrors {
    details: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn new(details: Vec<FieldViolation>) -> Self {
        Self { details }
    }

    /// Failure with one violation, e.g. for a body that is not JSON at all.
    pub fn single(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldViolation::new(field_path, message)])
    }

    pub fn details(&self) -> &[FieldViolation] {
        &self.details
    }

    pub fn into_details(self) -> Vec<FieldViolation> {
        self.details
    }

    pub fn len(&self) -> usize {
        self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// Paths of all violations, in order. Mostly useful in assertions and logs.
    pub fn paths(&self) -> Vec<&str> {
        self.details.iter().map(|d| d.field_path.as_str()).collect()
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldViolation;
    type IntoIter = std::vec::IntoIter<FieldViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.details.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_counts_violations() {
        let errs = ValidationErrors::new(vec![
            FieldViolation::new("email", "\"email\" must be a valid email"),
            FieldViolation::new("phone", "bad phone"),
        ]);
        assert_eq!(errs.to_string(), "validation failed with 2 violation(s)");
        assert_eq!(errs.paths(), vec!["email", "phone"]);
    }

    #[test]
    fn violation_serializes_camel_case() {
        let v = FieldViolation::new("tags.0.name", "oops");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["fieldPath"], "tags.0.name");
        assert_eq!(json["message"], "oops");
    }
}

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use tracing::trace;

use crate::error::{FieldViolation, ValidationErrors};
use crate::formats::{is_email, is_uuid};
use crate::schema::{Field, FieldType, Rule, Schema};

impl Schema {
    /// Validate `raw` against this schema.
    ///
    /// `None` and `null` are treated as an empty object, so an all-optional
    /// schema accepts them. Every field is checked even after a failure.
    pub fn validate(&self, raw: Option<&Value>) -> Result<Value, ValidationErrors> {
        let mut errors = Vec::new();
        let sanitized = match raw {
            None | Some(Value::Null) => validate_fields(self.fields(), &Map::new(), "", &mut errors),
            Some(Value::Object(map)) => validate_fields(self.fields(), map, "", &mut errors),
            Some(_) => {
                errors.push(FieldViolation::new("", "\"value\" must be of type object"));
                Map::new()
            }
        };

        if errors.is_empty() {
            Ok(Value::Object(sanitized))
        } else {
            trace!(schema = %self.name(), violations = errors.len(), "payload rejected");
            Err(ValidationErrors::new(errors))
        }
    }

    /// Validate, then deserialize the sanitized object into `T`.
    pub fn validate_into<T: DeserializeOwned>(
        &self,
        raw: Option<&Value>,
    ) -> Result<T, ValidationErrors> {
        let clean = self.validate(raw)?;
        serde_json::from_value(clean).map_err(|e| {
            ValidationErrors::single(
                "",
                format!("\"value\" does not match schema {}: {}", self.name(), e),
            )
        })
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn label(path: &str) -> &str {
    if path.is_empty() {
        "value"
    } else {
        path
    }
}

fn validate_fields(
    fields: &[Field],
    input: &Map<String, Value>,
    prefix: &str,
    errors: &mut Vec<FieldViolation>,
) -> Map<String, Value> {
    let mut out = Map::new();

    for field in fields {
        let path = join_path(prefix, &field.name);
        match input.get(&field.name).filter(|v| !v.is_null()) {
            Some(raw) => {
                if let Some(clean) = check_value(&field.ty, &field.rules, raw, &path, errors) {
                    out.insert(field.name.clone(), clean);
                }
            }
            None => {
                if let Some(default) = &field.default {
                    out.insert(field.name.clone(), default.clone());
                } else if field.required {
                    errors.push(FieldViolation::new(
                        &path,
                        format!("\"{}\" is required", label(&path)),
                    ));
                }
            }
        }
    }

    out
}

/// Returns the sanitized value, or `None` after pushing at least one violation.
fn check_value(
    ty: &FieldType,
    rules: &[Rule],
    raw: &Value,
    path: &str,
    errors: &mut Vec<FieldViolation>,
) -> Option<Value> {
    let name = label(path);
    let before = errors.len();

    let clean = match ty {
        FieldType::String => {
            let Some(s) = raw.as_str() else {
                errors.push(FieldViolation::new(path, format!("\"{name}\" must be a string")));
                return None;
            };
            if s.is_empty() && rules.iter().any(|r| matches!(r, Rule::NonEmpty)) {
                errors.push(FieldViolation::new(
                    path,
                    format!("\"{name}\" is not allowed to be empty"),
                ));
                return None;
            }
            for rule in rules {
                check_string_rule(rule, s, path, errors);
            }
            Value::String(s.to_string())
        }
        FieldType::Number | FieldType::Integer => {
            let integer = matches!(ty, FieldType::Integer);
            let Some(n) = coerce_number(raw, integer) else {
                let expected = if integer { "an integer" } else { "a number" };
                errors.push(FieldViolation::new(path, format!("\"{name}\" must be {expected}")));
                return None;
            };
            let v = n.as_f64().unwrap_or_default();
            for rule in rules {
                if let Rule::Range { min, max } = rule {
                    if let Some(min) = min.filter(|m| v < *m) {
                        errors.push(FieldViolation::new(
                            path,
                            format!("\"{name}\" must be greater than or equal to {min}"),
                        ));
                    }
                    if let Some(max) = max.filter(|m| v > *m) {
                        errors.push(FieldViolation::new(
                            path,
                            format!("\"{name}\" must be less than or equal to {max}"),
                        ));
                    }
                }
            }
            Value::Number(n)
        }
        FieldType::Boolean => match raw {
            Value::Bool(b) => Value::Bool(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Value::Bool(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Value::Bool(false),
            _ => {
                errors.push(FieldViolation::new(path, format!("\"{name}\" must be a boolean")));
                return None;
            }
        },
        FieldType::Object(schema) => {
            let Value::Object(map) = raw else {
                errors.push(FieldViolation::new(
                    path,
                    format!("\"{name}\" must be of type object"),
                ));
                return None;
            };
            Value::Object(validate_fields(schema.fields(), map, path, errors))
        }
        FieldType::Array(items) => {
            let Value::Array(elems) = raw else {
                errors.push(FieldViolation::new(path, format!("\"{name}\" must be an array")));
                return None;
            };
            for rule in rules {
                if let Rule::Length { min, max } = rule {
                    if let Some(min) = min.filter(|m| elems.len() < *m) {
                        errors.push(FieldViolation::new(
                            path,
                            format!("\"{name}\" must contain at least {min} items"),
                        ));
                    }
                    if let Some(max) = max.filter(|m| elems.len() > *m) {
                        errors.push(FieldViolation::new(
                            path,
                            format!("\"{name}\" must contain less than or equal to {max} items"),
                        ));
                    }
                }
            }
            let clean = elems
                .iter()
                .enumerate()
                .filter_map(|(i, el)| {
                    let el_path = join_path(path, &i.to_string());
                    check_value(items, &[], el, &el_path, errors)
                })
                .collect();
            Value::Array(clean)
        }
    };

    (errors.len() == before).then_some(clean)
}

fn check_string_rule(rule: &Rule, s: &str, path: &str, errors: &mut Vec<FieldViolation>) {
    let name = label(path);
    match rule {
        Rule::Pattern(re) if !re.is_match(s) => errors.push(FieldViolation::new(
            path,
            format!(
                "\"{name}\" with value \"{s}\" fails to match the required pattern: /{}/",
                re.as_str()
            ),
        )),
        Rule::Email if !is_email(s) => errors.push(FieldViolation::new(
            path,
            format!("\"{name}\" must be a valid email"),
        )),
        Rule::Uuid if !is_uuid(s) => errors.push(FieldViolation::new(
            path,
            format!("\"{name}\" must be a valid GUID"),
        )),
        Rule::Length { min, max } => {
            let len = s.chars().count();
            if let Some(min) = min.filter(|m| len < *m) {
                errors.push(FieldViolation::new(
                    path,
                    format!("\"{name}\" length must be at least {min} characters long"),
                ));
            }
            if let Some(max) = max.filter(|m| len > *m) {
                errors.push(FieldViolation::new(
                    path,
                    format!("\"{name}\" length must be less than or equal to {max} characters long"),
                ));
            }
        }
        _ => {}
    }
}

fn coerce_number(raw: &Value, integer: bool) -> Option<Number> {
    match raw {
        Value::Number(n) if !integer => Some(n.clone()),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Some(n.clone())
            } else {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| Number::from(f as i64))
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Some(Number::from(i))
            } else if integer {
                None
            } else {
                s.parse::<f64>().ok().and_then(Number::from_f64)
            }
        }
        _ => None,
    }
}

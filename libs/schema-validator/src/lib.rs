//! Declarative schema validation for JSON payloads.
//!
//! A [`Schema`] is an ordered list of [`Field`] descriptors. One routine,
//! [`Schema::validate`], interprets it against a raw `serde_json::Value` and
//! returns either a sanitized object (defaults applied, unknown keys dropped,
//! scalars coerced to the declared type) or every violation it found.
//!
//! ```
//! use schema_validator::{Field, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::new("person")
//!     .field(Field::string("name").required().non_empty())
//!     .field(Field::integer("age").range(Some(0.0), None).default_value(json!(0)));
//!
//! let clean = schema.validate(Some(&json!({ "name": "Ada", "extra": true }))).unwrap();
//! assert_eq!(clean, json!({ "name": "Ada", "age": 0 }));
//! ```

mod error;
mod formats;
mod schema;
mod validate;

pub use error::{FieldViolation, ValidationErrors};
pub use formats::{is_email, is_uuid};
pub use schema::{Field, FieldType, Rule, Schema};

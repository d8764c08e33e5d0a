//! Input schemas for the users resource.
//!
//! Field names are the wire names (camelCase); the sanitized output of each
//! schema deserializes straight into the matching REST DTO.

use once_cell::sync::Lazy;
use regex::Regex;
use schema_validator::{Field, Schema, ValidationErrors};
use serde_json::{json, Map, Value};

use crate::contract::model::{NewUser, UserPatch};

/// Optional `+country code`, then 7-15 digits, dashes or spaces.
pub const PHONE_PATTERN: &str = r"^(\+[1-9]\d{0,3}[-\s]?)?[\d\-\s]{7,15}$";

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(PHONE_PATTERN).expect("phone regex must compile"));

fn email() -> Field {
    Field::string("email").email()
}

fn phone() -> Field {
    Field::string("phone").pattern(PHONE_RE.clone())
}

/// `user-create`: firstName and lastName required.
pub static USER_CREATE: Lazy<Schema> = Lazy::new(|| {
    Schema::new("user-create")
        .field(Field::string("firstName").required().non_empty())
        .field(Field::string("lastName").required().non_empty())
        .field(email())
        .field(phone())
});

/// `user-update`: same checks as create, nothing required.
pub static USER_UPDATE: Lazy<Schema> = Lazy::new(|| {
    Schema::new("user-update")
        .field(Field::string("firstName").non_empty())
        .field(Field::string("lastName").non_empty())
        .field(email())
        .field(phone())
});

/// `id-param`: the `{id}` path segment.
pub static ID_PARAM: Lazy<Schema> =
    Lazy::new(|| Schema::new("id-param").field(Field::string("id").required().uuid()));

fn present(map: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        map.insert(key.to_string(), Value::String(v.clone()));
    }
}

/// Run `user-create` over an already-typed payload (in-process callers).
pub fn check_new_user(new_user: &NewUser) -> Result<(), ValidationErrors> {
    let mut raw = Map::new();
    raw.insert("firstName".into(), json!(new_user.first_name));
    raw.insert("lastName".into(), json!(new_user.last_name));
    present(&mut raw, "email", &new_user.email);
    present(&mut raw, "phone", &new_user.phone);
    USER_CREATE.validate(Some(&Value::Object(raw))).map(drop)
}

/// Run `user-update` over an already-typed patch (in-process callers).
pub fn check_patch(patch: &UserPatch) -> Result<(), ValidationErrors> {
    let mut raw = Map::new();
    present(&mut raw, "firstName", &patch.first_name);
    present(&mut raw, "lastName", &patch.last_name);
    present(&mut raw, "email", &patch.email);
    present(&mut raw, "phone", &patch.phone);
    USER_UPDATE.validate(Some(&Value::Object(raw))).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_reports_email_then_phone() {
        let errs = USER_CREATE
            .validate(Some(&json!({
                "firstName": "Alice",
                "lastName": "Johnson",
                "email": "bad",
                "phone": "bad"
            })))
            .unwrap_err();
        assert_eq!(errs.paths(), vec!["email", "phone"]);
        assert_eq!(errs.details()[0].message, "\"email\" must be a valid email");
        assert!(errs.details()[1]
            .message
            .starts_with("\"phone\" with value \"bad\" fails to match the required pattern"));
    }

    #[test]
    fn create_strips_unknown_fields() {
        let out = USER_CREATE
            .validate(Some(&json!({
                "firstName": "Alice",
                "lastName": "Johnson",
                "id": "forged",
                "createdAt": "1999-01-01T00:00:00.000Z",
                "isAdmin": true
            })))
            .unwrap();
        assert_eq!(out, json!({ "firstName": "Alice", "lastName": "Johnson" }));
    }

    #[test]
    fn create_requires_names() {
        let errs = USER_CREATE.validate(None).unwrap_err();
        assert_eq!(errs.paths(), vec!["firstName", "lastName"]);
        assert_eq!(errs.details()[0].message, "\"firstName\" is required");
    }

    #[test]
    fn update_accepts_empty_payloads() {
        assert_eq!(USER_UPDATE.validate(None).unwrap(), json!({}));
        assert_eq!(USER_UPDATE.validate(Some(&json!({}))).unwrap(), json!({}));
        let errs = USER_UPDATE
            .validate(Some(&json!({ "firstName": "" })))
            .unwrap_err();
        assert_eq!(errs.paths(), vec!["firstName"]);
    }

    #[test]
    fn phone_grammar() {
        for ok in ["+1 555-123-4567", "555 1234", "+44-20 7946 0958", "0123456789"] {
            assert!(PHONE_RE.is_match(ok), "{ok} should match");
        }
        for bad in ["bad", "123", "+0 5551234", "555-abc-1234", "1234567890123456"] {
            assert!(!PHONE_RE.is_match(bad), "{bad} should not match");
        }
    }

    #[test]
    fn id_param_requires_uuid() {
        let ok = json!({ "id": "550e8400-e29b-41d4-a716-446655440000" });
        assert!(ID_PARAM.validate(Some(&ok)).is_ok());

        let errs = ID_PARAM.validate(Some(&json!({ "id": "1" }))).unwrap_err();
        assert_eq!(errs.details()[0].message, "\"id\" must be a valid GUID");
    }

    #[test]
    fn typed_checks_reuse_schemas() {
        let new_user = NewUser {
            first_name: "".into(),
            last_name: "Doe".into(),
            email: Some("x".into()),
            phone: None,
        };
        let errs = check_new_user(&new_user).unwrap_err();
        assert_eq!(errs.paths(), vec!["firstName", "email"]);

        assert!(check_patch(&UserPatch::default()).is_ok());
        let patch = UserPatch {
            phone: Some("nope".into()),
            ..Default::default()
        };
        assert_eq!(check_patch(&patch).unwrap_err().paths(), vec!["phone"]);
    }
}

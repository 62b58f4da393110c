//! Presence and format checks for form input.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Permissive `local@domain.tld` shape check; not RFC 5322.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Names from `required` whose value in `record` is missing, null, or blank.
///
/// Numbers and booleans always count as present; arrays and objects count
/// only when non-empty.
/// A `record` that is not a JSON object is missing every field.
pub fn validate_required(record: &Value, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|field| match record.get(**field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            Some(Value::Object(map)) => map.is_empty(),
            Some(_) => false,
        })
        .map(|field| field.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@mail.uni.edu"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
    }

    #[test]
    fn blank_fields_are_reported() {
        let record = json!({"name": "A", "email": ""});
        assert_eq!(validate_required(&record, &["name", "email"]), vec!["email"]);
    }

    #[test]
    fn whitespace_null_and_absent_are_missing() {
        let record = json!({"name": "   ", "email": null});
        assert_eq!(
            validate_required(&record, &["name", "email", "college_id"]),
            vec!["name", "email", "college_id"]
        );
    }

    #[test]
    fn numbers_and_booleans_are_present() {
        let record = json!({"capacity": 0, "attended": false});
        assert!(validate_required(&record, &["capacity", "attended"]).is_empty());
    }

    #[test]
    fn empty_collections_are_missing() {
        let record = json!({"tags": [], "meta": {}, "ids": [1]});
        assert_eq!(validate_required(&record, &["tags", "meta", "ids"]), vec!["tags", "meta"]);
    }

    #[test]
    fn non_objects_miss_everything() {
        assert_eq!(validate_required(&json!("x"), &["name"]), vec!["name"]);
    }
}

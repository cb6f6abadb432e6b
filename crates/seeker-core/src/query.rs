//! Structural validation for generated search queries.
//!
//! The generation service returns an opaque JSON query object. Before it is
//! sent to the backend the executor runs these shape checks; the concrete
//! error strings double as feedback for the next generation attempt.

use std::collections::BTreeSet;

use serde_json::Value;

/// Query types the backend understands at the root or inside bool clauses.
const VALID_ROOT_KEYS: &[&str] = &[
    "bool",
    "match",
    "term",
    "terms",
    "range",
    "match_all",
    "nested",
    "prefix",
    "wildcard",
    "exists",
];

/// Clause keys a `bool` query may carry.
const VALID_BOOL_CLAUSES: &[&str] = &["must", "should", "must_not", "filter"];

/// Runs structural checks on a generated query object. Returns the concrete
/// violations; an empty list means the query may be executed.
pub fn validate_query(query: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(object) = query.as_object() else {
        errors.push("query must be a JSON object".to_string());
        return errors;
    };

    if !object.keys().any(|key| VALID_ROOT_KEYS.contains(&key.as_str())) {
        errors.push(format!(
            "query must contain at least one of: {}",
            VALID_ROOT_KEYS.join(", ")
        ));
    }

    if let Some(bool_query) = object.get("bool") {
        let Some(clauses) = bool_query.as_object() else {
            errors.push("bool query value must be an object".to_string());
            return errors;
        };

        let invalid: Vec<&str> = clauses
            .keys()
            .map(String::as_str)
            .filter(|key| !VALID_BOOL_CLAUSES.contains(key))
            .collect();
        if !invalid.is_empty() {
            errors.push(format!(
                "invalid bool clauses: {}. Valid clauses: {}",
                invalid.join(", "),
                VALID_BOOL_CLAUSES.join(", ")
            ));
        }

        for clause in VALID_BOOL_CLAUSES {
            if let Some(value) = clauses.get(*clause) {
                if !value.is_array() {
                    errors.push(format!("bool.{clause} must be a list"));
                }
            }
        }
    }

    errors
}

/// Collects every field name a query references. Used for debug logging and
/// for sanity-checking dependency substitution.
pub fn collect_fields(query: &Value) -> BTreeSet<String> {
    let mut fields = BTreeSet::new();
    collect_recursive(query, &mut fields);
    fields
}

fn collect_recursive(value: &Value, fields: &mut BTreeSet<String>) {
    match value {
        Value::Object(object) => {
            for (key, inner) in object {
                match key.as_str() {
                    // Leaf query types keyed by field name
                    "term" | "terms" | "match" | "range" | "prefix" | "wildcard" | "exists" => {
                        if let Some(inner) = inner.as_object() {
                            fields.extend(inner.keys().cloned());
                        }
                    }
                    "nested" => {
                        if let Some(nested) = inner.as_object() {
                            if let Some(path) = nested.get("path").and_then(Value::as_str) {
                                fields.insert(path.to_string());
                            }
                            if let Some(query) = nested.get("query") {
                                collect_recursive(query, fields);
                            }
                        }
                    }
                    _ => collect_recursive(inner, fields),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_recursive(item, fields);
            }
        }
        _ => {}
    }
}

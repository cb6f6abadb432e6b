//! In-memory search backend over a JSON document corpus.
//!
//! Evaluates the structured query vocabulary the generation service emits:
//! exact match (`term`/`terms`), `range`, `prefix`, `wildcard`, `exists`,
//! token `match`, `match_all`, `nested`, and structural `bool` composition.
//! Dotted field paths traverse nested objects; a trailing `.keyword`
//! sub-field (an index-mapping artifact of the original store) resolves to
//! the plain field.

use std::cmp::Ordering;
use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::{
    error::{AgentError, Result},
    services::{SearchBackend, SearchResponse},
};

/// Deterministic backend holding the whole corpus in memory.
pub struct MemoryBackend {
    documents: Vec<Value>,
}

impl MemoryBackend {
    /// Creates a backend over the given records.
    pub fn new(documents: Vec<Value>) -> Self {
        Self { documents }
    }

    /// Loads a corpus from a JSON file holding an array of records.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(&path).map_err(|e| AgentError::FileSystem {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        let documents: Vec<Value> = serde_json::from_str(&raw)?;
        Ok(Self::new(documents))
    }

    /// Number of records in the corpus.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus holds no records.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl SearchBackend for MemoryBackend {
    fn search(&self, query: &Value) -> Result<SearchResponse> {
        let matches: Vec<Value> = self
            .documents
            .iter()
            .filter(|doc| evaluate(query, doc))
            .cloned()
            .collect();

        debug!(
            "memory backend matched {} of {} documents",
            matches.len(),
            self.documents.len()
        );

        Ok(SearchResponse {
            hit_count: matches.len() as u64,
            documents: matches,
        })
    }
}

/// Evaluates one query clause against one document.
fn evaluate(query: &Value, doc: &Value) -> bool {
    let Some(object) = query.as_object() else {
        return false;
    };

    object.iter().all(|(key, body)| match key.as_str() {
        "match_all" => true,
        "bool" => evaluate_bool(body, doc),
        "term" => field_clause(body, doc, term_eq),
        "terms" => terms_clause(body, doc),
        "range" => field_clause(body, doc, range_matches),
        "prefix" => field_clause(body, doc, |value, expected| {
            string_pair(value, expected).is_some_and(|(actual, prefix)| actual.starts_with(&prefix))
        }),
        "wildcard" => field_clause(body, doc, |value, expected| {
            string_pair(value, expected)
                .is_some_and(|(actual, pattern)| wildcard_matches(&actual, &pattern))
        }),
        "match" => field_clause(body, doc, |value, expected| {
            string_pair(value, expected).is_some_and(|(actual, words)| {
                let haystack = actual.to_lowercase();
                words
                    .to_lowercase()
                    .split_whitespace()
                    .all(|word| haystack.contains(word))
            })
        }),
        "exists" => body
            .get("field")
            .and_then(Value::as_str)
            .is_some_and(|field| resolve_path(doc, field).is_some()),
        "nested" => evaluate_nested(body, doc),
        _ => false,
    })
}

fn evaluate_bool(body: &Value, doc: &Value) -> bool {
    let Some(clauses) = body.as_object() else {
        return false;
    };

    let all_match = |clause: &str| -> bool {
        clauses
            .get(clause)
            .and_then(Value::as_array)
            .map(|items| items.iter().all(|q| evaluate(q, doc)))
            .unwrap_or(true)
    };

    if !all_match("must") || !all_match("filter") {
        return false;
    }

    if let Some(must_not) = clauses.get("must_not").and_then(Value::as_array) {
        if must_not.iter().any(|q| evaluate(q, doc)) {
            return false;
        }
    }

    // `should` only constrains when there is no hard conjunction, matching
    // the minimum-should-match semantics of the original store.
    if let Some(should) = clauses.get("should").and_then(Value::as_array) {
        let has_hard_clause = clauses.contains_key("must") || clauses.contains_key("filter");
        if !has_hard_clause && !should.is_empty() && !should.iter().any(|q| evaluate(q, doc)) {
            return false;
        }
    }

    true
}

fn evaluate_nested(body: &Value, doc: &Value) -> bool {
    let Some(nested) = body.as_object() else {
        return false;
    };
    let Some(path) = nested.get("path").and_then(Value::as_str) else {
        return false;
    };
    let Some(query) = nested.get("query") else {
        return false;
    };

    match resolve_path(doc, path) {
        Some(Value::Array(items)) => items.iter().any(|item| evaluate(query, item)),
        // Nested object fields evaluate against the whole document so that
        // fully-qualified field names inside the nested query still resolve.
        Some(Value::Object(_)) => evaluate(query, doc),
        _ => false,
    }
}

/// Applies a `{field: expectation}` clause body with the given predicate.
fn field_clause<F>(body: &Value, doc: &Value, predicate: F) -> bool
where
    F: Fn(&Value, &Value) -> bool,
{
    let Some(object) = body.as_object() else {
        return false;
    };
    object.iter().all(|(field, expected)| {
        resolve_path(doc, field).is_some_and(|value| predicate(value, expected))
    })
}

fn terms_clause(body: &Value, doc: &Value) -> bool {
    let Some(object) = body.as_object() else {
        return false;
    };
    object.iter().all(|(field, expected)| {
        let Some(candidates) = expected.as_array() else {
            return false;
        };
        resolve_path(doc, field)
            .is_some_and(|value| candidates.iter().any(|candidate| term_eq(value, candidate)))
    })
}

fn term_eq(actual: &Value, expected: &Value) -> bool {
    // Term bodies may be bare values or `{"value": ...}` objects.
    let expected = expected.get("value").unwrap_or(expected);
    match (actual, expected) {
        (Value::String(a), Value::String(b)) => a.eq_ignore_ascii_case(b),
        _ => actual == expected,
    }
}

fn range_matches(actual: &Value, bounds: &Value) -> bool {
    let Some(bounds) = bounds.as_object() else {
        return false;
    };
    !bounds.is_empty()
        && bounds.iter().all(|(op, bound)| {
            let ordering = compare(actual, bound);
            match (op.as_str(), ordering) {
                ("gt", Some(o)) => o == Ordering::Greater,
                ("gte", Some(o)) => o != Ordering::Less,
                ("lt", Some(o)) => o == Ordering::Less,
                ("lte", Some(o)) => o != Ordering::Greater,
                _ => false,
            }
        })
}

fn compare(actual: &Value, bound: &Value) -> Option<Ordering> {
    match (actual, bound) {
        (Value::Number(a), Value::Number(b)) => a.as_f64().partial_cmp(&b.as_f64()),
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}

fn wildcard_matches(text: &str, pattern: &str) -> bool {
    // Iterative glob over `*` (any run) and `?` (any one char).
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0usize, 0usize);
    let (mut star, mut mark) = (None::<usize>, 0usize);

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            mark = t;
            p += 1;
        } else if let Some(s) = star {
            p = s + 1;
            mark += 1;
            t = mark;
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}

fn string_pair(actual: &Value, expected: &Value) -> Option<(String, String)> {
    let expected = expected.get("value").unwrap_or(expected);
    Some((actual.as_str()?.to_string(), expected.as_str()?.to_string()))
}

/// Resolves a dotted field path inside a document, tolerating a trailing
/// `.keyword` sub-field.
fn resolve_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_suffix(".keyword").unwrap_or(path);
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

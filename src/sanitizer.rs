//! Strip unsafe characters from every string leaf before persistence
//!
//! Display names come straight from the game API. Only ASCII letters,
//! digits, space and `. , ! ? -` survive; every other character is deleted.
//! Mapping keys (player tags, counter names) are left as they are.

use crate::riverlog::SeasonMap;
use serde_json::Value;

#[derive(Debug)]
pub struct SanitizeError(serde_json::Error);

impl std::fmt::Display for SanitizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sanitized data no longer matches the season layout: {}", self.0)
    }
}

impl std::error::Error for SanitizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<serde_json::Error> for SanitizeError {
    fn from(err: serde_json::Error) -> Self {
        SanitizeError(err)
    }
}

pub fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | ',' | '!' | '?' | '-')
}

pub fn clean_string(s: &str) -> String {
    s.chars().filter(|c| is_allowed(*c)).collect()
}

/// Recursively clean a JSON tree, returning the same shape
pub fn sanitize(tree: Value) -> Value {
    match tree {
        Value::String(s) => Value::String(clean_string(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, sanitize(value)))
                .collect(),
        ),
        scalar @ (Value::Null | Value::Bool(_) | Value::Number(_)) => scalar,
    }
}

/// Sanitize an aggregation batch through its stored JSON form
pub fn sanitize_seasons(seasons: SeasonMap) -> Result<SeasonMap, SanitizeError> {
    let tree = serde_json::to_value(&seasons)?;
    Ok(serde_json::from_value(sanitize(tree))?)
}

//! `{{dotted.path}}` interpolation used for tool responses and prompt messages.
//!
//! Placeholders that cannot be resolved (missing key, a value that cannot be
//! walked into, or `null`) stay in the output exactly as written. Strings are
//! substituted raw and every other JSON value in its compact JSON form.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\s*\}\}")
        .expect("placeholder pattern compiles")
});

pub fn render(template: &str, vars: &Value) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match lookup(vars, &caps[1]) {
            Some(value) => stringify(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Walks `vars` along a dotted path. Array elements are addressed by index.
pub fn lookup<'a>(vars: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = vars;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() { None } else { Some(current) }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

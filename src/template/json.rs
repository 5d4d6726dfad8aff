use serde_json::{Map, Value};

use crate::{
    foundation::error::{PosterError, PosterResult},
    model::layer::Layer,
};

/// Layer descriptors whose string values may hold `{{dotted.path}}` placeholders.
///
/// A string that is exactly one placeholder is replaced by the looked-up value with its type
/// preserved. Placeholders embedded in longer strings are interpolated as text, with missing and
/// `null` values rendering as the empty string. A missing whole-value placeholder drops the key
/// from its object; inside an array it becomes `null`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JsonTemplate {
    layers: Vec<Value>,
}

impl JsonTemplate {
    /// Template over the given layer descriptors.
    pub fn new(layers: Vec<Value>) -> Self {
        Self { layers }
    }

    /// Parse a JSON array of layer descriptors.
    pub fn from_value(value: Value) -> PosterResult<Self> {
        match value {
            Value::Array(layers) => Ok(Self::new(layers)),
            other => Err(PosterError::validation(format!(
                "json template must be an array of layers, got {}",
                value_kind(&other)
            ))),
        }
    }

    /// Parse JSON text holding an array of layer descriptors.
    pub fn from_json_str(s: &str) -> PosterResult<Self> {
        Self::from_value(serde_json::from_str(s)?)
    }

    /// Raw descriptors.
    pub fn layers(&self) -> &[Value] {
        &self.layers
    }

    /// Descriptors with every placeholder resolved against `data`.
    pub fn resolve(&self, data: &Value) -> Vec<Value> {
        self.layers
            .iter()
            .map(|l| resolve_tree(l, data).unwrap_or(Value::Null))
            .collect()
    }

    /// Resolve against `data` and decode the result into layers.
    pub fn instantiate(&self, data: &Value) -> PosterResult<Vec<Layer>> {
        self.resolve(data)
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(PosterError::from))
            .collect()
    }
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Walk dot-separated `path` through objects and (by numeric segment) arrays.
pub fn lookup_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |acc, key| match acc {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Next `{{path}}` at or after `from`: `(start, end, path)` with `end` past the closing braces.
fn next_placeholder(s: &str, from: usize) -> Option<(usize, usize, &str)> {
    let mut search = from;
    while let Some(rel) = s[search..].find("{{") {
        let open = search + rel;
        let body_start = open + 2;
        let body_len = s[body_start..]
            .find(|c: char| !is_path_char(c))
            .unwrap_or(s.len() - body_start);
        let body_end = body_start + body_len;
        if body_len > 0 && s[body_end..].starts_with("}}") {
            return Some((open, body_end + 2, &s[body_start..body_end]));
        }
        search = open + 1;
    }
    None
}

fn stringify(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Resolve one string; `None` means a whole-value placeholder that found nothing.
fn resolve_string(s: &str, data: &Value) -> Option<Value> {
    if let Some((0, end, path)) = next_placeholder(s, 0)
        && end == s.len()
    {
        return lookup_path(data, path).cloned();
    }

    let mut out = String::with_capacity(s.len());
    let mut cursor = 0;
    while let Some((start, end, path)) = next_placeholder(s, cursor) {
        out.push_str(&s[cursor..start]);
        out.push_str(&stringify(lookup_path(data, path)));
        cursor = end;
    }
    out.push_str(&s[cursor..]);
    Some(Value::String(out))
}

fn resolve_tree(value: &Value, data: &Value) -> Option<Value> {
    match value {
        Value::String(s) => resolve_string(s, data),
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .map(|v| resolve_tree(v, data).unwrap_or(Value::Null))
                .collect(),
        )),
        Value::Object(map) => Some(Value::Object(
            map.iter()
                .filter_map(|(k, v)| resolve_tree(v, data).map(|v| (k.clone(), v)))
                .collect::<Map<String, Value>>(),
        )),
        other => Some(other.clone()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/json.rs"]
mod tests;

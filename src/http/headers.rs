//! Header normalization for the structured request tool.

use serde_json::{Map, Value};

use super::{FieldMap, split_field, value_to_field};

/// The shapes a `headers` argument can arrive in.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderInput {
    Absent,
    Map(Map<String, Value>),
    List(Vec<Value>),
    Text(String),
}

impl From<Option<Value>> for HeaderInput {
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(Value::Object(map)) => HeaderInput::Map(map),
            Some(Value::Array(list)) => HeaderInput::List(list),
            Some(Value::String(text)) => HeaderInput::Text(text),
            _ => HeaderInput::Absent,
        }
    }
}

/// Normalize any accepted header shape into one ordered mapping.
#[must_use]
pub fn normalize_headers(input: HeaderInput) -> FieldMap {
    match input {
        HeaderInput::Absent => FieldMap::new(),
        HeaderInput::Map(map) => from_map(map),
        HeaderInput::List(list) => from_list(list),
        HeaderInput::Text(text) => from_text(&text),
    }
}

fn from_map(map: Map<String, Value>) -> FieldMap {
    map.into_iter()
        .map(|(name, value)| (name, value_to_field(value)))
        .collect()
}

fn from_list(list: Vec<Value>) -> FieldMap {
    let mut headers = FieldMap::new();
    for entry in list {
        match entry {
            Value::String(line) => {
                if let Some((name, value)) = split_field(&line) {
                    headers.insert(name, value);
                }
            }
            Value::Object(map) => headers.extend(from_map(map)),
            _ => {}
        }
    }
    headers
}

fn from_text(text: &str) -> FieldMap {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => return from_map(map),
        Ok(Value::Array(list)) => return from_list(list),
        _ => {}
    }

    text.trim()
        .split('\n')
        .filter_map(|line| split_field(line.trim()))
        .collect()
}

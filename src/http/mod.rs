//! Request-side normalization.
//!
//! This module turns loosely shaped tool arguments and captured raw requests into the
//! canonical method/URL/headers/body pieces the executor sends. Nothing in here fails:
//! messy input yields an empty or partial result instead of an error.

mod headers;
mod params;
mod parser;

use indexmap::IndexMap;
use serde_json::Value;

pub use headers::{HeaderInput, normalize_headers};
pub use params::{ParamInput, normalize_params};
pub use parser::{RawRequest, parse_raw_request};

/// Header or query mapping, in insertion order. A repeated key keeps its first position
/// and takes the last value.
pub type FieldMap = IndexMap<String, String>;

/// Render a JSON value the way it should appear in a header or query string.
fn value_to_field(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Split `name: value` on the first colon and trim both sides.
fn split_field(line: &str) -> Option<(String, String)> {
    line.split_once(':')
        .map(|(name, value)| (name.trim().to_owned(), value.trim().to_owned()))
}

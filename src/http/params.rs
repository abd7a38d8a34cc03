//! Query parameter normalization.

use serde_json::{Map, Value};

use super::{FieldMap, value_to_field};

/// The shapes a `params` argument can arrive in.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamInput {
    Absent,
    Map(Map<String, Value>),
    Text(String),
}

impl From<Option<Value>> for ParamInput {
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(Value::Object(map)) => ParamInput::Map(map),
            Some(Value::String(text)) => ParamInput::Text(text),
            _ => ParamInput::Absent,
        }
    }
}

/// Normalize query parameters. `None` means the request carries no query parameters
/// beyond whatever is already in the URL.
#[must_use]
pub fn normalize_params(input: ParamInput) -> Option<FieldMap> {
    match input {
        ParamInput::Absent => None,
        ParamInput::Map(map) => Some(from_map(map)),
        ParamInput::Text(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Some(from_map(map)),
            _ => from_pairs(&text),
        },
    }
}

fn from_map(map: Map<String, Value>) -> FieldMap {
    map.into_iter()
        .map(|(key, value)| (key, value_to_field(value)))
        .collect()
}

fn from_pairs(text: &str) -> Option<FieldMap> {
    let params: FieldMap = text
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.trim().to_owned(), value.trim().to_owned()))
        .collect();
    (!params.is_empty()).then_some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(r#"{"page": "1", "size": "10"}"#)]
    #[case(r#"{"page": 1, "size": 10}"#)]
    #[case("page=1&size=10")]
    #[case(" page = 1 & size=10")]
    #[case("page=1&&size=10&novalue")]
    fn test_text_forms_normalize_identically(#[case] text: &str) {
        let expected = FieldMap::from([
            ("page".to_owned(), "1".to_owned()),
            ("size".to_owned(), "10".to_owned()),
        ]);
        assert_eq!(normalize_params(ParamInput::Text(text.to_owned())), Some(expected));
    }

    #[rstest]
    #[case(ParamInput::Absent)]
    #[case(ParamInput::Text(String::new()))]
    #[case(ParamInput::Text("not params at all".to_owned()))]
    #[case(ParamInput::Text("[1, 2]".to_owned()))]
    #[case(ParamInput::from(Some(json!([1, 2]))))]
    fn test_unusable_input_is_none(#[case] input: ParamInput) {
        assert_eq!(normalize_params(input), None);
    }

    #[test]
    fn test_value_keeps_everything_after_first_equals() {
        let params = normalize_params(ParamInput::Text("q=a=b".to_owned())).unwrap();
        assert_eq!(params["q"], "a=b");
    }

    #[test]
    fn test_map_is_kept_in_order() {
        let params =
            normalize_params(ParamInput::from(Some(json!({"z": "last", "a": "first"})))).unwrap();
        let keys: Vec<_> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a"]);
    }
}

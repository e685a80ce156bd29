//! Encoding parameter dictionaries into URL-encoded strings.

use crate::encoding::{ParamMap, ParamValue};

/// Single `key=value` pair of a URL-encoded parameter string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterPair {
    pub key: String,
    /// `None` renders the bare key
    pub value: Option<String>,
}

impl ParameterPair {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Percent-escaped `key=value` (or `key` when there is no value).
    pub fn url_encoded_string(&self) -> String {
        let key = urlencoding::encode(&self.key);
        match &self.value {
            Some(value) => format!("{}={}", key, urlencoding::encode(value)),
            None => key.into_owned(),
        }
    }
}

/// Flatten a parameter value into pairs, nesting dictionary keys as `key[sub]`
/// and array elements as `key[]`.
fn pairs_for_value(key: &str, value: &ParamValue, pairs: &mut Vec<ParameterPair>) {
    match value {
        ParamValue::Null => pairs.push(ParameterPair::new(key, None)),
        ParamValue::String(s) => pairs.push(ParameterPair::new(key, Some(s.clone()))),
        ParamValue::Array(items) => {
            let nested_key = format!("{key}[]");
            for item in items {
                pairs_for_value(&nested_key, item, pairs);
            }
        }
        ParamValue::Set(items) => {
            for item in items {
                pairs.push(ParameterPair::new(key, Some(item.clone())));
            }
        }
        ParamValue::Dict(map) => {
            for (sub_key, sub_value) in map {
                pairs_for_value(&format!("{key}[{sub_key}]"), sub_value, pairs);
            }
        }
    }
}

/// Parameter pairs for a dictionary, in sorted key order.
pub fn parameter_pairs(params: &ParamMap) -> Vec<ParameterPair> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        pairs_for_value(key, value, &mut pairs);
    }
    pairs
}

/// URL-encoded string representation of the parameters.
pub fn url_encoded_string_for_parameters(params: &ParamMap) -> String {
    parameter_pairs(params)
        .iter()
        .map(ParameterPair::url_encoded_string)
        .collect::<Vec<_>>()
        .join("&")
}

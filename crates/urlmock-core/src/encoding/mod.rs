//! URL-encoded WWW form parameters.
//!
//! Parameter strings map to nested values:
//!
//! ```text
//! "A=a"            => { "A": "a" }
//! "A=a&A=b"        => { "A": <"a", "b"> }
//! "A[]=a&A[]=b"    => { "A": ["a", "b"] }
//! "A[B]=a&A[C]=b"  => { "A": { "B": "a", "C": "b" } }
//! "A[B]=a&A[B]=b"  => { "A": { "B": <"a", "b"> } }
//! ```
//!
//! where `<...>` is a set. Sets never contain fewer than two items.

pub mod encode;
pub mod parser;
pub mod query;

pub use encode::{url_encoded_string_for_parameters, ParameterPair};
pub use parser::{
    dictionary_for_url_encoded_parameters_string, ParseError, UrlEncodedParameterStringParser,
};
pub use query::{url_with_parameters, url_with_parameters_relative_to};

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Parameter dictionary with keys in sorted order.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// Value stored under a parameter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Key present without a value
    Null,
    String(String),
    Array(Vec<ParamValue>),
    Set(BTreeSet<String>),
    Dict(ParamMap),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Build a set value from the given items.
    pub fn set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamValue::Set(items.into_iter().map(Into::into).collect())
    }

    /// Build an array of strings from the given items.
    pub fn array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamValue::Array(
            items
                .into_iter()
                .map(|s| ParamValue::String(s.into()))
                .collect(),
        )
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<ParamMap> for ParamValue {
    fn from(map: ParamMap) -> Self {
        ParamValue::Dict(map)
    }
}

impl Serialize for ParamValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ParamValue::Null => serializer.serialize_none(),
            ParamValue::String(s) => serializer.serialize_str(s),
            ParamValue::Array(items) => serializer.collect_seq(items),
            ParamValue::Set(items) => serializer.collect_seq(items),
            ParamValue::Dict(map) => serializer.collect_map(map),
        }
    }
}

/// Whether every value is a string, null, a set of more than one string, a non-empty
/// array of strings, or a nested dictionary that is itself valid.
pub fn is_valid_url_encoded_parameter_dictionary(params: &ParamMap) -> bool {
    params.values().all(|value| match value {
        ParamValue::Null | ParamValue::String(_) => true,
        ParamValue::Set(items) => items.len() > 1,
        ParamValue::Array(items) => {
            !items.is_empty() && items.iter().all(|v| matches!(v, ParamValue::String(_)))
        }
        ParamValue::Dict(map) => is_valid_url_encoded_parameter_dictionary(map),
    })
}

/// Convert a JSON value into parameters.
///
/// Objects become dictionaries, arrays become arrays, null stays null, and every other
/// scalar is rendered with its JSON text.
pub fn param_value_from_json(value: &serde_json::Value) -> ParamValue {
    use serde_json::Value;
    match value {
        Value::Null => ParamValue::Null,
        Value::String(s) => ParamValue::String(s.clone()),
        Value::Bool(b) => ParamValue::String(b.to_string()),
        Value::Number(n) => ParamValue::String(n.to_string()),
        Value::Array(items) => ParamValue::Array(items.iter().map(param_value_from_json).collect()),
        Value::Object(map) => ParamValue::Dict(
            map.iter()
                .map(|(k, v)| (k.clone(), param_value_from_json(v)))
                .collect(),
        ),
    }
}

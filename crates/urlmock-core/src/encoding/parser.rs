//! Parser for URL-encoded parameter strings with bracketed nesting.

use crate::encoding::{ParamMap, ParamValue};
use std::collections::btree_map::Entry;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors produced while parsing a URL-encoded parameter string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed parameter key: {0}")]
    MalformedKey(String),
    #[error("invalid percent encoding in: {0}")]
    InvalidPercentEncoding(String),
    #[error("parameter '{0}' is used with conflicting types")]
    ConflictingTypes(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Append,
}

/// Parses URL-encoded parameter strings into nested parameter dictionaries.
#[derive(Debug, Clone)]
pub struct UrlEncodedParameterStringParser<'a> {
    string: &'a str,
}

impl<'a> UrlEncodedParameterStringParser<'a> {
    pub fn new(string: &'a str) -> Self {
        Self { string }
    }

    /// The string this parser reads.
    pub fn string(&self) -> &str {
        self.string
    }

    /// Parse the string into a dictionary.
    pub fn parse(&self) -> Result<ParamMap, ParseError> {
        let mut result = ParamMap::new();

        for pair in self.string.split('&') {
            if pair.is_empty() {
                continue;
            }

            let (raw_key, raw_value) = match pair.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (pair, None),
            };

            let key = decode_component(raw_key)?;
            let value = raw_value.map(decode_component).transpose()?;
            let path = parse_key_path(&key)?;

            let (first, rest) = match path.split_first() {
                Some((Segment::Key(name), rest)) => (name.clone(), rest),
                _ => return Err(ParseError::MalformedKey(key)),
            };

            insert_value(&mut result, first, rest, value, &key)?;
        }

        Ok(result)
    }
}

/// Parse the string, returning `None` on any parse error.
pub fn dictionary_for_url_encoded_parameters_string(string: &str) -> Option<ParamMap> {
    UrlEncodedParameterStringParser::new(string).parse().ok()
}

fn decode_component(component: &str) -> Result<String, ParseError> {
    let replaced = component.replace('+', " ");
    urlencoding::decode(&replaced)
        .map(|s| s.into_owned())
        .map_err(|_| ParseError::InvalidPercentEncoding(component.to_string()))
}

/// Split `name[a][b][]` into segments.
fn parse_key_path(key: &str) -> Result<Vec<Segment>, ParseError> {
    let malformed = || ParseError::MalformedKey(key.to_string());

    let (name, mut rest) = match key.find('[') {
        Some(i) => (&key[..i], &key[i..]),
        None => (key, ""),
    };

    if name.is_empty() || name.contains(']') {
        return Err(malformed());
    }

    let mut segments = vec![Segment::Key(name.to_string())];

    while !rest.is_empty() {
        let inner = rest.strip_prefix('[').ok_or_else(malformed)?;
        let close = inner.find(']').ok_or_else(malformed)?;
        let segment = &inner[..close];
        if segment.contains('[') {
            return Err(malformed());
        }
        rest = &inner[close + 1..];

        if segment.is_empty() {
            // `[]` is only allowed as the last segment
            if !rest.is_empty() {
                return Err(malformed());
            }
            segments.push(Segment::Append);
        } else {
            segments.push(Segment::Key(segment.to_string()));
        }
    }

    Ok(segments)
}

fn merge_leaf(existing: &mut ParamValue, value: Option<String>, key: &str) -> Result<(), ParseError> {
    // A key without a value merges as the empty string
    let incoming = value.unwrap_or_default();
    let replacement = match existing {
        ParamValue::Null if incoming.is_empty() => Some(ParamValue::String(incoming)),
        ParamValue::Null => Some(ParamValue::Set(BTreeSet::from([String::new(), incoming]))),
        ParamValue::String(current) if *current == incoming => None,
        ParamValue::String(current) => Some(ParamValue::Set(BTreeSet::from([
            std::mem::take(current),
            incoming,
        ]))),
        ParamValue::Set(items) => {
            items.insert(incoming);
            None
        }
        ParamValue::Array(_) | ParamValue::Dict(_) => {
            return Err(ParseError::ConflictingTypes(key.to_string()))
        }
    };
    if let Some(replacement) = replacement {
        *existing = replacement;
    }
    Ok(())
}

fn insert_value(
    map: &mut ParamMap,
    name: String,
    rest: &[Segment],
    value: Option<String>,
    key: &str,
) -> Result<(), ParseError> {
    match rest.split_first() {
        None => match map.entry(name) {
            Entry::Vacant(entry) => {
                entry.insert(value.map_or(ParamValue::Null, ParamValue::String));
                Ok(())
            }
            Entry::Occupied(mut entry) => merge_leaf(entry.get_mut(), value, key),
        },
        Some((Segment::Append, _)) => {
            let item = ParamValue::String(value.unwrap_or_default());
            match map.entry(name).or_insert_with(|| ParamValue::Array(Vec::new())) {
                ParamValue::Array(items) => {
                    items.push(item);
                    Ok(())
                }
                _ => Err(ParseError::ConflictingTypes(key.to_string())),
            }
        }
        Some((Segment::Key(sub_name), sub_rest)) => {
            match map.entry(name).or_insert_with(|| ParamValue::Dict(ParamMap::new())) {
                ParamValue::Dict(sub_map) => {
                    insert_value(sub_map, sub_name.clone(), sub_rest, value, key)
                }
                _ => Err(ParseError::ConflictingTypes(key.to_string())),
            }
        }
    }
}

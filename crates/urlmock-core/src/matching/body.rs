//! Body equivalence by content type.

use crate::encoding::dictionary_for_url_encoded_parameters_string;
use crate::types::message::{JSON_CONTENT_TYPE, WWW_FORM_URL_ENCODED_CONTENT_TYPE};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Bytes,
}

fn body_kind(content_type: Option<&str>) -> BodyKind {
    let Some(content_type) = content_type else {
        return BodyKind::Bytes;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime == JSON_CONTENT_TYPE || mime.ends_with("+json") {
        BodyKind::Json
    } else if mime == WWW_FORM_URL_ENCODED_CONTENT_TYPE {
        BodyKind::Form
    } else {
        BodyKind::Bytes
    }
}

fn json_equivalent(expected: &[u8], actual: &[u8]) -> Option<bool> {
    let expected: Value = serde_json::from_slice(expected).ok()?;
    let actual: Value = serde_json::from_slice(actual).ok()?;
    Some(expected == actual)
}

fn form_equivalent(expected: &[u8], actual: &[u8]) -> Option<bool> {
    let expected = dictionary_for_url_encoded_parameters_string(std::str::from_utf8(expected).ok()?)?;
    let actual = dictionary_for_url_encoded_parameters_string(std::str::from_utf8(actual).ok()?)?;
    Some(expected == actual)
}

/// Whether two bodies carry the same content for the given content type.
///
/// JSON bodies compare as parsed values and form bodies as parsed parameter maps.
/// Bodies that do not parse, and every other content type, compare as bytes.
/// A missing body equals an empty one.
pub fn bodies_are_equivalent(
    content_type: Option<&str>,
    expected: Option<&[u8]>,
    actual: Option<&[u8]>,
) -> bool {
    let expected = expected.unwrap_or_default();
    let actual = actual.unwrap_or_default();
    if expected == actual {
        return true;
    }
    if expected.is_empty() || actual.is_empty() {
        return false;
    }

    let parsed = match body_kind(content_type) {
        BodyKind::Json => json_equivalent(expected, actual),
        BodyKind::Form => form_equivalent(expected, actual),
        BodyKind::Bytes => None,
    };
    parsed.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, None, true)]
    #[case(None, Some(""), None, true)]
    #[case(None, None, Some("x"), false)]
    #[case(Some("text/plain"), Some("abc"), Some("abc"), true)]
    #[case(Some("text/plain"), Some("abc"), Some("abd"), false)]
    #[case(Some("application/json"), Some(r#"{"a":1,"b":2}"#), Some(r#"{ "b": 2, "a": 1 }"#), true)]
    #[case(Some("application/json; charset=utf-8"), Some(r#"{"a":1}"#), Some(r#"{"a":2}"#), false)]
    #[case(Some("application/vnd.api+json"), Some("[1, 2]"), Some("[1,2]"), true)]
    #[case(Some("application/json"), Some("not json"), Some("not json "), false)]
    #[case(Some("application/x-www-form-urlencoded"), Some("a=1&b=2"), Some("b=2&a=1"), true)]
    #[case(Some("application/x-www-form-urlencoded; charset=utf-8"), Some("a=1"), Some("a=2"), false)]
    #[case(None, Some(r#"{"a":1}"#), Some(r#"{ "a": 1 }"#), false)]
    fn test_bodies_are_equivalent(
        #[case] content_type: Option<&str>,
        #[case] expected: Option<&str>,
        #[case] actual: Option<&str>,
        #[case] result: bool,
    ) {
        assert_eq!(
            bodies_are_equivalent(
                content_type,
                expected.map(str::as_bytes),
                actual.map(str::as_bytes)
            ),
            result
        );
    }
}

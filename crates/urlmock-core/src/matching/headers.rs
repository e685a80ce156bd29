//! Header equality (case-insensitive field names, exact values).

use crate::types::HeaderMap;

pub fn headers_are_equal(expected: &HeaderMap, actual: &HeaderMap) -> bool {
    expected == actual
}

/// Header equality with the `ignored` fields left out of both sides.
pub fn headers_are_equal_ignoring(
    expected: &HeaderMap,
    actual: &HeaderMap,
    ignored: &[String],
) -> bool {
    if ignored.is_empty() {
        return headers_are_equal(expected, actual);
    }
    let kept = |(field, _): &(&str, &str)| {
        !ignored
            .iter()
            .any(|name| name.eq_ignore_ascii_case(field))
    };
    let expected: HeaderMap = expected.iter().filter(kept).collect();
    let actual: HeaderMap = actual.iter().filter(kept).collect();
    expected == actual
}

//! Core HTTP message types shared by mocks, responders, and the protocol.

pub mod message;
pub mod method;
pub mod request;

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP headers keyed case-insensitively.
///
/// The spelling used when a field is first inserted is kept for display and iteration.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(field))
    }

    /// Value for the given field, compared case-insensitively.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.position(field).map(|i| self.entries[i].1.as_str())
    }

    /// Set the value for a field, replacing any existing value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.position(&field) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((field, value)),
        }
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.position(field).map(|i| self.entries.remove(i).1)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Equal when both maps hold the same number of fields, the same field names
/// (case-insensitively), and identical values for those fields.
impl PartialEq for HeaderMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for HeaderMap {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = HeaderMap::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

impl Serialize for HeaderMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for HeaderMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let map = std::collections::BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(map.into_iter().collect())
    }
}

/// Transport-level failure sent to a protocol client instead of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    /// Error domain, e.g. `NSURLErrorDomain`
    pub domain: String,
    /// Domain-specific error code
    pub code: i64,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
}

impl ResponseError {
    /// Domain used for errors raised by URLMock itself.
    pub const URLMOCK_DOMAIN: &'static str = "URLMockErrorDomain";

    pub fn new(domain: impl Into<String>, code: i64, description: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            code,
            description: description.into(),
        }
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.domain, self.code, self.description)
    }
}

impl std::error::Error for ResponseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn h(pairs: &[(&str, &str)]) -> HeaderMap {
        pairs.iter().copied().collect()
    }

    #[rstest]
    fn test_header_map_case_insensitive_lookup() {
        let mut headers = h(&[("Content-Type", "application/json")]);
        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert!(headers.contains("CONTENT-TYPE"));

        headers.insert("content-type", "text/plain");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.iter().next(), Some(("Content-Type", "text/plain")));

        assert_eq!(headers.remove("CONTENT-type"), Some("text/plain".to_string()));
        assert!(headers.is_empty());
    }

    #[rstest]
    #[case(&[], &[], true)]
    #[case(&[("Accept", "a")], &[("accept", "a")], true)]
    #[case(&[("Accept", "a")], &[("Accept", "A")], false)]
    #[case(&[("Accept", "a")], &[("Accept", "a"), ("X-Extra", "b")], false)]
    #[case(&[("Accept", "a"), ("X-Extra", "b")], &[("accept", "a")], false)]
    #[case(&[("Accept", "a")], &[("Content-Type", "a")], false)]
    fn test_header_map_equality(
        #[case] left: &[(&str, &str)],
        #[case] right: &[(&str, &str)],
        #[case] expected: bool,
    ) {
        assert_eq!(h(left) == h(right), expected);
        assert_eq!(h(right) == h(left), expected);
    }

    #[rstest]
    fn test_header_map_serde() {
        let headers = h(&[("X-Token", "abc")]);
        let json = serde_json::to_string(&headers).expect("Should serialize");
        assert_eq!(json, r#"{"X-Token":"abc"}"#);
        let back: HeaderMap = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(back, headers);
    }

    #[rstest]
    fn test_response_error_display() {
        let error = ResponseError::new("NSURLErrorDomain", -1001, "timed out");
        assert_eq!(error.to_string(), "NSURLErrorDomain (-1001): timed out");
    }
}

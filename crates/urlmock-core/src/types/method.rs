//! HTTP method type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP method for request matching
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Uppercase method token as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method token that is not one of the supported methods.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(HttpMethod::Get)]
    #[case(HttpMethod::Post)]
    #[case(HttpMethod::Put)]
    #[case(HttpMethod::Patch)]
    #[case(HttpMethod::Delete)]
    #[case(HttpMethod::Head)]
    #[case(HttpMethod::Options)]
    fn test_http_method_roundtrip(#[case] method: HttpMethod) {
        let json = serde_json::to_string(&method).expect("Should serialize");
        assert_eq!(json, format!("\"{}\"", method.as_str()));
        let deserialized: HttpMethod = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(deserialized, method);
    }

    #[rstest]
    #[case("get", HttpMethod::Get)]
    #[case("Post", HttpMethod::Post)]
    #[case("PATCH", HttpMethod::Patch)]
    #[case("delete", HttpMethod::Delete)]
    fn test_http_method_from_str_case_insensitive(
        #[case] input: &str,
        #[case] expected: HttpMethod,
    ) {
        assert_eq!(input.parse::<HttpMethod>(), Ok(expected));
    }

    #[rstest]
    #[case("TRACE")]
    #[case("")]
    fn test_http_method_from_str_unknown(#[case] input: &str) {
        assert_eq!(
            input.parse::<HttpMethod>(),
            Err(UnknownMethod(input.to_string()))
        );
    }
}

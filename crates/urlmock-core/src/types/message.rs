//! Headers and body shared by mock requests and mock responders.

use crate::encoding::{
    dictionary_for_url_encoded_parameters_string, url_encoded_string_for_parameters, ParamMap,
};
use crate::error::MockError;
use crate::types::request::UrlRequest;
use crate::types::HeaderMap;
use serde::Serialize;
use serde_json::Value;

/// The `Accepts` header field.
pub const ACCEPTS_HEADER_FIELD: &str = "Accepts";
/// The `Content-Type` header field.
pub const CONTENT_TYPE_HEADER_FIELD: &str = "Content-Type";
/// The `Cookie` header field.
pub const COOKIE_HEADER_FIELD: &str = "Cookie";
/// The `Set-Cookie` header field.
pub const SET_COOKIE_HEADER_FIELD: &str = "Set-Cookie";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const UTF8_JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const WWW_FORM_URL_ENCODED_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const UTF8_WWW_FORM_URL_ENCODED_CONTENT_TYPE: &str =
    "application/x-www-form-urlencoded; charset=utf-8";

/// HTTP headers and body with typed accessors for JSON, form, and string bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpMessage {
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headers(headers: HeaderMap) -> Self {
        Self {
            headers,
            body: None,
        }
    }

    pub fn value_for_header_field(&self, field: &str) -> Option<&str> {
        self.headers.get(field)
    }

    pub fn set_value_for_header_field(&mut self, value: impl Into<String>, field: impl Into<String>) {
        self.headers.insert(field, value);
    }

    pub fn remove_value_for_header_field(&mut self, field: &str) {
        self.headers.remove(field);
    }

    /// Whether the request's headers equal this message's headers.
    pub fn headers_are_equal_to_headers_of_request(&self, request: &UrlRequest) -> bool {
        self.headers == request.headers
    }

    fn set_default_content_type(&mut self, content_type: &str) {
        if !self.headers.contains(CONTENT_TYPE_HEADER_FIELD) {
            self.headers.insert(CONTENT_TYPE_HEADER_FIELD, content_type);
        }
    }

    /// Body parsed as JSON, or `None` if there is no body or it is not valid JSON.
    pub fn json_from_body(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }

    /// Replace the body with the serialized JSON form of `value`.
    ///
    /// Sets `Content-Type` to `application/json; charset=utf-8` if it is not set yet.
    pub fn set_body_with_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), MockError> {
        let body = serde_json::to_vec(value)?;
        self.body = Some(body);
        self.set_default_content_type(UTF8_JSON_CONTENT_TYPE);
        Ok(())
    }

    /// Body interpreted as URL-encoded WWW form parameters.
    pub fn parameters_from_url_encoded_body(&self) -> Option<ParamMap> {
        self.string_from_body()
            .and_then(|body| dictionary_for_url_encoded_parameters_string(&body))
    }

    /// Replace the body with the URL-encoded form of `params`.
    ///
    /// Sets `Content-Type` to `application/x-www-form-urlencoded; charset=utf-8` if it is
    /// not set yet.
    pub fn set_body_by_url_encoding_parameters(&mut self, params: &ParamMap) {
        self.body = Some(url_encoded_string_for_parameters(params).into_bytes());
        self.set_default_content_type(UTF8_WWW_FORM_URL_ENCODED_CONTENT_TYPE);
    }

    /// Body decoded as UTF-8.
    pub fn string_from_body(&self) -> Option<String> {
        self.body
            .as_deref()
            .and_then(|body| std::str::from_utf8(body).ok())
            .map(str::to_string)
    }

    pub fn set_body_with_string(&mut self, string: &str) {
        self.body = Some(string.as_bytes().to_vec());
    }

    /// Body bytes, empty when there is no body.
    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }
}

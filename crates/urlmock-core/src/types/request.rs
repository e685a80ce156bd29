//! Intercepted requests and response heads.

use crate::encoding::{
    dictionary_for_url_encoded_parameters_string, url_encoded_string_for_parameters, ParamMap,
};
use crate::error::MockError;
use crate::types::message::{
    CONTENT_TYPE_HEADER_FIELD, UTF8_JSON_CONTENT_TYPE, UTF8_WWW_FORM_URL_ENCODED_CONTENT_TYPE,
};
use crate::types::method::HttpMethod;
use crate::types::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Request handed to the mock protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl UrlRequest {
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn parse(method: HttpMethod, url: &str) -> Result<Self, MockError> {
        let parsed = Url::parse(url).map_err(|source| MockError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        Ok(Self::new(method, parsed))
    }

    pub fn with_header(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(field, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a JSON body, adding a JSON `Content-Type` if none is set.
    pub fn with_json_body<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, MockError> {
        self.body = Some(serde_json::to_vec(value)?);
        if !self.headers.contains(CONTENT_TYPE_HEADER_FIELD) {
            self.headers
                .insert(CONTENT_TYPE_HEADER_FIELD, UTF8_JSON_CONTENT_TYPE);
        }
        Ok(self)
    }

    /// Set a URL-encoded form body, adding a form `Content-Type` if none is set.
    pub fn with_form_body(mut self, params: &ParamMap) -> Self {
        self.body = Some(url_encoded_string_for_parameters(params).into_bytes());
        if !self.headers.contains(CONTENT_TYPE_HEADER_FIELD) {
            self.headers.insert(
                CONTENT_TYPE_HEADER_FIELD,
                UTF8_WWW_FORM_URL_ENCODED_CONTENT_TYPE,
            );
        }
        self
    }

    pub fn body_data(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn json_from_body(&self) -> Option<Value> {
        self.body_data()
            .and_then(|body| serde_json::from_slice(body).ok())
    }

    pub fn parameters_from_url_encoded_body(&self) -> Option<ParamMap> {
        self.string_from_body()
            .and_then(|body| dictionary_for_url_encoded_parameters_string(&body))
    }

    pub fn string_from_body(&self) -> Option<String> {
        self.body_data()
            .and_then(|body| std::str::from_utf8(body).ok())
            .map(str::to_string)
    }

    pub fn http_headers_are_equal_to_headers(&self, headers: &HeaderMap) -> bool {
        self.headers == *headers
    }
}

/// Status line and headers sent to a protocol client before any body data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlResponse {
    pub url: Url,
    pub status: u16,
    pub headers: HeaderMap,
}

//! Declarative mock fixtures.
//!
//! A fixture file holds optional protocol settings and a list of mocks:
//!
//! ```yaml
//! settings:
//!   interceptsAllRequests: true
//! mocks:
//!   - method: POST
//!     url: http://example.com/users
//!     json: { name: John }
//!     response:
//!       status: 201
//!       json: { id: 1 }
//!   - pattern: http://example.com/users/:id
//!     methods: [GET]
//!     when: "${params.id != '0'}"
//!     response:
//!       json: { name: John }
//! ```

use crate::config::error::ConfigError;
use crate::encoding::{dictionary_for_url_encoded_parameters_string, param_value_from_json, ParamValue};
use crate::expression::{match_with_jmespath, strip_expression};
use crate::mocks::http_request::MockHttpRequest;
use crate::mocks::pattern::{PatternMatchingMockRequest, PatternParams};
use crate::mocks::responder::MockHttpResponder;
use crate::mocks::{MockRequest, MockResponder};
use crate::protocol::MockUrlProtocol;
use crate::types::message::{HttpMessage, CONTENT_TYPE_HEADER_FIELD};
use crate::types::method::HttpMethod;
use crate::types::request::UrlRequest;
use crate::types::{HeaderMap, ResponseError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Contents of one fixture file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<ProtocolSettings>,
    #[serde(default)]
    pub mocks: Vec<MockFixture>,
}

/// Protocol flags set by a fixture file. Absent flags are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intercepts_all_requests: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automatically_removes_serviced_mock_requests: Option<bool>,
}

impl ProtocolSettings {
    pub fn apply_to(&self, protocol: &MockUrlProtocol) {
        if let Some(intercepts) = self.intercepts_all_requests {
            protocol.set_intercepts_all_requests(intercepts);
        }
        if let Some(removes) = self.automatically_removes_serviced_mock_requests {
            protocol.set_automatically_removes_serviced_mock_requests(removes);
        }
        match self.enabled {
            Some(true) => protocol.enable(),
            Some(false) => protocol.disable(),
            None => {}
        }
    }
}

/// Request or response body, given as JSON, form parameters, or raw text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyFixture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
    /// Object of form parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl BodyFixture {
    /// Write the body into `message`. JSON and form bodies add a default `Content-Type`.
    fn apply_to(&self, message: &mut HttpMessage) -> Result<(), ConfigError> {
        let given = [self.json.is_some(), self.form.is_some(), self.body.is_some()];
        if given.iter().filter(|set| **set).count() > 1 {
            return Err(ConfigError::InvalidFixture(
                "only one of json, form, or body may be set".to_string(),
            ));
        }

        if let Some(json) = &self.json {
            message.set_body_with_json(json)?;
        } else if let Some(form) = &self.form {
            let ParamValue::Dict(params) = param_value_from_json(form) else {
                return Err(ConfigError::InvalidFixture(
                    "form must be an object of parameters".to_string(),
                ));
            };
            message.set_body_by_url_encoding_parameters(&params);
        } else if let Some(body) = &self.body {
            message.set_body_with_string(body);
        }
        Ok(())
    }
}

/// How a fixture mock responds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseFixture {
    /// HTTP status code, 200 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HeaderMap>,
    #[serde(flatten)]
    pub body: BodyFixture,
    /// Chunk count hint, 1 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
    /// Fail with this error instead of responding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl ResponseFixture {
    pub fn to_responder(&self) -> Result<MockHttpResponder, ConfigError> {
        if let Some(error) = &self.error {
            return Ok(MockHttpResponder::with_error(error.clone()));
        }

        let mut message = HttpMessage::with_headers(self.headers.clone().unwrap_or_default());
        self.body.apply_to(&mut message)?;

        let responder = MockHttpResponder::with_chunks(
            self.status.unwrap_or(200),
            message.headers,
            message.body.unwrap_or_default(),
            self.chunks.unwrap_or(1),
            Duration::from_millis(self.delay_ms.unwrap_or(0)),
        )?;
        Ok(responder)
    }
}

/// Mock matching one method and URL exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactMockFixture {
    pub method: HttpMethod,
    pub url: String,
    /// Expected request headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HeaderMap>,
    /// Expected request body
    #[serde(flatten)]
    pub body: BodyFixture,
    /// Defaults to whether `headers` is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_headers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_body: Option<bool>,
    #[serde(default)]
    pub response: ResponseFixture,
}

impl ExactMockFixture {
    pub fn to_mock_request(&self) -> Result<MockHttpRequest, ConfigError> {
        let mut mock = MockHttpRequest::new(self.method, &self.url)?;
        if let Some(headers) = &self.headers {
            mock.message_mut().headers = headers.clone();
            // A body fills in Content-Type, which only counts when declared
            if !headers.contains(CONTENT_TYPE_HEADER_FIELD) {
                mock.ignore_header_field_when_matching(CONTENT_TYPE_HEADER_FIELD);
            }
        }
        self.body.apply_to(mock.message_mut())?;

        mock.set_checks_headers_when_matching(self.check_headers.unwrap_or(self.headers.is_some()));
        mock.set_checks_body_when_matching(self.check_body.unwrap_or(true));
        mock.set_responder(Arc::new(self.response.to_responder()?));
        Ok(mock)
    }
}

/// Mock matching URLs against a `:name` pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMockFixture {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<HttpMethod>>,
    /// `${expr}` evaluated over `{params, query, headers, json}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    #[serde(default)]
    pub response: ResponseFixture,
}

impl PatternMockFixture {
    pub fn to_mock_request(&self) -> Result<PatternMatchingMockRequest, ConfigError> {
        let prototype = self.response.to_responder()?;
        let mut mock = PatternMatchingMockRequest::new(&self.pattern, move |_, _| {
            Arc::new(prototype.clone()) as Arc<dyn MockResponder>
        })?;

        if let Some(methods) = &self.methods {
            mock = mock.with_http_methods(methods.iter().copied());
        }

        if let Some(when) = &self.when {
            let expression = strip_expression(when).unwrap_or(when).to_string();
            if jmespath::compile(&expression).is_err() {
                return Err(ConfigError::InvalidFixture(format!(
                    "invalid expression '{expression}'"
                )));
            }
            mock = mock.with_request_matcher(move |request, params| {
                match_with_jmespath(&expression, &expression_context(request, params))
            });
        }

        Ok(mock)
    }
}

/// Data a `when` expression is evaluated over.
fn expression_context(request: &UrlRequest, params: &PatternParams) -> Value {
    let params: Map<String, Value> = params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    let query = request
        .url
        .query()
        .and_then(dictionary_for_url_encoded_parameters_string)
        .and_then(|query| serde_json::to_value(query).ok())
        .unwrap_or_else(|| Value::Object(Map::new()));

    let headers: Map<String, Value> = request
        .headers
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), Value::String(v.to_string())))
        .collect();

    serde_json::json!({
        "params": params,
        "query": query,
        "headers": headers,
        "json": request.json_from_body().unwrap_or(Value::Null),
    })
}

/// Fixture mock, either exact or pattern-matching.
#[derive(Debug, Clone, PartialEq)]
pub enum MockFixture {
    Exact(ExactMockFixture),
    Pattern(PatternMockFixture),
}

impl MockFixture {
    pub fn to_mock_request(&self) -> Result<Arc<dyn MockRequest>, ConfigError> {
        Ok(match self {
            MockFixture::Exact(fixture) => Arc::new(fixture.to_mock_request()?),
            MockFixture::Pattern(fixture) => Arc::new(fixture.to_mock_request()?),
        })
    }
}

impl Serialize for MockFixture {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MockFixture::Exact(fixture) => fixture.serialize(serializer),
            MockFixture::Pattern(fixture) => fixture.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MockFixture {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let is_pattern = value.get("pattern").is_some();
        let result = if is_pattern {
            serde_json::from_value(value).map(MockFixture::Pattern)
        } else {
            serde_json::from_value(value).map(MockFixture::Exact)
        };
        result.map_err(serde::de::Error::custom)
    }
}

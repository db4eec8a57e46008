use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;
use dockerize_core::EndpointConfig;

use crate::error::EngineError;
use crate::transport::RemoteRequest;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Raw(Bytes),
}

/// Per-call options for [`EngineClient::request`](crate::EngineClient::request).
///
/// `json` (on by default) sends `Accept: application/json`, labels JSON
/// bodies as such, and decodes the response body as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: reqwest::Method,
    pub json: bool,
    pub headers: BTreeMap<String, String>,
    pub body: RequestBody,
    pub timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: reqwest::Method::GET,
            json: true,
            headers: BTreeMap::new(),
            body: RequestBody::Empty,
            timeout: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::method(reqwest::Method::POST)
    }

    pub fn delete() -> Self {
        Self::method(reqwest::Method::DELETE)
    }

    pub fn method(method: reqwest::Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn json_body(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Raw body; turns JSON handling off.
    pub fn raw_body(mut self, body: Bytes) -> Self {
        self.body = RequestBody::Raw(body);
        self.json = false;
        self
    }

    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Combines these call options with the instance endpoint settings.
    ///
    /// The URI is `base_url` followed by `path`. Where both sides set the
    /// same header (compared case-insensitively) or a timeout, the
    /// instance value replaces the call value. `self` is consumed and a
    /// new request is returned; `instance` is not modified.
    pub fn merge(
        self,
        base_url: &str,
        path: &str,
        instance: &EndpointConfig,
    ) -> Result<RemoteRequest, EngineError> {
        let mut headers: BTreeMap<String, String> = self
            .headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();

        let body = match self.body {
            RequestBody::Empty => None,
            RequestBody::Json(value) => {
                if self.json {
                    headers
                        .entry("content-type".to_owned())
                        .or_insert_with(|| "application/json".to_owned());
                }
                let encoded =
                    serde_json::to_vec(&value).map_err(|e| EngineError::Encode { source: e })?;
                Some(Bytes::from(encoded))
            }
            RequestBody::Raw(bytes) => Some(bytes),
        };
        if self.json {
            headers
                .entry("accept".to_owned())
                .or_insert_with(|| "application/json".to_owned());
        }

        for (name, value) in &instance.headers {
            headers.insert(name.to_ascii_lowercase(), value.clone());
        }

        Ok(RemoteRequest {
            method: self.method,
            uri: format!("{base_url}{path}"),
            headers,
            body,
            timeout: instance.transport.timeout().or(self.timeout),
        })
    }
}

/// Response body as returned by [`EngineClient::request`](crate::EngineClient::request).
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(serde_json::Value),
    Text(String),
    Raw(Bytes),
}

impl ResponseBody {
    /// Decodes a body. With `json`, a body that is not valid JSON is kept as text.
    pub fn decode(body: Bytes, json: bool) -> Self {
        if body.is_empty() {
            return Self::Empty;
        }
        if json {
            // arch-lint: allow(no-silent-result-drop) reason="invalid JSON falls back to text decoding"
            if let Ok(value) = serde_json::from_slice(&body) {
                return Self::Json(value);
            }
        }
        match String::from_utf8(body.to_vec()) {
            Ok(text) => Self::Text(text),
            // arch-lint: allow(no-error-swallowing) reason="non-UTF-8 body is returned as raw bytes"
            Err(_) => Self::Raw(body),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Lossy text rendering, used in error messages.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Json(value) => value.to_string(),
            Self::Text(text) => text.clone(),
            Self::Raw(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

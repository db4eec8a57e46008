use std::fmt;

use bytes::Bytes;
use dockerize_core::EndpointConfig;

use crate::endpoint::Endpoint;
use crate::error::EngineError;
use crate::request::{RequestOptions, ResponseBody};
use crate::transport::{EngineTransport, RemoteResponse, Transport};

/// Identifier returned by the create-container call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Container engine API client, parameterized over the transport for testability.
pub struct EngineClient<T: Transport = EngineTransport> {
    config: EndpointConfig,
    base_url: String,
    transport: T,
}

impl EngineClient<EngineTransport> {
    /// Client with the transport picked from the endpoint URI.
    pub fn new(config: EndpointConfig) -> Result<Self, EngineError> {
        let transport = EngineTransport::from_config(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> EngineClient<T> {
    /// Fails with [`EngineError::MissingUri`] when the endpoint has no URI.
    pub fn with_transport(config: EndpointConfig, transport: T) -> Result<Self, EngineError> {
        let uri = config.base_uri().ok_or(EngineError::MissingUri)?;
        let base_url = Endpoint::parse(uri)?.base_url();
        Ok(Self {
            config,
            base_url,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Generic calls ──

    /// Issue a call and return the decoded body; the status code is ignored.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseBody, EngineError> {
        let json = options.json;
        let response = self.request_full(path, options).await?;
        Ok(ResponseBody::decode(response.body, json))
    }

    /// Issue a call and return status, headers, and raw body.
    pub async fn request_full(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<RemoteResponse, EngineError> {
        let method = options.method.clone();
        let request = options.merge(&self.base_url, path, &self.config)?;
        tracing::debug!(%method, uri = %request.uri, "engine request");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| EngineError::Transport {
                method: method.clone(),
                path: path.to_owned(),
                source: e,
            })?;

        tracing::debug!(%method, path, status = response.status, "engine response");
        Ok(response)
    }

    // ── Images ──

    /// `POST /build?t={tag}` with a tar build context.
    ///
    /// The build-status body is returned as text, never parsed as JSON.
    pub async fn build_image(&self, tag: &str, context: Bytes) -> Result<ResponseBody, EngineError> {
        let options = RequestOptions::post()
            .header("content-type", "application/tar")
            .raw_body(context);
        self.request(&format!("/build?t={tag}"), options).await
    }

    // ── Containers ──

    /// `POST /containers/create?name={name}`; returns the `Id` field.
    pub async fn create_container(
        &self,
        name: &str,
        config: &serde_json::Value,
    ) -> Result<ContainerId, EngineError> {
        let options = RequestOptions::post().json_body(config.clone());
        let body = self
            .request(&format!("/containers/create?name={name}"), options)
            .await?;

        body.as_json()
            .and_then(|v| v.get("Id"))
            .and_then(serde_json::Value::as_str)
            .filter(|id| !id.is_empty())
            .map(ContainerId::new)
            .ok_or_else(|| EngineError::MissingContainerId {
                body: body.to_text(),
            })
    }

    /// `POST /containers/{id}/start`.
    pub async fn start_container(&self, id: &ContainerId) -> Result<(), EngineError> {
        self.request(&format!("/containers/{id}/start"), RequestOptions::post())
            .await?;
        Ok(())
    }
}

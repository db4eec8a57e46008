use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;
use dockerize_core::EndpointConfig;

use crate::endpoint::Endpoint;
use crate::error::{EngineError, TransportError};
use crate::http::HttpTransport;

/// A fully merged engine call, ready for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub method: reqwest::Method,
    /// Base URL plus call path; only the request target for unix sockets
    pub uri: String,
    /// Lower-cased header names
    pub headers: BTreeMap<String, String>,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

/// Raw engine response; the status code is not interpreted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteResponse {
    pub status: u16,
    /// Lower-cased header names
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl RemoteResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstraction over the wire for testability.
///
/// Production code uses [`EngineTransport`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    /// Send one request and wait for the complete response.
    async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, TransportError>;
}

/// Transport chosen from the endpoint URI.
pub enum EngineTransport {
    Http(HttpTransport),
    #[cfg(unix)]
    Unix(crate::unix::UnixSocketTransport),
}

impl EngineTransport {
    pub fn from_config(config: &EndpointConfig) -> Result<Self, EngineError> {
        let uri = config.base_uri().ok_or(EngineError::MissingUri)?;
        match Endpoint::parse(uri)? {
            Endpoint::Http { .. } => {
                let transport = HttpTransport::new(&config.transport)
                    .map_err(|e| EngineError::TransportSetup { source: e })?;
                Ok(Self::Http(transport))
            }
            #[cfg(unix)]
            Endpoint::Unix { socket, .. } => Ok(Self::Unix(crate::unix::UnixSocketTransport::new(
                socket,
                config.transport.timeout(),
            ))),
            #[cfg(not(unix))]
            Endpoint::Unix { .. } => Err(EngineError::InvalidUri {
                uri: uri.to_owned(),
                reason: "unix sockets are not supported on this platform",
            }),
        }
    }
}

impl Transport for EngineTransport {
    async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, TransportError> {
        match self {
            Self::Http(transport) => transport.send(request).await,
            #[cfg(unix)]
            Self::Unix(transport) => transport.send(request).await,
        }
    }
}

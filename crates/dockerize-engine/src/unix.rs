use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;

use crate::error::TransportError;
use crate::transport::{RemoteRequest, RemoteResponse, Transport};

/// HTTP/1.1 over a unix domain socket, one connection per call.
///
/// Request URIs carry only the request target (`/build?t=..`); the socket
/// path is fixed when the transport is created.
pub struct UnixSocketTransport {
    socket: PathBuf,
    timeout: Option<Duration>,
}

impl UnixSocketTransport {
    pub fn new(socket: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            socket: socket.into(),
            timeout,
        }
    }
}

impl Transport for UnixSocketTransport {
    async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, TransportError> {
        let target = match request.uri.as_str() {
            "" => "/".to_owned(),
            uri if uri.starts_with('/') => uri.to_owned(),
            uri => {
                return Err(TransportError::InvalidRequest {
                    detail: format!("{uri} is not an origin-form request target"),
                });
            }
        };
        let socket = self.socket.as_path();

        // A call-level timeout replaces the transport default.
        match request.timeout.or(self.timeout) {
            Some(after) => tokio::time::timeout(after, exchange(socket, &target, request))
                .await
                // arch-lint: allow(no-error-swallowing) reason="elapsed carries no detail beyond the deadline"
                .map_err(|_| TransportError::Timeout { after })?,
            None => exchange(socket, &target, request).await,
        }
    }
}

async fn exchange(
    socket: &Path,
    target: &str,
    request: RemoteRequest,
) -> Result<RemoteResponse, TransportError> {
    let stream = UnixStream::connect(socket)
        .await
        .map_err(|e| TransportError::Connect {
            target: socket.display().to_string(),
            source: e,
        })?;

    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|e| TransportError::Http { source: e })?;

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!(error = %e, "engine connection closed");
        }
    });

    let body = request.body.unwrap_or_default();
    let mut builder = hyper::Request::builder().method(request.method).uri(target);
    for (name, value) in &request.headers {
        // Framing follows the actual body.
        if name == "content-length" {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }
    if !request.headers.contains_key("host") {
        builder = builder.header("host", "localhost");
    }
    builder = builder.header("content-length", body.len());
    let outgoing = builder
        .body(Full::new(body))
        .map_err(|e| TransportError::InvalidRequest {
            detail: e.to_string(),
        })?;

    let response = sender
        .send_request(outgoing)
        .await
        .map_err(|e| TransportError::Http { source: e })?;

    let status = response.status().as_u16();
    let headers: BTreeMap<String, String> = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_owned(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body: Bytes = response
        .into_body()
        .collect()
        .await
        .map_err(|e| TransportError::Http { source: e })?
        .to_bytes();

    Ok(RemoteResponse {
        status,
        headers,
        body,
    })
}

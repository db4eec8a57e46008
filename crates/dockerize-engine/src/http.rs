use std::collections::BTreeMap;
use std::path::Path;

use dockerize_core::TransportOptions;

use crate::error::TransportError;
use crate::transport::{RemoteRequest, RemoteResponse, Transport};

/// HTTP(S) transport backed by a pooled reqwest client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(options: &TransportOptions) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().use_rustls_tls();

        if let Some(timeout) = options.timeout() {
            builder = builder.timeout(timeout);
        }

        if let Some(ca) = &options.ca_cert {
            let pem = read_pem(ca)?;
            let cert =
                reqwest::Certificate::from_pem(&pem).map_err(|e| TransportError::Tls { source: e })?;
            builder = builder.add_root_certificate(cert);
        }

        match (&options.client_cert, &options.client_key) {
            (Some(cert), Some(key)) => {
                let mut pem = read_pem(cert)?;
                pem.extend(read_pem(key)?);
                let identity =
                    reqwest::Identity::from_pem(&pem).map_err(|e| TransportError::Tls { source: e })?;
                builder = builder.identity(identity);
            }
            (None, None) => {}
            _ => return Err(TransportError::IncompleteIdentity),
        }

        if options.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Tls { source: e })?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: RemoteRequest) -> Result<RemoteResponse, TransportError> {
        let mut builder = self.client.request(request.method, &request.uri);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request { source: e })?;

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
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request { source: e })?;

        Ok(RemoteResponse {
            status,
            headers,
            body,
        })
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, TransportError> {
    std::fs::read(path).map_err(|e| TransportError::TlsFile {
        path: path.to_path_buf(),
        source: e,
    })
}

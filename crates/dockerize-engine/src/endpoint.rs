use std::path::PathBuf;

use crate::EngineError;

/// Where engine calls are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Plain or TLS HTTP; `base` has no trailing slash.
    Http { base: String },
    /// HTTP over a unix domain socket. `path` is the request-target prefix
    /// (empty or a version such as `/v1.41`).
    Unix { socket: PathBuf, path: String },
}

impl Endpoint {
    /// Parses an endpoint URI.
    ///
    /// | Input | Result |
    /// |-------|--------|
    /// | `http://host`, `https://host:2376` | `Http` |
    /// | `tcp://host:2375` | `Http` with `http://` |
    /// | `host` | `Http` with `http://` |
    /// | `unix:///var/run/docker.sock`, `unix:/var/run/docker.sock` | `Unix` |
    /// | `http://unix:/var/run/docker.sock:/v1.41` | `Unix` with path `/v1.41` |
    pub fn parse(uri: &str) -> Result<Self, EngineError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(EngineError::MissingUri);
        }

        if let Some(rest) = uri
            .strip_prefix("http://unix:")
            .or_else(|| uri.strip_prefix("https://unix:"))
        {
            let (socket, path) = rest.split_once(':').unwrap_or((rest, ""));
            return unix(uri, socket, path);
        }
        if let Some(rest) = uri.strip_prefix("unix://") {
            return unix(uri, rest, "");
        }
        if let Some(rest) = uri.strip_prefix("unix:") {
            return unix(uri, rest, "");
        }
        if let Some(rest) = uri.strip_prefix("tcp://") {
            return http(uri, &format!("http://{rest}"));
        }
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return http(uri, uri);
        }
        if uri.contains("://") {
            return Err(EngineError::InvalidUri {
                uri: uri.to_owned(),
                reason: "unsupported scheme",
            });
        }
        http(uri, &format!("http://{uri}"))
    }

    /// Base URL that call paths are appended to.
    ///
    /// For unix endpoints this is only the request-target prefix (often
    /// empty); the socket path stays with the transport.
    pub fn base_url(&self) -> String {
        match self {
            Self::Http { base } => base.clone(),
            Self::Unix { path, .. } => path.clone(),
        }
    }
}

fn unix(uri: &str, socket: &str, path: &str) -> Result<Endpoint, EngineError> {
    if socket.is_empty() {
        return Err(EngineError::InvalidUri {
            uri: uri.to_owned(),
            reason: "missing socket path",
        });
    }
    Ok(Endpoint::Unix {
        socket: PathBuf::from(socket),
        path: path.trim_end_matches('/').to_owned(),
    })
}

fn http(uri: &str, base: &str) -> Result<Endpoint, EngineError> {
    let host = base.split_once("://").map(|(_, rest)| rest).unwrap_or(base);
    if host.is_empty() || host.starts_with('/') {
        return Err(EngineError::InvalidUri {
            uri: uri.to_owned(),
            reason: "missing host",
        });
    }
    Ok(Endpoint::Http {
        base: base.trim_end_matches('/').to_owned(),
    })
}

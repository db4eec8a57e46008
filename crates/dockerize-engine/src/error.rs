use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to connect to {target}")]
    Connect {
        target: String,
        source: std::io::Error,
    },

    #[error("http request failed")]
    Request { source: reqwest::Error },

    #[error("http exchange over unix socket failed")]
    Http { source: hyper::Error },

    #[error("request timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("invalid request: {detail}")]
    InvalidRequest { detail: String },

    #[error("failed to read TLS material at {path}")]
    TlsFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TLS configuration")]
    Tls { source: reqwest::Error },

    #[error("client_cert and client_key must be set together")]
    IncompleteIdentity,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("endpoint uri required; set [endpoint].uri in dockerize.toml, DOCKER_HOST, or --uri")]
    MissingUri,

    #[error("invalid endpoint uri {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: &'static str },

    #[error("failed to set up engine transport")]
    TransportSetup { source: TransportError },

    #[error("failed to encode request body")]
    Encode { source: serde_json::Error },

    #[error("engine call {method} {path} failed")]
    Transport {
        method: reqwest::Method,
        path: String,
        source: TransportError,
    },

    #[error("create-container response has no string `Id`: {body}")]
    MissingContainerId { body: String },
}

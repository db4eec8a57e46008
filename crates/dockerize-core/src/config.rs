use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// dockerize.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockerizeConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub recipe: RecipeConfig,
}

/// Container engine endpoint, applied to every remote call.
///
/// Accepted URI forms:
/// - `http://hostname`, `https://hostname:2376`, or a bare `hostname`
/// - `unix:///var/run/docker.sock` or `unix:/var/run/docker.sock`
/// - `http://unix:/var/run/docker.sock:` (socket path between `unix:` and the next `:`;
///   use `unix://` for socket paths that contain a colon)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Engine base URI; required before any client is constructed
    pub uri: Option<String>,
    /// Headers sent on every call; these win over call-site headers of the same name
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub transport: TransportOptions,
}

/// Transport settings passed through to the HTTP layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportOptions {
    /// Per-call timeout; no timeout when unset
    pub timeout_secs: Option<u64>,
    /// PEM CA bundle used to verify the engine's certificate
    pub ca_cert: Option<PathBuf>,
    /// PEM client certificate (requires `client_key`)
    pub client_cert: Option<PathBuf>,
    /// PEM client private key (requires `client_cert`)
    pub client_key: Option<PathBuf>,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Host port bound to the container's internal port
    #[serde(default = "default_port")]
    pub port: String,
    /// Pause after starting a container, in milliseconds
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Start the container after creation
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeConfig {
    /// Base image of the default recipe
    #[serde(default = "default_base_image")]
    pub base_image: String,
    /// Port the application listens on inside the container
    #[serde(default = "default_internal_port")]
    pub internal_port: u16,
}

impl EndpointConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    /// The configured URI, or `None` when missing or blank.
    pub fn base_uri(&self) -> Option<&str> {
        self.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

impl TransportOptions {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            settle_ms: default_settle_ms(),
            auto_start: default_auto_start(),
        }
    }
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            base_image: default_base_image(),
            internal_port: default_internal_port(),
        }
    }
}

impl DockerizeConfig {
    /// Load from dockerize.toml in the given directory, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join("dockerize.toml");
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            Ok(Self::default())
        }
    }
}

/// Host port used when none, or an empty one, is given.
pub const DEFAULT_HOST_PORT: &str = "3000";

pub(crate) fn default_port() -> String {
    DEFAULT_HOST_PORT.to_owned()
}

pub(crate) fn default_settle_ms() -> u64 {
    1000
}

fn default_auto_start() -> bool {
    true
}

fn default_base_image() -> String {
    "tatsushid/tinycore-node:4.2".to_owned()
}

fn default_internal_port() -> u16 {
    8080
}

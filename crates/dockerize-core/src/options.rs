use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::{DEFAULT_HOST_PORT, DefaultsConfig, default_port, default_settle_ms};

/// Options for a single `dockerize` invocation.
///
/// The image is tagged `{name}-image`; the container is named `{name}`.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Container name; `app-{unix millis}` when unset
    pub name: Option<String>,
    /// Host port bound to the container's internal port; empty means `3000`
    pub port: String,
    /// Full recipe (Dockerfile) text; the default recipe when unset
    pub recipe: Option<String>,
    /// package.json content for non-directory input; `{}` when unset
    pub dependency_manifest: Option<String>,
    /// Start the container after creation
    pub auto_start: bool,
    /// Create-container payload, sent as-is; replaces the default image and port binding
    pub container_config: Option<serde_json::Value>,
    /// Pause after the start call.
    ///
    /// This is a grace period only. It does not check that the
    /// application inside the container is accepting connections.
    pub settle_interval: Duration,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            name: None,
            port: default_port(),
            recipe: None,
            dependency_manifest: None,
            auto_start: true,
            container_config: None,
            settle_interval: Duration::from_millis(default_settle_ms()),
        }
    }
}

impl BuildOptions {
    /// Options seeded from the `[defaults]` table of dockerize.toml.
    pub fn from_defaults(defaults: &DefaultsConfig) -> Self {
        Self {
            port: defaults.port.clone(),
            auto_start: defaults.auto_start,
            settle_interval: Duration::from_millis(defaults.settle_ms),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn port(mut self, port: impl ToString) -> Self {
        self.port = port.to_string();
        self
    }

    pub fn recipe(mut self, recipe: impl Into<String>) -> Self {
        self.recipe = Some(recipe.into());
        self
    }

    pub fn dependency_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.dependency_manifest = Some(manifest.into());
        self
    }

    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    pub fn container_config(mut self, config: serde_json::Value) -> Self {
        self.container_config = Some(config);
        self
    }

    pub fn settle_interval(mut self, interval: Duration) -> Self {
        self.settle_interval = interval;
        self
    }

    /// The container name for this invocation, generating one from `now` if unset.
    pub fn resolve_name(&self, now: SystemTime) -> String {
        self.name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_app_name(now))
    }

    /// The host port for this invocation; an empty port falls back to the default.
    pub fn resolve_port(&self) -> &str {
        resolve_host_port(&self.port)
    }
}

/// `port`, or [`DEFAULT_HOST_PORT`] when it is empty.
pub fn resolve_host_port(port: &str) -> &str {
    if port.trim().is_empty() {
        DEFAULT_HOST_PORT
    } else {
        port
    }
}

/// `app-{milliseconds since the unix epoch}`.
pub fn default_app_name(now: SystemTime) -> String {
    let millis = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        // arch-lint: allow(no-silent-result-drop) reason="clock before the epoch yields app-0"
        .unwrap_or_default();
    format!("app-{millis}")
}

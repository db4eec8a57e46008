use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

use bytes::Bytes;
use dockerize_build::{ArchiveBuilder, RecipeTemplate, entries_for};
use dockerize_core::{
    AppInput, BuildOptions, DockerizeConfig, EndpointConfig, Entry, RecipeConfig, resolve_host_port,
};
use dockerize_engine::{
    ContainerId, EngineClient, EngineTransport, RemoteResponse, RequestOptions, ResponseBody,
    Transport,
};
use serde::Serialize;

use crate::Error;

/// Steps of one `dockerize` invocation, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalizing,
    Archiving,
    Building,
    Creating,
    Starting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normalizing => "normalize",
            Self::Archiving => "archive",
            Self::Building => "build",
            Self::Creating => "create",
            Self::Starting => "start",
        })
    }
}

/// Builds images from application code and runs them as containers.
///
/// Invocations share only the endpoint configuration and the transport.
/// Concurrent invocations must use distinct names.
pub struct Dockerizer<T: Transport = EngineTransport> {
    client: EngineClient<T>,
    recipe: RecipeConfig,
    archive: ArchiveBuilder,
}

impl Dockerizer<EngineTransport> {
    pub fn new(endpoint: EndpointConfig) -> Result<Self, Error> {
        let client =
            EngineClient::new(endpoint).map_err(|e| Error::Configuration { source: e })?;
        Ok(Self::with_client(client))
    }

    /// Uses the `[endpoint]` and `[recipe]` tables of dockerize.toml.
    pub fn from_config(config: &DockerizeConfig) -> Result<Self, Error> {
        Ok(Self::new(config.endpoint.clone())?.recipe_config(config.recipe.clone()))
    }
}

impl<T: Transport> Dockerizer<T> {
    pub fn with_transport(endpoint: EndpointConfig, transport: T) -> Result<Self, Error> {
        let client = EngineClient::with_transport(endpoint, transport)
            .map_err(|e| Error::Configuration { source: e })?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: EngineClient<T>) -> Self {
        Self {
            client,
            recipe: RecipeConfig::default(),
            archive: ArchiveBuilder::new(),
        }
    }

    /// Base image and internal port used for the default recipe and port binding.
    pub fn recipe_config(mut self, recipe: RecipeConfig) -> Self {
        self.recipe = recipe;
        self
    }

    pub fn archive_builder(mut self, archive: ArchiveBuilder) -> Self {
        self.archive = archive;
        self
    }

    /// The recipe used when [`BuildOptions::recipe`] is unset.
    pub fn default_recipe(&self) -> String {
        RecipeTemplate::new(&self.recipe).render()
    }

    /// Builds an image from `app`, creates a container from it, and
    /// optionally starts it. Returns the container id.
    ///
    /// Stages run strictly in order and the first failure ends the
    /// invocation. Nothing is rolled back: an image built before a failed
    /// create stays on the engine.
    pub async fn dockerize(
        &self,
        app: AppInput,
        options: BuildOptions,
    ) -> Result<ContainerId, Error> {
        let name = options.resolve_name(SystemTime::now());
        let image = format!("{name}-image");

        tracing::info!(stage = %Stage::Normalizing, %name, kind = %app.kind(), "dockerizing");
        let entries = entries_for(app, options.dependency_manifest.as_deref())
            .await
            .map_err(|e| Error::InputResolution { source: e })?;

        tracing::info!(stage = %Stage::Archiving, entries = entries.len(), "assembling build context");
        let recipe = options
            .recipe
            .clone()
            .unwrap_or_else(|| self.default_recipe());
        let context = self.dockerball(&recipe, entries).await?;

        tracing::info!(stage = %Stage::Building, %image, bytes = context.len(), "building image");
        self.client
            .build_image(&image, context)
            .await
            .map_err(|e| Error::remote(Stage::Building, e))?;

        tracing::info!(stage = %Stage::Creating, %name, "creating container");
        let config = match options.container_config {
            Some(config) => config,
            None => self.default_container_config(&image, options.resolve_port()),
        };
        let id = self
            .client
            .create_container(&name, &config)
            .await
            .map_err(|e| Error::remote(Stage::Creating, e))?;

        if options.auto_start {
            tracing::info!(stage = %Stage::Starting, %id, "starting container");
            self.client
                .start_container(&id)
                .await
                .map_err(|e| Error::remote(Stage::Starting, e))?;
            // Grace period only; readiness is not checked.
            tokio::time::sleep(options.settle_interval).await;
        } else {
            tracing::debug!(%id, "auto start disabled");
        }

        Ok(id)
    }

    /// Tar build context holding `entries` followed by the recipe as `Dockerfile`.
    pub async fn dockerball(&self, recipe: &str, entries: Vec<Entry>) -> Result<Bytes, Error> {
        self.archive
            .build(recipe, entries)
            .await
            .map_err(|e| Error::Archive { source: e })
    }

    /// Arbitrary engine call returning the decoded body.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseBody, dockerize_engine::EngineError> {
        self.client.request(path, options).await
    }

    /// Arbitrary engine call returning status, headers, and body.
    pub async fn request_full(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<RemoteResponse, dockerize_engine::EngineError> {
        self.client.request_full(path, options).await
    }

    /// `{ Image, HostConfig.PortBindings }` binding the internal port to `host_port`.
    ///
    /// An empty `host_port` binds to the default host port.
    pub fn default_container_config(&self, image: &str, host_port: &str) -> serde_json::Value {
        let host_port = resolve_host_port(host_port);
        let binding = format!("{}/tcp", self.recipe.internal_port);
        let config = ContainerConfig {
            image: image.to_owned(),
            host_config: HostConfig {
                port_bindings: BTreeMap::from([(
                    binding,
                    vec![PortBinding {
                        host_port: host_port.to_owned(),
                    }],
                )]),
            },
        };
        serde_json::json!(config)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ContainerConfig {
    image: String,
    host_config: HostConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct HostConfig {
    port_bindings: BTreeMap<String, Vec<PortBinding>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PortBinding {
    host_port: String,
}

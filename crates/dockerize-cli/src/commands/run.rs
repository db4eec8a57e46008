use dockerize::{BuildOptions, DockerizeConfig, Dockerizer};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{read_app, read_optional};

#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// Source text, a file, or a directory; `-` reads stdin
    pub app: String,
    /// Engine URI (unix://, tcp://, http(s)://); overrides [endpoint].uri
    #[arg(long, env = "DOCKER_HOST")]
    pub uri: Option<String>,
    /// Container name; the image is tagged NAME-image
    #[arg(long)]
    pub name: Option<String>,
    /// Host port bound to the container's internal port
    #[arg(long, short = 'p')]
    pub port: Option<String>,
    /// Recipe file used instead of the default
    #[arg(long, value_name = "FILE")]
    pub dockerfile: Option<PathBuf>,
    /// package.json used for non-directory input
    #[arg(long, value_name = "FILE")]
    pub package: Option<PathBuf>,
    /// Create-container JSON payload, sent as-is
    #[arg(long, value_name = "FILE")]
    pub container: Option<PathBuf>,
    /// Create the container without starting it
    #[arg(long)]
    pub no_start: bool,
    /// Pause after start, in milliseconds
    #[arg(long, value_name = "MS")]
    pub settle_ms: Option<u64>,
}

/// Build, create, and start; prints the container id.
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = DockerizeConfig::load(Path::new(super::PROJECT_DIR))?;
    if let Some(uri) = args.uri {
        config.endpoint.uri = Some(uri);
    }
    let docker = Dockerizer::from_config(&config)?;

    let mut options = BuildOptions::from_defaults(&config.defaults);
    options.name = args.name;
    if let Some(port) = args.port {
        options = options.port(port);
    }
    options.recipe = read_optional(args.dockerfile.as_deref()).await?;
    options.dependency_manifest = read_optional(args.package.as_deref()).await?;
    if let Some(raw) = read_optional(args.container.as_deref()).await? {
        let payload: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("container config is not valid JSON: {e}"))?;
        options = options.container_config(payload);
    }
    if args.no_start {
        options = options.auto_start(false);
    }
    if let Some(ms) = args.settle_ms {
        options = options.settle_interval(Duration::from_millis(ms));
    }

    let app = read_app(&args.app).await;
    tracing::debug!(kind = %app.kind(), "resolved application input");

    let id = docker.dockerize(app, options).await?;
    println!("{id}");
    Ok(())
}

mod archive;
mod recipe;
mod run;

use std::path::Path;

use dockerize::AppInput;

pub use archive::archive;
pub use recipe::recipe;
pub use run::{RunArgs, run};

/// Project directory holding the optional dockerize.toml.
pub(crate) const PROJECT_DIR: &str = ".";

/// `-` reads the application from stdin, anything else goes through detection.
pub(crate) async fn read_app(app: &str) -> AppInput {
    if app == "-" {
        AppInput::Stream(Box::new(tokio::io::stdin()))
    } else {
        AppInput::detect(app).await
    }
}

pub(crate) async fn read_optional(path: Option<&Path>) -> anyhow::Result<Option<String>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    Ok(Some(content))
}

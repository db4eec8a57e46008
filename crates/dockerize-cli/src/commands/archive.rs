use dockerize::DockerizeConfig;
use dockerize::build::{ArchiveBuilder, RecipeTemplate, entries_for, write_archive};
use std::path::Path;

use super::{read_app, read_optional};

/// Assemble the build context that `run` would send and write it to `output`.
pub async fn archive(
    app: &str,
    output: &Path,
    dockerfile: Option<&Path>,
    package: Option<&Path>,
) -> anyhow::Result<()> {
    let config = DockerizeConfig::load(Path::new(super::PROJECT_DIR))?;

    let recipe = match read_optional(dockerfile).await? {
        Some(recipe) => recipe,
        None => RecipeTemplate::new(&config.recipe).render(),
    };
    let manifest = read_optional(package).await?;

    let entries = entries_for(read_app(app).await, manifest.as_deref()).await?;
    let context = ArchiveBuilder::new().build(&recipe, entries).await?;
    write_archive(output, &context).await?;

    println!("Wrote {} ({} bytes)", output.display(), context.len());
    Ok(())
}

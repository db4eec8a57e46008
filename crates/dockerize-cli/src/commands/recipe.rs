use dockerize::DockerizeConfig;
use dockerize::build::RecipeTemplate;
use std::path::Path;

pub async fn recipe() -> anyhow::Result<()> {
    let config = DockerizeConfig::load(Path::new(super::PROJECT_DIR))?;
    println!("{}", RecipeTemplate::new(&config.recipe).render());
    Ok(())
}

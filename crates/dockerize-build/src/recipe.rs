use dockerize_core::RecipeConfig;

/// Renders the default Node.js recipe.
///
/// The recipe copies `/app` into the image, installs dependencies with
/// npm, and runs the application, which must listen on the internal port.
pub struct RecipeTemplate<'a> {
    config: &'a RecipeConfig,
}

impl<'a> RecipeTemplate<'a> {
    pub fn new(config: &'a RecipeConfig) -> Self {
        Self { config }
    }

    pub fn render(&self) -> String {
        format!(
            "FROM {base}\n\
             COPY /app /app\n\
             RUN cd /app; npm install\n\
             EXPOSE  {port}\n\
             CMD [\"node\", \"/app\"]",
            base = self.config.base_image,
            port = self.config.internal_port,
        )
    }
}

/// The recipe used when neither the caller nor dockerize.toml supplies one.
pub fn default_recipe() -> String {
    RecipeTemplate::new(&RecipeConfig::default()).render()
}

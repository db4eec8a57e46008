//! Recipe rendering, input normalization, and build-context assembly.
//!
//! # Build context
//!
//! ```text
//! dockerize(app, options)
//!   1. Normalize ── AppInput → entries (normalize::entries_for)
//!   2. Recipe    ── options.recipe or RecipeTemplate::render()
//!   3. Archive   ── entries + Dockerfile → tar bytes (ArchiveBuilder::build)
//! ```
//!
//! # Layout
//!
//! Non-directory input yields two files plus the recipe:
//! - `app/index.js`: the application code
//! - `app/package.json`: the dependency manifest (`{}` by default)
//! - `Dockerfile`
//!
//! Directory input yields the whole tree under `app/` plus the recipe.
//! The directory is expected to carry its own `package.json`.

pub mod archive;
pub mod normalize;
pub mod recipe;

pub use archive::{ArchiveBuilder, ArchiveError, RECIPE_ENTRY, build_archive, write_archive};
pub use normalize::entries_for;
pub use recipe::{RecipeTemplate, default_recipe};

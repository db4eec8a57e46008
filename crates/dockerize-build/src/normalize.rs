use dockerize_core::{AppInput, Entry, EntryData};

/// In-archive path of the application code for non-directory input.
pub const APP_ENTRY: &str = "/app/index.js";
/// In-archive path of the dependency manifest for non-directory input.
pub const MANIFEST_ENTRY: &str = "/app/package.json";
/// Root of the tree for directory input.
pub const APP_DIR_ENTRY: &str = "app";
pub const EMPTY_MANIFEST: &str = "{}";

/// Turns application input into archive entries.
///
/// Non-directory input becomes the code entry plus a manifest entry.
/// Directory input becomes a single tree entry and `dependency_manifest`
/// is ignored.
pub async fn entries_for(
    app: AppInput,
    dependency_manifest: Option<&str>,
) -> dockerize_core::Result<Vec<Entry>> {
    app.verify().await?;

    if let AppInput::Directory(path) = app {
        if dependency_manifest.is_some() {
            tracing::debug!(
                path = %path.display(),
                "ignoring dependency manifest for directory input"
            );
        }
        return Ok(vec![Entry::new(APP_DIR_ENTRY, EntryData::Directory(path))]);
    }

    let kind = app.kind();
    tracing::debug!(%kind, "normalized application input");

    Ok(vec![
        Entry::new(APP_ENTRY, EntryData::from(app)),
        Entry::text(MANIFEST_ENTRY, dependency_manifest.unwrap_or(EMPTY_MANIFEST)),
    ])
}

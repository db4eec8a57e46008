use std::path::PathBuf;

use crate::EntryKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Input resolution ──
    #[error("failed to stat application input {path}")]
    InputStat {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("application input {path} is not a {expected}")]
    InputKindMismatch { path: PathBuf, expected: EntryKind },
}

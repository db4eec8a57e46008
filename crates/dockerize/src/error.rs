use dockerize_build::ArchiveError;
use dockerize_engine::EngineError;

use crate::Stage;

/// Failure of one `dockerize` invocation. No later stage runs after any of these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid engine configuration")]
    Configuration { source: EngineError },

    #[error("failed to resolve application input")]
    InputResolution { source: dockerize_core::Error },

    #[error("failed to assemble build context")]
    Archive { source: ArchiveError },

    #[error("{stage} stage failed")]
    Transport { stage: Stage, source: EngineError },

    #[error("engine response rejected during {stage} stage")]
    RemoteSemantic { stage: Stage, source: EngineError },
}

impl Error {
    /// Maps an engine call failure to the stage that issued it.
    pub(crate) fn remote(stage: Stage, source: EngineError) -> Self {
        match source {
            EngineError::MissingContainerId { .. } => Self::RemoteSemantic { stage, source },
            _ => Self::Transport { stage, source },
        }
    }

    /// The pipeline stage that failed.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Configuration { .. } => None,
            Self::InputResolution { .. } => Some(Stage::Normalizing),
            Self::Archive { .. } => Some(Stage::Archiving),
            Self::Transport { stage, .. } | Self::RemoteSemantic { stage, .. } => Some(*stage),
        }
    }
}

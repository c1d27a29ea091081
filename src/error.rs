use std::path::PathBuf;

pub type VectraResult<T> = Result<T, VectraError>;

/// Document load failures, surfaced separately so callers can tell a missing
/// file from a broken one from a future-format one.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("file not found: '{}'", path.display())]
    NotFound { path: PathBuf },

    #[error("parse error in '{}': {detail}", path.display())]
    Parse { path: PathBuf, detail: String },

    #[error("version mismatch in '{}': found format version {found}, supported {supported}", path.display())]
    VersionMismatch {
        path: PathBuf,
        found: u32,
        supported: u32,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum VectraError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("canvas not found: '{0}'")]
    CanvasNotFound(String),

    #[error("canvas tree contains a cycle at '{0}'")]
    CanvasCycle(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("unknown target: {0}")]
    UnknownTarget(String),

    #[error("target init failed: {0}")]
    TargetInit(String),

    #[error("render failure: {0}")]
    Render(String),

    #[error("render cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VectraError {
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn unknown_target(msg: impl Into<String>) -> Self {
        Self::UnknownTarget(msg.into())
    }

    pub fn target_init(msg: impl Into<String>) -> Self {
        Self::TargetInit(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// True for errors detected before any rendering work begins.
    pub fn is_resolution_stage(&self) -> bool {
        matches!(
            self,
            Self::Load(_)
                | Self::CanvasNotFound(_)
                | Self::CanvasCycle(_)
                | Self::InvalidParameter(_)
                | Self::UnknownTarget(_)
                | Self::TargetInit(_)
        )
    }
}

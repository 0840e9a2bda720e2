use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("task {0} not found")]
    TaskNotFound(u64),

    #[error("storage error at '{}': {}", path.display(), source)]
    StorageIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt task store '{}': {}", path.display(), source)]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("locked by another process: {0}")]
    Locked(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrackerError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::TaskNotFound(_) => "task_not_found",
            Self::StorageIo { .. } => "storage_io_error",
            Self::CorruptStore { .. } => "corrupt_store",
            Self::Locked(_) => "locked",
            Self::Json(_) => "json_error",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StorageIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CorruptStore {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

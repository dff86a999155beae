//! Error types for rolepilot-sync.

use std::path::PathBuf;

use thiserror::Error;

use rolepilot_core::{ConfigError, ErrorKind};

/// Failure to deliver the reload signal to the supervisor.
#[derive(Debug, Error)]
#[error("failed to signal supervisor (pid {pid}): {source}")]
pub struct ReloadError {
    pub pid: i32,
    #[source]
    pub source: std::io::Error,
}

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The config could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be serialized.
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The supervisor could not be told to reload.
    #[error(transparent)]
    Reload(#[from] ReloadError),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Config(e) => e.kind(),
            SyncError::Io { .. } | SyncError::Reload(_) => ErrorKind::Io,
            SyncError::Json(_) => ErrorKind::Parse,
        }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

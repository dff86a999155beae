//! Error types for rolepilot-core.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse category of a [`ConfigError`], used by callers that only care
/// whether the failure came from the filesystem, the document text, or the
/// document structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Parse,
    Config,
}

/// All errors that can arise while loading the supervisor config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be opened or read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template-stripped text is not valid JSON.
    #[error("failed to parse supervisor config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The config file is not valid UTF-8.
    #[error("supervisor config at {path} is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The agent conditional block does not have the expected single
    /// open/close shape.
    #[error("unexpected template markers in {path}: {reason}")]
    Template { path: PathBuf, reason: String },

    /// A required environment variable is unset.
    #[error("environment variable {var} is not set")]
    MissingEnv { var: &'static str },

    /// `services` is missing or empty.
    #[error("supervisor config declares no services")]
    NoServices,

    /// `services[0].name` is empty or is nothing but a role suffix.
    #[error("first service name {name:?} has no base name")]
    EmptyServiceName { name: String },

    /// Discovery-agent mode is on but `coprocesses` is empty.
    #[error("discovery agent enabled but supervisor config declares no coprocesses")]
    NoCoprocesses,

    /// Discovery-agent mode is on but the first coprocess has no
    /// `-retry-join <host>` pair.
    #[error("first coprocess command has no `-retry-join <host>` argument")]
    MissingRetryJoin,
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Io { .. } => ErrorKind::Io,
            ConfigError::Parse { .. }
            | ConfigError::Encoding { .. }
            | ConfigError::Template { .. } => ErrorKind::Parse,
            ConfigError::MissingEnv { .. }
            | ConfigError::NoServices
            | ConfigError::EmptyServiceName { .. }
            | ConfigError::NoCoprocesses
            | ConfigError::MissingRetryJoin => ErrorKind::Config,
        }
    }
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}

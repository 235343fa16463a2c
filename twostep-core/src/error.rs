//! Error types for twostep-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading view configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, with the path that was being read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file did not exist at the given path.
    #[error("view config not found at {path}")]
    NotFound { path: PathBuf },

    /// YAML parse error, including file path and line context from serde_yaml.
    #[error("failed to parse view config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An escaping method name that is not one of the known methods.
    #[error("unknown escaping method '{0}'; expected: html, entities, js, raw")]
    UnknownEscapingMethod(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}

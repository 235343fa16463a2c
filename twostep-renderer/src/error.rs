//! Error types for twostep-renderer.

use std::path::PathBuf;

use thiserror::Error;

use twostep_core::ConfigError;

/// All errors that can arise while loading or rendering views.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera failed to compile the loader's templates.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Tera failed while executing a template.
    #[error("failed to render template '{template}': {source}")]
    Render {
        template: String,
        #[source]
        source: tera::Error,
    },

    /// No search directory of the loader holds the template.
    #[error("template \"{name}\" not found (looked into: {})", display_dirs(.dirs))]
    TemplateNotFound { name: String, dirs: Vec<PathBuf> },

    /// The name is empty or points outside the search directories.
    #[error("invalid template name \"{name}\": {reason}")]
    InvalidTemplateName { name: String, reason: &'static str },

    /// A loader search directory does not exist.
    #[error("template directory {path} does not exist")]
    MissingDirectory { path: PathBuf },

    /// Filesystem error while reading templates or cache entries.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON error (cache entries, render context).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The view has no template to render.
    #[error("a template has not been set")]
    NoTemplate,

    /// The view is decorated but has no layout template.
    #[error("the view is decorated but no decorator template has been set")]
    NoDecoratorTemplate,

    /// Invalid view configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

fn display_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

//! View configuration, loaded from a YAML file.
//!
//! # File shape
//!
//! ```yaml
//! app_dir: apps/frontend          # relative to this file
//! decorator_dirs: [templates]     # relative to app_dir
//! module_dirs: [modules, ../../plugins/blog/modules]
//! template_cache_dir: ../../cache/templates
//! standard_helpers: [Partial, Cache, Date]
//! escaping_strategy: true
//! escaping_method: html
//! extension: .html
//! has_layout: true
//! decorator_template: layout
//! ```
//!
//! Every key is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::escaping::EscapingMethod;

/// Default template file extension.
pub const DEFAULT_EXTENSION: &str = ".html";

/// Config file name picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "twostep.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Application root. Every other relative path resolves against it.
    pub app_dir: PathBuf,
    /// Layout search path, in priority order.
    pub decorator_dirs: Vec<PathBuf>,
    /// Roots holding `<module>/templates`. The first root is the primary one.
    pub module_dirs: Vec<PathBuf>,
    /// Where template resolution entries are cached. `None` disables caching.
    pub template_cache_dir: Option<PathBuf>,
    /// Helper names loaded in addition to the baseline set.
    pub standard_helpers: Vec<String>,
    /// Whether plain attribute values are escaped on export.
    pub escaping_strategy: bool,
    pub escaping_method: EscapingMethod,
    /// Template file extension, including the leading dot.
    pub extension: String,
    /// Whether views are decorated with a layout by default.
    pub has_layout: bool,
    /// Layout template name; the extension is appended when missing.
    pub decorator_template: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            app_dir: PathBuf::from("."),
            decorator_dirs: vec![PathBuf::from("templates")],
            module_dirs: vec![PathBuf::from("modules")],
            template_cache_dir: None,
            standard_helpers: vec!["Partial".to_string(), "Cache".to_string()],
            escaping_strategy: true,
            escaping_method: EscapingMethod::Html,
            extension: DEFAULT_EXTENSION.to_string(),
            has_layout: true,
            decorator_template: "layout".to_string(),
        }
    }
}

impl ViewConfig {
    /// Defaults rooted at `app_dir`.
    pub fn with_app_dir(app_dir: impl Into<PathBuf>) -> Self {
        ViewConfig {
            app_dir: app_dir.into(),
            ..Default::default()
        }
    }

    /// Load a config file. A relative `app_dir` resolves against the file's directory.
    ///
    /// Returns `ConfigError::NotFound` if absent,
    /// `ConfigError::Parse` (with path + line context) if malformed YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let mut config: ViewConfig = if contents.trim().is_empty() {
            ViewConfig::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?
        };
        if config.app_dir.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.app_dir = base.join(&config.app_dir);
        }
        Ok(config)
    }

    /// Load `path` when given, else `<cwd>/twostep.yaml` when present, else
    /// defaults rooted at `cwd`.
    pub fn discover(path: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let candidate = cwd.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::with_app_dir(cwd))
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.app_dir.join(path)
        }
    }

    /// Layout search directories, resolved, in priority order.
    pub fn decorator_dirs(&self) -> Vec<PathBuf> {
        self.decorator_dirs.iter().map(|d| self.resolve(d)).collect()
    }

    /// Template search directories for `module`, in priority order.
    ///
    /// The primary root's `<module>/templates` is always included so a missing
    /// module surfaces as a loader error. Further roots contribute only when
    /// they actually carry the module.
    pub fn template_dirs(&self, module: &str) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        for (i, root) in self.module_dirs.iter().enumerate() {
            let dir = self.resolve(root).join(module).join("templates");
            if i == 0 || dir.is_dir() {
                dirs.push(dir);
            }
        }
        dirs
    }

    /// Resolved template cache directory, if caching is enabled.
    pub fn template_cache_dir(&self) -> Option<PathBuf> {
        self.template_cache_dir.as_deref().map(|d| self.resolve(d))
    }

    /// The escaping method to apply on export, or `None` when escaping is off.
    pub fn escaping(&self) -> Option<EscapingMethod> {
        self.escaping_strategy.then_some(self.escaping_method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_framework_settings() {
        let config = ViewConfig::default();
        assert_eq!(config.extension, ".html");
        assert_eq!(config.standard_helpers, ["Partial", "Cache"]);
        assert_eq!(config.escaping(), Some(EscapingMethod::Html));
        assert!(config.has_layout);
        assert!(config.template_cache_dir().is_none());
    }

    #[test]
    fn escaping_off_yields_none() {
        let config = ViewConfig {
            escaping_strategy: false,
            ..Default::default()
        };
        assert_eq!(config.escaping(), None);
    }

    #[test]
    fn relative_paths_resolve_against_app_dir() {
        let config = ViewConfig {
            template_cache_dir: Some(PathBuf::from("cache")),
            decorator_dirs: vec![PathBuf::from("templates"), PathBuf::from("/abs/layouts")],
            ..ViewConfig::with_app_dir("/srv/app")
        };
        assert_eq!(
            config.decorator_dirs(),
            [PathBuf::from("/srv/app/templates"), PathBuf::from("/abs/layouts")]
        );
        assert_eq!(config.template_cache_dir(), Some(PathBuf::from("/srv/app/cache")));
    }

    #[test]
    fn primary_module_dir_is_always_listed() {
        let config = ViewConfig {
            module_dirs: vec![PathBuf::from("modules"), PathBuf::from("plugins")],
            ..ViewConfig::with_app_dir("/does/not/exist")
        };
        assert_eq!(
            config.template_dirs("blog"),
            [PathBuf::from("/does/not/exist/modules/blog/templates")]
        );
    }

    #[test]
    fn yaml_roundtrip_keeps_every_field() {
        let config = ViewConfig {
            standard_helpers: vec!["Date".to_string()],
            escaping_method: EscapingMethod::Entities,
            ..ViewConfig::with_app_dir("/srv/app")
        };
        let yaml = serde_yaml::to_string(&config).expect("serialize");
        let back: ViewConfig = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(back, config);
    }
}

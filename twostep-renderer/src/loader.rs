//! Filesystem template loaders: one per rendering role.
//!
//! A [`TemplateLoader`] searches an ordered list of directories; the first
//! directory holding a name wins. Names are `/`-separated paths relative to a
//! search directory and may not climb out of it.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cache::ResolutionCache;
use crate::error::{io_err, RenderError};

/// The two rendering roles of a two-step view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderRole {
    /// Action content.
    Module,
    /// Layout wrapping the action content.
    Decorator,
}

impl LoaderRole {
    /// Value exposed to templates as `sf_type`.
    pub fn context_type(&self) -> &'static str {
        match self {
            LoaderRole::Module => "action",
            LoaderRole::Decorator => "layout",
        }
    }
}

impl fmt::Display for LoaderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderRole::Module => write!(f, "module"),
            LoaderRole::Decorator => write!(f, "decorator"),
        }
    }
}

/// Resolves template names against a fixed, ordered set of directories.
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    dirs: Vec<PathBuf>,
    cache: Option<ResolutionCache>,
}

impl TemplateLoader {
    /// Build a loader over `dirs`. Every directory must exist.
    pub fn new(dirs: Vec<PathBuf>, cache_dir: Option<PathBuf>) -> Result<Self, RenderError> {
        for dir in &dirs {
            if !dir.is_dir() {
                return Err(RenderError::MissingDirectory { path: dir.clone() });
            }
        }
        Ok(TemplateLoader {
            dirs,
            cache: cache_dir.map(ResolutionCache::new),
        })
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn cache(&self) -> Option<&ResolutionCache> {
        self.cache.as_ref()
    }

    /// Resolve `name` to the file that backs it.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, RenderError> {
        let name = normalize_name(name)?;
        if let Some(path) = self.cache.as_ref().and_then(|c| c.lookup(&self.dirs, &name)) {
            return Ok(path);
        }
        for dir in &self.dirs {
            let candidate = dir.join(&name);
            if candidate.is_file() {
                if let Some(cache) = &self.cache {
                    cache.store(&self.dirs, &name, &candidate);
                }
                return Ok(candidate);
            }
        }
        Err(RenderError::TemplateNotFound {
            name,
            dirs: self.dirs.clone(),
        })
    }

    /// Whether `name` resolves. Invalid names do not exist.
    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    /// Source text of `name`.
    pub fn source(&self, name: &str) -> Result<String, RenderError> {
        let path = self.resolve(name)?;
        std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))
    }

    /// `name` plus every template it extends, includes or imports, followed
    /// transitively, as `(name, source)` pairs with `name` first.
    ///
    /// Only these files are read. References that do not resolve are left
    /// out so the engine reports them against the template that uses them.
    pub fn templates_for(&self, name: &str) -> Result<Vec<(String, String)>, RenderError> {
        let root = normalize_name(name)?;
        let mut seen: HashSet<String> = HashSet::from([root.clone()]);
        let mut pending = vec![root];
        let mut templates = Vec::new();

        while let Some(current) = pending.pop() {
            let source = self.source(&current)?;
            for reference in template_references(&source) {
                let Ok(reference) = normalize_name(&reference) else {
                    continue;
                };
                if !seen.insert(reference.clone()) {
                    continue;
                }
                if self.exists(&reference) {
                    pending.push(reference);
                } else {
                    tracing::debug!(template = %current, missing = %reference, "unresolved template reference");
                }
            }
            templates.push((current, source));
        }
        Ok(templates)
    }
}

/// Normalise a template name: `\` becomes `/`, empty and `.` segments are
/// dropped, and the name may not leave its search directory.
pub fn normalize_name(name: &str) -> Result<String, RenderError> {
    let invalid = |reason| RenderError::InvalidTemplateName {
        name: name.to_string(),
        reason,
    };
    if name.contains('\0') {
        return Err(invalid("contains a NUL byte"));
    }
    let unified = name.replace('\\', "/");
    if unified.starts_with('/') || Path::new(&unified).has_root() {
        return Err(invalid("must be relative to a template directory"));
    }
    let mut parts: Vec<&str> = Vec::new();
    for part in unified.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(invalid("looks for a template outside the configured directories"));
                }
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return Err(invalid("is empty"));
    }
    Ok(parts.join("/"))
}

/// Names referenced by `extends`, `include` and `import` tags in `source`.
fn template_references(source: &str) -> Vec<String> {
    let mut references = Vec::new();
    let mut rest = source;
    while let Some(open) = rest.find("{%") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("%}") else {
            break;
        };
        let tag = after[..close].trim_matches('-').trim();
        let keyword = tag.split_whitespace().next().unwrap_or_default();
        let args = &tag[keyword.len()..];
        match keyword {
            "extends" | "include" => references.extend(quoted_strings(args)),
            // `import "macros.html" as m`
            "import" => references.extend(quoted_strings(args.split(" as ").next().unwrap_or(args))),
            _ => {}
        }
        rest = &after[close + 2..];
    }
    references
}

fn quoted_strings(args: &str) -> Vec<String> {
    let mut strings = Vec::new();
    let mut rest = args;
    while let Some(open) = rest.find(['"', '\'', '`']) {
        let quote = &rest[open..open + 1];
        let body = &rest[open + 1..];
        let Some(close) = body.find(quote) else {
            break;
        };
        strings.push(body[..close].to_string());
        rest = &body[close + 1..];
    }
    strings
}

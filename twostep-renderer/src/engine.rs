//! Tera template engine: extensions plus per-call loader binding.
//!
//! The engine holds no loader. Every [`TemplateEngine::load_template`] call
//! names the loader to read from, so a template can never be compiled from
//! the wrong search path.
//!
//! Autoescaping is disabled: attribute values are escaped when the view
//! exports them (see [`twostep_core::EscapingMethod`]), which is what lets
//! trusted markup such as `sf_content` pass through unchanged.

use std::path::{Path, PathBuf};

use tera::{Context, Tera};

use crate::error::RenderError;
use crate::extensions::Extension;
use crate::loader::{normalize_name, TemplateLoader};

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Compiles templates read through a [`TemplateLoader`] and carries the
/// registered extensions.
#[derive(Default)]
pub struct TemplateEngine {
    extensions: Vec<Box<dyn Extension>>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `extension`. An extension with the same name is replaced in
    /// place, so the latest instance wins and keeps the original position.
    pub fn add_extension(&mut self, extension: Box<dyn Extension>) {
        match self
            .extensions
            .iter_mut()
            .find(|e| e.name() == extension.name())
        {
            Some(slot) => *slot = extension,
            None => self.extensions.push(extension),
        }
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|e| e.name() == name)
    }

    /// Registered extension names, in registration order.
    pub fn extension_names(&self) -> Vec<&'static str> {
        self.extensions.iter().map(|e| e.name()).collect()
    }

    pub fn extensions(&self) -> impl Iterator<Item = &dyn Extension> {
        self.extensions.iter().map(|e| e.as_ref())
    }

    /// Compile `name` from `loader`.
    ///
    /// The templates `name` extends, includes or imports are compiled
    /// alongside it from the same loader. Other files in the search
    /// directories are never read.
    pub fn load_template(&self, loader: &TemplateLoader, name: &str) -> Result<Template, RenderError> {
        let name = normalize_name(name)?;
        let path = loader.resolve(&name)?;

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        for extension in &self.extensions {
            extension.register(&mut tera);
        }
        tera.add_raw_templates(loader.templates_for(&name)?)?;

        tracing::debug!(template = %name, path = %path.display(), "template loaded");
        Ok(Template { name, path, tera })
    }

    /// Compile and render `name` from `loader` in one step.
    pub fn render(
        &self,
        loader: &TemplateLoader,
        name: &str,
        context: &Context,
    ) -> Result<String, RenderError> {
        self.load_template(loader, name)?.render(context)
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// A compiled template, ready to render against a context.
pub struct Template {
    name: String,
    path: PathBuf,
    tera: Tera,
}

impl Template {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File the template was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(&self, context: &Context) -> Result<String, RenderError> {
        self.tera
            .render(&self.name, context)
            .map_err(|source| RenderError::Render {
                template: self.name.clone(),
                source,
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Two-step view renderer: action content first, then the layout around it.
//!
//! # Render sequence
//!
//! 1. Pre-render check (template set and resolvable, layout too when decorated).
//! 2. `module` role: the action template, read through the module loader, with
//!    the view attributes plus `sf_type = "action"`.
//! 3. `decorator` role, only for decorated views: the layout template, read
//!    through the decorator loader, with exactly `sf_content` (the step 2
//!    output, trusted) and `sf_type = "layout"`.
//!
//! Each role gets its own context built from scratch, so the view's attributes
//! are the same before and after [`ViewRenderer::render`].

use twostep_core::{AttributeHolder, SafeString, ViewConfig};

use crate::engine::TemplateEngine;
use crate::error::RenderError;
use crate::extensions::{load_extensions, ExtensionRegistry};
use crate::loader::{LoaderRole, TemplateLoader};
use crate::view::{View, CONTENT_VAR, TYPE_VAR};

pub struct ViewRenderer {
    view: View,
    engine: TemplateEngine,
    module_loader: TemplateLoader,
    decorator_loader: TemplateLoader,
    loaded_extensions: Vec<String>,
}

impl ViewRenderer {
    /// Initialize a renderer for `module`/`action`/`view` with the standard
    /// extension bundles.
    pub fn initialize(
        config: &ViewConfig,
        module: &str,
        action: &str,
        view: &str,
    ) -> Result<Self, RenderError> {
        Self::initialize_with_registry(config, &ExtensionRegistry::standard(), module, action, view)
    }

    /// Like [`ViewRenderer::initialize`], drawing extensions from `registry`.
    ///
    /// Fails when a loader search directory does not exist.
    pub fn initialize_with_registry(
        config: &ViewConfig,
        registry: &ExtensionRegistry,
        module: &str,
        action: &str,
        view: &str,
    ) -> Result<Self, RenderError> {
        let view = View::new(config, module, action, view);
        let cache_dir = config.template_cache_dir();

        let decorator_loader = TemplateLoader::new(config.decorator_dirs(), cache_dir.clone())?;
        let module_loader = TemplateLoader::new(config.template_dirs(module), cache_dir)?;

        let mut renderer = ViewRenderer {
            view,
            engine: TemplateEngine::new(),
            module_loader,
            decorator_loader,
            loaded_extensions: Vec::new(),
        };
        renderer.load_extensions(registry, &config.standard_helpers);
        Ok(renderer)
    }

    /// Add the bundle of each candidate helper found in `registry`.
    ///
    /// Returns the identifiers registered by this call.
    pub fn load_extensions(&mut self, registry: &ExtensionRegistry, configured: &[String]) -> Vec<String> {
        let loaded = load_extensions(&mut self.engine, registry, configured);
        for id in &loaded {
            if !self.loaded_extensions.contains(id) {
                self.loaded_extensions.push(id.clone());
            }
        }
        loaded
    }

    /// Identifiers registered through [`ViewRenderer::load_extensions`], in order.
    pub fn loaded_extensions(&self) -> &[String] {
        &self.loaded_extensions
    }

    /// Render the view: module template, then the layout when decorated.
    pub fn render(&self) -> Result<String, RenderError> {
        self.pre_render_check()?;

        let content = self.render_role(LoaderRole::Module, None)?;
        if self.view.is_decorator() {
            return self.render_role(LoaderRole::Decorator, Some(&content));
        }
        Ok(content)
    }

    /// Fail early when a template the render needs is unset or unresolvable.
    pub fn pre_render_check(&self) -> Result<(), RenderError> {
        let template = self.view.template().ok_or(RenderError::NoTemplate)?;
        self.module_loader.resolve(template)?;

        if self.view.is_decorator() {
            let layout = self
                .view
                .decorator_template()
                .ok_or(RenderError::NoDecoratorTemplate)?;
            self.decorator_loader.resolve(layout)?;
        }
        Ok(())
    }

    /// Render a single role. `content` is only read by the decorator role.
    pub fn render_role(&self, role: LoaderRole, content: Option<&str>) -> Result<String, RenderError> {
        let (name, holder) = match role {
            LoaderRole::Module => {
                let name = self.view.template().ok_or(RenderError::NoTemplate)?;
                let mut holder = self.view.attributes().clone();
                holder.set(TYPE_VAR, role.context_type());
                (name, holder)
            }
            LoaderRole::Decorator => {
                let name = self
                    .view
                    .decorator_template()
                    .ok_or(RenderError::NoDecoratorTemplate)?;
                let mut holder = AttributeHolder::new();
                holder.set(CONTENT_VAR, SafeString::new(content.unwrap_or_default()));
                holder.set(TYPE_VAR, role.context_type());
                (name, holder)
            }
        };

        tracing::debug!(
            module = %self.view.module_name(),
            action = %self.view.action_name(),
            role = %role,
            template = %name,
            "rendering template"
        );
        let context = self.view.context_for(&holder)?;
        self.engine.render(self.loader(role), name, &context)
    }

    /// The loader serving `role`.
    pub fn loader(&self, role: LoaderRole) -> &TemplateLoader {
        match role {
            LoaderRole::Module => &self.module_loader,
            LoaderRole::Decorator => &self.decorator_loader,
        }
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    /// Direct engine access, e.g. to add extensions after initialization.
    pub fn engine_mut(&mut self) -> &mut TemplateEngine {
        &mut self.engine
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }
}

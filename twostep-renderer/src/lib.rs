//! # twostep-renderer
//!
//! Two-step view rendering on top of Tera: an action template renders the
//! content, then an optional layout template wraps it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use twostep_core::ViewConfig;
//! use twostep_renderer::ViewRenderer;
//!
//! fn render_index(config: &ViewConfig) -> Result<String, twostep_renderer::RenderError> {
//!     let mut renderer = ViewRenderer::initialize(config, "blog", "index", "Success")?;
//!     renderer.view_mut().set_attribute("title", "Latest posts");
//!     renderer.render()
//! }
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod extensions;
pub mod loader;
pub mod renderer;
pub mod view;

pub use cache::{CacheEntry, ResolutionCache};
pub use engine::{Template, TemplateEngine};
pub use error::RenderError;
pub use extensions::{Extension, ExtensionRegistry};
pub use loader::{LoaderRole, TemplateLoader};
pub use renderer::ViewRenderer;
pub use view::{View, CONTENT_VAR, TYPE_VAR};

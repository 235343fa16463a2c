//! Base view state: names, templates, decorator settings and attributes.

use tera::Context;
use twostep_core::{AttributeHolder, AttributeValue, EscapingMethod, ViewConfig};

use crate::error::RenderError;

/// Context variable holding the decorated content in a layout.
pub const CONTENT_VAR: &str = "sf_content";

/// Context variable naming the role being rendered (`action` or `layout`).
pub const TYPE_VAR: &str = "sf_type";

/// The view an action renders: which templates to use and what data to feed them.
#[derive(Debug, Clone)]
pub struct View {
    module_name: String,
    action_name: String,
    view_name: String,
    extension: String,
    template: Option<String>,
    decorator: bool,
    decorator_template: Option<String>,
    attributes: AttributeHolder,
    escaping: Option<EscapingMethod>,
}

impl View {
    /// A view for `module`/`action` with result `view` (e.g. `Success`).
    ///
    /// The template defaults to `<action><view><extension>`; decoration and
    /// escaping follow `config`.
    pub fn new(config: &ViewConfig, module: &str, action: &str, view: &str) -> Self {
        let mut v = View {
            module_name: module.to_string(),
            action_name: action.to_string(),
            view_name: view.to_string(),
            extension: config.extension.clone(),
            template: Some(format!("{action}{view}{}", config.extension)),
            decorator: false,
            decorator_template: None,
            attributes: AttributeHolder::new(),
            escaping: config.escaping(),
        };
        if config.has_layout {
            v.set_decorator_template(Some(&config.decorator_template));
        }
        v
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = Some(template.into());
    }

    pub fn is_decorator(&self) -> bool {
        self.decorator
    }

    pub fn set_decorator(&mut self, decorator: bool) {
        self.decorator = decorator;
    }

    pub fn decorator_template(&self) -> Option<&str> {
        self.decorator_template.as_deref()
    }

    /// `Some(name)` enables decoration with `name` (the view extension is
    /// appended when `name` has none); `None` disables decoration.
    pub fn set_decorator_template(&mut self, template: Option<&str>) {
        match template {
            Some(name) => {
                let name = if name.contains('.') {
                    name.to_string()
                } else {
                    format!("{name}{}", self.extension)
                };
                self.decorator_template = Some(name);
                self.decorator = true;
            }
            None => {
                self.decorator_template = None;
                self.decorator = false;
            }
        }
    }

    pub fn attributes(&self) -> &AttributeHolder {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeHolder {
        &mut self.attributes
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.set(name, value);
    }

    pub fn get_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn escaping(&self) -> Option<EscapingMethod> {
        self.escaping
    }

    pub fn set_escaping(&mut self, escaping: Option<EscapingMethod>) {
        self.escaping = escaping;
    }

    /// Export `holder` into a render context using this view's escaping.
    pub fn context_for(&self, holder: &AttributeHolder) -> Result<Context, RenderError> {
        let map = holder.to_map(self.escaping);
        Ok(Context::from_value(serde_json::Value::Object(map))?)
    }
}

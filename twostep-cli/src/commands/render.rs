//! `twostep render`: render one module action view.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde_json::Value;

use twostep_renderer::ViewRenderer;

/// Arguments for `twostep render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Module whose templates directory holds the action template.
    pub module: String,

    /// Action name; the default template is `<action><view><extension>`.
    pub action: String,

    /// View result name.
    #[arg(long, default_value = "Success")]
    pub view: String,

    /// View configuration file (default: ./twostep.yaml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Set a template variable. VALUE is read as JSON when valid, else as a string.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, Value)>,

    /// Module template to render instead of the default one.
    #[arg(long)]
    pub template: Option<String>,

    /// Layout template to decorate with.
    #[arg(long, conflicts_with = "no_layout")]
    pub layout: Option<String>,

    /// Render the module template alone.
    #[arg(long)]
    pub no_layout: bool,

    /// Write the output to FILE instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let config = crate::load_config(self.config.as_deref())?;
        let mut renderer = ViewRenderer::initialize(&config, &self.module, &self.action, &self.view)
            .with_context(|| format!("failed to initialize view for {}/{}", self.module, self.action))?;

        let view = renderer.view_mut();
        if let Some(template) = &self.template {
            view.set_template(template.as_str());
        }
        if self.no_layout {
            view.set_decorator_template(None);
        } else if let Some(layout) = &self.layout {
            view.set_decorator_template(Some(layout));
        }
        for (name, value) in self.set {
            view.set_attribute(name, value);
        }

        let output = renderer
            .render()
            .with_context(|| format!("failed to render {}/{}", self.module, self.action))?;

        match &self.output {
            Some(path) => {
                fs::write(path, &output)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::debug!(path = %path.display(), bytes = output.len(), "output written");
            }
            None => print!("{output}"),
        }
        Ok(())
    }
}

/// `name=value` with `value` as JSON when it parses, else a plain string.
fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("variable name is empty in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

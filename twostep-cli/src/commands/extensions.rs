//! `twostep extensions`: which helper bundles a view would get.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use twostep_renderer::extensions::{candidate_helpers, extension_id};
use twostep_renderer::ExtensionRegistry;

/// Arguments for `twostep extensions`.
#[derive(Args, Debug)]
pub struct ExtensionsArgs {
    /// View configuration file (default: ./twostep.yaml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ExtensionsArgs {
    pub fn run(self) -> Result<()> {
        let config = crate::load_config(self.config.as_deref())?;
        let registry = ExtensionRegistry::standard();

        let mut registered = 0;
        for helper in candidate_helpers(&config.standard_helpers) {
            let id = extension_id(&helper);
            match registry.instantiate(&id) {
                Some(extension) => {
                    registered += 1;
                    let mut provides: Vec<&str> = extension.functions().to_vec();
                    provides.extend(extension.filters().iter().copied());
                    println!(
                        "{} {:<10} {} ({})",
                        "✓".green(),
                        helper,
                        id,
                        provides.join(", ").dimmed()
                    );
                }
                None => println!("{} {:<10} {}", "-".yellow(), helper, "no bundle, skipped".dimmed()),
            }
        }
        println!("{registered} extension(s) registered");
        Ok(())
    }
}

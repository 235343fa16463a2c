//! `twostep cache`: template resolution cache maintenance.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use twostep_renderer::ResolutionCache;

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Remove every cached template resolution.
    Clear {
        /// View configuration file (default: ./twostep.yaml when present).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub fn run(command: CacheCommand) -> Result<()> {
    match command {
        CacheCommand::Clear { config } => clear(config),
    }
}

fn clear(config: Option<PathBuf>) -> Result<()> {
    let config = crate::load_config(config.as_deref())?;
    let Some(dir) = config.template_cache_dir() else {
        println!("{}", "no template_cache_dir configured; nothing to clear".yellow());
        return Ok(());
    };

    let removed = ResolutionCache::new(dir.clone())
        .clear()
        .with_context(|| format!("failed to clear cache at {}", dir.display()))?;
    println!("removed {removed} cache entr{} from {}", if removed == 1 { "y" } else { "ies" }, dir.display());
    Ok(())
}

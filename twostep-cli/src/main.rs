//! twostep: render module views through their layouts from the shell.
//!
//! # Usage
//!
//! ```text
//! twostep render <module> <action> [--view Success] [--set name=value]... [--no-layout]
//! twostep extensions [--config twostep.yaml]
//! twostep cache clear [--config twostep.yaml]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `warn`); logs go to stderr.

mod commands;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{cache::CacheCommand, extensions::ExtensionsArgs, render::RenderArgs};
use twostep_core::ViewConfig;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "twostep",
    version,
    about = "Render module templates and decorate them with layouts",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a module action view, decorated by its layout.
    Render(RenderArgs),

    /// List candidate helpers and the extension bundles registered for them.
    Extensions(ExtensionsArgs),

    /// Manage the template resolution cache.
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// `--config FILE`, else `./twostep.yaml`, else defaults rooted at the
/// current directory.
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<ViewConfig> {
    let cwd: PathBuf = std::env::current_dir().context("could not determine current directory")?;
    ViewConfig::discover(explicit, &cwd).context("failed to load view configuration")
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => args.run(),
        Commands::Extensions(args) => args.run(),
        Commands::Cache { command } => commands::cache::run(command),
    }
}

/* src/cli/core/src/main.rs */

mod build;
mod clean;
mod config;
mod dev;
mod logging;
mod shell;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use config::{AxhubConfig, STATE_DIR, resolve_config};

#[derive(Parser)]
#[command(name = "axhub", about = "Axhub Make: multi-entry prototype builds and virtual HTML previews", version)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Walk the source tree and write the entry manifest
  Scan {
    /// Path to axhub.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Build every entry, or one entry, into the release output directory
  Build {
    /// Path to axhub.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Entry key to build, e.g. elements/button
    #[arg(short, long)]
    entry: Option<String>,
  },
  /// Print the resolved bundler configuration as JSON
  BundlerConfig {
    /// Path to axhub.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Entry key for single-entry mode (defaults to $AXHUB_ENTRY)
    #[arg(short, long)]
    entry: Option<String>,
    /// production or dev-preview (defaults to $AXHUB_BUILD_MODE, then production)
    #[arg(short, long)]
    mode: Option<String>,
  },
  /// Start the preview server in front of the Vite dev server
  Dev {
    /// Path to axhub.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Listen port (overrides dev.port)
    #[arg(short, long)]
    port: Option<u16>,
    /// Do not start Vite; unclaimed requests answer 404
    #[arg(long)]
    no_vite: bool,
  },
  /// Remove build output and the .axhub state directory
  Clean {
    /// Path to axhub.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
}

/// Warn if `.axhub/` is not covered by any gitignore rule
fn warn_state_dir_not_gitignored(base_dir: &Path) {
  use std::process::Command;
  let output = Command::new("git").args(["check-ignore", "-q", STATE_DIR]).current_dir(base_dir).output();
  // exit 1 = not ignored; 0 = ignored; anything else = not a git repo or git missing
  if let Ok(o) = output
    && o.status.code() == Some(1)
  {
    ui::warn(&format!("{STATE_DIR}/ is not in .gitignore -- consider adding it to avoid tracking build state"));
  }
}

fn load(explicit: Option<PathBuf>) -> Result<(PathBuf, AxhubConfig)> {
  let cwd = std::env::current_dir().context("failed to get cwd")?;
  resolve_config(explicit.as_deref(), &cwd)
}

#[tokio::main]
async fn main() -> Result<()> {
  logging::init();
  let cli = Cli::parse();

  match cli.command {
    Command::Scan { config } => {
      let (base_dir, config) = load(config)?;
      build::run::run_scan(&config, &base_dir)?;
    }
    Command::Build { config, entry } => {
      let (base_dir, config) = load(config)?;
      warn_state_dir_not_gitignored(&base_dir);
      build::run::run_build(&config, &base_dir, entry.as_deref()).await?;
    }
    Command::BundlerConfig { config, entry, mode } => {
      let (base_dir, config) = load(config)?;
      build::run::run_bundler_config(&config, &base_dir, entry, mode)?;
    }
    Command::Dev { config, port, no_vite } => {
      let (base_dir, config) = load(config)?;
      warn_state_dir_not_gitignored(&base_dir);
      dev::run_dev(&config, &base_dir, port, no_vite).await?;
    }
    Command::Clean { config } => {
      let (base_dir, config) = load(config)?;
      clean::run_clean(&config, &base_dir)?;
    }
  }

  Ok(())
}

/* src/cli/core/src/build/run.rs */

// `axhub scan`, `axhub build` and `axhub bundler-config`.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use axhub_engine::{BundlerConfig, ENTRY_ENV, EntryManifest};
use tokio_util::sync::CancellationToken;

use super::invoker::{BuildInvoker, InvokerSettings, MODE_ENV};
use super::{load_or_scan, scan_and_save};
use crate::config::{AxhubConfig, BuildMode};
use crate::shell::warn_if_vite_missing;
use crate::ui::{self, DIM, RESET};

pub fn run_scan(config: &AxhubConfig, base_dir: &Path) -> Result<()> {
  ui::banner("scan");
  let manifest = scan_and_save(config, base_dir)?;
  for key in manifest.keys() {
    ui::detail(&format!("{DIM}{key}{RESET}"));
  }
  ui::ok(&format!("{} -> {}", ui::entries(manifest.len()), config.build.manifest));
  Ok(())
}

/// Production build: one entry, or every entry in key order stopping at the first failure.
pub async fn run_build(config: &AxhubConfig, base_dir: &Path, entry: Option<&str>) -> Result<()> {
  let started = Instant::now();
  ui::banner("build");
  warn_if_vite_missing(base_dir, &config.build.bundler_command);

  ui::step(1, 2, "Scanning entries");
  let manifest = scan_and_save(config, base_dir)?;
  ui::detail(&format!("{} found", ui::entries(manifest.len())));
  ui::blank();

  let keys: Vec<String> = match entry {
    Some(key) => vec![key.to_string()],
    None => manifest.keys().map(str::to_string).collect(),
  };
  if keys.is_empty() {
    bail!("no entries found under {}", base_dir.join(&config.source.root).display());
  }

  ui::step(2, 2, &format!("Building {}", ui::entries(keys.len())));
  let invoker = BuildInvoker::new(base_dir, InvokerSettings::from_config(config), CancellationToken::new());
  build_keys(&invoker, &manifest, &keys).await?;
  ui::blank();

  ui::ok(&format!(
    "build complete -> {}/ ({:.1}s)",
    config.build.out_dir,
    started.elapsed().as_secs_f64()
  ));
  Ok(())
}

async fn build_keys(invoker: &BuildInvoker, manifest: &EntryManifest, keys: &[String]) -> Result<()> {
  for key in keys {
    match invoker.build(manifest, key, BuildMode::Production).await {
      Ok(out) => ui::entry_built(key, out.code.len(), out.elapsed),
      Err(e) => {
        ui::entry_failed(key);
        return Err(anyhow::Error::new(e)).with_context(|| format!("build failed for {key}"));
      }
    }
  }
  Ok(())
}

/// Resolve the bundler configuration the way the invoker would for the
/// same entry and mode.
pub fn resolve_bundler_config(
  config: &AxhubConfig,
  base_dir: &Path,
  entry: Option<&str>,
  mode: BuildMode,
) -> Result<BundlerConfig> {
  let manifest = load_or_scan(config, base_dir)?;
  Ok(BundlerConfig::resolve(&manifest, entry, &config.bundler_options(mode))?)
}

/// Print the bundler configuration. Entry and mode fall back to `AXHUB_ENTRY`
/// and `AXHUB_BUILD_MODE`, so a bundler config file spawned by the invoker can
/// shell out to this command unchanged.
pub fn run_bundler_config(
  config: &AxhubConfig,
  base_dir: &Path,
  entry: Option<String>,
  mode: Option<String>,
) -> Result<()> {
  let selector = entry.or_else(|| std::env::var(ENTRY_ENV).ok()).filter(|s| !s.is_empty());
  let mode = match mode.or_else(|| std::env::var(MODE_ENV).ok()).filter(|s| !s.is_empty()) {
    Some(value) => BuildMode::parse(&value)?,
    None => BuildMode::Production,
  };
  let resolved = resolve_bundler_config(config, base_dir, selector.as_deref(), mode)?;
  println!("{}", resolved.to_json()?);
  Ok(())
}

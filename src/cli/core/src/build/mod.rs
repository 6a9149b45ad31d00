/* src/cli/core/src/build/mod.rs */

pub mod invoker;
pub mod run;


use std::path::Path;

use anyhow::{Context, Result};
use axhub_engine::{EntryManifest, scan};

use crate::config::AxhubConfig;

pub use invoker::{BuildError, BuildInvoker, InvokerSettings};

/// Walk the source tree and replace the manifest file with the result.
pub fn scan_and_save(config: &AxhubConfig, base_dir: &Path) -> Result<EntryManifest> {
  let manifest = scan(base_dir, &config.scan_options())
    .with_context(|| format!("failed to scan {}", base_dir.join(&config.source.root).display()))?;
  let path = config.manifest_path(base_dir);
  manifest.save(&path).with_context(|| format!("failed to write {}", path.display()))?;
  Ok(manifest)
}

/// Read the persisted manifest, scanning first when none has been written yet.
pub fn load_or_scan(config: &AxhubConfig, base_dir: &Path) -> Result<EntryManifest> {
  let path = config.manifest_path(base_dir);
  if path.is_file() {
    return EntryManifest::load(&path).with_context(|| format!("failed to load {}", path.display()));
  }
  scan_and_save(config, base_dir)
}

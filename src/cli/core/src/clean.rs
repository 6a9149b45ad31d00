/* src/cli/core/src/clean.rs */

// `axhub clean`: removes release artifacts and the `.axhub/` state directory
// (manifest, bundler configs, preview artifacts).

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::{AxhubConfig, STATE_DIR};
use crate::ui;

pub fn run_clean(config: &AxhubConfig, base_dir: &Path) -> Result<()> {
  ui::arrow("cleaning project");

  delete_dir_if_exists(&base_dir.join(&config.build.out_dir))?;
  delete_dir_if_exists(&base_dir.join(STATE_DIR))?;

  ui::ok("clean complete");
  Ok(())
}

fn delete_dir_if_exists(path: &Path) -> Result<()> {
  if path.exists() {
    std::fs::remove_dir_all(path).with_context(|| format!("failed to remove {}", path.display()))?;
    ui::detail(&format!("deleted {}", path.display()));
  }
  Ok(())
}

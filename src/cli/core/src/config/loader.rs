/* src/cli/core/src/config/loader.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::AxhubConfig;

pub const CONFIG_FILE: &str = "axhub.toml";

/// Walk upward from `start` to find `axhub.toml`, like Cargo.toml discovery
pub fn find_axhub_config(start: &Path) -> Result<PathBuf> {
  let mut dir =
    start.canonicalize().with_context(|| format!("failed to canonicalize {}", start.display()))?;
  loop {
    let candidate = dir.join(CONFIG_FILE);
    if candidate.is_file() {
      return Ok(candidate);
    }
    if !dir.pop() {
      bail!("{CONFIG_FILE} not found (searched upward from {})", start.display());
    }
  }
}

pub fn load_axhub_config(path: &Path) -> Result<AxhubConfig> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let config: AxhubConfig =
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
  config.validate().with_context(|| format!("invalid {}", path.display()))?;
  Ok(config)
}

/// Resolve the project base directory and its configuration.
///
/// An explicit path must exist. Without one, `axhub.toml` is searched upward
/// from `cwd`; a project without any config file runs on defaults in `cwd`.
pub fn resolve_config(explicit: Option<&Path>, cwd: &Path) -> Result<(PathBuf, AxhubConfig)> {
  let path = match explicit {
    Some(p) => p.to_path_buf(),
    None => match find_axhub_config(cwd) {
      Ok(p) => p,
      Err(_) => return Ok((cwd.to_path_buf(), AxhubConfig::default())),
    },
  };
  let config = load_axhub_config(&path)?;
  let base_dir = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
    _ => cwd.to_path_buf(),
  };
  Ok((base_dir, config))
}

/* src/cli/core/src/shell.rs */

// Shell helpers shared by build and dev.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::ui;

/// Resolve a path inside node_modules by walking up parent directories,
/// the way Node resolves packages.
pub(crate) fn resolve_node_module(start: &Path, suffix: &str) -> Option<PathBuf> {
  let mut dir = start.to_path_buf();
  loop {
    let candidate = dir.join("node_modules").join(suffix);
    if candidate.exists() {
      return Some(candidate);
    }
    if !dir.pop() {
      return None;
    }
  }
}

/// Check if a command exists on PATH.
pub(crate) fn which_exists(cmd: &str) -> bool {
  Command::new("which")
    .arg(cmd)
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .status()
    .is_ok_and(|s| s.success())
}

/// Substitute `{port}` in a configured command line.
pub(crate) fn expand_port(command: &str, port: u16) -> String {
  command.replace("{port}", &port.to_string())
}

/// Commands routed through `npx vite` need either a local vite install or npx
/// itself; say so up front instead of failing inside the first build.
pub(crate) fn warn_if_vite_missing(base_dir: &Path, command: &str) {
  if !command.trim_start().starts_with("npx vite") {
    return;
  }
  if resolve_node_module(base_dir, ".bin/vite").is_some() {
    return;
  }
  if which_exists("npx") {
    ui::warn("vite is not installed locally; npx will download it on first use");
  } else {
    ui::warn("neither node_modules/.bin/vite nor npx was found; builds will fail");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn expands_port_placeholder() {
    assert_eq!(expand_port("npx vite --port {port} --strictPort", 5173), "npx vite --port 5173 --strictPort");
    assert_eq!(expand_port("vite", 1), "vite");
  }

  #[test]
  fn resolves_node_module_from_nested_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let bin = tmp.path().join("node_modules/.bin");
    std::fs::create_dir_all(&bin).unwrap();
    std::fs::write(bin.join("vite"), "").unwrap();
    let nested = tmp.path().join("src/elements");
    std::fs::create_dir_all(&nested).unwrap();

    let found = resolve_node_module(&nested, ".bin/vite").unwrap();
    assert_eq!(found, bin.join("vite"));
    assert!(resolve_node_module(&nested, ".bin/nope").is_none());
  }
}

/* src/server/engine/rust/src/manifest.rs */

//! Entry manifest: `entries.json`, the lookup table shared by the bundler
//! configuration and the dev router. Rebuilt from a full directory walk;
//! a rescan is always authoritative.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::entry::{EntryKey, Group};
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryManifest {
  /// `group/name` -> entry source path
  #[serde(default)]
  pub js: BTreeMap<String, String>,
  /// `group/name` -> virtual HTML path
  #[serde(default)]
  pub html: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
  /// Directory holding `elements/` and `pages/`, relative to the base dir or absolute.
  pub source_root: PathBuf,
  /// File whose presence makes a folder a buildable unit.
  pub entry_file: String,
}

impl Default for ScanOptions {
  fn default() -> Self {
    Self { source_root: PathBuf::from("src"), entry_file: "index.tsx".to_string() }
  }
}

impl EntryManifest {
  pub fn insert(&mut self, key: &EntryKey, source_path: impl Into<String>) {
    let k = key.to_string();
    self.html.insert(k.clone(), key.virtual_html_path());
    self.js.insert(k, source_path.into());
  }

  pub fn len(&self) -> usize {
    self.js.len()
  }

  pub fn is_empty(&self) -> bool {
    self.js.is_empty()
  }

  pub fn contains(&self, key: &str) -> bool {
    self.js.contains_key(key)
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.js.keys().map(String::as_str)
  }

  /// Source path for `key`, or an `UnknownEntry` error carrying the closest known key.
  pub fn source_path(&self, key: &str) -> Result<&str> {
    if let Some(path) = self.js.get(key) {
      return Ok(path);
    }
    let candidates: Vec<&str> = self.keys().collect();
    Err(EngineError::UnknownEntry {
      key: key.to_string(),
      suggestion: did_you_mean(key, &candidates).map(str::to_string),
    })
  }

  /// Subset of the manifest restricted to one group.
  pub fn filter_group(&self, group: Group) -> EntryManifest {
    let prefix = format!("{group}/");
    let keep = |m: &BTreeMap<String, String>| -> BTreeMap<String, String> {
      m.iter().filter(|(k, _)| k.starts_with(&prefix)).map(|(k, v)| (k.clone(), v.clone())).collect()
    };
    EntryManifest { js: keep(&self.js), html: keep(&self.html) }
  }

  /// Every js key must have an html twin and every key must parse.
  pub fn validate(&self) -> std::result::Result<(), String> {
    for key in self.js.keys() {
      EntryKey::parse(key).map_err(|e| e.to_string())?;
      if !self.html.contains_key(key) {
        return Err(format!("entry \"{key}\" has a source path but no html entry"));
      }
    }
    Ok(())
  }

  pub fn from_json(content: &str, origin: &Path) -> Result<Self> {
    let manifest: EntryManifest = serde_json::from_str(content).map_err(|e| {
      EngineError::MalformedManifest { path: origin.to_path_buf(), message: e.to_string() }
    })?;
    manifest
      .validate()
      .map_err(|message| EngineError::MalformedManifest { path: origin.to_path_buf(), message })?;
    Ok(manifest)
  }

  pub fn load(path: &Path) -> Result<Self> {
    let content = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
    Self::from_json(&content, path)
  }

  /// Write the manifest to a sibling temp file, then rename it over `path`.
  pub fn save(&self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
    }
    let mut json = serde_json::to_string_pretty(self)
      .map_err(|source| EngineError::Serialize { what: "entry manifest", source })?;
    json.push('\n');

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    std::fs::write(&tmp, json).map_err(|e| EngineError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| EngineError::io(path, e))
  }
}

/// Walk `<base_dir>/<source_root>/{elements,pages}` and register every folder
/// that directly contains the entry file.
pub fn scan(base_dir: &Path, options: &ScanOptions) -> Result<EntryManifest> {
  let root = base_dir.join(&options.source_root);
  if !root.is_dir() {
    return Err(EngineError::MissingSourceRoot(root));
  }

  let mut manifest = EntryManifest::default();
  for group in Group::BUILDABLE {
    let group_dir = root.join(group.as_str());
    if !group_dir.is_dir() {
      continue;
    }
    let entries = std::fs::read_dir(&group_dir).map_err(|e| EngineError::io(&group_dir, e))?;
    for entry in entries.flatten() {
      if !entry.file_type().is_ok_and(|ft| ft.is_dir()) {
        continue;
      }
      let Some(name) = entry.file_name().to_str().map(str::to_string) else { continue };
      let Ok(key) = EntryKey::new(group, name) else { continue };
      let entry_path = entry.path().join(&options.entry_file);
      if !entry_path.is_file() {
        continue;
      }
      manifest.insert(&key, display_path(base_dir, &entry_path));
    }
  }
  Ok(manifest)
}

/// Base-relative path with forward slashes, falling back to the full path
/// when the entry lives outside the base dir.
fn display_path(base_dir: &Path, path: &Path) -> String {
  let rel = path.strip_prefix(base_dir).unwrap_or(path);
  rel.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/")
}

pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
  let b: Vec<char> = b.chars().collect();
  let n = b.len();
  let mut prev: Vec<usize> = (0..=n).collect();
  let mut curr = vec![0; n + 1];
  for (i, ca) in a.chars().enumerate() {
    curr[0] = i + 1;
    for (j, cb) in b.iter().enumerate() {
      let cost = usize::from(ca != *cb);
      curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
    }
    std::mem::swap(&mut prev, &mut curr);
  }
  prev[n]
}

pub(crate) fn did_you_mean<'a>(name: &str, candidates: &[&'a str]) -> Option<&'a str> {
  candidates
    .iter()
    .map(|c| (*c, levenshtein(name, c)))
    .filter(|(_, d)| *d <= 3 && *d > 0)
    .min_by_key(|(_, d)| *d)
    .map(|(c, _)| c)
}

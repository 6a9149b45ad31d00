/* src/server/engine/rust/src/entry.rs */

//! Entry keys: `<group>/<name>` identifiers for buildable units.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Top-level folder a unit lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
  Elements,
  Pages,
  Themes,
}

impl Group {
  /// Groups walked by the scanner. Themes can be previewed but never become entries.
  pub const BUILDABLE: [Group; 2] = [Group::Elements, Group::Pages];

  pub const PREVIEWABLE: [Group; 3] = [Group::Elements, Group::Pages, Group::Themes];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Elements => "elements",
      Self::Pages => "pages",
      Self::Themes => "themes",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "elements" => Some(Self::Elements),
      "pages" => Some(Self::Pages),
      "themes" => Some(Self::Themes),
      _ => None,
    }
  }

  pub fn is_buildable(self) -> bool {
    Self::BUILDABLE.contains(&self)
  }
}

impl fmt::Display for Group {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A single path segment that is safe to join onto a directory:
/// non-empty, no separators, no NUL, not hidden, not `.`/`..`.
pub(crate) fn is_safe_segment(s: &str) -> bool {
  !s.is_empty()
    && !s.starts_with('.')
    && !s.contains(['/', '\\', '\0'])
    && s.chars().all(|c| !c.is_control())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
  group: Group,
  name: String,
}

impl EntryKey {
  pub fn new(group: Group, name: impl Into<String>) -> Result<Self> {
    let name = name.into();
    if !is_safe_segment(&name) {
      return Err(EngineError::InvalidEntryKey(format!("{group}/{name}")));
    }
    Ok(Self { group, name })
  }

  pub fn parse(key: &str) -> Result<Self> {
    let invalid = || EngineError::InvalidEntryKey(key.to_string());
    let (group, name) = key.split_once('/').ok_or_else(invalid)?;
    let group = Group::parse(group).ok_or_else(invalid)?;
    Self::new(group, name).map_err(|_| invalid())
  }

  pub fn group(&self) -> Group {
    self.group
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Logical HTML address recorded in the manifest; never exists on disk.
  pub fn virtual_html_path(&self) -> String {
    format!("{}/{}/index.html", self.group, self.name)
  }

  /// Artifact location relative to the bundler output directory.
  pub fn artifact_file_name(&self) -> String {
    format!("{}/{}.js", self.group, self.name)
  }
}

impl fmt::Display for EntryKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.group, self.name)
  }
}

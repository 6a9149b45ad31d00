/* src/server/engine/rust/src/error.rs */

use std::path::PathBuf;

use thiserror::Error;

use crate::contract::ContractViolation;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("source root not found: {}", .0.display())]
  MissingSourceRoot(PathBuf),

  #[error("I/O error on {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid entry key \"{0}\" (expected \"<group>/<name>\", group is elements, pages or themes)")]
  InvalidEntryKey(String),

  #[error("unknown entry \"{key}\"{hint}", hint = suggestion_hint(.suggestion.as_deref()))]
  UnknownEntry { key: String, suggestion: Option<String> },

  #[error("malformed manifest {}: {message}", path.display())]
  MalformedManifest { path: PathBuf, message: String },

  #[error("invalid bundler option: {0}")]
  InvalidOption(String),

  #[error("unresolved template placeholder {{{{{0}}}}}")]
  UnresolvedPlaceholder(String),

  #[error("failed to serialize {what}: {source}")]
  Serialize {
    what: &'static str,
    #[source]
    source: serde_json::Error,
  },

  #[error(transparent)]
  Contract(#[from] ContractViolation),
}

impl EngineError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io { path: path.into(), source }
  }
}

fn suggestion_hint(suggestion: Option<&str>) -> String {
  match suggestion {
    Some(s) => format!(" (did you mean \"{s}\"?)"),
    None => String::new(),
  }
}

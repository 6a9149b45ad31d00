/* src/server/engine/rust/src/route.rs */

//! URL shapes understood by the virtual HTML router, and their precedence.
//!
//! Parsing is pure: a shape only says "this URL looks like X". Whether the
//! backing file or entry exists is decided by the handler, which may decline
//! and let the next shape in `ROUTE_PRECEDENCE` try.

use std::path::PathBuf;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::entry::{EntryKey, Group, is_safe_segment};

/// URL prefix shared by project docs/libraries markdown and admin static files.
pub const ASSETS_PREFIX: &str = "assets";

/// URL prefix for on-demand compiled artifacts.
pub const BUILD_PREFIX: &str = "build";

/// Subtrees of the project assets directory that hold markdown documentation.
pub const DOC_SUBTREES: [&str; 2] = ["docs", "libraries"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
  Markdown,
  DocViewer,
  Preview,
  Artifact,
  Asset,
}

/// Handler order. Earlier shapes are more specific: every markdown and
/// doc-viewer URL under `/assets/` is also a valid asset URL.
pub const ROUTE_PRECEDENCE: [RouteKind; 5] = [
  RouteKind::Markdown,
  RouteKind::DocViewer,
  RouteKind::Preview,
  RouteKind::Artifact,
  RouteKind::Asset,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocKind {
  Spec,
  Prd,
}

impl DocKind {
  pub const ALL: [DocKind; 2] = [DocKind::Spec, DocKind::Prd];

  pub fn key(self) -> &'static str {
    match self {
      Self::Spec => "spec",
      Self::Prd => "prd",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Spec => "Spec",
      Self::Prd => "PRD",
    }
  }

  pub fn file_name(self) -> &'static str {
    match self {
      Self::Spec => "spec.md",
      Self::Prd => "prd.md",
    }
  }

  fn from_file_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|k| k.file_name() == name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownTarget {
  /// `assets/<docs|libraries>/...` relative to the project assets directory's parent.
  Assets { rel: PathBuf },
  /// A component's own `spec.md` / `prd.md`.
  Component { group: Group, name: String, doc: DocKind },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocUnit {
  Component { group: Group, name: String },
  /// Directory under the project assets directory, e.g. `docs/guide`.
  Assets { rel_dir: PathBuf, url_dir: String },
}

impl DocUnit {
  /// Display name of the documentation set (last path component).
  pub fn set_name(&self) -> &str {
    match self {
      Self::Component { name, .. } => name,
      Self::Assets { url_dir, .. } => url_dir.rsplit('/').next().unwrap_or(url_dir.as_str()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
  Markdown(MarkdownTarget),
  DocViewer(DocUnit),
  Preview { group: Group, name: String },
  Artifact(EntryKey),
  /// Path relative to the admin assets directory.
  Asset { rel: PathBuf },
}

impl RouteKind {
  pub fn name(self) -> &'static str {
    match self {
      Self::Markdown => "markdown",
      Self::DocViewer => "doc-viewer",
      Self::Preview => "preview",
      Self::Artifact => "artifact",
      Self::Asset => "asset",
    }
  }

  /// Shapes that own their URL space: a miss is a 404, never a proxy fallthrough.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Artifact | Self::Asset)
  }

  pub fn parse(self, path: &str) -> Option<RouteMatch> {
    let segs = decode_segments(path)?;
    let segs: Vec<&str> = segs.iter().map(String::as_str).collect();
    match self {
      Self::Markdown => parse_markdown(&segs),
      Self::DocViewer => parse_doc_viewer(&segs),
      Self::Preview => parse_preview(&segs),
      Self::Artifact => parse_artifact(&segs),
      Self::Asset => parse_asset(&segs),
    }
  }
}

/// Every shape `path` matches, in precedence order.
pub fn candidates(path: &str) -> Vec<(RouteKind, RouteMatch)> {
  ROUTE_PRECEDENCE.iter().filter_map(|kind| kind.parse(path).map(|m| (*kind, m))).collect()
}

/// Split a URL path into percent-decoded segments. Returns None when any
/// segment is empty, hidden, a traversal, or decodes to a separator.
pub fn decode_segments(path: &str) -> Option<Vec<String>> {
  let trimmed = path.strip_prefix('/').unwrap_or(path);
  if trimmed.is_empty() {
    return None;
  }
  trimmed
    .split('/')
    .map(|raw| {
      let decoded = percent_decode_str(raw).decode_utf8().ok()?;
      is_safe_segment(&decoded).then(|| decoded.into_owned())
    })
    .collect()
}

/// Prefixes whose URL space the router owns outright: a request under them
/// that no handler claims is a 404, never forwarded to the dev server.
pub fn is_reserved(path: &str) -> bool {
  let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
  first == BUILD_PREFIX || first == ASSETS_PREFIX
}

/// Characters escaped when a path segment is put back into a URL.
const SEGMENT: &AsciiSet = &CONTROLS
  .add(b' ')
  .add(b'"')
  .add(b'#')
  .add(b'%')
  .add(b'/')
  .add(b'<')
  .add(b'>')
  .add(b'?')
  .add(b'\\')
  .add(b'`')
  .add(b'{')
  .add(b'}');

/// Absolute URL path from raw segments, each percent-encoded.
pub fn url_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
  let mut out = String::new();
  for seg in segments {
    out.push('/');
    out.extend(utf8_percent_encode(seg, SEGMENT));
  }
  if out.is_empty() {
    out.push('/');
  }
  out
}

fn is_doc_subtree(seg: &str) -> bool {
  DOC_SUBTREES.contains(&seg)
}

fn preview_group(seg: &str) -> Option<Group> {
  Group::parse(seg).filter(|g| Group::PREVIEWABLE.contains(g))
}

fn join(segs: &[&str]) -> PathBuf {
  segs.iter().collect()
}

fn parse_markdown(segs: &[&str]) -> Option<RouteMatch> {
  match segs {
    [ASSETS_PREFIX, subtree, .., last] if is_doc_subtree(subtree) && last.ends_with(".md") => {
      Some(RouteMatch::Markdown(MarkdownTarget::Assets { rel: join(&segs[1..]) }))
    }
    [group, name, file] => {
      let group = preview_group(group)?;
      let doc = DocKind::from_file_name(file)?;
      Some(RouteMatch::Markdown(MarkdownTarget::Component { group, name: name.to_string(), doc }))
    }
    _ => None,
  }
}

fn parse_doc_viewer(segs: &[&str]) -> Option<RouteMatch> {
  match segs {
    [ASSETS_PREFIX, subtree, dir @ .., "spec.html"] if is_doc_subtree(subtree) && !dir.is_empty() => {
      let dirs = &segs[1..segs.len() - 1];
      Some(RouteMatch::DocViewer(DocUnit::Assets { rel_dir: join(dirs), url_dir: dirs.join("/") }))
    }
    [group, name, "spec.html"] => {
      let group = preview_group(group)?;
      Some(RouteMatch::DocViewer(DocUnit::Component { group, name: name.to_string() }))
    }
    _ => None,
  }
}

fn parse_preview(segs: &[&str]) -> Option<RouteMatch> {
  match segs {
    [group, name, "index.html"] => {
      let group = preview_group(group)?;
      Some(RouteMatch::Preview { group, name: name.to_string() })
    }
    _ => None,
  }
}

fn parse_artifact(segs: &[&str]) -> Option<RouteMatch> {
  match segs {
    [BUILD_PREFIX, group, file] => {
      let stem = file.strip_suffix(".js")?;
      let group = Group::parse(group)?;
      EntryKey::new(group, stem).ok().map(RouteMatch::Artifact)
    }
    _ => None,
  }
}

fn parse_asset(segs: &[&str]) -> Option<RouteMatch> {
  match segs {
    [ASSETS_PREFIX, rest @ ..] if !rest.is_empty() => Some(RouteMatch::Asset { rel: join(rest) }),
    _ => None,
  }
}

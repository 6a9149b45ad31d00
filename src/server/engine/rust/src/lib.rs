/* src/server/engine/rust/src/lib.rs */

//! Pure-logic core of Axhub Make: entry discovery, the entry manifest,
//! virtual HTML route parsing and synthesis, the dual-mode bundler
//! configuration, and the component contract applied to IIFE builds.
//! Nothing in this crate spawns processes or opens sockets.

pub mod bundler;
pub mod contract;
pub mod entry;
pub mod error;
pub mod escape;
pub mod manifest;
pub mod page;
pub mod route;
pub mod template;

// Public API re-exports
pub use bundler::{BundlerConfig, BundlerOptions, CONFIG_ENV, ENTRY_ENV, JsxRuntime, OutputFormat};
pub use contract::{ComponentContract, ContractViolation, REQUIRED_EXPORT, is_js_identifier, marker_banner};
pub use entry::{EntryKey, Group};
pub use error::{EngineError, Result};
pub use escape::{escape_html, json_for_html_attr, script_string_literal};
pub use manifest::{EntryManifest, ScanOptions, scan};
pub use page::{DocLink, DocViewerDocument, PreviewDocument, ScriptRef, preview_title};
pub use route::{
  ASSETS_PREFIX, BUILD_PREFIX, DocKind, DocUnit, MarkdownTarget, ROUTE_PRECEDENCE, RouteKind, RouteMatch,
  candidates, is_reserved, url_path,
};

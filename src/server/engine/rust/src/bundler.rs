/* src/server/engine/rust/src/bundler.rs */

//! Dual-mode bundler configuration.
//!
//! The JS bundler runs as an external process and reads this configuration
//! as JSON. Without an entry selector it serves every component as an ES
//! module page; with one it produces a single IIFE bundle for embedding.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::contract::{is_js_identifier, marker_banner};
use crate::entry::EntryKey;
use crate::error::{EngineError, Result};
use crate::manifest::{EntryManifest, did_you_mean};

/// Names the single entry a bundler child process builds.
pub const ENTRY_ENV: &str = "AXHUB_ENTRY";

/// Path of the JSON configuration handed to the bundler child process.
pub const CONFIG_ENV: &str = "AXHUB_BUNDLER_CONFIG";

const REACT_GLOBALS: [(&str, &str); 2] = [("react", "React"), ("react-dom", "ReactDOM")];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
  Es,
  Iife,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsxRuntime {
  Automatic,
  Classic,
}

#[derive(Debug, Clone)]
pub struct BundlerOptions {
  pub out_dir: String,
  pub global_name: String,
  pub modern_target: String,
  pub legacy_target: String,
  /// Module that replaces `react` in multi-page mode, if any.
  pub react_shim: Option<String>,
}

impl Default for BundlerOptions {
  fn default() -> Self {
    Self {
      out_dir: "dist".into(),
      global_name: "UserComponent".into(),
      modern_target: "esnext".into(),
      legacy_target: "es2015".into(),
      react_shim: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlerConfig {
  pub single_entry: bool,
  pub entry_key: Option<String>,
  pub input: BTreeMap<String, String>,
  pub format: OutputFormat,
  pub global_name: Option<String>,
  pub external: Vec<String>,
  pub globals: BTreeMap<String, String>,
  pub jsx_runtime: JsxRuntime,
  pub target: String,
  pub minify: bool,
  pub enforce_contract: bool,
  pub banner: Option<String>,
  pub out_dir: String,
  pub entry_file_name: Option<String>,
  pub empty_out_dir: bool,
  pub dedupe: Vec<String>,
  pub alias: BTreeMap<String, String>,
}

impl BundlerConfig {
  /// Build the configuration for `selector`, or the multi-page configuration
  /// when there is none. An unknown selector is a configuration error.
  pub fn resolve(manifest: &EntryManifest, selector: Option<&str>, options: &BundlerOptions) -> Result<Self> {
    match selector {
      None => Ok(Self::multi_page(manifest, options)),
      Some(key) => Self::single_entry(manifest, key, options),
    }
  }

  fn multi_page(manifest: &EntryManifest, options: &BundlerOptions) -> Self {
    let alias = options
      .react_shim
      .iter()
      .filter(|shim| !shim.is_empty())
      .map(|shim| ("react".to_string(), shim.clone()))
      .collect();

    Self {
      single_entry: false,
      entry_key: None,
      input: manifest.html.clone(),
      format: OutputFormat::Es,
      global_name: None,
      external: Vec::new(),
      globals: BTreeMap::new(),
      jsx_runtime: JsxRuntime::Automatic,
      target: options.modern_target.clone(),
      minify: false,
      enforce_contract: false,
      banner: None,
      out_dir: options.out_dir.clone(),
      entry_file_name: None,
      empty_out_dir: false,
      dedupe: REACT_GLOBALS.iter().map(|(m, _)| m.to_string()).collect(),
      alias,
    }
  }

  fn single_entry(manifest: &EntryManifest, key: &str, options: &BundlerOptions) -> Result<Self> {
    let source = manifest.js.get(key).ok_or_else(|| {
      let known: Vec<&str> = manifest.keys().collect();
      EngineError::UnknownEntry {
        key: key.to_string(),
        suggestion: did_you_mean(key, &known).map(str::to_string),
      }
    })?;
    let entry = EntryKey::parse(key)?;
    if !is_js_identifier(&options.global_name) {
      return Err(EngineError::InvalidOption(format!(
        "global name \"{}\" is not a valid JavaScript identifier",
        options.global_name
      )));
    }

    Ok(Self {
      single_entry: true,
      entry_key: Some(key.to_string()),
      input: BTreeMap::from([(key.to_string(), source.clone())]),
      format: OutputFormat::Iife,
      global_name: Some(options.global_name.clone()),
      external: REACT_GLOBALS.iter().map(|(m, _)| m.to_string()).collect(),
      globals: REACT_GLOBALS.iter().map(|(m, g)| (m.to_string(), g.to_string())).collect(),
      jsx_runtime: JsxRuntime::Classic,
      target: options.legacy_target.clone(),
      minify: true,
      enforce_contract: true,
      banner: Some(marker_banner(&entry)),
      out_dir: options.out_dir.clone(),
      entry_file_name: Some(entry.artifact_file_name()),
      empty_out_dir: false,
      dedupe: Vec::new(),
      alias: BTreeMap::new(),
    })
  }

  /// `single_entry` holds exactly when the output is IIFE with one input.
  pub fn holds_mode_invariant(&self) -> bool {
    self.single_entry == (self.format == OutputFormat::Iife && self.input.len() == 1)
      && self.single_entry == !self.external.is_empty()
  }

  pub fn to_json(&self) -> Result<String> {
    serde_json::to_string_pretty(self).map_err(|source| EngineError::Serialize { what: "bundler config", source })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn manifest() -> EntryManifest {
    let mut m = EntryManifest::default();
    m.insert(&EntryKey::parse("elements/button").unwrap(), "src/elements/button/index.tsx");
    m.insert(&EntryKey::parse("pages/home").unwrap(), "src/pages/home/index.tsx");
    m
  }

  #[test]
  fn multi_page_uses_every_html_entry() {
    let cfg = BundlerConfig::resolve(&manifest(), None, &BundlerOptions::default()).unwrap();
    assert!(!cfg.single_entry);
    assert_eq!(cfg.format, OutputFormat::Es);
    assert_eq!(cfg.input.len(), 2);
    assert_eq!(cfg.input["pages/home"], "pages/home/index.html");
    assert!(cfg.external.is_empty());
    assert_eq!(cfg.dedupe, vec!["react", "react-dom"]);
    assert_eq!(cfg.jsx_runtime, JsxRuntime::Automatic);
    assert!(!cfg.enforce_contract);
    assert!(cfg.holds_mode_invariant());
  }

  #[test]
  fn single_entry_is_one_iife_input() {
    let cfg = BundlerConfig::resolve(&manifest(), Some("elements/button"), &BundlerOptions::default()).unwrap();
    assert!(cfg.single_entry);
    assert_eq!(cfg.format, OutputFormat::Iife);
    let expected = BTreeMap::from([("elements/button".to_string(), "src/elements/button/index.tsx".to_string())]);
    assert_eq!(cfg.input, expected);
    assert_eq!(cfg.external, vec!["react", "react-dom"]);
    assert_eq!(cfg.globals["react-dom"], "ReactDOM");
    assert_eq!(cfg.global_name.as_deref(), Some("UserComponent"));
    assert_eq!(cfg.target, "es2015");
    assert_eq!(cfg.entry_file_name.as_deref(), Some("elements/button.js"));
    assert_eq!(cfg.banner.as_deref(), Some("/* @axhub-component elements/button */"));
    assert!(cfg.minify && cfg.enforce_contract && !cfg.empty_out_dir);
    assert!(cfg.holds_mode_invariant());
  }

  #[test]
  fn mode_invariant_holds_for_every_selector() {
    let m = manifest();
    let opts = BundlerOptions::default();
    let selectors = [None, Some("elements/button"), Some("pages/home")];
    for sel in selectors {
      assert!(BundlerConfig::resolve(&m, sel, &opts).unwrap().holds_mode_invariant());
    }
  }

  #[test]
  fn single_entry_project_in_multi_page_mode_is_still_es() {
    let mut m = EntryManifest::default();
    m.insert(&EntryKey::parse("pages/only").unwrap(), "src/pages/only/index.tsx");
    let cfg = BundlerConfig::resolve(&m, None, &BundlerOptions::default()).unwrap();
    assert_eq!(cfg.input.len(), 1);
    assert!(!cfg.single_entry);
    assert!(cfg.holds_mode_invariant());
  }

  #[test]
  fn unknown_selector_names_key_and_suggests() {
    let err = BundlerConfig::resolve(&manifest(), Some("elements/buton"), &BundlerOptions::default()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("elements/buton"));
    assert!(msg.contains("elements/button"));
  }

  #[test]
  fn invalid_global_name_is_rejected() {
    let opts = BundlerOptions { global_name: "my-comp".into(), ..BundlerOptions::default() };
    assert!(matches!(
      BundlerConfig::resolve(&manifest(), Some("pages/home"), &opts),
      Err(EngineError::InvalidOption(_))
    ));
  }

  #[test]
  fn react_shim_becomes_alias_in_dev_only() {
    let opts = BundlerOptions { react_shim: Some("./shims/react.ts".into()), ..BundlerOptions::default() };
    let dev = BundlerConfig::resolve(&manifest(), None, &opts).unwrap();
    assert_eq!(dev.alias["react"], "./shims/react.ts");
    let iife = BundlerConfig::resolve(&manifest(), Some("pages/home"), &opts).unwrap();
    assert!(iife.alias.is_empty());
  }

  #[test]
  fn json_is_camel_case() {
    let cfg = BundlerConfig::resolve(&manifest(), Some("pages/home"), &BundlerOptions::default()).unwrap();
    let v: serde_json::Value = serde_json::from_str(&cfg.to_json().unwrap()).unwrap();
    assert_eq!(v["singleEntry"], true);
    assert_eq!(v["format"], "iife");
    assert_eq!(v["entryFileName"], "pages/home.js");
    assert_eq!(v["emptyOutDir"], false);
    assert_eq!(v["jsxRuntime"], "classic");
  }
}

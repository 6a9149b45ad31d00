/* src/cli/core/src/config/types.rs */

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use axhub_engine::{BundlerOptions, ComponentContract, ScanOptions, is_js_identifier};
use serde::Deserialize;

/// Where a build writes its artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildMode {
  /// Release artifacts under `build.out_dir`.
  Production,
  /// On-demand builds for the dev router, kept apart from release output.
  DevPreview,
}

impl BuildMode {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Production => "production",
      Self::DevPreview => "dev-preview",
    }
  }

  pub fn parse(value: &str) -> Result<Self> {
    match value {
      "production" => Ok(Self::Production),
      "dev-preview" => Ok(Self::DevPreview),
      other => bail!("unknown build mode {other:?} (expected production or dev-preview)"),
    }
  }
}

pub const STATE_DIR: &str = ".axhub";
pub const PREVIEW_OUT_DIR: &str = ".axhub/preview";
pub const DEV_BUNDLER_CONFIG: &str = ".axhub/bundler/dev.json";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AxhubConfig {
  #[serde(default)]
  pub project: ProjectSection,
  #[serde(default)]
  pub source: SourceSection,
  #[serde(default)]
  pub build: BuildSection,
  #[serde(default)]
  pub dev: DevSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
  #[serde(default = "default_project_name")]
  pub name: String,
}

impl Default for ProjectSection {
  fn default() -> Self {
    Self { name: default_project_name() }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSection {
  #[serde(default = "default_source_root")]
  pub root: String,
  #[serde(default = "default_entry_file")]
  pub entry_file: String,
  #[serde(default = "default_style_file")]
  pub style_file: String,
}

impl Default for SourceSection {
  fn default() -> Self {
    Self { root: default_source_root(), entry_file: default_entry_file(), style_file: default_style_file() }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
  #[serde(default = "default_out_dir")]
  pub out_dir: String,
  #[serde(default = "default_manifest")]
  pub manifest: String,
  #[serde(default = "default_bundler_command")]
  pub bundler_command: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent: usize,
  #[serde(default = "default_global_name")]
  pub global_name: String,
  #[serde(default = "default_registration_hook")]
  pub registration_hook: String,
  #[serde(default = "default_target")]
  pub target: String,
}

impl Default for BuildSection {
  fn default() -> Self {
    Self {
      out_dir: default_out_dir(),
      manifest: default_manifest(),
      bundler_command: default_bundler_command(),
      timeout_secs: default_timeout_secs(),
      max_concurrent: default_max_concurrent(),
      global_name: default_global_name(),
      registration_hook: default_registration_hook(),
      target: default_target(),
    }
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
  /// ES module through the Vite dev server, with fast refresh.
  #[default]
  Source,
  /// The IIFE artifact from `/build/`, as the host page would load it.
  Compiled,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DevSection {
  #[serde(default = "default_dev_port")]
  pub port: u16,
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_vite_port")]
  pub vite_port: u16,
  #[serde(default = "default_vite_command")]
  pub vite_command: String,
  #[serde(default = "default_assets_dir")]
  pub assets_dir: String,
  #[serde(default = "default_admin_dir")]
  pub admin_dir: String,
  #[serde(default)]
  pub preview: PreviewMode,
  #[serde(default)]
  pub react_shim: String,
  #[serde(default = "default_react_umd")]
  pub react_umd: String,
  #[serde(default = "default_react_dom_umd")]
  pub react_dom_umd: String,
}

impl Default for DevSection {
  fn default() -> Self {
    Self {
      port: default_dev_port(),
      host: default_host(),
      vite_port: default_vite_port(),
      vite_command: default_vite_command(),
      assets_dir: default_assets_dir(),
      admin_dir: default_admin_dir(),
      preview: PreviewMode::default(),
      react_shim: String::new(),
      react_umd: default_react_umd(),
      react_dom_umd: default_react_dom_umd(),
    }
  }
}

fn default_project_name() -> String {
  "axhub-project".to_string()
}

fn default_source_root() -> String {
  "src".to_string()
}

fn default_entry_file() -> String {
  "index.tsx".to_string()
}

fn default_style_file() -> String {
  "style.css".to_string()
}

fn default_out_dir() -> String {
  "dist".to_string()
}

fn default_manifest() -> String {
  ".axhub/entries.json".to_string()
}

fn default_bundler_command() -> String {
  "npx vite build".to_string()
}

fn default_timeout_secs() -> u64 {
  60
}

fn default_max_concurrent() -> usize {
  4
}

fn default_global_name() -> String {
  "UserComponent".to_string()
}

fn default_registration_hook() -> String {
  "__AXHUB_DEFINE_COMPONENT__".to_string()
}

fn default_target() -> String {
  "es2015".to_string()
}

fn default_dev_port() -> u16 {
  51720
}

fn default_host() -> String {
  "127.0.0.1".to_string()
}

fn default_vite_port() -> u16 {
  51721
}

fn default_vite_command() -> String {
  "npx vite --port {port} --strictPort".to_string()
}

fn default_assets_dir() -> String {
  "assets".to_string()
}

fn default_admin_dir() -> String {
  "admin/assets".to_string()
}

fn default_react_umd() -> String {
  "https://unpkg.com/react@18/umd/react.development.js".to_string()
}

fn default_react_dom_umd() -> String {
  "https://unpkg.com/react-dom@18/umd/react-dom.development.js".to_string()
}

impl AxhubConfig {
  pub fn validate(&self) -> Result<()> {
    if self.build.timeout_secs == 0 {
      bail!("build.timeout_secs must be greater than 0");
    }
    if self.build.max_concurrent == 0 {
      bail!("build.max_concurrent must be greater than 0");
    }
    if !is_js_identifier(&self.build.global_name) {
      bail!("build.global_name \"{}\" is not a valid JavaScript identifier", self.build.global_name);
    }
    if self.build.registration_hook.is_empty() {
      bail!("build.registration_hook must not be empty");
    }
    if self.source.entry_file.is_empty() || self.source.entry_file.contains('/') {
      bail!("source.entry_file must be a bare file name, got \"{}\"", self.source.entry_file);
    }
    if self.dev.port == self.dev.vite_port {
      bail!("dev.port and dev.vite_port must differ (both are {})", self.dev.port);
    }
    Ok(())
  }

  pub fn scan_options(&self) -> ScanOptions {
    ScanOptions { source_root: PathBuf::from(&self.source.root), entry_file: self.source.entry_file.clone() }
  }

  pub fn manifest_path(&self, base_dir: &Path) -> PathBuf {
    base_dir.join(&self.build.manifest)
  }

  pub fn out_dir(&self, mode: BuildMode) -> &str {
    match mode {
      BuildMode::Production => &self.build.out_dir,
      BuildMode::DevPreview => PREVIEW_OUT_DIR,
    }
  }

  pub fn bundler_options(&self, mode: BuildMode) -> BundlerOptions {
    let shim = self.dev.react_shim.trim();
    BundlerOptions {
      out_dir: self.out_dir(mode).to_string(),
      global_name: self.build.global_name.clone(),
      legacy_target: self.build.target.clone(),
      react_shim: (!shim.is_empty()).then(|| shim.to_string()),
      ..BundlerOptions::default()
    }
  }

  pub fn contract(&self) -> ComponentContract {
    ComponentContract::new(&self.build.global_name, &self.build.registration_hook)
  }
}

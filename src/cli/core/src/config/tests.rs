/* src/cli/core/src/config/tests.rs */

use std::path::Path;

use super::loader::{CONFIG_FILE, find_axhub_config, load_axhub_config};
use super::types::PREVIEW_OUT_DIR;
use super::*;

#[test]
fn empty_file_is_all_defaults() {
  let config: AxhubConfig = toml::from_str("").unwrap();
  assert_eq!(config.source.root, "src");
  assert_eq!(config.source.entry_file, "index.tsx");
  assert_eq!(config.source.style_file, "style.css");
  assert_eq!(config.build.out_dir, "dist");
  assert_eq!(config.build.manifest, ".axhub/entries.json");
  assert_eq!(config.build.bundler_command, "npx vite build");
  assert_eq!(config.build.timeout_secs, 60);
  assert_eq!(config.build.max_concurrent, 4);
  assert_eq!(config.build.global_name, "UserComponent");
  assert_eq!(config.build.registration_hook, "__AXHUB_DEFINE_COMPONENT__");
  assert_eq!(config.dev.port, 51720);
  assert_eq!(config.dev.vite_port, 51721);
  assert_eq!(config.dev.preview, PreviewMode::Source);
  assert_eq!(config.dev.admin_dir, "admin/assets");
  assert!(config.validate().is_ok());
}

#[test]
fn partial_sections_keep_other_defaults() {
  let toml_str = r#"
[project]
name = "prototypes"

[build]
out_dir = "out"
timeout_secs = 5

[dev]
preview = "compiled"
"#;
  let config: AxhubConfig = toml::from_str(toml_str).unwrap();
  assert_eq!(config.project.name, "prototypes");
  assert_eq!(config.build.out_dir, "out");
  assert_eq!(config.build.timeout_secs, 5);
  assert_eq!(config.build.max_concurrent, 4);
  assert_eq!(config.dev.preview, PreviewMode::Compiled);
  assert_eq!(config.dev.host, "127.0.0.1");
}

#[test]
fn unknown_preview_mode_is_a_parse_error() {
  let result: Result<AxhubConfig, _> = toml::from_str("[dev]\npreview = \"ssr\"\n");
  assert!(result.is_err());
}

#[test]
fn validation_rejects_bad_values() {
  let cases = [
    "[build]\ntimeout_secs = 0\n",
    "[build]\nmax_concurrent = 0\n",
    "[build]\nglobal_name = \"user-component\"\n",
    "[source]\nentry_file = \"a/index.tsx\"\n",
    "[dev]\nport = 4000\nvite_port = 4000\n",
  ];
  for case in cases {
    let config: AxhubConfig = toml::from_str(case).unwrap();
    assert!(config.validate().is_err(), "expected validation failure for {case:?}");
  }
}

#[test]
fn out_dir_depends_on_mode() {
  let config = AxhubConfig::default();
  assert_eq!(config.out_dir(BuildMode::Production), "dist");
  assert_eq!(config.out_dir(BuildMode::DevPreview), PREVIEW_OUT_DIR);
  assert_eq!(config.bundler_options(BuildMode::DevPreview).out_dir, ".axhub/preview");
}

#[test]
fn react_shim_is_optional() {
  let config = AxhubConfig::default();
  assert!(config.bundler_options(BuildMode::Production).react_shim.is_none());

  let config: AxhubConfig = toml::from_str("[dev]\nreact_shim = \"./shim/react.ts\"\n").unwrap();
  assert_eq!(config.bundler_options(BuildMode::Production).react_shim.as_deref(), Some("./shim/react.ts"));
}

#[test]
fn find_config_walks_upward() {
  let tmp = tempfile::tempdir().unwrap();
  std::fs::write(tmp.path().join(CONFIG_FILE), "[project]\nname = \"x\"\n").unwrap();
  let nested = tmp.path().join("src/elements/button");
  std::fs::create_dir_all(&nested).unwrap();

  let found = find_axhub_config(&nested).unwrap();
  assert_eq!(found, tmp.path().canonicalize().unwrap().join(CONFIG_FILE));
}

#[test]
fn resolve_without_config_uses_defaults_in_cwd() {
  let tmp = tempfile::tempdir().unwrap();
  let (base, config) = resolve_config(None, tmp.path()).unwrap();
  assert_eq!(base, tmp.path());
  assert_eq!(config.project.name, "axhub-project");
}

#[test]
fn resolve_explicit_config_uses_its_directory() {
  let tmp = tempfile::tempdir().unwrap();
  let path = tmp.path().join("custom.toml");
  std::fs::write(&path, "[source]\nroot = \"app\"\n").unwrap();

  let (base, config) = resolve_config(Some(&path), Path::new("/")).unwrap();
  assert_eq!(base, tmp.path());
  assert_eq!(config.source.root, "app");
}

#[test]
fn invalid_config_file_names_the_path() {
  let tmp = tempfile::tempdir().unwrap();
  let path = tmp.path().join(CONFIG_FILE);
  std::fs::write(&path, "[build]\nmax_concurrent = 0\n").unwrap();
  let err = load_axhub_config(&path).unwrap_err();
  assert!(format!("{err:#}").contains("max_concurrent"));
  assert!(err.to_string().contains(CONFIG_FILE));
}

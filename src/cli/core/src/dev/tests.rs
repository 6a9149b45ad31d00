/* src/cli/core/src/dev/tests.rs */

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use super::server::{DevContext, build_router};
use crate::build::scan_and_save;
use crate::config::{AxhubConfig, PreviewMode};

const FAKE_BUNDLER: &str = r#"out=$(sed -n 's/.*"outDir": "\(.*\)".*/\1/p' "$AXHUB_BUNDLER_CONFIG"); mkdir -p "$out/$(dirname "$AXHUB_ENTRY")"; printf 'var UserComponent=(function(){return 1})();' > "$out/$AXHUB_ENTRY.js""#;

const COMPONENT: &str = "const Component = () => null;\nexport default Component;\n";

fn write(root: &Path, rel: &str, content: &str) {
  let path = root.join(rel);
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, content).unwrap();
}

fn project() -> TempDir {
  let tmp = tempfile::tempdir().unwrap();
  let root = tmp.path();
  write(root, "src/elements/button/index.tsx", COMPONENT);
  write(root, "src/elements/button/style.css", ".btn { color: red }\n");
  write(root, "src/elements/button/spec.md", "# Button\n");
  write(root, "src/elements/bad/index.tsx", "export default function Bad() { return null }\n");
  write(root, "src/pages/home/index.tsx", COMPONENT);
  write(root, "src/pages/home/spec.md", "# Home\n");
  write(root, "src/pages/home/prd.md", "# Home PRD\n");
  write(root, "src/themes/dark/index.tsx", COMPONENT);
  write(root, "assets/docs/guide/intro.md", "# Intro\n");
  write(root, "assets/libraries/antd/spec.md", "# antd\n");
  write(root, "admin/assets/app.js", "console.log('admin');\n");
  tmp
}

fn config(preview: PreviewMode) -> AxhubConfig {
  let mut config = AxhubConfig::default();
  config.build.bundler_command = FAKE_BUNDLER.to_string();
  config.dev.preview = preview;
  config
}

fn app_with(tmp: &TempDir, config: AxhubConfig) -> Router {
  let manifest = scan_and_save(&config, tmp.path()).unwrap();
  let ctx = DevContext::new(config, tmp.path().to_path_buf(), manifest, None, CancellationToken::new());
  build_router(Arc::new(ctx))
}

fn app(tmp: &TempDir) -> Router {
  app_with(tmp, config(PreviewMode::Source))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, String) {
  let response = app.clone().oneshot(req).await.unwrap();
  let status = response.status();
  let headers = response.headers().clone();
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
  (status, headers, String::from_utf8_lossy(&bytes).into_owned())
}

async fn get(app: &Router, path: &str) -> (StatusCode, HeaderMap, String) {
  send(app, Request::get(path).body(Body::empty()).unwrap()).await
}

async fn post_json(app: &Router, path: &str, body: &str) -> (StatusCode, String) {
  let req = Request::post(path)
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap();
  let (status, _, body) = send(app, req).await;
  (status, body)
}

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> &'a str {
  headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("")
}

// -- artifacts --

#[tokio::test]
async fn artifact_is_built_on_demand() {
  let tmp = project();
  let app = app(&tmp);

  let (status, headers, body) = get(&app, "/build/elements/button.js").await;
  assert_eq!(status, StatusCode::OK);
  assert!(header_str(&headers, header::CONTENT_TYPE).starts_with("application/javascript"));
  assert_eq!(header_str(&headers, header::CACHE_CONTROL), "no-cache");
  assert!(body.starts_with("/* @axhub-component elements/button */"));
  assert!(tmp.path().join(".axhub/preview/elements/button.js").is_file());
  assert!(!tmp.path().join("dist").exists());
}

#[tokio::test]
async fn unknown_artifact_is_404_not_proxied() {
  let tmp = project();
  let app = app(&tmp);

  let (status, _, _) = get(&app, "/build/elements/doesnotexist.js").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _, _) = get(&app, "/build/themes/dark.js").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _, _) = get(&app, "/build/elements/button.css").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn contract_violation_is_a_500_with_the_requirement() {
  let tmp = project();
  let app = app(&tmp);

  let (status, headers, body) = get(&app, "/build/elements/bad.js").await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert!(header_str(&headers, header::CONTENT_TYPE).starts_with("text/plain"));
  assert!(body.contains("export default"));
  assert!(body.contains("src/elements/bad/index.tsx"));
}

#[tokio::test]
async fn bundler_failure_body_is_the_raw_diagnostics() {
  let tmp = project();
  let mut cfg = config(PreviewMode::Source);
  cfg.build.bundler_command = "echo 'index.tsx:1:1 boom' >&2; exit 1".into();
  let app = app_with(&tmp, cfg);

  let (status, _, body) = get(&app, "/build/pages/home.js").await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body, "index.tsx:1:1 boom");
}

// -- previews --

#[tokio::test]
async fn source_preview_loads_entry_and_style() {
  let tmp = project();
  let app = app(&tmp);

  let (status, headers, body) = get(&app, "/elements/button/index.html").await;
  assert_eq!(status, StatusCode::OK);
  assert!(header_str(&headers, header::CONTENT_TYPE).starts_with("text/html"));
  assert!(body.contains("/src/elements/button/index.tsx"));
  assert!(body.contains("<link rel=\"stylesheet\" href=\"/src/elements/button/style.css\">"));
  assert!(body.contains("button (elements) | Axhub Preview"));
}

#[tokio::test]
async fn preview_without_style_has_no_stylesheet() {
  let tmp = project();
  let app = app(&tmp);

  let (status, _, body) = get(&app, "/pages/home/index.html").await;
  assert_eq!(status, StatusCode::OK);
  assert!(!body.contains("style.css"));
}

#[tokio::test]
async fn compiled_preview_loads_the_artifact_route() {
  let tmp = project();
  let app = app_with(&tmp, config(PreviewMode::Compiled));

  let (status, _, body) = get(&app, "/pages/home/index.html").await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("/build/pages/home.js"));
  assert!(body.contains("__AXHUB_DEFINE_COMPONENT__"));
}

#[tokio::test]
async fn themes_preview_from_source_even_when_compiled() {
  let tmp = project();
  let app = app_with(&tmp, config(PreviewMode::Compiled));

  let (status, _, body) = get(&app, "/themes/dark/index.html").await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("/src/themes/dark/index.tsx"));
  assert!(!body.contains("/build/"));
}

#[tokio::test]
async fn missing_preview_falls_through_to_404_without_vite() {
  let tmp = project();
  let app = app(&tmp);

  let (status, _, _) = get(&app, "/elements/nothing/index.html").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- docs --

#[tokio::test]
async fn component_markdown_is_passed_through() {
  let tmp = project();
  let app = app(&tmp);

  let (status, headers, body) = get(&app, "/pages/home/prd.md").await;
  assert_eq!(status, StatusCode::OK);
  assert!(header_str(&headers, header::CONTENT_TYPE).starts_with("text/markdown"));
  assert_eq!(body, "# Home PRD\n");
}

#[tokio::test]
async fn assets_markdown_is_passed_through() {
  let tmp = project();
  let app = app(&tmp);

  let (status, _, body) = get(&app, "/assets/docs/guide/intro.md").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, "# Intro\n");

  let (status, _, _) = get(&app, "/assets/docs/guide/missing.md").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn doc_viewer_with_one_doc() {
  let tmp = project();
  let app = app(&tmp);

  let (status, _, body) = get(&app, "/elements/button/spec.html").await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("data-spec-url=\"/elements/button/spec.md\""));
  assert!(body.contains("data-multi-doc=\"false\""));
}

#[tokio::test]
async fn doc_viewer_with_spec_and_prd() {
  let tmp = project();
  let app = app(&tmp);

  let (status, _, body) = get(&app, "/pages/home/spec.html").await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("data-multi-doc=\"true\""));
  assert!(body.contains("/pages/home/prd.md"));
}

#[tokio::test]
async fn doc_viewer_for_library_docs() {
  let tmp = project();
  let app = app(&tmp);

  let (status, _, body) = get(&app, "/assets/libraries/antd/spec.html").await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("/assets/libraries/antd/spec.md"));
}

// -- admin assets and fallthrough --

#[tokio::test]
async fn admin_assets_are_served_from_disk() {
  let tmp = project();
  let app = app(&tmp);

  let (status, _, body) = get(&app, "/assets/app.js").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, "console.log('admin');\n");

  let (status, _, _) = get(&app, "/assets/missing.js").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn traversal_is_rejected() {
  let tmp = project();
  let app = app(&tmp);

  let (status, _, _) = get(&app, "/assets/%2e%2e/axhub.toml").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unclaimed_paths_are_404_without_vite() {
  let tmp = project();
  let app = app(&tmp);

  let (status, _, _) = get(&app, "/src/main.tsx").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _, _) = get(&app, "/").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- auxiliary API --

#[tokio::test]
async fn entries_lists_and_filters() {
  let tmp = project();
  let app = app(&tmp);

  let (status, _, body) = get(&app, "/__axhub/entries").await;
  assert_eq!(status, StatusCode::OK);
  let json: serde_json::Value = serde_json::from_str(&body).unwrap();
  assert_eq!(json["js"].as_object().unwrap().len(), 3);
  assert_eq!(json["html"]["pages/home"], "pages/home/index.html");

  let (_, _, body) = get(&app, "/__axhub/entries?group=pages").await;
  let json: serde_json::Value = serde_json::from_str(&body).unwrap();
  assert_eq!(json["js"].as_object().unwrap().len(), 1);

  let (status, _, body) = get(&app, "/__axhub/entries?group=themes").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body.contains("\"error\""));
}

#[tokio::test]
async fn rescan_picks_up_new_entries() {
  let tmp = project();
  let app = app(&tmp);

  let (status, _, _) = get(&app, "/build/pages/later.js").await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  write(tmp.path(), "src/pages/later/index.tsx", COMPONENT);
  let (status, body) = post_json(&app, "/__axhub/rescan", "{}").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(serde_json::from_str::<serde_json::Value>(&body).unwrap()["entries"], 4);

  let (status, _, _) = get(&app, "/build/pages/later.js").await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn build_endpoint_reports_bytes() {
  let tmp = project();
  let app = app(&tmp);

  let (status, body) = post_json(&app, "/__axhub/build", r#"{"entry":"elements/button"}"#).await;
  assert_eq!(status, StatusCode::OK);
  let json: serde_json::Value = serde_json::from_str(&body).unwrap();
  assert_eq!(json["entry"], "elements/button");
  assert!(json["bytes"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn build_endpoint_rejects_bad_requests() {
  let tmp = project();
  let app = app(&tmp);

  let (status, _) = post_json(&app, "/__axhub/build", "not json").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = post_json(&app, "/__axhub/build", r#"{"entry":"button"}"#).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = post_json(&app, "/__axhub/build", r#"{"entry":"elements/buton"}"#).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body.contains("elements/button"));
}

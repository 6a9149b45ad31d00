/* src/cli/core/src/dev/handlers/assets.rs */

use axhub_engine::ASSETS_PREFIX;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, Uri};
use axum::response::Response;
use tower_http::services::ServeDir;

use crate::dev::server::DevContext;

/// Serve `/assets/**` from the admin assets directory. `ServeDir` handles
/// content types, conditional requests and its own traversal checks.
pub(super) async fn serve(ctx: &DevContext, method: &Method, uri: &Uri) -> Option<Response> {
  let rest = uri.path().strip_prefix('/')?.strip_prefix(ASSETS_PREFIX)?;
  let inner: Uri = rest.parse().ok()?;
  let req = Request::builder().method(method.clone()).uri(inner).body(Body::empty()).ok()?;

  let mut dir = ServeDir::new(ctx.admin_dir()).append_index_html_on_directories(false);
  let response = dir.try_call(req).await.ok()?;
  if response.status() == StatusCode::NOT_FOUND {
    return None;
  }
  Some(response.map(Body::new))
}

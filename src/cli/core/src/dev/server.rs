/* src/cli/core/src/dev/server.rs */

// Dev server: the virtual HTML router in front of the Vite dev server.
// Route shapes are tried in `ROUTE_PRECEDENCE` order; the first handler that
// claims a request answers it. Everything else goes to Vite.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::Result;
use axhub_engine::{EntryManifest, candidates, is_reserved};
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use super::proxy::{ViteProxy, is_websocket_upgrade};
use super::{api, handlers};
use crate::build::{BuildInvoker, InvokerSettings, scan_and_save};
use crate::config::AxhubConfig;

/// Everything a request handler needs, created once per `axhub dev` session.
pub(crate) struct DevContext {
  pub config: AxhubConfig,
  pub base_dir: PathBuf,
  pub invoker: BuildInvoker,
  pub proxy: Option<ViteProxy>,
  manifest: RwLock<Arc<EntryManifest>>,
}

impl DevContext {
  pub fn new(
    config: AxhubConfig,
    base_dir: PathBuf,
    manifest: EntryManifest,
    proxy: Option<ViteProxy>,
    shutdown: CancellationToken,
  ) -> Self {
    let invoker = BuildInvoker::new(&base_dir, InvokerSettings::from_config(&config), shutdown);
    Self { config, base_dir, invoker, proxy, manifest: RwLock::new(Arc::new(manifest)) }
  }

  /// Current manifest snapshot. A rescan swaps in a new one; requests that
  /// already hold a snapshot keep using it.
  pub fn manifest(&self) -> Arc<EntryManifest> {
    self.manifest.read().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
  }

  pub fn rescan(&self) -> Result<Arc<EntryManifest>> {
    let fresh = Arc::new(scan_and_save(&self.config, &self.base_dir)?);
    *self.manifest.write().unwrap_or_else(std::sync::PoisonError::into_inner) = fresh.clone();
    Ok(fresh)
  }

  pub fn source_root(&self) -> PathBuf {
    self.base_dir.join(&self.config.source.root)
  }

  /// Project docs and libraries (`/assets/docs`, `/assets/libraries`).
  pub fn assets_dir(&self) -> PathBuf {
    self.base_dir.join(&self.config.dev.assets_dir)
  }

  /// Admin static files behind `/assets/`.
  pub fn admin_dir(&self) -> PathBuf {
    self.base_dir.join(&self.config.dev.admin_dir)
  }

  /// URL under which the Vite dev server exposes a project file.
  pub fn source_url(&self, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(&self.base_dir).ok()?;
    let segments: Vec<&str> = rel.components().map(|c| c.as_os_str().to_str()).collect::<Option<_>>()?;
    Some(axhub_engine::url_path(segments))
  }
}

pub(crate) type SharedContext = Arc<DevContext>;

pub(crate) fn build_router(ctx: SharedContext) -> Router {
  Router::new()
    .route("/__axhub/entries", get(api::entries))
    .route("/__axhub/rescan", post(api::rescan))
    .route("/__axhub/build", post(api::build))
    .fallback(dispatch)
    .layer(TraceLayer::new_for_http())
    .with_state(ctx)
}

pub(crate) fn not_found() -> Response {
  (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "Not Found").into_response()
}

async fn dispatch(State(ctx): State<SharedContext>, req: Request<Body>) -> Response {
  let path = req.uri().path().to_string();

  if is_websocket_upgrade(&req) {
    return match &ctx.proxy {
      Some(proxy) => proxy.tunnel(req).await,
      None => not_found(),
    };
  }

  if matches!(*req.method(), Method::GET | Method::HEAD) {
    let method = req.method().clone();
    let uri = req.uri().clone();
    for (kind, matched) in candidates(&path) {
      if let Some(response) = handlers::handle(&ctx, &matched, &method, &uri).await {
        tracing::debug!(%path, handler = kind.name(), status = %response.status(), "virtual route");
        return response;
      }
      if kind.is_terminal() {
        return not_found();
      }
    }
  }

  if is_reserved(&path) {
    return not_found();
  }
  match &ctx.proxy {
    Some(proxy) => proxy.forward(req).await,
    None => not_found(),
  }
}

/* src/cli/core/src/dev/handlers/mod.rs */

// One handler per route shape. `None` means "not mine after all" and lets
// the next shape in precedence order try.

mod artifact;
mod assets;
mod docs;
mod markdown;
mod preview;

use axhub_engine::RouteMatch;
use axum::http::{Method, Uri};
use axum::response::Response;

use super::server::DevContext;

pub(super) async fn handle(ctx: &DevContext, matched: &RouteMatch, method: &Method, uri: &Uri) -> Option<Response> {
  match matched {
    RouteMatch::Markdown(target) => markdown::serve(ctx, target).await,
    RouteMatch::DocViewer(unit) => docs::serve(ctx, unit).await,
    RouteMatch::Preview { group, name } => preview::serve(ctx, *group, name).await,
    RouteMatch::Artifact(key) => artifact::serve(ctx, key).await,
    RouteMatch::Asset { .. } => assets::serve(ctx, method, uri).await,
  }
}

async fn is_file(path: &std::path::Path) -> bool {
  tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

/* src/cli/core/src/dev/handlers/markdown.rs */

use axhub_engine::MarkdownTarget;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::dev::server::DevContext;

pub(super) async fn serve(ctx: &DevContext, target: &MarkdownTarget) -> Option<Response> {
  let path = match target {
    MarkdownTarget::Assets { rel } => ctx.assets_dir().join(rel),
    MarkdownTarget::Component { group, name, doc } => {
      ctx.source_root().join(group.as_str()).join(name).join(doc.file_name())
    }
  };
  let text = tokio::fs::read_to_string(&path).await.ok()?;
  Some(
    (
      [(header::CONTENT_TYPE, "text/markdown; charset=utf-8"), (header::CACHE_CONTROL, "no-cache")],
      text,
    )
      .into_response(),
  )
}

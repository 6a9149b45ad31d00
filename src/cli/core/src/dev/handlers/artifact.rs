/* src/cli/core/src/dev/handlers/artifact.rs */

use axhub_engine::EntryKey;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::config::BuildMode;
use crate::dev::error::build_error_text;
use crate::dev::server::DevContext;

/// Compile the entry on demand. Every request rebuilds; there is no cache.
pub(super) async fn serve(ctx: &DevContext, key: &EntryKey) -> Option<Response> {
  let manifest = ctx.manifest();
  let key = key.to_string();
  if !manifest.contains(&key) {
    return None;
  }

  Some(match ctx.invoker.build(&manifest, &key, BuildMode::DevPreview).await {
    Ok(out) => (
      [
        (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
        (header::CACHE_CONTROL, "no-cache"),
      ],
      out.code,
    )
      .into_response(),
    Err(e) => {
      tracing::warn!(entry = %key, error = %e, "on-demand build failed");
      build_error_text(&e)
    }
  })
}

/* src/cli/core/src/dev/handlers/preview.rs */

use axhub_engine::{BUILD_PREFIX, Group, PreviewDocument, ScriptRef, preview_title, url_path};
use axum::response::{Html, IntoResponse, Response};

use super::is_file;
use crate::config::PreviewMode;
use crate::dev::server::DevContext;

pub(super) async fn serve(ctx: &DevContext, group: Group, name: &str) -> Option<Response> {
  let dir = ctx.source_root().join(group.as_str()).join(name);
  let entry = dir.join(&ctx.config.source.entry_file);
  if !is_file(&entry).await {
    return None;
  }

  let dev = &ctx.config.dev;
  // Themes never become entries, so there is no artifact to load for them.
  let script = if dev.preview == PreviewMode::Compiled && group.is_buildable() {
    let file = format!("{name}.js");
    ScriptRef::Compiled {
      url: url_path([BUILD_PREFIX, group.as_str(), file.as_str()]),
      react_url: dev.react_umd.clone(),
      react_dom_url: dev.react_dom_umd.clone(),
    }
  } else {
    ScriptRef::Module { src: ctx.source_url(&entry)? }
  };

  let style = dir.join(&ctx.config.source.style_file);
  let stylesheet = if is_file(&style).await { ctx.source_url(&style) } else { None };

  let doc = PreviewDocument {
    title: preview_title(group.as_str(), name),
    script,
    stylesheet,
    hook: ctx.config.build.registration_hook.clone(),
  };
  match doc.render() {
    Ok(html) => Some(Html(html).into_response()),
    Err(e) => {
      tracing::warn!(%group, name, error = %e, "preview render failed");
      None
    }
  }
}

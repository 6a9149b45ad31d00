/* src/cli/core/src/dev/handlers/docs.rs */

use std::path::PathBuf;

use axhub_engine::{ASSETS_PREFIX, DocKind, DocLink, DocUnit, DocViewerDocument, url_path};
use axum::response::{Html, IntoResponse, Response};

use super::is_file;
use crate::dev::server::DevContext;

/// Directory holding the unit's docs and the URL segments that reach it.
fn locate(ctx: &DevContext, unit: &DocUnit) -> (PathBuf, Vec<String>) {
  match unit {
    DocUnit::Component { group, name } => {
      (ctx.source_root().join(group.as_str()).join(name), vec![group.as_str().to_string(), name.clone()])
    }
    DocUnit::Assets { rel_dir, url_dir } => {
      let mut segments = vec![ASSETS_PREFIX.to_string()];
      segments.extend(url_dir.split('/').map(str::to_string));
      (ctx.assets_dir().join(rel_dir), segments)
    }
  }
}

pub(super) async fn serve(ctx: &DevContext, unit: &DocUnit) -> Option<Response> {
  let (dir, segments) = locate(ctx, unit);
  let set = unit.set_name();

  let mut docs = Vec::new();
  for kind in DocKind::ALL {
    if !is_file(&dir.join(kind.file_name())).await {
      continue;
    }
    let url = url_path(segments.iter().map(String::as_str).chain([kind.file_name()]));
    docs.push(DocLink { key: kind.key().to_string(), label: format!("{set} {}", kind.label()), url });
  }
  if docs.is_empty() {
    return None;
  }

  let doc = DocViewerDocument { title: format!("{set} docs"), docs };
  match doc.render() {
    Ok(html) => Some(Html(html).into_response()),
    Err(e) => {
      tracing::warn!(set, error = %e, "doc viewer render failed");
      None
    }
  }
}

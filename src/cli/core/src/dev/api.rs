/* src/cli/core/src/dev/api.rs */

// Auxiliary JSON endpoints under `/__axhub/` used by the admin UI.

use axhub_engine::{EntryKey, EntryManifest, Group};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::ApiError;
use super::server::SharedContext;
use crate::build::BuildError;
use crate::config::BuildMode;

#[derive(Debug, Deserialize)]
pub(super) struct EntriesQuery {
  group: Option<String>,
}

/// `GET /__axhub/entries[?group=elements]`
pub(super) async fn entries(
  State(ctx): State<SharedContext>,
  Query(query): Query<EntriesQuery>,
) -> Result<Json<EntryManifest>, ApiError> {
  let manifest = ctx.manifest();
  let Some(group) = query.group else {
    return Ok(Json(EntryManifest::clone(&manifest)));
  };
  match Group::parse(&group) {
    Some(g) if g.is_buildable() => Ok(Json(manifest.filter_group(g))),
    _ => Err(ApiError::bad_request(format!("unknown group \"{group}\" (expected elements or pages)"))),
  }
}

/// `POST /__axhub/rescan`
pub(super) async fn rescan(State(ctx): State<SharedContext>) -> Result<Json<Value>, ApiError> {
  let scanning = ctx.clone();
  let manifest = tokio::task::spawn_blocking(move || scanning.rescan())
    .await
    .map_err(|e| ApiError::internal(format!("rescan task failed: {e}")))?
    .map_err(|e| ApiError::internal(format!("{e:#}")))?;
  tracing::info!(entries = manifest.len(), "manifest rescanned");
  Ok(Json(json!({ "entries": manifest.len() })))
}

#[derive(Debug, Deserialize)]
pub(super) struct BuildRequest {
  entry: String,
}

/// `POST /__axhub/build {"entry": "group/name"}`
pub(super) async fn build(
  State(ctx): State<SharedContext>,
  body: Result<Json<BuildRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
  let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
  EntryKey::parse(&req.entry).map_err(|e| ApiError::bad_request(e.to_string()))?;

  let manifest = ctx.manifest();
  let out = ctx.invoker.build(&manifest, &req.entry, BuildMode::DevPreview).await.map_err(|e: BuildError| {
    tracing::warn!(entry = %req.entry, error = %e, "api build failed");
    ApiError::from(e)
  })?;
  Ok(Json(json!({ "entry": out.entry.to_string(), "bytes": out.code.len() })))
}

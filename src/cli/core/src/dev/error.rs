/* src/cli/core/src/dev/error.rs */

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::build::BuildError;

/// HTTP status for a failed build.
pub(crate) fn build_status(err: &BuildError) -> StatusCode {
  match err {
    e if e.is_unknown_entry() => StatusCode::NOT_FOUND,
    BuildError::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
    BuildError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
    _ => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

/// Plain-text rendering used by the artifact route: the body is exactly
/// what the bundler printed, so it reads like a terminal build log.
pub(crate) fn build_error_text(err: &BuildError) -> Response {
  let status = build_status(err);
  let body = err.diagnostics();
  (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

/// JSON `{"error": "..."}` error for the auxiliary API.
#[derive(Debug)]
pub(crate) struct ApiError {
  pub status: StatusCode,
  pub message: String,
}

impl ApiError {
  pub fn bad_request(message: impl Into<String>) -> Self {
    Self { status: StatusCode::BAD_REQUEST, message: message.into() }
  }

  pub fn internal(message: impl Into<String>) -> Self {
    Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let body = serde_json::json!({ "error": self.message });
    (self.status, axum::Json(body)).into_response()
  }
}

impl From<BuildError> for ApiError {
  fn from(err: BuildError) -> Self {
    Self { status: build_status(&err), message: err.diagnostics() }
  }
}

//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Ticker {0} not found")]
  TickerNotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("{0}")]
  Unprocessable(String),

  #[error("summary unavailable: {0}")]
  SummaryUnavailable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error, logging it before it leaves the handler.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    tracing::error!(error = %e, "store failure");
    ApiError::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::TickerNotFound(_) => {
        (StatusCode::NOT_FOUND, json!({ "error": self.to_string() }))
      }
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Unprocessable(m) => {
        (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": m }))
      }
      ApiError::SummaryUnavailable(m) => {
        (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": m }))
      }
      ApiError::Store(e) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Server error", "details": e.to_string() }),
      ),
    };
    (status, Json(body)).into_response()
  }
}

//! JSON REST API for finboard.
//!
//! Exposes an axum [`Router`] backed by any [`FactStore`] and [`Summarizer`].
//! TLS, CORS and request tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", finboard_api::api_router(state))
//! ```

pub mod company;
pub mod error;
pub mod health;

use std::sync::Arc;

use axum::{Router, routing::get};
use finboard_core::{pivot::ColumnOrder, store::FactStore, summary::Summarizer};

pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, M> {
  pub store:        Arc<S>,
  pub summarizer:   Arc<M>,
  /// Year ordering used by `GET /company/{ticker}/table`.
  pub column_order: ColumnOrder,
}

impl<S, M> ApiState<S, M> {
  pub fn new(store: Arc<S>, summarizer: Arc<M>, column_order: ColumnOrder) -> Self {
    Self { store, summarizer, column_order }
  }
}

// Manual impl: deriving would require `S: Clone` and `M: Clone`.
impl<S, M> Clone for ApiState<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:        Arc::clone(&self.store),
      summarizer:   Arc::clone(&self.summarizer),
      column_order: self.column_order,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, M>(state: ApiState<S, M>) -> Router<()>
where
  S: FactStore + 'static,
  M: Summarizer + 'static,
{
  Router::new()
    .route("/health", get(health::handler))
    .route("/company", get(company::list::<S, M>))
    .route("/company/{ticker}", get(company::facts::<S, M>))
    .route("/company/{ticker}/meta", get(company::meta::<S, M>))
    .route("/company/{ticker}/table", get(company::table::<S, M>))
    .route("/company/{ticker}/summary", get(company::summary::<S, M>))
    .with_state(state)
}

#[cfg(test)]
mod tests;

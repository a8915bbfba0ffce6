//! Handlers for `/company` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/company` | All known companies, ordered by ticker |
//! | `GET`  | `/company/{ticker}` | Raw facts as `{"source":"db","data":[...]}` |
//! | `GET`  | `/company/{ticker}/meta` | Company metadata |
//! | `GET`  | `/company/{ticker}/table` | Facts pivoted into a display table |
//! | `GET`  | `/company/{ticker}/summary` | `?label` or `?statement_type&metric` |
//!
//! Ticker lookup is exact and case-sensitive. A ticker without a metadata row
//! is reported as 404 even if facts exist for it.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use finboard_core::{
  company::CompanyMetadata,
  fact::{CompanyFacts, FactRecord},
  pivot::{PivotTable, pivot_with},
  series::{MetricKey, time_series},
  store::FactStore,
  summary::{MetricSummary, SummaryError, Summarizer},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

async fn load_records<S: FactStore>(
  store: &S,
  ticker: &str,
) -> Result<Vec<FactRecord>, ApiError> {
  let facts = store
    .get_facts(ticker)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::TickerNotFound(ticker.to_owned()))?;
  Ok(facts.into_iter().map(FactRecord::from).collect())
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /company`
pub async fn list<S, M>(
  State(state): State<ApiState<S, M>>,
) -> Result<Json<Vec<CompanyMetadata>>, ApiError>
where
  S: FactStore,
  M: Summarizer,
{
  let companies = state.store.list_companies().await.map_err(ApiError::store)?;
  Ok(Json(companies))
}

// ─── Facts ────────────────────────────────────────────────────────────────────

/// `GET /company/{ticker}`
pub async fn facts<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(ticker): Path<String>,
) -> Result<Json<CompanyFacts>, ApiError>
where
  S: FactStore,
  M: Summarizer,
{
  let facts = state
    .store
    .get_facts(&ticker)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::TickerNotFound(ticker))?;
  Ok(Json(CompanyFacts::from_store(facts)))
}

/// `GET /company/{ticker}/meta`
pub async fn meta<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(ticker): Path<String>,
) -> Result<Json<CompanyMetadata>, ApiError>
where
  S: FactStore,
  M: Summarizer,
{
  state
    .store
    .get_metadata(&ticker)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or(ApiError::TickerNotFound(ticker))
}

// ─── Table ────────────────────────────────────────────────────────────────────

/// `GET /company/{ticker}/table`
pub async fn table<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(ticker): Path<String>,
) -> Result<Json<PivotTable>, ApiError>
where
  S: FactStore,
  M: Summarizer,
{
  let records = load_records(state.store.as_ref(), &ticker).await?;
  Ok(Json(pivot_with(&records, state.column_order)))
}

// ─── Summary ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
  /// Combined `"{statement_type}: {metric}"` label.
  pub label:          Option<String>,
  pub statement_type: Option<String>,
  pub metric:         Option<String>,
}

impl SummaryParams {
  /// Explicit `statement_type` + `metric` take precedence over `label`.
  pub fn metric_key(&self) -> Result<MetricKey, ApiError> {
    match (&self.statement_type, &self.metric, &self.label) {
      (Some(st), Some(m), _) if !st.trim().is_empty() && !m.trim().is_empty() => {
        Ok(MetricKey::new(st.trim(), m.trim()))
      }
      (_, _, Some(label)) => label
        .parse()
        .map_err(|e: finboard_core::Error| ApiError::BadRequest(e.to_string())),
      _ => Err(ApiError::BadRequest(
        "expected `label` or both `statement_type` and `metric`".into(),
      )),
    }
  }
}

/// `GET /company/{ticker}/summary?statement_type=...&metric=...`
pub async fn summary<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(ticker): Path<String>,
  Query(params): Query<SummaryParams>,
) -> Result<Json<MetricSummary>, ApiError>
where
  S: FactStore,
  M: Summarizer,
{
  let records = load_records(state.store.as_ref(), &ticker).await?;
  let key = params.metric_key()?;
  let series = time_series(&records, &key);
  let label = key.label();

  match state.summarizer.summarize(&ticker, &label, &series).await {
    Ok(summary) => Ok(Json(MetricSummary { metric: label, summary })),
    Err(SummaryError::EmptySeries) => Err(ApiError::Unprocessable(format!(
      "no data points for {label}"
    ))),
    Err(SummaryError::Unavailable(reason)) => {
      tracing::warn!(%ticker, metric = %label, %reason, "summary unavailable");
      Err(ApiError::SummaryUnavailable(reason))
    }
  }
}

//! Router tests against an in-memory `SqliteStore` and a failing backend.

use std::sync::Arc;

use axum::{
  body::{Body, to_bytes},
  http::{Request, StatusCode},
};
use finboard_core::{
  company::CompanyMetadata,
  fact::{CompanyFacts, Fact},
  pivot::{ColumnOrder, PivotTable},
  series::TimeSeries,
  store::FactStore,
  summary::{DisabledSummarizer, MetricSummary, SummaryError, Summarizer},
};
use finboard_store_sqlite::SqliteStore;
use serde_json::Value;
use tower::ServiceExt as _;

use crate::{ApiState, api_router};

/// Reports the number of points it was given.
struct CountingSummarizer;

impl Summarizer for CountingSummarizer {
  async fn summarize(
    &self,
    ticker: &str,
    metric_label: &str,
    series: &TimeSeries,
  ) -> Result<String, SummaryError> {
    if series.is_empty() {
      return Err(SummaryError::EmptySeries);
    }
    Ok(format!("{ticker} {metric_label}: {} points", series.len()))
  }
}

fn fact(ticker: &str, year: i32, statement: &str, metric: &str, value: Option<f64>) -> Fact {
  Fact {
    company_name:   "ASML Holding".into(),
    ticker:         ticker.into(),
    year,
    statement_type: statement.into(),
    metric:         metric.into(),
    value,
  }
}

async fn seeded_store() -> Arc<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store
    .upsert_metadata(CompanyMetadata {
      ticker:                 "ASML".into(),
      company_name:           "ASML Holding".into(),
      investor_relations_url: Some("https://www.asml.com/en/investors".into()),
    })
    .await
    .unwrap();
  store
    .upsert_facts(vec![
      fact("ASML", 2023, "Income Statement", "Revenue", Some(5_000_000.0)),
      fact("ASML", 2024, "Income Statement", "Revenue", Some(7_000_000.0)),
      fact("ASML", 2024, "Income Statement", "Dividends", None),
      fact("ASML", 2019, "Historical", "Revenue", Some(1_000_000.0)),
    ])
    .await
    .unwrap();
  // Facts without a metadata row.
  store
    .upsert_facts(vec![fact("GHOST", 2024, "Income Statement", "Revenue", Some(1.0))])
    .await
    .unwrap();
  Arc::new(store)
}

/// A backend whose database has gone away.
struct UnavailableStore;

#[derive(Debug, thiserror::Error)]
#[error("database is locked")]
struct Locked;

impl FactStore for UnavailableStore {
  type Error = Locked;

  async fn list_companies(&self) -> Result<Vec<CompanyMetadata>, Locked> { Err(Locked) }

  async fn get_metadata(&self, _ticker: &str) -> Result<Option<CompanyMetadata>, Locked> {
    Err(Locked)
  }

  async fn get_facts(&self, _ticker: &str) -> Result<Option<Vec<Fact>>, Locked> {
    Err(Locked)
  }

  async fn upsert_metadata(&self, _metadata: CompanyMetadata) -> Result<(), Locked> {
    Err(Locked)
  }

  async fn upsert_facts(&self, _facts: Vec<Fact>) -> Result<usize, Locked> { Err(Locked) }

  async fn import_company(
    &self,
    _metadata: CompanyMetadata,
    _facts: Vec<Fact>,
  ) -> Result<usize, Locked> {
    Err(Locked)
  }
}

async fn get<S: FactStore + 'static, M: Summarizer + 'static>(
  store: Arc<S>,
  summarizer: M,
  uri: &str,
) -> (StatusCode, Value) {
  let state = ApiState::new(store, Arc::new(summarizer), ColumnOrder::default());
  let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
  let resp = api_router(state).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, body)
}

// ── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_ok() {
  let (status, body) = get(seeded_store().await, DisabledSummarizer, "/health").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ok");
}

// ── Company ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_returns_known_companies_only() {
  let (status, body) = get(seeded_store().await, DisabledSummarizer, "/company").await;
  assert_eq!(status, StatusCode::OK);
  let companies: Vec<CompanyMetadata> = serde_json::from_value(body).unwrap();
  assert_eq!(companies.len(), 1);
  assert_eq!(companies[0].ticker, "ASML");
}

#[tokio::test]
async fn facts_endpoint_returns_source_and_data() {
  let (status, body) = get(seeded_store().await, DisabledSummarizer, "/company/ASML").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["source"], "db");

  let facts: CompanyFacts = serde_json::from_value(body).unwrap();
  assert_eq!(facts.data.len(), 4);
  assert_eq!(facts.data[0].year, 2019);
  assert!(facts.data.iter().any(|f| f.value.is_none()));
}

#[tokio::test]
async fn unknown_ticker_is_404_with_message() {
  let (status, body) = get(seeded_store().await, DisabledSummarizer, "/company/NOPE").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "Ticker NOPE not found");
}

#[tokio::test]
async fn ticker_lookup_is_case_sensitive() {
  let (status, _) = get(seeded_store().await, DisabledSummarizer, "/company/asml").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn facts_without_metadata_are_404() {
  let store = seeded_store().await;
  let (status, _) = get(store.clone(), DisabledSummarizer, "/company/GHOST").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = get(store.clone(), DisabledSummarizer, "/company/GHOST/meta").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = get(store, DisabledSummarizer, "/company/GHOST/table").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_failure_is_500_with_details() {
  for uri in ["/company", "/company/ASML", "/company/ASML/meta", "/company/ASML/table"] {
    let (status, body) = get(Arc::new(UnavailableStore), DisabledSummarizer, uri).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
    assert_eq!(body["error"], "Server error", "{uri}");
    assert_eq!(body["details"], "database is locked", "{uri}");
  }
}

#[tokio::test]
async fn meta_endpoint() {
  let (status, body) =
    get(seeded_store().await, DisabledSummarizer, "/company/ASML/meta").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["company_name"], "ASML Holding");
  assert_eq!(body["investor_relations_url"], "https://www.asml.com/en/investors");
}

// ── Table ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn table_pivots_and_suppresses_empty_rows() {
  let (status, body) =
    get(seeded_store().await, DisabledSummarizer, "/company/ASML/table").await;
  assert_eq!(status, StatusCode::OK);

  let table: PivotTable = serde_json::from_value(body).unwrap();
  assert_eq!(table.columns, vec!["2024", "2023"]);
  assert_eq!(table.sections.len(), 1);
  assert_eq!(table.sections[0].section_label, "Income Statement");
  assert_eq!(table.sections[0].rows.len(), 1);
  assert_eq!(table.sections[0].rows[0].row_label, "Revenue");
  assert_eq!(table.sections[0].rows[0].cells, vec!["7.00", "5.00"]);
}

#[tokio::test]
async fn table_for_company_without_facts_is_empty() {
  let store = seeded_store().await;
  store
    .upsert_metadata(CompanyMetadata {
      ticker:                 "ROG".into(),
      company_name:           "Roche".into(),
      investor_relations_url: None,
    })
    .await
    .unwrap();

  let (status, body) = get(store, DisabledSummarizer, "/company/ROG/table").await;
  assert_eq!(status, StatusCode::OK);
  let table: PivotTable = serde_json::from_value(body).unwrap();
  assert!(table.is_empty());
  assert!(table.columns.is_empty());
}

// ── Summary ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn summary_by_statement_and_metric() {
  let (status, body) = get(
    seeded_store().await,
    CountingSummarizer,
    "/company/ASML/summary?statement_type=Income%20Statement&metric=Revenue",
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let summary: MetricSummary = serde_json::from_value(body).unwrap();
  assert_eq!(summary.metric, "Income Statement: Revenue");
  assert_eq!(summary.summary, "ASML Income Statement: Revenue: 2 points");
}

#[tokio::test]
async fn summary_by_label() {
  let (status, body) = get(
    seeded_store().await,
    CountingSummarizer,
    "/company/ASML/summary?label=Income%20Statement%3A%20Revenue",
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["metric"], "Income Statement: Revenue");
}

#[tokio::test]
async fn summary_without_metric_is_400() {
  let (status, _) =
    get(seeded_store().await, CountingSummarizer, "/company/ASML/summary").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = get(
    seeded_store().await,
    CountingSummarizer,
    "/company/ASML/summary?label=Revenue",
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn summary_for_series_without_values_is_422() {
  let (status, _) = get(
    seeded_store().await,
    CountingSummarizer,
    "/company/ASML/summary?statement_type=Income%20Statement&metric=Dividends",
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn summary_unknown_ticker_is_404() {
  let (status, _) = get(
    seeded_store().await,
    CountingSummarizer,
    "/company/NOPE/summary?statement_type=Income%20Statement&metric=Revenue",
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  // Unknown ticker wins over a malformed metric.
  let (status, body) = get(
    seeded_store().await,
    CountingSummarizer,
    "/company/NOPE/summary?label=Revenue",
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "Ticker NOPE not found");
}

#[tokio::test]
async fn disabled_summarizer_is_503() {
  let (status, body) = get(
    seeded_store().await,
    DisabledSummarizer,
    "/company/ASML/summary?statement_type=Income%20Statement&metric=Revenue",
  )
  .await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert!(body["error"].is_string());
}

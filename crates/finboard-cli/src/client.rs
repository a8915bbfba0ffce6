//! Async HTTP client wrapping the finboard JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use finboard_core::{
  company::CompanyMetadata,
  fact::CompanyFacts,
  series::MetricKey,
  summary::MetricSummary,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// Async HTTP client for the finboard JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  async fn read_json<T: DeserializeOwned>(path: &str, resp: Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
      // The server reports failures as `{"error": "..."}`.
      let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
        .unwrap_or_else(|| status.to_string());
      return Err(anyhow!("GET {path} → {message}"));
    }
    resp
      .json()
      .await
      .with_context(|| format!("deserialising {path}"))
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let resp = self
      .client
      .get(self.url(path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    Self::read_json(path, resp).await
  }

  // ── Companies ─────────────────────────────────────────────────────────────

  /// `GET /api/company`
  pub async fn list_companies(&self) -> Result<Vec<CompanyMetadata>> {
    self.get("/company").await
  }

  /// `GET /api/company/{ticker}/meta`
  pub async fn metadata(&self, ticker: &str) -> Result<CompanyMetadata> {
    self.get(&format!("/company/{ticker}/meta")).await
  }

  /// `GET /api/company/{ticker}`
  pub async fn company_facts(&self, ticker: &str) -> Result<CompanyFacts> {
    self.get(&format!("/company/{ticker}")).await
  }

  // ── Summary ───────────────────────────────────────────────────────────────

  /// `GET /api/company/{ticker}/summary?statement_type=..&metric=..`
  pub async fn summary(&self, ticker: &str, key: &MetricKey) -> Result<MetricSummary> {
    let path = format!("/company/{ticker}/summary");
    let resp = self
      .client
      .get(self.url(&path))
      .query(&[
        ("statement_type", key.statement_type.as_str()),
        ("metric", key.metric.as_str()),
      ])
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    Self::read_json(&path, resp).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn urls_are_rooted_under_api() {
    let client = ApiClient::new("http://localhost:3001/").unwrap();
    assert_eq!(client.url("/company"), "http://localhost:3001/api/company");
    assert_eq!(
      client.url("/company/ASML/meta"),
      "http://localhost:3001/api/company/ASML/meta"
    );
  }
}

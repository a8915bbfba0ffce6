//! The summary service contract.
//!
//! A [`Summarizer`] turns one metric's time series into a short trend
//! description, typically by calling a hosted language model. Callers must
//! treat every failure as non-fatal and fall back to [`FALLBACK_MESSAGE`].

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::series::TimeSeries;

/// Shown in place of a summary when none could be produced.
pub const FALLBACK_MESSAGE: &str = "Overview unavailable.";

#[derive(Debug, Error)]
pub enum SummaryError {
  #[error("no data points to summarize")]
  EmptySeries,

  #[error("summary service unavailable: {0}")]
  Unavailable(String),
}

/// Produces a natural-language description of a metric's trend.
pub trait Summarizer: Send + Sync {
  /// Describe `series` for `metric_label` of `ticker`.
  ///
  /// Implementations must reject an empty series with
  /// [`SummaryError::EmptySeries`] and bound their own running time, failing
  /// with [`SummaryError::Unavailable`] when the bound is exceeded.
  fn summarize<'a>(
    &'a self,
    ticker: &'a str,
    metric_label: &'a str,
    series: &'a TimeSeries,
  ) -> impl Future<Output = Result<String, SummaryError>> + Send + 'a;
}

/// Used when no language model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSummarizer;

impl Summarizer for DisabledSummarizer {
  async fn summarize(
    &self,
    _ticker: &str,
    _metric_label: &str,
    series: &TimeSeries,
  ) -> Result<String, SummaryError> {
    if series.is_empty() {
      return Err(SummaryError::EmptySeries);
    }
    Err(SummaryError::Unavailable("no summary model configured".into()))
  }
}

/// Response body of `GET /company/{ticker}/summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSummary {
  pub metric:  String,
  pub summary: String,
}

/// The instruction sent to the language model.
pub fn build_prompt(ticker: &str, metric_label: &str, series: &TimeSeries) -> String {
  let data = series
    .points
    .iter()
    .map(|p| format!("{}: {}", p.year, p.value))
    .collect::<Vec<_>>()
    .join("\n");

  format!(
    "You are a financial analyst reviewing reported figures for the public \
     company \"{ticker}\". Write a 2-3 sentence overview of the trend in \
     \"{metric_label}\" over this period.\n\n\
     Data:\n{data}\n\n\
     Avoid unnecessary commentary. Focus on what the numbers show."
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::series::Point;

  #[test]
  fn prompt_lists_every_point() {
    let series = TimeSeries {
      points: vec![
        Point { year: 2023, value: 5_000_000.0 },
        Point { year: 2024, value: 7_000_000.0 },
      ],
    };
    let prompt = build_prompt("ASML", "Income Statement: Revenue", &series);
    assert!(prompt.contains("\"ASML\""));
    assert!(prompt.contains("\"Income Statement: Revenue\""));
    assert!(prompt.contains("2023: 5000000\n2024: 7000000"));
  }

  #[tokio::test]
  async fn disabled_summarizer_is_unavailable() {
    let s = DisabledSummarizer;
    let series = TimeSeries { points: vec![Point { year: 2024, value: 1.0 }] };
    assert!(matches!(
      s.summarize("X", "A: B", &series).await,
      Err(SummaryError::Unavailable(_))
    ));
    assert!(matches!(
      s.summarize("X", "A: B", &TimeSeries::default()).await,
      Err(SummaryError::EmptySeries)
    ));
  }
}

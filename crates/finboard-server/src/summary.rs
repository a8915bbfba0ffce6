//! Summarizer backed by an OpenAI-compatible chat-completion endpoint.

use std::time::Duration;

use finboard_core::{
  series::TimeSeries,
  summary::{DisabledSummarizer, SummaryError, Summarizer, build_prompt},
};
use serde::{Deserialize, Serialize};

use crate::{Result, ServerConfig};

const TEMPERATURE: f32 = 0.4;

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
  model:       &'a str,
  messages:    Vec<ChatMessage<'a>>,
  temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
  role:    &'a str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
  #[serde(default)]
  content: Option<String>,
}

/// Extract the trimmed text of the first choice.
fn parse_completion(body: &str) -> Result<String, SummaryError> {
  let response: ChatResponse = serde_json::from_str(body)
    .map_err(|e| SummaryError::Unavailable(format!("malformed completion: {e}")))?;

  response
    .choices
    .into_iter()
    .next()
    .and_then(|c| c.message.content)
    .map(|text| text.trim().to_owned())
    .filter(|text| !text.is_empty())
    .ok_or_else(|| SummaryError::Unavailable("completion had no content".into()))
}

// ─── OpenAiSummarizer ─────────────────────────────────────────────────────────

pub struct OpenAiSummarizer {
  client:   reqwest::Client,
  endpoint: String,
  api_key:  String,
  model:    String,
}

impl OpenAiSummarizer {
  pub fn new(
    api_key: impl Into<String>,
    base_url: &str,
    model: impl Into<String>,
    timeout: Duration,
  ) -> Result<Self> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
      api_key: api_key.into(),
      model: model.into(),
    })
  }
}

impl Summarizer for OpenAiSummarizer {
  async fn summarize(
    &self,
    ticker: &str,
    metric_label: &str,
    series: &TimeSeries,
  ) -> Result<String, SummaryError> {
    if series.is_empty() {
      return Err(SummaryError::EmptySeries);
    }

    let prompt = build_prompt(ticker, metric_label, series);
    let request = ChatRequest {
      model:       &self.model,
      messages:    vec![ChatMessage { role: "user", content: &prompt }],
      temperature: TEMPERATURE,
    };

    let unavailable = |e: reqwest::Error| SummaryError::Unavailable(e.to_string());
    let body = self
      .client
      .post(&self.endpoint)
      .bearer_auth(&self.api_key)
      .json(&request)
      .send()
      .await
      .map_err(unavailable)?
      .error_for_status()
      .map_err(unavailable)?
      .text()
      .await
      .map_err(unavailable)?;

    let summary = parse_completion(&body)?;
    tracing::debug!(%ticker, metric = %metric_label, "summary generated");
    Ok(summary)
  }
}

// ─── Runtime selection ────────────────────────────────────────────────────────

/// The summarizer chosen at startup from [`ServerConfig`].
pub enum ConfiguredSummarizer {
  OpenAi(OpenAiSummarizer),
  Disabled(DisabledSummarizer),
}

impl ConfiguredSummarizer {
  pub fn from_config(config: &ServerConfig) -> Result<Self> {
    match config.api_key() {
      Some(key) => Ok(Self::OpenAi(OpenAiSummarizer::new(
        key,
        &config.openai_base_url,
        config.openai_model.clone(),
        Duration::from_secs(config.summary_timeout_secs),
      )?)),
      None => Ok(Self::Disabled(DisabledSummarizer)),
    }
  }

  pub fn is_enabled(&self) -> bool { matches!(self, Self::OpenAi(_)) }
}

impl Summarizer for ConfiguredSummarizer {
  async fn summarize(
    &self,
    ticker: &str,
    metric_label: &str,
    series: &TimeSeries,
  ) -> Result<String, SummaryError> {
    match self {
      Self::OpenAi(s) => s.summarize(ticker, metric_label, series).await,
      Self::Disabled(s) => s.summarize(ticker, metric_label, series).await,
    }
  }
}

//! Analysis types — one LLM-generated read of one transcript.
//!
//! Unlike transcripts, analyses carry no uniqueness constraint on
//! (ticker, quarter, year): the same call may be analysed many times by
//! different providers, models, or workflows, and every run is kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::score::Score;

/// Which LLM backend produced an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
  OpenAi,
  Xai,
  Gemini,
}

/// How the analysis was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
  /// Single-pass prompt over the transcript.
  Standard,
  /// Multi-step tool-using workflow.
  AgenticWorkflow,
}

/// A stored analysis record.
///
/// `score` is `None` when the analysis text did not contain an extractable
/// score — a valid outcome, distinct from a score of exactly zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
  pub id:                  i64,
  /// Owning transcript, when one was stored; analyses may exist without.
  pub transcript_id:       Option<i64>,
  pub ticker:              String,
  pub quarter:             u8,
  pub year:                i32,
  /// Store-assigned timestamp of the analysis run.
  pub analysis_date:       DateTime<Utc>,
  pub score:               Option<Score>,
  pub score_justification: Option<String>,
  pub analysis_markdown:   String,
  /// Optional structured breakdown emitted alongside the markdown.
  pub analysis_json:       Option<serde_json::Value>,
  pub provider:            Provider,
  pub model:               Option<String>,
  pub analysis_type:       AnalysisType,
  pub financial_context_included: bool,
  pub processing_time_seconds:    Option<f64>,
  pub created_at:          DateTime<Utc>,
}

/// Input to [`crate::store::EarningsStore::insert_analysis`].
///
/// When `transcript_id` is `None` the store resolves it from
/// (ticker, quarter, year), leaving it null if no transcript is stored.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
  pub transcript_id:       Option<i64>,
  pub ticker:              String,
  pub quarter:             u8,
  pub year:                i32,
  pub score:               Option<Score>,
  pub score_justification: Option<String>,
  pub analysis_markdown:   String,
  pub analysis_json:       Option<serde_json::Value>,
  pub provider:            Provider,
  pub model:               Option<String>,
  pub analysis_type:       AnalysisType,
  pub financial_context_included: bool,
  pub processing_time_seconds:    Option<f64>,
}

impl NewAnalysis {
  /// Convenience constructor with all optional fields left empty.
  pub fn new(
    ticker: impl Into<String>,
    quarter: u8,
    year: i32,
    analysis_markdown: impl Into<String>,
    provider: Provider,
    analysis_type: AnalysisType,
  ) -> Self {
    Self {
      transcript_id: None,
      ticker: ticker.into(),
      quarter,
      year,
      score: None,
      score_justification: None,
      analysis_markdown: analysis_markdown.into(),
      analysis_json: None,
      provider,
      model: None,
      analysis_type,
      financial_context_included: false,
      processing_time_seconds: None,
    }
  }
}

//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`, timestamps as RFC 3339 strings, JSON
//! payloads as compact JSON text, and enums via their stable snake_case
//! tags (which must match the serde renames in `callscore-core`).

use callscore_core::{
  analysis::{Analysis, AnalysisType, Provider},
  correlation::{CorrelationStat, ScorePriceRow},
  movement::Horizon,
  score::Score,
  transcript::{Transcript, TranscriptMeta, TranscriptSource},
};
use chrono::{DateTime, NaiveDate, Utc};

use crate::{Error, Result};

// ─── Dates and timestamps ────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── JSON payloads ───────────────────────────────────────────────────────────

pub fn encode_json(v: &serde_json::Value) -> String { v.to_string() }

pub fn decode_json(s: &str) -> Result<serde_json::Value> {
  Ok(serde_json::from_str(s)?)
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_source(s: TranscriptSource) -> &'static str {
  match s {
    TranscriptSource::ApiNinjas => "api_ninjas",
    TranscriptSource::Finnhub => "finnhub",
    TranscriptSource::ManualUpload => "manual_upload",
  }
}

pub fn decode_source(s: &str) -> Result<TranscriptSource> {
  match s {
    "api_ninjas" => Ok(TranscriptSource::ApiNinjas),
    "finnhub" => Ok(TranscriptSource::Finnhub),
    "manual_upload" => Ok(TranscriptSource::ManualUpload),
    other => Err(Error::UnknownTag("source", other.to_string())),
  }
}

pub fn encode_provider(p: Provider) -> &'static str {
  match p {
    Provider::OpenAi => "openai",
    Provider::Xai => "xai",
    Provider::Gemini => "gemini",
  }
}

pub fn decode_provider(s: &str) -> Result<Provider> {
  match s {
    "openai" => Ok(Provider::OpenAi),
    "xai" => Ok(Provider::Xai),
    "gemini" => Ok(Provider::Gemini),
    other => Err(Error::UnknownTag("provider", other.to_string())),
  }
}

pub fn encode_analysis_type(t: AnalysisType) -> &'static str {
  match t {
    AnalysisType::Standard => "standard",
    AnalysisType::AgenticWorkflow => "agentic_workflow",
  }
}

pub fn decode_analysis_type(s: &str) -> Result<AnalysisType> {
  match s {
    "standard" => Ok(AnalysisType::Standard),
    "agentic_workflow" => Ok(AnalysisType::AgenticWorkflow),
    other => Err(Error::UnknownTag("analysis type", other.to_string())),
  }
}

fn decode_score(v: Option<i64>) -> Result<Option<Score>> {
  v.map(|raw| Score::new(raw as i32).map_err(Error::Core)).transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `transcripts` row.
pub struct RawTranscript {
  pub id:              i64,
  pub ticker:          String,
  pub company_name:    Option<String>,
  pub quarter:         i64,
  pub year:            i64,
  pub transcript_date: String,
  pub transcript_text: String,
  pub source:          String,
  pub source_metadata: Option<String>,
  pub word_count:      i64,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawTranscript {
  pub fn into_transcript(self) -> Result<Transcript> {
    Ok(Transcript {
      id:              self.id,
      ticker:          self.ticker,
      company_name:    self.company_name,
      quarter:         self.quarter as u8,
      year:            self.year as i32,
      transcript_date: decode_date(&self.transcript_date)?,
      transcript_text: self.transcript_text,
      source:          decode_source(&self.source)?,
      source_metadata: self
        .source_metadata
        .as_deref()
        .map(decode_json)
        .transpose()?,
      word_count:      self.word_count as u32,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values for the list view — no transcript text.
pub struct RawTranscriptMeta {
  pub id:              i64,
  pub ticker:          String,
  pub company_name:    Option<String>,
  pub quarter:         i64,
  pub year:            i64,
  pub transcript_date: String,
  pub source:          String,
  pub word_count:      i64,
  pub created_at:      String,
}

impl RawTranscriptMeta {
  pub fn into_meta(self) -> Result<TranscriptMeta> {
    Ok(TranscriptMeta {
      id:              self.id,
      ticker:          self.ticker,
      company_name:    self.company_name,
      quarter:         self.quarter as u8,
      year:            self.year as i32,
      transcript_date: decode_date(&self.transcript_date)?,
      source:          decode_source(&self.source)?,
      word_count:      self.word_count as u32,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from an `analyses` row.
pub struct RawAnalysis {
  pub id:                  i64,
  pub transcript_id:       Option<i64>,
  pub ticker:              String,
  pub quarter:             i64,
  pub year:                i64,
  pub analysis_date:       String,
  pub score:               Option<i64>,
  pub score_justification: Option<String>,
  pub analysis_markdown:   String,
  pub analysis_json:       Option<String>,
  pub provider:            String,
  pub model:               Option<String>,
  pub analysis_type:       String,
  pub financial_context_included: bool,
  pub processing_time_seconds:    Option<f64>,
  pub created_at:          String,
}

impl RawAnalysis {
  pub fn into_analysis(self) -> Result<Analysis> {
    Ok(Analysis {
      id:                  self.id,
      transcript_id:       self.transcript_id,
      ticker:              self.ticker,
      quarter:             self.quarter as u8,
      year:                self.year as i32,
      analysis_date:       decode_dt(&self.analysis_date)?,
      score:               decode_score(self.score)?,
      score_justification: self.score_justification,
      analysis_markdown:   self.analysis_markdown,
      analysis_json:       self
        .analysis_json
        .as_deref()
        .map(decode_json)
        .transpose()?,
      provider:            decode_provider(&self.provider)?,
      model:               self.model,
      analysis_type:       decode_analysis_type(&self.analysis_type)?,
      financial_context_included: self.financial_context_included,
      processing_time_seconds:    self.processing_time_seconds,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from the score-price join.
pub struct RawScorePriceRow {
  pub ticker:              String,
  pub quarter:             i64,
  pub year:                i64,
  pub earnings_date:       String,
  pub score:               Option<i64>,
  pub score_justification: Option<String>,
  pub provider:            String,
  pub model:               Option<String>,
  pub movement_1d_pct:  Option<f64>,
  pub movement_3d_pct:  Option<f64>,
  pub movement_5d_pct:  Option<f64>,
  pub movement_10d_pct: Option<f64>,
}

impl RawScorePriceRow {
  pub fn into_row(self) -> Result<ScorePriceRow> {
    Ok(ScorePriceRow {
      ticker:              self.ticker,
      quarter:             self.quarter as u8,
      year:                self.year as i32,
      earnings_date:       decode_date(&self.earnings_date)?,
      score:               decode_score(self.score)?,
      score_justification: self.score_justification,
      provider:            decode_provider(&self.provider)?,
      model:               self.model,
      movement_1d_pct:  self.movement_1d_pct,
      movement_3d_pct:  self.movement_3d_pct,
      movement_5d_pct:  self.movement_5d_pct,
      movement_10d_pct: self.movement_10d_pct,
    })
  }
}

/// Raw values read from a `correlations` row.
pub struct RawCorrelation {
  pub ticker:                  Option<String>,
  pub period_days:             i64,
  pub correlation_coefficient: f64,
  pub sample_size:             i64,
  pub mean_absolute_error:     Option<f64>,
  pub r_squared:               Option<f64>,
  pub direction_accuracy:      Option<f64>,
  pub analysis_date:           String,
}

impl RawCorrelation {
  pub fn into_stat(self) -> Result<CorrelationStat> {
    Ok(CorrelationStat {
      ticker:              self.ticker,
      period:              Horizon::try_from(self.period_days as u32)
        .map_err(Error::Core)?,
      coefficient:         self.correlation_coefficient,
      sample_size:         self.sample_size as u32,
      mean_absolute_error: self.mean_absolute_error,
      r_squared:           self.r_squared,
      direction_accuracy:  self.direction_accuracy,
      analysis_date:       decode_date(&self.analysis_date)?,
    })
  }
}

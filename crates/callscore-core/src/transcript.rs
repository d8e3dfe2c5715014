//! Transcript types — the raw earnings-call text and its provenance.
//!
//! A transcript is unique per (ticker, quarter, year). Re-ingestion of the
//! same key is an upsert: the stored text, date, source, and metadata are
//! replaced in place and the original row id survives.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where a transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptSource {
  ApiNinjas,
  Finnhub,
  ManualUpload,
}

/// A stored earnings-call transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
  pub id:              i64,
  pub ticker:          String,
  pub company_name:    Option<String>,
  pub quarter:         u8,
  pub year:            i32,
  pub transcript_date: NaiveDate,
  pub transcript_text: String,
  pub source:          TranscriptSource,
  /// Opaque provenance payload from the source API.
  pub source_metadata: Option<serde_json::Value>,
  /// Whitespace-delimited token count, computed by the store at write time.
  pub word_count:      u32,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

/// Transcript metadata without the (potentially very large) full text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMeta {
  pub id:              i64,
  pub ticker:          String,
  pub company_name:    Option<String>,
  pub quarter:         u8,
  pub year:            i32,
  pub transcript_date: NaiveDate,
  pub source:          TranscriptSource,
  pub word_count:      u32,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::EarningsStore::upsert_transcript`].
/// `word_count` and the timestamps are always set by the store.
#[derive(Debug, Clone)]
pub struct NewTranscript {
  pub ticker:          String,
  pub company_name:    Option<String>,
  pub quarter:         u8,
  pub year:            i32,
  pub transcript_date: NaiveDate,
  pub transcript_text: String,
  pub source:          TranscriptSource,
  pub source_metadata: Option<serde_json::Value>,
}

impl NewTranscript {
  /// Convenience constructor with the optional fields left empty.
  pub fn new(
    ticker: impl Into<String>,
    quarter: u8,
    year: i32,
    transcript_date: NaiveDate,
    transcript_text: impl Into<String>,
    source: TranscriptSource,
  ) -> Self {
    Self {
      ticker: ticker.into(),
      company_name: None,
      quarter,
      year,
      transcript_date,
      transcript_text: transcript_text.into(),
      source,
      source_metadata: None,
    }
  }
}

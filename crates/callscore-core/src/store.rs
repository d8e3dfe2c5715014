//! The `EarningsStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `callscore-store-sqlite`). The correlation engine and the CLI depend on
//! this abstraction, not on any concrete backend.
//!
//! Contract summary:
//! - transcripts and price movements are upserted on their natural keys and
//!   a key collision is never an error;
//! - analyses are insert-only and may exist without a stored transcript;
//! - every operation runs in a single transaction — a failure rolls the
//!   whole operation back;
//! - validation failures are rejected before any write, distinct from
//!   connectivity failures, which are surfaced untouched and never retried.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  analysis::{Analysis, NewAnalysis},
  correlation::{CorrelationStat, ScorePriceRow},
  movement::NewPriceMovement,
  transcript::{NewTranscript, Transcript, TranscriptMeta},
};

// ─── Observability snapshot ──────────────────────────────────────────────────

/// Row counts and extremes, for status displays. Not part of the
/// correlation logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
  pub transcripts:         u64,
  pub analyses:            u64,
  pub price_movements:     u64,
  pub distinct_tickers:    u64,
  pub latest_analysis:     Option<DateTime<Utc>>,
  pub earliest_transcript: Option<NaiveDate>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an earnings-analysis store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait EarningsStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Transcripts ───────────────────────────────────────────────────────

  /// Insert a transcript, or update it in place if (ticker, quarter, year)
  /// already exists — the original row id is preserved either way.
  /// `word_count` is computed here from the text.
  fn upsert_transcript(
    &self,
    input: NewTranscript,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Fetch a transcript by its natural key. Returns `None` if not stored.
  fn get_transcript<'a>(
    &'a self,
    ticker: &'a str,
    quarter: u8,
    year: i32,
  ) -> impl Future<Output = Result<Option<Transcript>, Self::Error>> + Send + 'a;

  /// List transcript metadata (without the full text), newest transcript
  /// date first, optionally filtered by ticker.
  fn list_transcripts<'a>(
    &'a self,
    ticker: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<TranscriptMeta>, Self::Error>> + Send + 'a;

  // ── Analyses ──────────────────────────────────────────────────────────

  /// Record an analysis run. If `transcript_id` is not supplied, it is
  /// resolved from (ticker, quarter, year) and left null when no transcript
  /// is stored. The analysis timestamp is set by the store.
  fn insert_analysis(
    &self,
    input: NewAnalysis,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Fetch an analysis by id.
  fn get_analysis(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Analysis>, Self::Error>> + Send + '_;

  /// The most recent analysis for a ticker, by analysis timestamp.
  fn get_latest_analysis<'a>(
    &'a self,
    ticker: &'a str,
  ) -> impl Future<Output = Result<Option<Analysis>, Self::Error>> + Send + 'a;

  /// List analyses, most recent first, optionally filtered and limited.
  fn list_analyses<'a>(
    &'a self,
    ticker: Option<&'a str>,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Analysis>, Self::Error>> + Send + 'a;

  // ── Price movements ───────────────────────────────────────────────────

  /// Insert or update the price row for (ticker, earnings_date). The
  /// movement percentages are always rederived from the supplied prices;
  /// a horizon without a price yields a null percentage, not zero.
  fn upsert_price_movement(
    &self,
    input: NewPriceMovement,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  // ── Correlation inputs and cache ──────────────────────────────────────

  /// The score-price join, ordered by earnings date descending. Exact-date
  /// matching: an analysis joins the price row whose `earnings_date` equals
  /// its transcript's date.
  fn score_price_rows<'a>(
    &'a self,
    ticker: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<ScorePriceRow>, Self::Error>> + Send + 'a;

  /// Persist a computed correlation statistic, upserting on
  /// (ticker, period, analysis_date).
  fn save_correlation(
    &self,
    stat: CorrelationStat,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// List persisted correlation statistics, newest analysis date first.
  fn list_correlations<'a>(
    &'a self,
    ticker: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<CorrelationStat>, Self::Error>> + Send + 'a;

  // ── Misc reads ────────────────────────────────────────────────────────

  /// Distinct tickers present in the analyses table, alphabetical.
  fn list_tickers(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Observability snapshot.
  fn stats(
    &self,
  ) -> impl Future<Output = Result<StoreStats, Self::Error>> + Send + '_;
}

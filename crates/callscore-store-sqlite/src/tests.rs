use chrono::NaiveDate;

use callscore_core::{
  analysis::{AnalysisType, NewAnalysis, Provider},
  correlation::CorrelationStat,
  movement::{Horizon, NewPriceMovement},
  score::Score,
  store::EarningsStore,
  transcript::{NewTranscript, TranscriptSource},
};

use crate::{Error, SqliteStore};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_transcript(ticker: &str, quarter: u8, year: i32) -> NewTranscript {
  NewTranscript::new(
    ticker,
    quarter,
    year,
    date(year, 7, 30),
    "Good afternoon and welcome to the earnings call.",
    TranscriptSource::ApiNinjas,
  )
}

fn sample_analysis(ticker: &str, quarter: u8, year: i32) -> NewAnalysis {
  NewAnalysis::new(
    ticker,
    quarter,
    year,
    "## Analysis\n\n**Score: [3]/5**",
    Provider::OpenAi,
    AnalysisType::Standard,
  )
}

// ─── Transcripts ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_transcript_round_trips() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  let id = store
    .upsert_transcript(sample_transcript("AAPL", 3, 2025))
    .await
    .unwrap();

  let stored = store.get_transcript("AAPL", 3, 2025).await.unwrap().unwrap();
  assert_eq!(stored.id, id);
  assert_eq!(stored.ticker, "AAPL");
  assert_eq!(stored.quarter, 3);
  assert_eq!(stored.year, 2025);
  assert_eq!(stored.transcript_date, date(2025, 7, 30));
  assert_eq!(stored.source, TranscriptSource::ApiNinjas);
  // "Good afternoon and welcome to the earnings call." is 8 words.
  assert_eq!(stored.word_count, 8);
}

#[tokio::test]
async fn upsert_transcript_updates_in_place() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  let first = store
    .upsert_transcript(sample_transcript("AAPL", 3, 2025))
    .await
    .unwrap();

  let mut replacement = sample_transcript("AAPL", 3, 2025);
  replacement.transcript_text = "Revised transcript text.".into();
  replacement.source = TranscriptSource::ManualUpload;
  let second = store.upsert_transcript(replacement).await.unwrap();

  // Same natural key: the row id survives and the content is replaced.
  assert_eq!(first, second);
  let stored = store.get_transcript("AAPL", 3, 2025).await.unwrap().unwrap();
  assert_eq!(stored.transcript_text, "Revised transcript text.");
  assert_eq!(stored.source, TranscriptSource::ManualUpload);
  assert_eq!(stored.word_count, 3);

  let all = store.list_transcripts(None).await.unwrap();
  assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn get_transcript_normalizes_ticker() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store
    .upsert_transcript(sample_transcript("  aapl ", 3, 2025))
    .await
    .unwrap();

  assert!(store.get_transcript("aapl", 3, 2025).await.unwrap().is_some());
  assert!(store.get_transcript("AAPL", 3, 2025).await.unwrap().is_some());
  assert!(store.get_transcript("MSFT", 3, 2025).await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_transcript_rejects_bad_input() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  let res = store.upsert_transcript(sample_transcript("AAPL", 5, 2025)).await;
  assert!(matches!(res, Err(Error::Core(_))));

  let res = store.upsert_transcript(sample_transcript("", 3, 2025)).await;
  assert!(matches!(res, Err(Error::Core(_))));

  let res = store.upsert_transcript(sample_transcript("AAPL", 3, 1999)).await;
  assert!(matches!(res, Err(Error::Core(_))));

  // Nothing was written.
  assert!(store.list_transcripts(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_transcripts_filters_and_orders() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  let mut older = sample_transcript("AAPL", 2, 2025);
  older.transcript_date = date(2025, 4, 30);
  store.upsert_transcript(older).await.unwrap();
  store.upsert_transcript(sample_transcript("AAPL", 3, 2025)).await.unwrap();
  store.upsert_transcript(sample_transcript("MSFT", 3, 2025)).await.unwrap();

  let aapl = store.list_transcripts(Some("AAPL")).await.unwrap();
  assert_eq!(aapl.len(), 2);
  // Newest transcript date first.
  assert_eq!(aapl[0].quarter, 3);
  assert_eq!(aapl[1].quarter, 2);

  let all = store.list_transcripts(None).await.unwrap();
  assert_eq!(all.len(), 3);
}

// ─── Analyses ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_analysis_resolves_transcript_id() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let transcript_id = store
    .upsert_transcript(sample_transcript("AAPL", 3, 2025))
    .await
    .unwrap();

  let id = store
    .insert_analysis(sample_analysis("AAPL", 3, 2025))
    .await
    .unwrap();

  let stored = store.get_analysis(id).await.unwrap().unwrap();
  assert_eq!(stored.transcript_id, Some(transcript_id));
  assert_eq!(stored.provider, Provider::OpenAi);
  assert_eq!(stored.analysis_type, AnalysisType::Standard);
}

#[tokio::test]
async fn insert_analysis_without_transcript_is_allowed() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  let id = store
    .insert_analysis(sample_analysis("NVDA", 2, 2025))
    .await
    .unwrap();

  let stored = store.get_analysis(id).await.unwrap().unwrap();
  assert_eq!(stored.transcript_id, None);
  assert_eq!(stored.ticker, "NVDA");
}

#[tokio::test]
async fn insert_analysis_preserves_extracted_score() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  let markdown = "## Analysis\n\n**Score: [-2]/5**\n\n\
                  **Justification:**\nGuidance was cut.\n";
  let extraction = callscore_extract::extract_score(markdown);

  let mut input = sample_analysis("AAPL", 3, 2025);
  input.analysis_markdown = markdown.into();
  input.score = extraction.score;
  input.score_justification = extraction.justification;
  let id = store.insert_analysis(input).await.unwrap();

  let stored = store.get_analysis(id).await.unwrap().unwrap();
  assert_eq!(stored.score.map(|s| s.value()), Some(-2));
  assert_eq!(stored.score_justification.as_deref(), Some("Guidance was cut."));
}

#[tokio::test]
async fn insert_analysis_distinguishes_missing_score_from_zero() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  let missing = store
    .insert_analysis(sample_analysis("AAPL", 1, 2025))
    .await
    .unwrap();

  let mut zeroed = sample_analysis("AAPL", 2, 2025);
  zeroed.score = Some(Score::new(0).unwrap());
  let zeroed = store.insert_analysis(zeroed).await.unwrap();

  let missing = store.get_analysis(missing).await.unwrap().unwrap();
  let zeroed = store.get_analysis(zeroed).await.unwrap().unwrap();
  assert_eq!(missing.score, None);
  assert_eq!(zeroed.score.map(|s| s.value()), Some(0));
}

#[tokio::test]
async fn insert_analysis_rejects_negative_processing_time() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  let mut input = sample_analysis("AAPL", 3, 2025);
  input.processing_time_seconds = Some(-1.0);
  let res = store.insert_analysis(input).await;
  assert!(matches!(res, Err(Error::Core(_))));
}

#[tokio::test]
async fn latest_analysis_and_listing_order() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  store.insert_analysis(sample_analysis("AAPL", 1, 2025)).await.unwrap();
  store.insert_analysis(sample_analysis("AAPL", 2, 2025)).await.unwrap();
  let last = store.insert_analysis(sample_analysis("AAPL", 3, 2025)).await.unwrap();
  store.insert_analysis(sample_analysis("MSFT", 3, 2025)).await.unwrap();

  let latest = store.get_latest_analysis("AAPL").await.unwrap().unwrap();
  assert_eq!(latest.id, last);

  let listed = store.list_analyses(Some("AAPL"), Some(2)).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].id, last);

  let all = store.list_analyses(None, None).await.unwrap();
  assert_eq!(all.len(), 4);

  assert!(store.get_latest_analysis("TSLA").await.unwrap().is_none());
}

#[tokio::test]
async fn list_tickers_is_distinct_and_sorted() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  store.insert_analysis(sample_analysis("MSFT", 3, 2025)).await.unwrap();
  store.insert_analysis(sample_analysis("AAPL", 3, 2025)).await.unwrap();
  store.insert_analysis(sample_analysis("AAPL", 2, 2025)).await.unwrap();

  let tickers = store.list_tickers().await.unwrap();
  assert_eq!(tickers, vec!["AAPL".to_string(), "MSFT".to_string()]);
}

// ─── Price movements ─────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_price_movement_derives_percentages() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  let mut input = NewPriceMovement::new("AAPL", date(2025, 7, 30), 225.0);
  input.price_after_1d = Some(230.5);
  input.price_after_3d = Some(228.0);
  store.upsert_price_movement(input).await.unwrap();

  let rows = {
    // Verify via the join — the store exposes movements only through it.
    store.upsert_transcript(sample_transcript("AAPL", 3, 2025)).await.unwrap();
    store.insert_analysis(sample_analysis("AAPL", 3, 2025)).await.unwrap();
    store.score_price_rows(Some("AAPL")).await.unwrap()
  };

  assert_eq!(rows.len(), 1);
  // Stored at full precision: the raw formula value survives the round
  // trip, with two-decimal rounding left to display code.
  let m1 = rows[0].movement_1d_pct.unwrap();
  assert!((m1 - (230.5 - 225.0) / 225.0 * 100.0).abs() < 1e-9);
  let m3 = rows[0].movement_3d_pct.unwrap();
  assert!((m3 - (228.0 - 225.0) / 225.0 * 100.0).abs() < 1e-9);
  // No 5d or 10d observation: null percentage, not zero.
  assert_eq!(rows[0].movement_5d_pct, None);
  assert_eq!(rows[0].movement_10d_pct, None);
}

#[tokio::test]
async fn upsert_price_movement_rederives_on_update() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store.upsert_transcript(sample_transcript("AAPL", 3, 2025)).await.unwrap();
  store.insert_analysis(sample_analysis("AAPL", 3, 2025)).await.unwrap();

  let mut input = NewPriceMovement::new("AAPL", date(2025, 7, 30), 100.0);
  input.price_after_5d = Some(110.0);
  let first = store.upsert_price_movement(input.clone()).await.unwrap();

  input.price_after_5d = Some(90.0);
  let second = store.upsert_price_movement(input).await.unwrap();
  assert_eq!(first, second);

  let rows = store.score_price_rows(Some("AAPL")).await.unwrap();
  assert!((rows[0].movement_5d_pct.unwrap() - -10.0).abs() < 1e-9);
}

// ─── Score-price join ────────────────────────────────────────────────────────

#[tokio::test]
async fn score_price_join_requires_exact_date() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store.upsert_transcript(sample_transcript("AAPL", 3, 2025)).await.unwrap();
  store.insert_analysis(sample_analysis("AAPL", 3, 2025)).await.unwrap();

  // Price row dated one day off the transcript date: no match.
  let off_by_one = NewPriceMovement::new("AAPL", date(2025, 7, 31), 225.0);
  store.upsert_price_movement(off_by_one).await.unwrap();
  assert!(store.score_price_rows(None).await.unwrap().is_empty());

  let exact = NewPriceMovement::new("AAPL", date(2025, 7, 30), 225.0);
  store.upsert_price_movement(exact).await.unwrap();
  let rows = store.score_price_rows(None).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].earnings_date, date(2025, 7, 30));
}

#[tokio::test]
async fn score_price_join_orders_and_filters() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  for (ticker, quarter, day) in [("AAPL", 2u8, 15u32), ("AAPL", 3, 30), ("MSFT", 3, 22)] {
    let mut t = sample_transcript(ticker, quarter, 2025);
    t.transcript_date = date(2025, 7, day);
    store.upsert_transcript(t).await.unwrap();
    store.insert_analysis(sample_analysis(ticker, quarter, 2025)).await.unwrap();
    store
      .upsert_price_movement(NewPriceMovement::new(ticker, date(2025, 7, day), 100.0))
      .await
      .unwrap();
  }

  let all = store.score_price_rows(None).await.unwrap();
  assert_eq!(all.len(), 3);
  // Newest earnings date first.
  assert_eq!(all[0].earnings_date, date(2025, 7, 30));
  assert_eq!(all[2].earnings_date, date(2025, 7, 15));

  let aapl = store.score_price_rows(Some("AAPL")).await.unwrap();
  assert_eq!(aapl.len(), 2);
  assert!(aapl.iter().all(|r| r.ticker == "AAPL"));
}

// ─── Correlation cache ───────────────────────────────────────────────────────

fn sample_stat(ticker: Option<&str>) -> CorrelationStat {
  CorrelationStat {
    ticker:              ticker.map(str::to_owned),
    period:              Horizon::D5,
    coefficient:         0.42,
    sample_size:         12,
    mean_absolute_error: Some(3.1),
    r_squared:           Some(0.17),
    direction_accuracy:  Some(66.7),
    analysis_date:       date(2025, 8, 25),
  }
}

#[tokio::test]
async fn save_correlation_upserts_per_ticker_and_aggregate() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  let aapl_id = store.save_correlation(sample_stat(Some("AAPL"))).await.unwrap();
  let agg_id = store.save_correlation(sample_stat(None)).await.unwrap();
  assert_ne!(aapl_id, agg_id);

  // Re-saving the aggregate for the same day replaces it rather than
  // stacking a second NULL-ticker row.
  let mut updated = sample_stat(None);
  updated.coefficient = 0.9;
  let again = store.save_correlation(updated).await.unwrap();
  assert_eq!(again, agg_id);

  let all = store.list_correlations(None).await.unwrap();
  assert_eq!(all.len(), 2);
  let agg = all.iter().find(|s| s.ticker.is_none()).unwrap();
  assert_eq!(agg.coefficient, 0.9);

  let aapl = store.list_correlations(Some("AAPL")).await.unwrap();
  assert_eq!(aapl.len(), 1);
  assert_eq!(aapl[0].period, Horizon::D5);
  assert_eq!(aapl[0].sample_size, 12);
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_snapshot_counts() {
  let store = SqliteStore::open_in_memory().await.unwrap();

  let empty = store.stats().await.unwrap();
  assert_eq!(empty.transcripts, 0);
  assert_eq!(empty.latest_analysis, None);
  assert_eq!(empty.earliest_transcript, None);

  store.upsert_transcript(sample_transcript("AAPL", 3, 2025)).await.unwrap();
  store.insert_analysis(sample_analysis("AAPL", 3, 2025)).await.unwrap();
  store.insert_analysis(sample_analysis("MSFT", 3, 2025)).await.unwrap();
  store
    .upsert_price_movement(NewPriceMovement::new("AAPL", date(2025, 7, 30), 225.0))
    .await
    .unwrap();

  let stats = store.stats().await.unwrap();
  assert_eq!(stats.transcripts, 1);
  assert_eq!(stats.analyses, 2);
  assert_eq!(stats.price_movements, 1);
  assert_eq!(stats.distinct_tickers, 2);
  assert!(stats.latest_analysis.is_some());
  assert_eq!(stats.earliest_transcript, Some(date(2025, 7, 30)));
}

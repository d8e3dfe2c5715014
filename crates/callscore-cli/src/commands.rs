//! One async function per subcommand. These are thin wrappers: read input,
//! call into the library crates, print results.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use callscore_context::{correlation_report, FinancialSummary};
use callscore_core::{
  analysis::{AnalysisType, NewAnalysis, Provider},
  movement::{Horizon, NewPriceMovement},
  score::movement_band,
  store::EarningsStore,
  transcript::{NewTranscript, TranscriptSource},
};
use callscore_correlate::{fmt_coefficient, fmt_pct, summarize};
use callscore_store_sqlite::SqliteStore;

// ─── Parse helpers ────────────────────────────────────────────────────────────

fn parse_source(s: &str) -> anyhow::Result<TranscriptSource> {
  match s {
    "api_ninjas" => Ok(TranscriptSource::ApiNinjas),
    "finnhub" => Ok(TranscriptSource::Finnhub),
    "manual_upload" => Ok(TranscriptSource::ManualUpload),
    other => bail!(
      "unknown source {other:?}; expected api_ninjas, finnhub, or manual_upload"
    ),
  }
}

fn parse_provider(s: &str) -> anyhow::Result<Provider> {
  match s {
    "openai" => Ok(Provider::OpenAi),
    "xai" => Ok(Provider::Xai),
    "gemini" => Ok(Provider::Gemini),
    other => bail!("unknown provider {other:?}; expected openai, xai, or gemini"),
  }
}

fn parse_analysis_type(s: &str) -> anyhow::Result<AnalysisType> {
  match s {
    "standard" => Ok(AnalysisType::Standard),
    "agentic_workflow" => Ok(AnalysisType::AgenticWorkflow),
    other => bail!(
      "unknown analysis type {other:?}; expected standard or agentic_workflow"
    ),
  }
}

fn provider_tag(p: Provider) -> &'static str {
  match p {
    Provider::OpenAi => "openai",
    Provider::Xai => "xai",
    Provider::Gemini => "gemini",
  }
}

// ─── Transcripts ─────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub async fn ingest_transcript(
  store: &SqliteStore,
  file: &Path,
  ticker: &str,
  quarter: u8,
  year: i32,
  date: NaiveDate,
  source: &str,
  company: Option<String>,
) -> anyhow::Result<()> {
  let text = std::fs::read_to_string(file)
    .with_context(|| format!("reading transcript file {}", file.display()))?;
  let source = parse_source(source)?;

  let mut input = NewTranscript::new(ticker, quarter, year, date, text, source);
  input.company_name = company;

  let id = store.upsert_transcript(input).await?;
  tracing::info!(ticker, quarter, year, id, "stored transcript");
  println!("stored transcript {ticker} Q{quarter} {year} (id {id})");
  Ok(())
}

/// One entry of the batch-ingest manifest.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
  file:    PathBuf,
  ticker:  String,
  quarter: u8,
  year:    i32,
  date:    NaiveDate,
  source:  String,
  company: Option<String>,
}

pub async fn ingest_batch(
  store: &SqliteStore,
  manifest: &Path,
) -> anyhow::Result<()> {
  let raw = std::fs::read_to_string(manifest)
    .with_context(|| format!("reading manifest {}", manifest.display()))?;
  let entries: Vec<ManifestEntry> =
    serde_json::from_str(&raw).context("parsing manifest JSON")?;

  let total = entries.len();
  let mut stored = 0usize;

  for entry in entries {
    let result = ingest_transcript(
      store,
      &entry.file,
      &entry.ticker,
      entry.quarter,
      entry.year,
      entry.date,
      &entry.source,
      entry.company,
    )
    .await;

    match result {
      Ok(()) => stored += 1,
      // One bad entry must not sink the rest of the batch.
      Err(err) => {
        tracing::warn!(
          ticker = %entry.ticker,
          file = %entry.file.display(),
          error = %err,
          "skipping manifest entry"
        );
      }
    }
  }

  println!("ingested {stored}/{total} transcripts");
  Ok(())
}

// ─── Analyses ────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub async fn record_analysis(
  store: &SqliteStore,
  file: &Path,
  ticker: &str,
  quarter: u8,
  year: i32,
  provider: &str,
  model: Option<String>,
  analysis_type: &str,
  with_context: bool,
  processing_time: Option<f64>,
) -> anyhow::Result<()> {
  let markdown = std::fs::read_to_string(file)
    .with_context(|| format!("reading analysis file {}", file.display()))?;
  let provider = parse_provider(provider)?;
  let analysis_type = parse_analysis_type(analysis_type)?;

  let extraction = callscore_extract::extract_score(&markdown);

  let mut input =
    NewAnalysis::new(ticker, quarter, year, markdown, provider, analysis_type);
  input.score = extraction.score;
  input.score_justification = extraction.justification;
  input.model = model;
  input.financial_context_included = with_context;
  input.processing_time_seconds = processing_time;

  let id = store.insert_analysis(input).await?;

  // A parse miss is a valid outcome, reported distinctly from a score of 0.
  match extraction.score {
    Some(score) => {
      println!(
        "recorded analysis (id {id}): score {score} ({}), expected move {}",
        score.label(),
        movement_band(score.value()),
      );
    }
    None => {
      tracing::warn!(ticker, id, "no extractable score in analysis");
      println!("recorded analysis (id {id}): no extractable score, stored without one");
    }
  }
  Ok(())
}

// ─── Prices ──────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub async fn record_prices(
  store: &SqliteStore,
  ticker: &str,
  date: NaiveDate,
  before: f64,
  after: [Option<f64>; 4],
  volume_before: Option<i64>,
  volume_after_1d: Option<i64>,
  price_source: String,
) -> anyhow::Result<()> {
  let [after_1d, after_3d, after_5d, after_10d] = after;
  let input = NewPriceMovement {
    ticker: ticker.to_owned(),
    earnings_date: date,
    price_before: before,
    price_after_1d: after_1d,
    price_after_3d: after_3d,
    price_after_5d: after_5d,
    price_after_10d: after_10d,
    volume_before,
    volume_after_1d,
    data_source: price_source,
  };

  let id = store.upsert_price_movement(input).await?;
  tracing::info!(ticker, %date, id, "stored price movement");
  println!("stored price movement {ticker} {date} (id {id})");
  Ok(())
}

// ─── Correlation ─────────────────────────────────────────────────────────────

pub async fn correlate(
  store: &SqliteStore,
  ticker: Option<&str>,
  period: u32,
  save: bool,
) -> anyhow::Result<()> {
  let horizon = Horizon::try_from(period)
    .map_err(|_| anyhow::anyhow!("unsupported period {period}; expected 1, 3, 5, or 10"))?;

  let summary = summarize(store, ticker, horizon).await?;
  let scope = ticker.unwrap_or("all tickers");

  if summary.insufficient_data() {
    println!(
      "insufficient data for {scope} over {horizon}: {} matched score-price pair(s), need at least 2",
      summary.sample_size
    );
    return Ok(());
  }

  println!("correlation for {scope} over {horizon}");
  println!("  coefficient:        {}", fmt_coefficient(summary.coefficient));
  println!("  sample size:        {}", summary.sample_size);
  match summary.direction_accuracy {
    Some(acc) => println!("  direction accuracy: {}", fmt_pct(acc)),
    None => println!("  direction accuracy: n/a"),
  }
  if let Some(mae) = summary.mean_absolute_error {
    println!("  mean abs error:     {mae:.2} pct points");
  }
  if let Some(r2) = summary.r_squared {
    println!("  r squared:          {}", fmt_coefficient(r2));
  }

  println!("  score buckets:");
  for bucket in &summary.buckets {
    match (bucket.mean_movement, bucket.std_dev) {
      (Some(mean), Some(std)) => println!(
        "    {:<24} n={:<3} mean {:+.2}% std {:.2}",
        bucket.label, bucket.count, mean, std
      ),
      (Some(mean), None) => println!(
        "    {:<24} n={:<3} mean {:+.2}%",
        bucket.label, bucket.count, mean
      ),
      _ => println!("    {:<24} n=0", bucket.label),
    }
  }

  if save {
    let stat = summary.into_stat(Utc::now().date_naive());
    let id = store.save_correlation(stat).await?;
    println!("saved correlation statistic (id {id})");
  }
  Ok(())
}

// ─── Report ──────────────────────────────────────────────────────────────────

pub fn report(
  ticker: &str,
  quarter: u8,
  year: i32,
  summary_path: &Path,
) -> anyhow::Result<()> {
  let raw = std::fs::read_to_string(summary_path).with_context(|| {
    format!("reading financial summary {}", summary_path.display())
  })?;
  let summary: FinancialSummary =
    serde_json::from_str(&raw).context("parsing financial summary JSON")?;

  println!("{}", correlation_report(ticker, quarter, year, &summary));
  Ok(())
}

// ─── Misc reads ──────────────────────────────────────────────────────────────

pub async fn tickers(store: &SqliteStore) -> anyhow::Result<()> {
  for ticker in store.list_tickers().await? {
    println!("{ticker}");
  }
  Ok(())
}

pub async fn stats(store: &SqliteStore) -> anyhow::Result<()> {
  let stats = store.stats().await?;
  println!("transcripts:      {}", stats.transcripts);
  println!("analyses:         {}", stats.analyses);
  println!("price movements:  {}", stats.price_movements);
  println!("distinct tickers: {}", stats.distinct_tickers);
  match stats.latest_analysis {
    Some(ts) => println!("latest analysis:  {ts}"),
    None => println!("latest analysis:  none"),
  }
  match stats.earliest_transcript {
    Some(d) => println!("earliest call:    {d}"),
    None => println!("earliest call:    none"),
  }
  Ok(())
}

// ─── CSV export ──────────────────────────────────────────────────────────────

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
  if value.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_owned()
  }
}

fn csv_opt_f64(value: Option<f64>) -> String {
  value.map(|v| v.to_string()).unwrap_or_default()
}

pub async fn export(store: &SqliteStore) -> anyhow::Result<()> {
  let rows = store.score_price_rows(None).await?;

  println!(
    "ticker,quarter,year,earnings_date,score,score_justification,provider,\
     model,movement_1d_pct,movement_3d_pct,movement_5d_pct,movement_10d_pct"
  );
  for row in rows {
    let fields = [
      csv_field(&row.ticker),
      row.quarter.to_string(),
      row.year.to_string(),
      row.earnings_date.to_string(),
      row.score.map(|s| s.value().to_string()).unwrap_or_default(),
      csv_field(row.score_justification.as_deref().unwrap_or_default()),
      provider_tag(row.provider).to_owned(),
      csv_field(row.model.as_deref().unwrap_or_default()),
      csv_opt_f64(row.movement_1d_pct),
      csv_opt_f64(row.movement_3d_pct),
      csv_opt_f64(row.movement_5d_pct),
      csv_opt_f64(row.movement_10d_pct),
    ];
    println!("{}", fields.join(","));
  }
  Ok(())
}

//! `callscore` — CLI for the earnings-call score store.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, and dispatches to one subcommand per operation: transcript
//! ingestion, analysis recording, price recording, correlation, reporting,
//! and CSV export.

mod commands;

use std::path::PathBuf;

use anyhow::Context as _;
use callscore_store_sqlite::SqliteStore;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "callscore", about = "Earnings-call score and price store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Open (or create) the store and initialise its schema.
  Init,

  /// Ingest one transcript file.
  IngestTranscript {
    /// Path to the transcript text file.
    file:   PathBuf,
    #[arg(long)]
    ticker: String,
    #[arg(long)]
    quarter: u8,
    #[arg(long)]
    year:   i32,
    /// Earnings-call date, YYYY-MM-DD.
    #[arg(long)]
    date:   NaiveDate,
    /// Transcript source: api_ninjas, finnhub, or manual_upload.
    #[arg(long, default_value = "manual_upload")]
    source: String,
    #[arg(long)]
    company: Option<String>,
  },

  /// Ingest many transcripts from a JSON manifest; failures are logged
  /// per item and do not abort the run.
  IngestBatch {
    /// JSON array of {file, ticker, quarter, year, date, source, company?}.
    #[arg(long)]
    manifest: PathBuf,
  },

  /// Record an LLM analysis from a markdown file, extracting its score.
  RecordAnalysis {
    /// Path to the analysis markdown file.
    file:   PathBuf,
    #[arg(long)]
    ticker: String,
    #[arg(long)]
    quarter: u8,
    #[arg(long)]
    year:   i32,
    /// LLM provider: openai, xai, or gemini.
    #[arg(long)]
    provider: String,
    #[arg(long)]
    model:  Option<String>,
    /// Analysis type: standard or agentic_workflow.
    #[arg(long, default_value = "standard")]
    analysis_type: String,
    /// Whether financial context was injected into the prompt.
    #[arg(long)]
    with_context: bool,
    #[arg(long)]
    processing_time: Option<f64>,
  },

  /// Record prices around an earnings date; movement percentages are
  /// derived in the store.
  RecordPrices {
    #[arg(long)]
    ticker: String,
    /// Earnings date, YYYY-MM-DD.
    #[arg(long)]
    date:   NaiveDate,
    #[arg(long)]
    before: f64,
    #[arg(long)]
    after_1d: Option<f64>,
    #[arg(long)]
    after_3d: Option<f64>,
    #[arg(long)]
    after_5d: Option<f64>,
    #[arg(long)]
    after_10d: Option<f64>,
    #[arg(long)]
    volume_before: Option<i64>,
    #[arg(long)]
    volume_after_1d: Option<i64>,
    #[arg(long, default_value = callscore_core::movement::DEFAULT_PRICE_SOURCE)]
    price_source: String,
  },

  /// Correlate scores against realized movements.
  Correlate {
    /// Restrict to one ticker; omit for all tickers.
    ticker: Option<String>,
    /// Horizon in trading days: 1, 3, 5, or 10.
    #[arg(long, default_value_t = 5)]
    period: u32,
    /// Persist the computed statistic.
    #[arg(long)]
    save:   bool,
  },

  /// Render the markdown correlation report from a financial-summary file.
  Report {
    #[arg(long)]
    ticker: String,
    #[arg(long)]
    quarter: u8,
    #[arg(long)]
    year:   i32,
    /// JSON file containing the financial summary.
    #[arg(long)]
    summary: PathBuf,
  },

  /// List distinct tickers with stored analyses.
  Tickers,

  /// Show store row counts and extremes.
  Stats,

  /// Export the score-price join as CSV on stdout.
  Export,
}

// ─── Config ───────────────────────────────────────────────────────────────────

/// Shape of `config.toml`; every key can also come from `CALLSCORE_*`.
#[derive(Debug, Clone, Deserialize)]
struct CliConfig {
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
}

fn default_store_path() -> PathBuf { PathBuf::from("callscore.db") }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CALLSCORE"))
    .build()
    .context("failed to read config file")?;

  let cfg: CliConfig = settings
    .try_deserialize()
    .context("failed to deserialise CliConfig")?;

  // Opened per subcommand: `report` is store-free and must not create a
  // database file as a side effect.
  let open_store = || async {
    SqliteStore::open(&cfg.store_path)
      .await
      .with_context(|| format!("failed to open store at {:?}", cfg.store_path))
  };

  match cli.command {
    Command::Init => {
      // Opening runs schema initialisation.
      open_store().await?;
      println!("store ready at {}", cfg.store_path.display());
      Ok(())
    }
    Command::IngestTranscript {
      file,
      ticker,
      quarter,
      year,
      date,
      source,
      company,
    } => {
      let store = open_store().await?;
      commands::ingest_transcript(
        &store, &file, &ticker, quarter, year, date, &source, company,
      )
      .await
    }
    Command::IngestBatch { manifest } => {
      let store = open_store().await?;
      commands::ingest_batch(&store, &manifest).await
    }
    Command::RecordAnalysis {
      file,
      ticker,
      quarter,
      year,
      provider,
      model,
      analysis_type,
      with_context,
      processing_time,
    } => {
      let store = open_store().await?;
      commands::record_analysis(
        &store,
        &file,
        &ticker,
        quarter,
        year,
        &provider,
        model,
        &analysis_type,
        with_context,
        processing_time,
      )
      .await
    }
    Command::RecordPrices {
      ticker,
      date,
      before,
      after_1d,
      after_3d,
      after_5d,
      after_10d,
      volume_before,
      volume_after_1d,
      price_source,
    } => {
      let store = open_store().await?;
      commands::record_prices(
        &store,
        &ticker,
        date,
        before,
        [after_1d, after_3d, after_5d, after_10d],
        volume_before,
        volume_after_1d,
        price_source,
      )
      .await
    }
    Command::Correlate { ticker, period, save } => {
      let store = open_store().await?;
      commands::correlate(&store, ticker.as_deref(), period, save).await
    }
    Command::Report { ticker, quarter, year, summary } => {
      commands::report(&ticker, quarter, year, &summary)
    }
    Command::Tickers => commands::tickers(&open_store().await?).await,
    Command::Stats => commands::stats(&open_store().await?).await,
    Command::Export => commands::export(&open_store().await?).await,
  }
}

//! [`SqliteStore`] — the SQLite implementation of [`EarningsStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use callscore_core::{
  analysis::{Analysis, NewAnalysis},
  correlation::{CorrelationStat, ScorePriceRow},
  movement::{movement_pct, NewPriceMovement},
  store::{EarningsStore, StoreStats},
  transcript::{NewTranscript, Transcript, TranscriptMeta},
  validate,
};

use crate::{
  encode::{
    decode_date, decode_dt, encode_date, encode_dt, encode_analysis_type,
    encode_json, encode_provider, encode_source, RawAnalysis, RawCorrelation,
    RawScorePriceRow, RawTranscript, RawTranscriptMeta,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn transcript_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTranscript> {
  Ok(RawTranscript {
    id:              row.get(0)?,
    ticker:          row.get(1)?,
    company_name:    row.get(2)?,
    quarter:         row.get(3)?,
    year:            row.get(4)?,
    transcript_date: row.get(5)?,
    transcript_text: row.get(6)?,
    source:          row.get(7)?,
    source_metadata: row.get(8)?,
    word_count:      row.get(9)?,
    created_at:      row.get(10)?,
    updated_at:      row.get(11)?,
  })
}

const TRANSCRIPT_COLS: &str = "id, ticker, company_name, quarter, year, \
   transcript_date, transcript_text, source, source_metadata, word_count, \
   created_at, updated_at";

fn meta_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTranscriptMeta> {
  Ok(RawTranscriptMeta {
    id:              row.get(0)?,
    ticker:          row.get(1)?,
    company_name:    row.get(2)?,
    quarter:         row.get(3)?,
    year:            row.get(4)?,
    transcript_date: row.get(5)?,
    source:          row.get(6)?,
    word_count:      row.get(7)?,
    created_at:      row.get(8)?,
  })
}

const META_COLS: &str = "id, ticker, company_name, quarter, year, \
   transcript_date, source, word_count, created_at";

fn analysis_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAnalysis> {
  Ok(RawAnalysis {
    id:                  row.get(0)?,
    transcript_id:       row.get(1)?,
    ticker:              row.get(2)?,
    quarter:             row.get(3)?,
    year:                row.get(4)?,
    analysis_date:       row.get(5)?,
    score:               row.get(6)?,
    score_justification: row.get(7)?,
    analysis_markdown:   row.get(8)?,
    analysis_json:       row.get(9)?,
    provider:            row.get(10)?,
    model:               row.get(11)?,
    analysis_type:       row.get(12)?,
    financial_context_included: row.get(13)?,
    processing_time_seconds:    row.get(14)?,
    created_at:          row.get(15)?,
  })
}

const ANALYSIS_COLS: &str = "id, transcript_id, ticker, quarter, year, \
   analysis_date, score, score_justification, analysis_markdown, \
   analysis_json, provider, model, analysis_type, \
   financial_context_included, processing_time_seconds, created_at";

fn correlation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCorrelation> {
  Ok(RawCorrelation {
    ticker:                  row.get(0)?,
    period_days:             row.get(1)?,
    correlation_coefficient: row.get(2)?,
    sample_size:             row.get(3)?,
    mean_absolute_error:     row.get(4)?,
    r_squared:               row.get(5)?,
    direction_accuracy:      row.get(6)?,
    analysis_date:           row.get(7)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An earnings store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl EarningsStore for SqliteStore {
  type Error = Error;

  // ── Transcripts ───────────────────────────────────────────────────────────

  async fn upsert_transcript(&self, input: NewTranscript) -> Result<i64> {
    let ticker = validate::ticker(&input.ticker)?;
    validate::quarter(input.quarter)?;
    validate::year(input.year)?;

    let word_count = input.transcript_text.split_whitespace().count() as i64;
    let date_str   = encode_date(input.transcript_date);
    let source_str = encode_source(input.source);
    let meta_str   = input.source_metadata.as_ref().map(encode_json);
    let now_str    = encode_dt(Utc::now());

    let quarter = input.quarter as i64;
    let year = input.year as i64;

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO transcripts
             (ticker, company_name, quarter, year, transcript_date,
              transcript_text, source, source_metadata, word_count,
              created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
           ON CONFLICT (ticker, quarter, year) DO UPDATE SET
             company_name    = excluded.company_name,
             transcript_date = excluded.transcript_date,
             transcript_text = excluded.transcript_text,
             source          = excluded.source,
             source_metadata = excluded.source_metadata,
             word_count      = excluded.word_count,
             updated_at      = excluded.updated_at",
          rusqlite::params![
            ticker,
            input.company_name,
            quarter,
            year,
            date_str,
            input.transcript_text,
            source_str,
            meta_str,
            word_count,
            now_str,
          ],
        )?;

        // last_insert_rowid is wrong after a conflict-update, so resolve the
        // surviving id by natural key.
        let id: i64 = tx.query_row(
          "SELECT id FROM transcripts
           WHERE ticker = ?1 AND quarter = ?2 AND year = ?3",
          rusqlite::params![ticker, quarter, year],
          |r| r.get(0),
        )?;

        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(id)
  }

  async fn get_transcript(
    &self,
    ticker: &str,
    quarter: u8,
    year: i32,
  ) -> Result<Option<Transcript>> {
    let ticker = validate::ticker(ticker)?;
    let quarter = quarter as i64;
    let year = year as i64;

    let sql = format!(
      "SELECT {TRANSCRIPT_COLS} FROM transcripts
       WHERE ticker = ?1 AND quarter = ?2 AND year = ?3"
    );

    let raw: Option<RawTranscript> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params![ticker, quarter, year],
              transcript_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTranscript::into_transcript).transpose()
  }

  async fn list_transcripts(
    &self,
    ticker: Option<&str>,
  ) -> Result<Vec<TranscriptMeta>> {
    let ticker = ticker.map(validate::ticker).transpose()?;

    let raws: Vec<RawTranscriptMeta> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(t) = ticker {
          let sql = format!(
            "SELECT {META_COLS} FROM transcripts
             WHERE ticker = ?1
             ORDER BY transcript_date DESC"
          );
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map(rusqlite::params![t], meta_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let sql = format!(
            "SELECT {META_COLS} FROM transcripts
             ORDER BY transcript_date DESC"
          );
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map([], meta_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTranscriptMeta::into_meta).collect()
  }

  // ── Analyses ──────────────────────────────────────────────────────────────

  async fn insert_analysis(&self, input: NewAnalysis) -> Result<i64> {
    let ticker = validate::ticker(&input.ticker)?;
    validate::quarter(input.quarter)?;
    validate::year(input.year)?;
    validate::processing_time(input.processing_time_seconds)?;

    let quarter = input.quarter as i64;
    let year = input.year as i64;
    let score = input.score.map(|s| s.value() as i64);
    let json_str = input.analysis_json.as_ref().map(encode_json);
    let provider_str = encode_provider(input.provider);
    let type_str = encode_analysis_type(input.analysis_type);
    let now_str = encode_dt(Utc::now());

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let transcript_id: Option<i64> = match input.transcript_id {
          Some(id) => Some(id),
          None => tx
            .query_row(
              "SELECT id FROM transcripts
               WHERE ticker = ?1 AND quarter = ?2 AND year = ?3",
              rusqlite::params![ticker, quarter, year],
              |r| r.get(0),
            )
            .optional()?,
        };

        tx.execute(
          "INSERT INTO analyses
             (transcript_id, ticker, quarter, year, analysis_date, score,
              score_justification, analysis_markdown, analysis_json,
              provider, model, analysis_type, financial_context_included,
              processing_time_seconds, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                   ?14, ?5)",
          rusqlite::params![
            transcript_id,
            ticker,
            quarter,
            year,
            now_str,
            score,
            input.score_justification,
            input.analysis_markdown,
            json_str,
            provider_str,
            input.model,
            type_str,
            input.financial_context_included,
            input.processing_time_seconds,
          ],
        )?;

        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(id)
  }

  async fn get_analysis(&self, id: i64) -> Result<Option<Analysis>> {
    let sql = format!("SELECT {ANALYSIS_COLS} FROM analyses WHERE id = ?1");

    let raw: Option<RawAnalysis> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], analysis_from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAnalysis::into_analysis).transpose()
  }

  async fn get_latest_analysis(&self, ticker: &str) -> Result<Option<Analysis>> {
    let ticker = validate::ticker(ticker)?;
    let sql = format!(
      "SELECT {ANALYSIS_COLS} FROM analyses
       WHERE ticker = ?1
       ORDER BY analysis_date DESC, id DESC
       LIMIT 1"
    );

    let raw: Option<RawAnalysis> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![ticker], analysis_from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAnalysis::into_analysis).transpose()
  }

  async fn list_analyses(
    &self,
    ticker: Option<&str>,
    limit: Option<usize>,
  ) -> Result<Vec<Analysis>> {
    let ticker = ticker.map(validate::ticker).transpose()?;
    // SQLite treats a negative LIMIT as unlimited.
    let limit = limit.map(|n| n as i64).unwrap_or(-1);

    let raws: Vec<RawAnalysis> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(t) = ticker {
          let sql = format!(
            "SELECT {ANALYSIS_COLS} FROM analyses
             WHERE ticker = ?1
             ORDER BY analysis_date DESC, id DESC
             LIMIT ?2"
          );
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map(rusqlite::params![t, limit], analysis_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let sql = format!(
            "SELECT {ANALYSIS_COLS} FROM analyses
             ORDER BY analysis_date DESC, id DESC
             LIMIT ?1"
          );
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map(rusqlite::params![limit], analysis_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnalysis::into_analysis).collect()
  }

  // ── Price movements ───────────────────────────────────────────────────────

  async fn upsert_price_movement(&self, input: NewPriceMovement) -> Result<i64> {
    let ticker = validate::ticker(&input.ticker)?;
    let date_str = encode_date(input.earnings_date);
    let now_str = encode_dt(Utc::now());

    let m1  = movement_pct(input.price_before, input.price_after_1d);
    let m3  = movement_pct(input.price_before, input.price_after_3d);
    let m5  = movement_pct(input.price_before, input.price_after_5d);
    let m10 = movement_pct(input.price_before, input.price_after_10d);

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO price_movements
             (ticker, earnings_date, price_before, price_after_1d,
              price_after_3d, price_after_5d, price_after_10d,
              movement_1d_pct, movement_3d_pct, movement_5d_pct,
              movement_10d_pct, volume_before, volume_after_1d,
              data_source, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                   ?14, ?15, ?15)
           ON CONFLICT (ticker, earnings_date) DO UPDATE SET
             price_before     = excluded.price_before,
             price_after_1d   = excluded.price_after_1d,
             price_after_3d   = excluded.price_after_3d,
             price_after_5d   = excluded.price_after_5d,
             price_after_10d  = excluded.price_after_10d,
             movement_1d_pct  = excluded.movement_1d_pct,
             movement_3d_pct  = excluded.movement_3d_pct,
             movement_5d_pct  = excluded.movement_5d_pct,
             movement_10d_pct = excluded.movement_10d_pct,
             volume_before    = excluded.volume_before,
             volume_after_1d  = excluded.volume_after_1d,
             data_source      = excluded.data_source,
             updated_at       = excluded.updated_at",
          rusqlite::params![
            ticker,
            date_str,
            input.price_before,
            input.price_after_1d,
            input.price_after_3d,
            input.price_after_5d,
            input.price_after_10d,
            m1,
            m3,
            m5,
            m10,
            input.volume_before,
            input.volume_after_1d,
            input.data_source,
            now_str,
          ],
        )?;

        let id: i64 = tx.query_row(
          "SELECT id FROM price_movements
           WHERE ticker = ?1 AND earnings_date = ?2",
          rusqlite::params![ticker, date_str],
          |r| r.get(0),
        )?;

        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(id)
  }

  // ── Correlation inputs and cache ──────────────────────────────────────────

  async fn score_price_rows(
    &self,
    ticker: Option<&str>,
  ) -> Result<Vec<ScorePriceRow>> {
    let ticker = ticker.map(validate::ticker).transpose()?;

    const COLS: &str = "a.ticker, a.quarter, a.year, p.earnings_date, \
       a.score, a.score_justification, a.provider, a.model, \
       p.movement_1d_pct, p.movement_3d_pct, p.movement_5d_pct, \
       p.movement_10d_pct";
    // Exact-date join: an analysis matches the price row recorded for its
    // transcript's date, never a nearby one.
    const JOIN: &str = "FROM analyses a \
       JOIN transcripts t ON t.ticker = a.ticker \
         AND t.quarter = a.quarter AND t.year = a.year \
       JOIN price_movements p ON p.ticker = a.ticker \
         AND p.earnings_date = t.transcript_date";

    let raws: Vec<RawScorePriceRow> = self
      .conn
      .call(move |conn| {
        let mapper = |row: &rusqlite::Row<'_>| {
          Ok(RawScorePriceRow {
            ticker:              row.get(0)?,
            quarter:             row.get(1)?,
            year:                row.get(2)?,
            earnings_date:       row.get(3)?,
            score:               row.get(4)?,
            score_justification: row.get(5)?,
            provider:            row.get(6)?,
            model:               row.get(7)?,
            movement_1d_pct:  row.get(8)?,
            movement_3d_pct:  row.get(9)?,
            movement_5d_pct:  row.get(10)?,
            movement_10d_pct: row.get(11)?,
          })
        };

        let rows = if let Some(t) = ticker {
          let sql = format!(
            "SELECT {COLS} {JOIN}
             WHERE a.ticker = ?1
             ORDER BY p.earnings_date DESC"
          );
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map(rusqlite::params![t], mapper)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let sql =
            format!("SELECT {COLS} {JOIN} ORDER BY p.earnings_date DESC");
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map([], mapper)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawScorePriceRow::into_row).collect()
  }

  async fn save_correlation(&self, stat: CorrelationStat) -> Result<i64> {
    let ticker = stat.ticker.as_deref().map(validate::ticker).transpose()?;
    let period = stat.period.days() as i64;
    let date_str = encode_date(stat.analysis_date);
    let now_str = encode_dt(Utc::now());
    let sample_size = stat.sample_size as i64;

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // `IS` instead of `=` so a NULL ticker (the aggregate run) matches
        // its own prior row.
        let updated = tx.execute(
          "UPDATE correlations SET
             correlation_coefficient = ?4,
             sample_size             = ?5,
             mean_absolute_error     = ?6,
             r_squared               = ?7,
             direction_accuracy      = ?8
           WHERE ticker IS ?1 AND period_days = ?2 AND analysis_date = ?3",
          rusqlite::params![
            ticker,
            period,
            date_str,
            stat.coefficient,
            sample_size,
            stat.mean_absolute_error,
            stat.r_squared,
            stat.direction_accuracy,
          ],
        )?;

        if updated == 0 {
          tx.execute(
            "INSERT INTO correlations
               (ticker, period_days, correlation_coefficient, sample_size,
                mean_absolute_error, r_squared, direction_accuracy,
                analysis_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
              ticker,
              period,
              stat.coefficient,
              sample_size,
              stat.mean_absolute_error,
              stat.r_squared,
              stat.direction_accuracy,
              date_str,
              now_str,
            ],
          )?;
        }

        let id: i64 = tx.query_row(
          "SELECT id FROM correlations
           WHERE ticker IS ?1 AND period_days = ?2 AND analysis_date = ?3",
          rusqlite::params![ticker, period, date_str],
          |r| r.get(0),
        )?;

        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(id)
  }

  async fn list_correlations(
    &self,
    ticker: Option<&str>,
  ) -> Result<Vec<CorrelationStat>> {
    let ticker = ticker.map(validate::ticker).transpose()?;

    const COLS: &str = "ticker, period_days, correlation_coefficient, \
       sample_size, mean_absolute_error, r_squared, direction_accuracy, \
       analysis_date";

    let raws: Vec<RawCorrelation> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(t) = ticker {
          let sql = format!(
            "SELECT {COLS} FROM correlations
             WHERE ticker = ?1
             ORDER BY analysis_date DESC, period_days ASC"
          );
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map(rusqlite::params![t], correlation_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let sql = format!(
            "SELECT {COLS} FROM correlations
             ORDER BY analysis_date DESC, period_days ASC"
          );
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map([], correlation_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCorrelation::into_stat).collect()
  }

  // ── Misc reads ────────────────────────────────────────────────────────────

  async fn list_tickers(&self) -> Result<Vec<String>> {
    let tickers = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT DISTINCT ticker FROM analyses ORDER BY ticker")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(tickers)
  }

  async fn stats(&self) -> Result<StoreStats> {
    let (transcripts, analyses, movements, tickers, latest, earliest) = self
      .conn
      .call(|conn| {
        let transcripts: i64 =
          conn.query_row("SELECT COUNT(*) FROM transcripts", [], |r| r.get(0))?;
        let analyses: i64 =
          conn.query_row("SELECT COUNT(*) FROM analyses", [], |r| r.get(0))?;
        let movements: i64 = conn.query_row(
          "SELECT COUNT(*) FROM price_movements",
          [],
          |r| r.get(0),
        )?;
        let tickers: i64 = conn.query_row(
          "SELECT COUNT(DISTINCT ticker) FROM analyses",
          [],
          |r| r.get(0),
        )?;
        let latest: Option<String> = conn.query_row(
          "SELECT MAX(analysis_date) FROM analyses",
          [],
          |r| r.get(0),
        )?;
        let earliest: Option<String> = conn.query_row(
          "SELECT MIN(transcript_date) FROM transcripts",
          [],
          |r| r.get(0),
        )?;
        Ok((transcripts, analyses, movements, tickers, latest, earliest))
      })
      .await?;

    Ok(StoreStats {
      transcripts:         transcripts as u64,
      analyses:            analyses as u64,
      price_movements:     movements as u64,
      distinct_tickers:    tickers as u64,
      latest_analysis:     latest.as_deref().map(decode_dt).transpose()?,
      earliest_transcript: earliest.as_deref().map(decode_date).transpose()?,
    })
  }
}

//! SQL schema for the callscore SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.
//!
//! The CHECK constraints duplicate the Rust-side validation on purpose —
//! they guard rows written by anything other than this crate.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per earnings call; re-ingestion updates in place.
CREATE TABLE IF NOT EXISTS transcripts (
    id              INTEGER PRIMARY KEY,
    ticker          TEXT NOT NULL,
    company_name    TEXT,
    quarter         INTEGER NOT NULL CHECK (quarter BETWEEN 1 AND 4),
    year            INTEGER NOT NULL CHECK (year BETWEEN 2000 AND 2100),
    transcript_date TEXT NOT NULL,   -- ISO 8601 date
    transcript_text TEXT NOT NULL,
    source          TEXT NOT NULL,   -- 'api_ninjas' | 'finnhub' | 'manual_upload'
    source_metadata TEXT,            -- JSON payload from the source API
    word_count      INTEGER NOT NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    UNIQUE (ticker, quarter, year)
);

-- Many analyses may exist per transcript; none is ever updated.
CREATE TABLE IF NOT EXISTS analyses (
    id                  INTEGER PRIMARY KEY,
    transcript_id       INTEGER REFERENCES transcripts(id) ON DELETE CASCADE,
    ticker              TEXT NOT NULL,
    quarter             INTEGER NOT NULL CHECK (quarter BETWEEN 1 AND 4),
    year                INTEGER NOT NULL CHECK (year BETWEEN 2000 AND 2100),
    analysis_date       TEXT NOT NULL,   -- RFC 3339; store-assigned
    score               INTEGER CHECK (score BETWEEN -5 AND 5),
    score_justification TEXT,
    analysis_markdown   TEXT NOT NULL,
    analysis_json       TEXT,            -- JSON
    provider            TEXT NOT NULL,   -- 'openai' | 'xai' | 'gemini'
    model               TEXT,
    analysis_type       TEXT NOT NULL,   -- 'standard' | 'agentic_workflow'
    financial_context_included INTEGER NOT NULL DEFAULT 0,
    processing_time_seconds    REAL,
    created_at          TEXT NOT NULL
);

-- One row per (ticker, earnings_date); movement percentages are derived
-- from the price columns on every write, never stored stale.
CREATE TABLE IF NOT EXISTS price_movements (
    id               INTEGER PRIMARY KEY,
    ticker           TEXT NOT NULL,
    earnings_date    TEXT NOT NULL,
    price_before     REAL NOT NULL,
    price_after_1d   REAL,
    price_after_3d   REAL,
    price_after_5d   REAL,
    price_after_10d  REAL,
    movement_1d_pct  REAL,
    movement_3d_pct  REAL,
    movement_5d_pct  REAL,
    movement_10d_pct REAL,
    volume_before    INTEGER,
    volume_after_1d  INTEGER,
    data_source      TEXT NOT NULL DEFAULT 'yfinance',
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    UNIQUE (ticker, earnings_date)
);

-- Cache of correlation-engine output; ticker NULL = aggregate run.
CREATE TABLE IF NOT EXISTS correlations (
    id                      INTEGER PRIMARY KEY,
    ticker                  TEXT,
    period_days             INTEGER NOT NULL CHECK (period_days > 0),
    correlation_coefficient REAL NOT NULL,
    sample_size             INTEGER NOT NULL,
    mean_absolute_error     REAL,
    r_squared               REAL,
    direction_accuracy      REAL,    -- percentage
    analysis_date           TEXT NOT NULL,
    created_at              TEXT NOT NULL
);

-- SQLite treats NULLs as distinct in plain UNIQUE constraints, so the
-- aggregate (NULL-ticker) rows need an expression index to get real
-- upsert-on-conflict behaviour.
CREATE UNIQUE INDEX IF NOT EXISTS correlations_key_idx
    ON correlations(COALESCE(ticker, ''), period_days, analysis_date);

CREATE INDEX IF NOT EXISTS transcripts_ticker_idx   ON transcripts(ticker);
CREATE INDEX IF NOT EXISTS transcripts_date_idx     ON transcripts(transcript_date);
CREATE INDEX IF NOT EXISTS analyses_ticker_idx      ON analyses(ticker);
CREATE INDEX IF NOT EXISTS analyses_date_idx        ON analyses(analysis_date);
CREATE INDEX IF NOT EXISTS analyses_transcript_idx  ON analyses(transcript_id);
CREATE INDEX IF NOT EXISTS price_movements_ticker_idx ON price_movements(ticker);
CREATE INDEX IF NOT EXISTS price_movements_date_idx   ON price_movements(earnings_date);

PRAGMA user_version = 1;
";

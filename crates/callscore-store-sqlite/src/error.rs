//! Error type for `callscore-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A validation failure — the write was rejected before reaching storage.
  #[error("validation error: {0}")]
  Core(#[from] callscore_core::Error),

  /// Connectivity or SQL failure. Fatal for the current operation; the
  /// store never retries on its own.
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum tag that no longer decodes (e.g. hand-edited rows).
  #[error("unknown {0} tag: {1:?}")]
  UnknownTag(&'static str, String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error types for `callscore-core`.
//!
//! Everything here is a validation failure: bad inputs are rejected before
//! they reach storage, and they are distinct from connectivity failures
//! (which belong to the store backends).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("score {0} outside [-5, +5]")]
  ScoreOutOfRange(i32),

  #[error("quarter {0} outside [1, 4]")]
  QuarterOutOfRange(u8),

  #[error("year {0} outside [2000, 2100]")]
  YearOutOfRange(i32),

  #[error("invalid ticker: {0:?}")]
  InvalidTicker(String),

  #[error("processing time {0} is negative")]
  NegativeProcessingTime(f64),

  #[error("unsupported horizon: {0} days")]
  UnsupportedHorizon(u32),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

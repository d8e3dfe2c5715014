//! Correlation types — the score-price join row and the materialized
//! statistic cache entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  analysis::Provider,
  movement::Horizon,
  score::Score,
};

/// One row of the score-price join: an analysis matched to the realized
/// price movement for the same ticker and earnings date.
///
/// This is the primary input to the correlation engine. The join is exact
/// on date: the price row's `earnings_date` equals the transcript date the
/// analysis was recorded against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePriceRow {
  pub ticker:              String,
  pub quarter:             u8,
  pub year:                i32,
  pub earnings_date:       NaiveDate,
  pub score:               Option<Score>,
  pub score_justification: Option<String>,
  pub provider:            Provider,
  pub model:               Option<String>,
  pub movement_1d_pct:  Option<f64>,
  pub movement_3d_pct:  Option<f64>,
  pub movement_5d_pct:  Option<f64>,
  pub movement_10d_pct: Option<f64>,
}

impl ScorePriceRow {
  pub fn movement(&self, horizon: Horizon) -> Option<f64> {
    match horizon {
      Horizon::D1 => self.movement_1d_pct,
      Horizon::D3 => self.movement_3d_pct,
      Horizon::D5 => self.movement_5d_pct,
      Horizon::D10 => self.movement_10d_pct,
    }
  }
}

/// A persisted correlation statistic — a cache of engine output, unique per
/// (ticker, period, analysis_date).
///
/// `coefficient` of 0.0 with `sample_size` < 2 means "insufficient data",
/// not a genuine zero correlation; consumers must special-case it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationStat {
  /// `None` aggregates across all tickers.
  pub ticker:              Option<String>,
  pub period:              Horizon,
  pub coefficient:         f64,
  pub sample_size:         u32,
  pub mean_absolute_error: Option<f64>,
  pub r_squared:           Option<f64>,
  /// Percentage in [0, 100].
  pub direction_accuracy:  Option<f64>,
  /// The date the statistic was computed for.
  pub analysis_date:       NaiveDate,
}

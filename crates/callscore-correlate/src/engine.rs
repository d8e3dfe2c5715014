//! The store-driven entry point: fetch the score-price join and compute
//! every statistic for one horizon in a single pass.

use chrono::NaiveDate;

use callscore_core::{
  correlation::{CorrelationStat, ScorePriceRow},
  movement::Horizon,
  store::EarningsStore,
};

use crate::stats::{
  bucket_statistics, correlation, direction_accuracy, magnitude_error,
  BucketStat,
};

/// Everything the engine knows about one (ticker?, horizon) slice.
///
/// `sample_size < 2` means the coefficient is the defined degenerate 0.0;
/// check [`CorrelationSummary::insufficient_data`] before presenting it.
#[derive(Debug, Clone)]
pub struct CorrelationSummary {
  pub ticker:              Option<String>,
  pub horizon:             Horizon,
  pub coefficient:         f64,
  pub sample_size:         usize,
  pub direction_accuracy:  Option<f64>,
  pub mean_absolute_error: Option<f64>,
  pub r_squared:           Option<f64>,
  pub buckets:             [BucketStat; 5],
}

impl CorrelationSummary {
  pub fn insufficient_data(&self) -> bool { self.sample_size < 2 }

  /// Convert into the persistable statistic for a given computation date.
  pub fn into_stat(self, analysis_date: NaiveDate) -> CorrelationStat {
    CorrelationStat {
      ticker: self.ticker,
      period: self.horizon,
      coefficient: self.coefficient,
      sample_size: self.sample_size as u32,
      mean_absolute_error: self.mean_absolute_error,
      r_squared: self.r_squared,
      direction_accuracy: self.direction_accuracy,
      analysis_date,
    }
  }
}

/// Compute a summary over rows already in hand.
pub fn summarize_rows(
  ticker: Option<&str>,
  rows: &[ScorePriceRow],
  horizon: Horizon,
) -> CorrelationSummary {
  let (coefficient, sample_size) = correlation(rows, horizon);
  let r_squared =
    (sample_size >= 2).then(|| coefficient * coefficient);

  CorrelationSummary {
    ticker: ticker.map(str::to_owned),
    horizon,
    coefficient,
    sample_size,
    direction_accuracy: direction_accuracy(rows, horizon),
    mean_absolute_error: magnitude_error(rows, horizon),
    r_squared,
    buckets: bucket_statistics(rows, horizon),
  }
}

/// Query the store's score-price join and summarize it. Read-only; the
/// caller decides whether to persist the result via
/// [`EarningsStore::save_correlation`].
pub async fn summarize<S: EarningsStore>(
  store: &S,
  ticker: Option<&str>,
  horizon: Horizon,
) -> Result<CorrelationSummary, S::Error> {
  let rows = store.score_price_rows(ticker).await?;
  Ok(summarize_rows(ticker, &rows, horizon))
}

//! Score-price correlation engine.
//!
//! Measures how well stored analysis scores predicted the realized
//! post-earnings price movements. Everything here is read-only over the
//! store and stateless between calls; persisting a computed statistic is
//! the caller's decision.

mod engine;
mod stats;

pub use engine::{summarize, summarize_rows, CorrelationSummary};
pub use stats::{
  bucket_statistics, correlation, direction_accuracy, fmt_coefficient,
  fmt_pct, magnitude_error, pearson, BucketStat, EXPECTED_MOVE_PER_POINT,
};

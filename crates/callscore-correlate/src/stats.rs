//! Pure statistics over score-price rows.
//!
//! All functions use pairwise deletion: a row missing either its score or
//! the requested horizon's movement is skipped, never imputed.

use callscore_core::{
  correlation::ScorePriceRow,
  movement::Horizon,
  score::Direction,
};

/// Naive baseline for magnitude error: each score point is "worth" two
/// percentage points of movement. Deliberately not a fitted model.
pub const EXPECTED_MOVE_PER_POINT: f64 = 2.0;

// ─── Pearson ─────────────────────────────────────────────────────────────────

/// Pearson correlation coefficient. Returns 0.0 when fewer than two pairs
/// are given or either series has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
  let n = xs.len().min(ys.len());
  if n < 2 {
    return 0.0;
  }

  let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
  let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

  let mut cov = 0.0;
  let mut var_x = 0.0;
  let mut var_y = 0.0;
  for i in 0..n {
    let dx = xs[i] - mean_x;
    let dy = ys[i] - mean_y;
    cov += dx * dy;
    var_x += dx * dx;
    var_y += dy * dy;
  }

  if var_x == 0.0 || var_y == 0.0 {
    return 0.0;
  }
  cov / (var_x.sqrt() * var_y.sqrt())
}

/// (score, movement) pairs for a horizon, rows missing either skipped.
fn pairs(rows: &[ScorePriceRow], horizon: Horizon) -> Vec<(f64, f64)> {
  rows
    .iter()
    .filter_map(|row| {
      let score = row.score?;
      let movement = row.movement(horizon)?;
      Some((score.value() as f64, movement))
    })
    .collect()
}

/// Correlation between scores and a horizon's movements, with the number of
/// usable pairs. Fewer than two pairs yields `(0.0, n)` — a defined
/// degenerate result meaning "insufficient data", not a zero correlation.
pub fn correlation(rows: &[ScorePriceRow], horizon: Horizon) -> (f64, usize) {
  let pairs = pairs(rows, horizon);
  if pairs.len() < 2 {
    return (0.0, pairs.len());
  }
  let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
  (pearson(&xs, &ys), xs.len())
}

// ─── Direction accuracy ──────────────────────────────────────────────────────

/// Percentage of pairs where the score's sign class (Up/Down/Neutral)
/// exactly matches the movement's. `None` when no usable pairs exist —
/// callers must not render that as 0%.
pub fn direction_accuracy(
  rows: &[ScorePriceRow],
  horizon: Horizon,
) -> Option<f64> {
  let pairs = pairs(rows, horizon);
  if pairs.is_empty() {
    return None;
  }
  let hits = pairs
    .iter()
    .filter(|(score, movement)| Direction::of(*score) == Direction::of(*movement))
    .count();
  Some(hits as f64 / pairs.len() as f64 * 100.0)
}

// ─── Magnitude error ─────────────────────────────────────────────────────────

/// Mean absolute error between realized movement and the
/// `score × EXPECTED_MOVE_PER_POINT` baseline. `None` when no usable pairs.
pub fn magnitude_error(rows: &[ScorePriceRow], horizon: Horizon) -> Option<f64> {
  let pairs = pairs(rows, horizon);
  if pairs.is_empty() {
    return None;
  }
  let total: f64 = pairs
    .iter()
    .map(|(score, movement)| (movement - score * EXPECTED_MOVE_PER_POINT).abs())
    .sum();
  Some(total / pairs.len() as f64)
}

// ─── Buckets ─────────────────────────────────────────────────────────────────

/// Per-sentiment-band movement statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketStat {
  pub label:         &'static str,
  pub count:         u32,
  /// `None` when the bucket is empty.
  pub mean_movement: Option<f64>,
  /// Sample standard deviation; `None` when count < 2.
  pub std_dev:       Option<f64>,
}

const BUCKET_LABELS: [&str; 5] = [
  "Very Bearish (-5 to -3)",
  "Bearish (-2 to -1)",
  "Neutral (0 to 1)",
  "Bullish (2 to 3)",
  "Very Bullish (4 to 5)",
];

fn bucket_index(score: i32) -> usize {
  match score {
    i32::MIN..=-3 => 0,
    -2..=-1 => 1,
    0..=1 => 2,
    2..=3 => 3,
    _ => 4,
  }
}

/// Group rows into the five fixed score bands and describe each band's
/// movement distribution.
pub fn bucket_statistics(
  rows: &[ScorePriceRow],
  horizon: Horizon,
) -> [BucketStat; 5] {
  let mut movements: [Vec<f64>; 5] = Default::default();
  for (score, movement) in pairs(rows, horizon) {
    movements[bucket_index(score as i32)].push(movement);
  }

  std::array::from_fn(|i| {
    let xs = &movements[i];
    let count = xs.len();
    let mean = (count > 0).then(|| xs.iter().sum::<f64>() / count as f64);
    let std_dev = (count > 1).then(|| {
      let m = mean.unwrap_or(0.0);
      let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
      (ss / (count - 1) as f64).sqrt()
    });
    BucketStat {
      label: BUCKET_LABELS[i],
      count: count as u32,
      mean_movement: mean,
      std_dev,
    }
  })
}

// ─── Display helpers ─────────────────────────────────────────────────────────

/// Coefficients print with three decimals; full precision is kept internally.
pub fn fmt_coefficient(v: f64) -> String { format!("{v:.3}") }

/// Percentages print with two decimals and a sign-free `%` suffix.
pub fn fmt_pct(v: f64) -> String { format!("{v:.2}%") }

#[cfg(test)]
mod tests {
  use callscore_core::{analysis::Provider, score::Score};
  use chrono::NaiveDate;

  use super::*;

  fn row(score: Option<i32>, movement_5d: Option<f64>) -> ScorePriceRow {
    ScorePriceRow {
      ticker:              "AAPL".into(),
      quarter:             3,
      year:                2025,
      earnings_date:       NaiveDate::from_ymd_opt(2025, 7, 30).unwrap(),
      score:               score.map(|s| Score::new(s).unwrap()),
      score_justification: None,
      provider:            Provider::OpenAi,
      model:               None,
      movement_1d_pct:  None,
      movement_3d_pct:  None,
      movement_5d_pct:  movement_5d,
      movement_10d_pct: None,
    }
  }

  #[test]
  fn pearson_perfect_positive() {
    let xs = [1.0, 2.0, 3.0];
    let ys = [2.0, 4.0, 6.0];
    assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-12);
  }

  #[test]
  fn pearson_perfect_negative() {
    let xs = [1.0, 2.0, 3.0];
    let ys = [6.0, 4.0, 2.0];
    assert!((pearson(&xs, &ys) + 1.0).abs() < 1e-12);
  }

  #[test]
  fn pearson_degenerate_inputs_are_zero() {
    assert_eq!(pearson(&[1.0], &[2.0]), 0.0);
    assert_eq!(pearson(&[], &[]), 0.0);
    // Zero variance in one series.
    assert_eq!(pearson(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
  }

  #[test]
  fn correlation_skips_incomplete_rows() {
    let rows = vec![
      row(Some(3), Some(6.0)),
      row(Some(-2), Some(-4.0)),
      row(None, Some(1.0)),    // no score
      row(Some(1), None),      // no 5d movement
    ];
    let (coeff, n) = correlation(&rows, Horizon::D5);
    assert_eq!(n, 2);
    assert!((coeff - 1.0).abs() < 1e-12);
  }

  #[test]
  fn correlation_insufficient_data() {
    let rows = vec![row(Some(3), Some(5.0))];
    assert_eq!(correlation(&rows, Horizon::D5), (0.0, 1));
    assert_eq!(correlation(&[], Horizon::D5), (0.0, 0));
  }

  #[test]
  fn direction_accuracy_counts_exact_sign_matches() {
    let rows = vec![
      row(Some(3), Some(5.0)),   // up / up
      row(Some(-2), Some(-3.0)), // down / down
      row(Some(2), Some(-1.5)),  // up / down
      row(Some(0), Some(0.0)),   // neutral / neutral
    ];
    assert_eq!(direction_accuracy(&rows, Horizon::D5), Some(75.0));
  }

  #[test]
  fn direction_accuracy_none_without_pairs() {
    assert_eq!(direction_accuracy(&[], Horizon::D5), None);
    let rows = vec![row(None, Some(1.0)), row(Some(2), None)];
    assert_eq!(direction_accuracy(&rows, Horizon::D5), None);
  }

  #[test]
  fn magnitude_error_against_baseline() {
    // score 3 → expected +6.0, realized +8.0 → error 2.0
    // score -1 → expected -2.0, realized -1.0 → error 1.0
    let rows = vec![row(Some(3), Some(8.0)), row(Some(-1), Some(-1.0))];
    let mae = magnitude_error(&rows, Horizon::D5).unwrap();
    assert!((mae - 1.5).abs() < 1e-12);
  }

  #[test]
  fn buckets_cover_the_full_score_range() {
    for s in -5..=5 {
      assert!(bucket_index(s) < 5);
    }
    assert_eq!(bucket_index(-5), 0);
    assert_eq!(bucket_index(-3), 0);
    assert_eq!(bucket_index(-1), 1);
    assert_eq!(bucket_index(0), 2);
    assert_eq!(bucket_index(1), 2);
    assert_eq!(bucket_index(3), 3);
    assert_eq!(bucket_index(5), 4);
  }

  #[test]
  fn bucket_statistics_mean_and_std() {
    let rows = vec![
      row(Some(4), Some(5.0)),
      row(Some(5), Some(7.0)),
      row(Some(0), Some(0.5)),
    ];
    let buckets = bucket_statistics(&rows, Horizon::D5);

    let very_bullish = &buckets[4];
    assert_eq!(very_bullish.count, 2);
    assert_eq!(very_bullish.mean_movement, Some(6.0));
    // Sample std dev of [5.0, 7.0] with n-1 denominator.
    assert!((very_bullish.std_dev.unwrap() - std::f64::consts::SQRT_2).abs() < 1e-12);

    let neutral = &buckets[2];
    assert_eq!(neutral.count, 1);
    assert_eq!(neutral.mean_movement, Some(0.5));
    assert_eq!(neutral.std_dev, None);

    let empty = &buckets[0];
    assert_eq!(empty.count, 0);
    assert_eq!(empty.mean_movement, None);
    assert_eq!(empty.std_dev, None);
  }

  #[test]
  fn display_helpers_round_for_output_only() {
    assert_eq!(fmt_coefficient(0.123456), "0.123");
    assert_eq!(fmt_coefficient(-1.0), "-1.000");
    assert_eq!(fmt_pct(66.666), "66.67%");
  }
}

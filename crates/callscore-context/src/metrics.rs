//! Aggregations over the input records. Each returns `None` on empty input
//! so renderers can skip the section instead of printing zeros.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::summary::{PriceBar, Recommendation, SurpriseObservation};

/// Recommendations older than the 20 most recent are ignored — sentiment
/// from years back says nothing about the current quarter.
const RECENT_RECOMMENDATION_WINDOW: usize = 20;

// ─── Surprise metrics ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SurpriseMetrics {
  pub average_surprise: f64,
  /// Upper median: for an even count the higher of the two middle values.
  pub median_surprise:  f64,
  pub max_surprise:     f64,
  pub min_surprise:     f64,
  pub beat_count:       u32,
  pub miss_count:       u32,
  pub meet_count:       u32,
  pub total_quarters:   u32,
}

pub fn surprise_metrics(
  history: &[SurpriseObservation],
) -> Option<SurpriseMetrics> {
  if history.is_empty() {
    return None;
  }

  let surprises: Vec<f64> =
    history.iter().map(SurpriseObservation::surprise_pct).collect();
  let n = surprises.len();

  let mut sorted = surprises.clone();
  sorted.sort_by(|a, b| a.total_cmp(b));

  Some(SurpriseMetrics {
    average_surprise: surprises.iter().sum::<f64>() / n as f64,
    median_surprise:  sorted[n / 2],
    max_surprise:     sorted[n - 1],
    min_surprise:     sorted[0],
    beat_count:       surprises.iter().filter(|s| **s > 0.0).count() as u32,
    miss_count:       surprises.iter().filter(|s| **s < 0.0).count() as u32,
    meet_count:       surprises.iter().filter(|s| **s == 0.0).count() as u32,
    total_quarters:   n as u32,
  })
}

// ─── Recommendation summary ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationSummary {
  pub total:            u32,
  /// (grade, count), highest count first; ties break alphabetically.
  pub grade_distribution: Vec<(String, u32)>,
  pub firms_covering:   u32,
  pub most_recent_date: NaiveDate,
}

pub fn recommendation_summary(
  recommendations: &[Recommendation],
) -> Option<RecommendationSummary> {
  if recommendations.is_empty() {
    return None;
  }

  let mut recent: Vec<&Recommendation> = recommendations.iter().collect();
  recent.sort_by(|a, b| b.date.cmp(&a.date));
  recent.truncate(RECENT_RECOMMENDATION_WINDOW);

  let mut grades: HashMap<&str, u32> = HashMap::new();
  for rec in &recent {
    *grades.entry(rec.to_grade.as_str()).or_default() += 1;
  }
  let mut grade_distribution: Vec<(String, u32)> =
    grades.into_iter().map(|(g, c)| (g.to_owned(), c)).collect();
  grade_distribution.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

  let mut firms: Vec<&str> = recent.iter().map(|r| r.firm.as_str()).collect();
  firms.sort_unstable();
  firms.dedup();

  Some(RecommendationSummary {
    total: recent.len() as u32,
    grade_distribution,
    firms_covering: firms.len() as u32,
    most_recent_date: recent[0].date,
  })
}

// ─── Price snapshot ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
  /// Close of the latest bar by date.
  pub last_close:  f64,
  pub period_high: f64,
  pub period_low:  f64,
  pub mean_volume: f64,
}

pub fn price_snapshot(bars: &[PriceBar]) -> Option<PriceSnapshot> {
  let latest = bars.iter().max_by_key(|b| b.date)?;

  let mut high = f64::NEG_INFINITY;
  let mut low = f64::INFINITY;
  let mut volume = 0.0;
  for bar in bars {
    high = high.max(bar.high);
    low = low.min(bar.low);
    volume += bar.volume as f64;
  }

  Some(PriceSnapshot {
    last_close:  latest.close,
    period_high: high,
    period_low:  low,
    mean_volume: volume / bars.len() as f64,
  })
}

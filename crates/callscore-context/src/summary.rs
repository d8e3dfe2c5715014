//! Input records for context assembly — one struct per market-data section.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything known about a company at report time. Usually deserialized
/// from a JSON file produced by an external data-collection step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialSummary {
  pub ticker:            String,
  pub company_info:      Option<CompanyInfo>,
  pub analyst_estimates: Option<AnalystEstimates>,
  #[serde(default)]
  pub recommendations:   Vec<Recommendation>,
  #[serde(default)]
  pub price_bars:        Vec<PriceBar>,
  #[serde(default)]
  pub earnings_history:  Vec<SurpriseObservation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyInfo {
  pub name:       Option<String>,
  pub sector:     Option<String>,
  pub industry:   Option<String>,
  /// In dollars; rendered as $X.XXB.
  pub market_cap: Option<f64>,
  pub employees:  Option<u64>,
}

/// Analyst estimate blocks are passed through as opaque JSON — their shape
/// varies by data vendor and the renderer only pretty-prints them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalystEstimates {
  pub earnings_estimate: Option<serde_json::Value>,
  pub revenue_estimate:  Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
  pub date:       NaiveDate,
  pub firm:       String,
  pub to_grade:   String,
  pub from_grade: Option<String>,
  pub action:     Option<String>,
}

/// One daily OHLCV observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
  pub date:   NaiveDate,
  pub open:   f64,
  pub high:   f64,
  pub low:    f64,
  pub close:  f64,
  pub volume: u64,
}

/// One quarter's estimate-vs-actual EPS observation, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurpriseObservation {
  pub period:       Option<String>,
  pub eps_estimate: f64,
  pub eps_actual:   f64,
}

impl SurpriseObservation {
  /// Surprise as a percentage of the estimate's magnitude. A zero estimate
  /// yields 0.0 — there is no meaningful base to compare against.
  pub fn surprise_pct(&self) -> f64 {
    if self.eps_estimate == 0.0 {
      return 0.0;
    }
    (self.eps_actual - self.eps_estimate) / self.eps_estimate.abs() * 100.0
  }
}

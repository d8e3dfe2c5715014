//! Financial-context assembly and report rendering.
//!
//! The input types mirror what external market-data collaborators produce
//! (company profile, analyst estimates, recommendation history, OHLCV bars,
//! EPS surprise history). Every section is optional: this crate tolerates
//! whatever subset is available and simply omits the rest from its output.
//! Nothing here touches the store.

mod metrics;
mod render;
mod summary;

pub use metrics::{
  price_snapshot, recommendation_summary, surprise_metrics, PriceSnapshot,
  RecommendationSummary, SurpriseMetrics,
};
pub use render::{correlation_report, financial_context};
pub use summary::{
  AnalystEstimates, CompanyInfo, FinancialSummary, PriceBar, Recommendation,
  SurpriseObservation,
};

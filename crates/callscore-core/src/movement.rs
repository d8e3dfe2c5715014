//! Price-movement types — what the stock actually did after earnings.
//!
//! One row per (ticker, earnings_date), upserted. The percentage columns
//! are derived from the prices inside the store and are recomputed on every
//! write — they are never stored stale relative to their inputs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default data-source tag for price rows.
pub const DEFAULT_PRICE_SOURCE: &str = "yfinance";

// ─── Horizon ─────────────────────────────────────────────────────────────────

/// The four fixed post-earnings observation horizons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
  D1,
  D3,
  D5,
  D10,
}

impl Horizon {
  pub const ALL: [Horizon; 4] = [Self::D1, Self::D3, Self::D5, Self::D10];

  pub fn days(self) -> u32 {
    match self {
      Self::D1 => 1,
      Self::D3 => 3,
      Self::D5 => 5,
      Self::D10 => 10,
    }
  }
}

impl TryFrom<u32> for Horizon {
  type Error = Error;

  fn try_from(days: u32) -> Result<Self> {
    match days {
      1 => Ok(Self::D1),
      3 => Ok(Self::D3),
      5 => Ok(Self::D5),
      10 => Ok(Self::D10),
      other => Err(Error::UnsupportedHorizon(other)),
    }
  }
}

impl std::fmt::Display for Horizon {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}d", self.days())
  }
}

// ─── Derivation ──────────────────────────────────────────────────────────────

/// Percentage movement from `price_before` to `price_after`, at full float
/// precision — rounding to two decimals is a display concern only. Absent
/// `price_after` yields `None`, never zero; a zero `price_before` also
/// yields `None` rather than a division blow-up.
pub fn movement_pct(price_before: f64, price_after: Option<f64>) -> Option<f64> {
  let after = price_after?;
  if price_before == 0.0 {
    return None;
  }
  Some((after - price_before) / price_before * 100.0)
}

// ─── PriceMovement ───────────────────────────────────────────────────────────

/// A stored price-movement row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceMovement {
  pub id:              i64,
  pub ticker:          String,
  pub earnings_date:   NaiveDate,
  /// Reference price just prior to the earnings call.
  pub price_before:    f64,
  pub price_after_1d:  Option<f64>,
  pub price_after_3d:  Option<f64>,
  pub price_after_5d:  Option<f64>,
  pub price_after_10d: Option<f64>,
  pub movement_1d_pct:  Option<f64>,
  pub movement_3d_pct:  Option<f64>,
  pub movement_5d_pct:  Option<f64>,
  pub movement_10d_pct: Option<f64>,
  pub volume_before:   Option<i64>,
  pub volume_after_1d: Option<i64>,
  pub data_source:     String,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl PriceMovement {
  pub fn price_after(&self, horizon: Horizon) -> Option<f64> {
    match horizon {
      Horizon::D1 => self.price_after_1d,
      Horizon::D3 => self.price_after_3d,
      Horizon::D5 => self.price_after_5d,
      Horizon::D10 => self.price_after_10d,
    }
  }

  pub fn movement(&self, horizon: Horizon) -> Option<f64> {
    match horizon {
      Horizon::D1 => self.movement_1d_pct,
      Horizon::D3 => self.movement_3d_pct,
      Horizon::D5 => self.movement_5d_pct,
      Horizon::D10 => self.movement_10d_pct,
    }
  }
}

/// Input to [`crate::store::EarningsStore::upsert_price_movement`].
/// The movement percentages are always derived by the store; callers supply
/// prices only.
#[derive(Debug, Clone)]
pub struct NewPriceMovement {
  pub ticker:          String,
  pub earnings_date:   NaiveDate,
  pub price_before:    f64,
  pub price_after_1d:  Option<f64>,
  pub price_after_3d:  Option<f64>,
  pub price_after_5d:  Option<f64>,
  pub price_after_10d: Option<f64>,
  pub volume_before:   Option<i64>,
  pub volume_after_1d: Option<i64>,
  pub data_source:     String,
}

impl NewPriceMovement {
  /// Convenience constructor: no post-earnings observations yet, default
  /// data source.
  pub fn new(
    ticker: impl Into<String>,
    earnings_date: NaiveDate,
    price_before: f64,
  ) -> Self {
    Self {
      ticker: ticker.into(),
      earnings_date,
      price_before,
      price_after_1d: None,
      price_after_3d: None,
      price_after_5d: None,
      price_after_10d: None,
      volume_before: None,
      volume_after_1d: None,
      data_source: DEFAULT_PRICE_SOURCE.to_string(),
    }
  }
}

//! The analysis score — a bounded integer in `[-5, +5]` representing the
//! predicted earnings-driven price direction and magnitude.
//!
//! Scores are extracted from LLM analysis text; anything outside the valid
//! range is rejected at construction and never reaches storage.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lowest admissible score.
pub const MIN_SCORE: i32 = -5;
/// Highest admissible score.
pub const MAX_SCORE: i32 = 5;

// ─── Score ───────────────────────────────────────────────────────────────────

/// A validated score. Constructible only through [`Score::new`];
/// deserialization routes through the same range check.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "i32", into = "i32")]
pub struct Score(i32);

impl Score {
  /// Validate and wrap a raw integer. Out-of-range values are rejected.
  pub fn new(value: i32) -> Result<Self> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
      return Err(Error::ScoreOutOfRange(value));
    }
    Ok(Self(value))
  }

  pub fn value(self) -> i32 { self.0 }

  /// Ordinal sentiment label for display.
  pub fn label(self) -> ScoreLabel {
    match self.0 {
      s if s >= 4 => ScoreLabel::VeryBullish,
      s if s >= 2 => ScoreLabel::Bullish,
      s if s >= 1 => ScoreLabel::SlightlyBullish,
      0 => ScoreLabel::Neutral,
      s if s >= -1 => ScoreLabel::SlightlyBearish,
      s if s >= -3 => ScoreLabel::Bearish,
      _ => ScoreLabel::VeryBearish,
    }
  }

  /// Sign class used for direction-accuracy comparison.
  pub fn direction(self) -> Direction {
    match self.0 {
      s if s > 0 => Direction::Up,
      s if s < 0 => Direction::Down,
      _ => Direction::Neutral,
    }
  }
}

impl TryFrom<i32> for Score {
  type Error = Error;

  fn try_from(value: i32) -> Result<Self> { Self::new(value) }
}

impl From<Score> for i32 {
  fn from(score: Score) -> i32 { score.0 }
}

impl std::fmt::Display for Score {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:+}", self.0)
  }
}

// ─── Labels ──────────────────────────────────────────────────────────────────

/// Seven-band ordinal sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreLabel {
  VeryBullish,
  Bullish,
  SlightlyBullish,
  Neutral,
  SlightlyBearish,
  Bearish,
  VeryBearish,
}

impl std::fmt::Display for ScoreLabel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      Self::VeryBullish => "Very Bullish",
      Self::Bullish => "Bullish",
      Self::SlightlyBullish => "Slightly Bullish",
      Self::Neutral => "Neutral",
      Self::SlightlyBearish => "Slightly Bearish",
      Self::Bearish => "Bearish",
      Self::VeryBearish => "Very Bearish",
    };
    f.write_str(s)
  }
}

// ─── Direction ───────────────────────────────────────────────────────────────

/// Sign class of a score or a realized movement. Neutral only matches
/// neutral — a 0 score against a 0.0% movement counts as agreement, a 0
/// score against any non-zero movement does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Up,
  Down,
  Neutral,
}

impl Direction {
  /// Classify a floating-point movement percentage.
  pub fn of(value: f64) -> Self {
    if value > 0.0 {
      Self::Up
    } else if value < 0.0 {
      Self::Down
    } else {
      Self::Neutral
    }
  }
}

// ─── Expected-movement bands ─────────────────────────────────────────────────

/// Human-readable expected-movement band for a raw score value.
///
/// Total over all integers: anything outside `[-5, +5]` maps to `"Unknown"`,
/// never to a panic. The bands are asymmetric on purpose — they mirror the
/// scoring rubric the analysis prompt asks the model to follow.
pub fn movement_band(score: i32) -> &'static str {
  match score {
    5 => ">+10%",
    4 => "+7% to +10%",
    3 => "+4% to +7%",
    2 => "+2% to +4%",
    1 => "0% to +2%",
    0 => "-1% to +1%",
    -1 => "0% to -2%",
    -2 => "-2% to -4%",
    -3 => "-4% to -7%",
    -4 => "-7% to -10%",
    -5 => "<-10%",
    _ => "Unknown",
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

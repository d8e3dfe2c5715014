//! Input validation applied at the store boundary.
//!
//! A rejected write is a [`crate::Error`], distinct from a connectivity
//! failure; nothing validated here ever reaches storage in an invalid state.

use crate::error::{Error, Result};

/// Maximum ticker length, matching the 10-character schema column.
pub const MAX_TICKER_LEN: usize = 10;

/// Validate and normalise a ticker symbol to uppercase.
///
/// Accepts ASCII alphanumerics plus `.` and `-` (e.g. `BRK.B`, `RDS-A`).
pub fn ticker(raw: &str) -> Result<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty()
    || trimmed.len() > MAX_TICKER_LEN
    || !trimmed
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
  {
    return Err(Error::InvalidTicker(raw.to_string()));
  }
  Ok(trimmed.to_ascii_uppercase())
}

/// Validate a fiscal quarter (1 through 4).
pub fn quarter(q: u8) -> Result<u8> {
  if !(1..=4).contains(&q) {
    return Err(Error::QuarterOutOfRange(q));
  }
  Ok(q)
}

/// Validate a fiscal year against the sane bound [2000, 2100].
pub fn year(y: i32) -> Result<i32> {
  if !(2000..=2100).contains(&y) {
    return Err(Error::YearOutOfRange(y));
  }
  Ok(y)
}

/// Validate an optional processing-time measurement (seconds).
pub fn processing_time(seconds: Option<f64>) -> Result<Option<f64>> {
  if let Some(s) = seconds
    && s < 0.0
  {
    return Err(Error::NegativeProcessingTime(s));
  }
  Ok(seconds)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ticker_normalises_case_and_whitespace() {
    assert_eq!(ticker(" aapl ").unwrap(), "AAPL");
    assert_eq!(ticker("brk.b").unwrap(), "BRK.B");
  }

  #[test]
  fn ticker_rejects_garbage() {
    assert!(ticker("").is_err());
    assert!(ticker("TOOLONGTICKER").is_err());
    assert!(ticker("AA PL").is_err());
    assert!(ticker("AAPL;DROP").is_err());
  }

  #[test]
  fn quarter_and_year_bounds() {
    assert!(quarter(0).is_err());
    assert!(quarter(5).is_err());
    assert!(quarter(4).is_ok());
    assert!(year(1999).is_err());
    assert!(year(2101).is_err());
    assert!(year(2024).is_ok());
  }

  #[test]
  fn processing_time_must_be_non_negative() {
    assert!(processing_time(Some(-0.1)).is_err());
    assert_eq!(processing_time(Some(1.5)).unwrap(), Some(1.5));
    assert_eq!(processing_time(None).unwrap(), None);
  }
}

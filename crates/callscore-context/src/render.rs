//! Renderers: the prompt-injection context blob and the markdown report.

use crate::{
  metrics::{price_snapshot, recommendation_summary, surprise_metrics},
  summary::FinancialSummary,
};

/// Analyst-recommendation JSON is capped in the prompt context — the model
/// needs the gist, not the full history.
const RECOMMENDATION_JSON_CAP: usize = 500;

fn pretty_json(value: &serde_json::Value) -> String {
  serde_json::to_string_pretty(value).unwrap_or_default()
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
  match s.char_indices().nth(max_chars) {
    Some((idx, _)) => &s[..idx],
    None => s,
  }
}

/// Group an integer's digits with commas (volume display).
fn fmt_thousands(value: f64) -> String {
  let rounded = value.round() as i64;
  let digits = rounded.abs().to_string();
  let mut out = String::new();
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  if rounded < 0 {
    format!("-{out}")
  } else {
    out
  }
}

// ─── Prompt context ──────────────────────────────────────────────────────────

/// Plain-text context blob for injection into an analysis prompt. Sections
/// with no data are omitted entirely.
pub fn financial_context(summary: &FinancialSummary) -> String {
  let mut parts: Vec<String> = Vec::new();

  if let Some(info) = &summary.company_info {
    let name = info.name.as_deref().unwrap_or(&summary.ticker);
    parts.push(format!("Company: {name}"));
    parts.push(format!("Sector: {}", info.sector.as_deref().unwrap_or("N/A")));
    parts.push(format!(
      "Industry: {}",
      info.industry.as_deref().unwrap_or("N/A")
    ));
    if let Some(cap) = info.market_cap {
      parts.push(format!("Market Cap: ${:.2}B", cap / 1e9));
    }
  }

  if let Some(estimates) = &summary.analyst_estimates {
    if let Some(earnings) = &estimates.earnings_estimate {
      parts.push("\nAnalyst Earnings Estimates:".into());
      parts.push(pretty_json(earnings));
    }
    if let Some(revenue) = &estimates.revenue_estimate {
      parts.push("\nAnalyst Revenue Estimates:".into());
      parts.push(pretty_json(revenue));
    }
  }

  if !summary.recommendations.is_empty() {
    parts.push("\nRecent Analyst Recommendations:".into());
    let json = serde_json::to_value(&summary.recommendations)
      .map(|v| pretty_json(&v))
      .unwrap_or_default();
    parts.push(truncate_chars(&json, RECOMMENDATION_JSON_CAP).to_owned());
  }

  if let Some(snap) = price_snapshot(&summary.price_bars) {
    parts.push("\nRecent Price Data:".into());
    parts.push(format!("Current Price: ${:.2}", snap.last_close));
    parts.push(format!("Period High: ${:.2}", snap.period_high));
    parts.push(format!("Period Low: ${:.2}", snap.period_low));
  }

  parts.join("\n")
}

// ─── Markdown report ─────────────────────────────────────────────────────────

/// Full markdown correlation report, sections separated by `---`.
pub fn correlation_report(
  ticker: &str,
  quarter: u8,
  year: i32,
  summary: &FinancialSummary,
) -> String {
  let mut parts: Vec<String> = vec![
    "# Financial Data Correlation Report".into(),
    format!("## {ticker} - Q{quarter} {year}\n"),
    "---\n".into(),
  ];

  if let Some(info) = &summary.company_info {
    parts.push("## Company Overview\n".into());
    parts.push(format!("**Name:** {}", info.name.as_deref().unwrap_or(ticker)));
    parts.push(format!(
      "**Sector:** {}",
      info.sector.as_deref().unwrap_or("N/A")
    ));
    parts.push(format!(
      "**Industry:** {}",
      info.industry.as_deref().unwrap_or("N/A")
    ));
    if let Some(cap) = info.market_cap {
      parts.push(format!("**Market Cap:** ${:.2}B", cap / 1e9));
    }
    parts.push("\n---\n".into());
  }

  if let Some(m) = surprise_metrics(&summary.earnings_history) {
    parts.push("## Historical Earnings Surprise Metrics\n".into());
    parts.push(format!("**Average Surprise:** {:.2}%", m.average_surprise));
    parts.push(format!(
      "**Beat Rate:** {}/{} quarters",
      m.beat_count, m.total_quarters
    ));
    parts.push(format!("**Max Surprise:** {:.2}%", m.max_surprise));
    parts.push(format!("**Min Surprise:** {:.2}%", m.min_surprise));
    parts.push("\n---\n".into());
  }

  if let Some(recs) = recommendation_summary(&summary.recommendations) {
    parts.push("## Analyst Recommendations\n".into());
    parts.push(format!("**Total Recent Recommendations:** {}", recs.total));
    parts.push(format!("**Firms Covering:** {}", recs.firms_covering));
    if !recs.grade_distribution.is_empty() {
      parts.push("\n**Grade Distribution:**".into());
      for (grade, count) in &recs.grade_distribution {
        parts.push(format!("- {grade}: {count}"));
      }
    }
    parts.push("\n---\n".into());
  }

  if let Some(snap) = price_snapshot(&summary.price_bars) {
    parts.push("## Recent Price Performance\n".into());
    parts.push(format!("**Current Price:** ${:.2}", snap.last_close));
    parts.push(format!("**Period High:** ${:.2}", snap.period_high));
    parts.push(format!("**Period Low:** ${:.2}", snap.period_low));
    parts.push(format!(
      "**Average Volume:** {}",
      fmt_thousands(snap.mean_volume)
    ));
    parts.push("\n---\n".into());
  }

  parts.join("\n")
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use crate::summary::{CompanyInfo, PriceBar, SurpriseObservation};

  use super::*;

  fn summary_with_company() -> FinancialSummary {
    FinancialSummary {
      ticker: "AAPL".into(),
      company_info: Some(CompanyInfo {
        name:       Some("Apple Inc.".into()),
        sector:     Some("Technology".into()),
        industry:   None,
        market_cap: Some(3.45e12),
        employees:  Some(160_000),
      }),
      ..Default::default()
    }
  }

  #[test]
  fn context_renders_present_sections_only() {
    let context = financial_context(&summary_with_company());
    assert!(context.contains("Company: Apple Inc."));
    assert!(context.contains("Sector: Technology"));
    assert!(context.contains("Industry: N/A"));
    assert!(context.contains("Market Cap: $3450.00B"));
    // No estimates, recommendations, or prices were supplied.
    assert!(!context.contains("Estimates"));
    assert!(!context.contains("Recommendations"));
    assert!(!context.contains("Price Data"));
  }

  #[test]
  fn context_empty_summary_is_empty() {
    let empty = FinancialSummary { ticker: "AAPL".into(), ..Default::default() };
    assert_eq!(financial_context(&empty), "");
  }

  #[test]
  fn report_always_carries_the_header() {
    let empty = FinancialSummary { ticker: "AAPL".into(), ..Default::default() };
    let report = correlation_report("AAPL", 3, 2025, &empty);
    assert!(report.starts_with("# Financial Data Correlation Report"));
    assert!(report.contains("## AAPL - Q3 2025"));
    assert!(!report.contains("## Company Overview"));
  }

  #[test]
  fn report_includes_surprise_and_price_sections() {
    let mut summary = summary_with_company();
    summary.earnings_history = vec![
      SurpriseObservation { period: None, eps_estimate: 2.0, eps_actual: 2.5 },
      SurpriseObservation { period: None, eps_estimate: 1.0, eps_actual: 0.9 },
    ];
    summary.price_bars = vec![PriceBar {
      date:   NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
      open:   10.0,
      high:   12.0,
      low:    9.0,
      close:  11.0,
      volume: 1_234_567,
    }];

    let report = correlation_report("AAPL", 3, 2025, &summary);
    assert!(report.contains("## Historical Earnings Surprise Metrics"));
    assert!(report.contains("**Beat Rate:** 1/2 quarters"));
    assert!(report.contains("## Recent Price Performance"));
    assert!(report.contains("**Average Volume:** 1,234,567"));
  }

  #[test]
  fn thousands_grouping() {
    assert_eq!(fmt_thousands(0.0), "0");
    assert_eq!(fmt_thousands(999.0), "999");
    assert_eq!(fmt_thousands(1_000.0), "1,000");
    assert_eq!(fmt_thousands(1_234_567.4), "1,234,567");
  }
}

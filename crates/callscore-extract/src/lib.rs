//! Score and justification extraction from LLM analysis markdown.
//!
//! The upstream text is expected — but not guaranteed — to contain a line
//! of the form `**Score: [+3]/5**` and, later, a `**Justification:**`
//! heading. Nothing about that format is contractual, so this is a parser
//! with a degrade-to-absent policy: a missing or out-of-range score is a
//! *parse miss*, not an error, and callers decide what to do with it.
//!
//! Everything here is pure and deterministic.

use std::sync::LazyLock;

use regex::Regex;

pub use callscore_core::score::{Score, ScoreLabel, movement_band};

/// Matches `**Score: X/5**`, tolerating an optional sign and optional
/// square brackets around the integer.
static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\*\*Score:\s*\[?([+-]?\d+)\]?/5\*\*").expect("score pattern")
});

/// Matches the justification block: everything after the heading up to the
/// next horizontal rule or heading marker.
static JUSTIFICATION_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?s)\*\*Justification:\*\*\s*\n(.*?)(?:\n---|\n##|$)")
    .expect("justification pattern")
});

/// Section delimiter used by the fallback window.
static SECTION_BREAK_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\n---|\n##").expect("section pattern"));

/// Leading label text stripped from the fallback window.
static LABEL_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\*\*Justification:\*\*\s*").expect("label pattern")
});

/// Upper bound, in characters, on the fallback justification window.
pub const FALLBACK_WINDOW: usize = 500;

/// Result of scanning one block of analysis text.
///
/// `score: None` means the text did not conform to the template (or the
/// parsed value was out of range) — distinct from a score of exactly zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
  pub score:         Option<Score>,
  pub justification: Option<String>,
}

/// Extract the score and its justification from analysis markdown.
///
/// A matched integer outside `[-5, +5]` is treated exactly like a missing
/// marker: both fields come back absent. Invalid data degrades; it never
/// panics and never surfaces the out-of-range value.
pub fn extract_score(analysis_text: &str) -> Extraction {
  let Some(caps) = SCORE_RE.captures(analysis_text) else {
    return Extraction::default();
  };

  let Ok(raw) = caps[1].parse::<i32>() else {
    // Digit run too long for i32 — same policy as out-of-range.
    return Extraction::default();
  };
  let Ok(score) = Score::new(raw) else {
    return Extraction::default();
  };

  let marker_end = caps.get(0).map_or(0, |m| m.end());
  let justification = match JUSTIFICATION_RE.captures(analysis_text) {
    Some(j) => non_empty(j[1].trim()),
    None => fallback_justification(analysis_text, marker_end),
  };

  Extraction { score: Some(score), justification }
}

/// Without a `**Justification:**` heading, capture a bounded window of text
/// immediately after the score marker, stopping at the next section break.
fn fallback_justification(text: &str, from: usize) -> Option<String> {
  let tail = &text[from..];
  let window = match SECTION_BREAK_RE.find(tail) {
    Some(m) => &tail[..m.start()],
    None => {
      let cap = tail
        .char_indices()
        .nth(FALLBACK_WINDOW)
        .map_or(tail.len(), |(i, _)| i);
      &tail[..cap]
    }
  };

  let stripped = LABEL_PREFIX_RE.replace(window.trim(), "");
  non_empty(stripped.trim())
}

fn non_empty(s: &str) -> Option<String> {
  if s.is_empty() { None } else { Some(s.to_string()) }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bracketed_positive_score_with_justification() {
    let text = "## Verdict\n\n**Score: [+3]/5**\n\n\
                **Justification:**\nStrong beat.\n---\n## Next section";
    let e = extract_score(text);
    assert_eq!(e.score.map(Score::value), Some(3));
    assert_eq!(e.justification.as_deref(), Some("Strong beat."));
  }

  #[test]
  fn plain_and_signed_forms() {
    for (text, expected) in [
      ("**Score: 4/5**", 4),
      ("**Score: +2/5**", 2),
      ("**Score: -3/5**", -3),
      ("**Score: [0]/5**", 0),
      ("**Score:   [-5]/5**", -5),
    ] {
      let e = extract_score(text);
      assert_eq!(e.score.map(Score::value), Some(expected), "{text:?}");
    }
  }

  #[test]
  fn missing_marker_is_a_parse_miss() {
    let e = extract_score("The quarter looked fine overall.");
    assert_eq!(e, Extraction::default());
  }

  #[test]
  fn out_of_range_score_degrades_to_absent() {
    let e = extract_score("**Score: -6/5**\n\n**Justification:**\nBad.\n---");
    assert_eq!(e.score, None);
    assert_eq!(e.justification, None);
  }

  #[test]
  fn absurd_digit_run_degrades_to_absent() {
    let e = extract_score("**Score: 99999999999999999999/5**");
    assert_eq!(e, Extraction::default());
  }

  #[test]
  fn justification_stops_at_heading() {
    let text = "**Score: 2/5**\n\n**Justification:**\nMargins expanded.\n\
                Guidance raised.\n## Risks\nnot captured";
    let e = extract_score(text);
    assert_eq!(
      e.justification.as_deref(),
      Some("Margins expanded.\nGuidance raised.")
    );
  }

  #[test]
  fn fallback_window_when_heading_missing() {
    let text = "**Score: -2/5** Weak guidance and soft demand.\n---\nignored";
    let e = extract_score(text);
    assert_eq!(e.score.map(Score::value), Some(-2));
    assert_eq!(
      e.justification.as_deref(),
      Some("Weak guidance and soft demand.")
    );
  }

  #[test]
  fn fallback_strips_label_prefix() {
    // Heading present but on the same line as the prose, so the strict
    // pattern misses and the fallback has to clean up.
    let text = "**Score: 1/5**\n**Justification:** Inline prose here.";
    let e = extract_score(text);
    assert_eq!(e.justification.as_deref(), Some("Inline prose here."));
  }

  #[test]
  fn fallback_window_is_bounded() {
    let filler = "x".repeat(2000);
    let text = format!("**Score: 1/5**\n{filler}");
    let e = extract_score(&text);
    let j = e.justification.expect("windowed justification");
    assert!(j.chars().count() <= FALLBACK_WINDOW);
  }

  #[test]
  fn extraction_is_deterministic() {
    let text = "**Score: [+3]/5**\n\n**Justification:**\nStrong beat.\n---";
    let first = extract_score(text);
    for _ in 0..10 {
      assert_eq!(extract_score(text), first);
    }
  }
}

//! Keyword coverage: required (P1.1) and preferred (P1.2) role keywords.

use super::{ParameterOutcome, ScoringInput};
use crate::errors::ScoringError;
use crate::matching::MatchSummary;
use crate::models::Diagnostics;

const REQUIRED_MAX: f64 = 25.0;
const REQUIRED_POINTS_BAND: (f64, f64) = (1.5, 12.5);
const PREFERRED_MAX: f64 = 10.0;
const PREFERRED_POINTS_BAND: (f64, f64) = (0.75, 5.0);
/// Missing keywords named in the message; the full list is in the diagnostics.
const MISSING_SHOWN: usize = 5;

pub fn required_keywords(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    Ok(score_keywords(&input.keywords.required, REQUIRED_MAX, REQUIRED_POINTS_BAND, "required"))
}

pub fn preferred_keywords(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    Ok(score_keywords(&input.keywords.preferred, PREFERRED_MAX, PREFERRED_POINTS_BAND, "preferred"))
}

/// `min(matched × pointsPerKeyword, max)` where pointsPerKeyword = max / total, clamped to
/// the band. Small lists hit the band's upper edge, so a few misses still cost
/// proportionally; large lists hit the lower edge and saturate before 100% coverage.
fn score_keywords(summary: &MatchSummary, max: f64, (low, high): (f64, f64), label: &str) -> ParameterOutcome {
    if summary.total == 0 {
        return ParameterOutcome::new(
            max,
            format!("No {label} keywords for this role; full credit"),
            Diagnostics::Keywords {
                summary: summary.clone(),
                points_per_keyword: 0.0,
            },
        );
    }

    let points_per_keyword = (max / summary.total as f64).clamp(low, high);
    let score = (summary.matched_count as f64 * points_per_keyword).min(max);

    let mut message = format!(
        "Matched {} of {} {} keywords",
        summary.matched_count, summary.total, label
    );
    if !summary.unmatched.is_empty() {
        let shown: Vec<&str> = summary
            .unmatched
            .iter()
            .take(MISSING_SHOWN)
            .map(String::as_str)
            .collect();
        message.push_str(&format!("; missing: {}", shown.join(", ")));
        if summary.unmatched.len() > MISSING_SHOWN {
            message.push_str(&format!(" (+{} more)", summary.unmatched.len() - MISSING_SHOWN));
        }
    }

    ParameterOutcome::new(
        score,
        message,
        Diagnostics::Keywords {
            summary: summary.clone(),
            points_per_keyword,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn summary(matched: usize, total: usize) -> MatchSummary {
        let names: Vec<String> = (0..total).map(|i| format!("kw{i:02}")).collect();
        let scores: BTreeMap<String, f64> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), if i < matched { 1.0 } else { 0.0 }))
            .collect();
        MatchSummary {
            total,
            matched_count: matched,
            match_rate: if total == 0 { 0.0 } else { matched as f64 / total as f64 * 100.0 },
            threshold: 0.6,
            scores,
            matched: names[..matched].to_vec(),
            unmatched: names[matched..].to_vec(),
        }
    }

    #[test]
    fn test_empty_list_is_full_credit() {
        let outcome = score_keywords(&summary(0, 0), REQUIRED_MAX, REQUIRED_POINTS_BAND, "required");
        assert_eq!(outcome.score, 25.0);
    }

    #[test]
    fn test_points_per_keyword_proportional() {
        // 10 keywords → 2.5 points each.
        let outcome = score_keywords(&summary(6, 10), REQUIRED_MAX, REQUIRED_POINTS_BAND, "required");
        assert!((outcome.score - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_points_band_upper_edge() {
        // 1 keyword would be 25 points; the band caps it at 12.5.
        let outcome = score_keywords(&summary(1, 1), REQUIRED_MAX, REQUIRED_POINTS_BAND, "required");
        assert!((outcome.score - 12.5).abs() < 1e-9);
        match outcome.diagnostics {
            Diagnostics::Keywords { points_per_keyword, .. } => assert_eq!(points_per_keyword, 12.5),
            other => panic!("unexpected diagnostics {other:?}"),
        }
    }

    #[test]
    fn test_points_band_lower_edge_saturates() {
        // 40 keywords → 0.625 raised to 1.5; 17 matches already reach the max.
        let outcome = score_keywords(&summary(17, 40), REQUIRED_MAX, REQUIRED_POINTS_BAND, "required");
        assert_eq!(outcome.score, 25.0);
    }

    #[test]
    fn test_preferred_band() {
        let outcome = score_keywords(&summary(1, 20), PREFERRED_MAX, PREFERRED_POINTS_BAND, "preferred");
        assert!((outcome.score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_message_lists_missing_keywords() {
        let outcome = score_keywords(&summary(1, 8), REQUIRED_MAX, REQUIRED_POINTS_BAND, "required");
        assert!(outcome.message.starts_with("Matched 1 of 8 required keywords"));
        assert!(outcome.message.contains("kw01"));
        assert!(outcome.message.contains("(+2 more)"));
    }
}

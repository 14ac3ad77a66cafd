//! Content quality: action verbs (P2.1), quantification (P2.2), achievement depth (P2.3).

use super::bands::{at_most, interpolate};
use super::{ParameterOutcome, ScoringInput};
use crate::classifiers::{action_verbs, quantification, vague_phrases};
use crate::errors::ScoringError;
use crate::models::{Diagnostics, Level};

/// (coverage %, average tier) a résumé must reach at each level.
fn verb_thresholds(level: Level) -> (f64, f64) {
    match level {
        Level::Beginner => (60.0, 1.5),
        Level::Intermediary => (70.0, 2.0),
        Level::Senior => (80.0, 2.5),
    }
}

pub fn action_verbs(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let stats = action_verbs::analyze(&input.bullets);
    let (required_coverage, required_average_tier) = verb_thresholds(input.level());
    let diagnostics = Diagnostics::ActionVerbs {
        stats: stats.clone(),
        required_coverage,
        required_average_tier,
    };

    if stats.total_bullets == 0 {
        return Ok(ParameterOutcome::new(0.0, "No achievement bullets to assess", diagnostics));
    }

    let coverage_met = stats.coverage >= required_coverage;
    let tier_met = stats.average_tier >= required_average_tier;
    let (score, verdict) = match (coverage_met, tier_met) {
        (true, true) => (15.0, "both thresholds met"),
        (true, false) => (8.0, "verbs present but weak"),
        (false, true) => (8.0, "strong verbs but too few bullets lead with one"),
        (false, false) => (0.0, "neither threshold met"),
    };

    Ok(ParameterOutcome::new(
        score,
        format!(
            "Action verbs: {:.0}% coverage (need {:.0}%), average tier {:.2} (need {:.1}); {}",
            stats.coverage, required_coverage, stats.average_tier, required_average_tier, verdict
        ),
        diagnostics,
    ))
}

/// Piecewise-linear curve over the weighted quantification rate.
pub fn quantification_curve(rate: f64) -> f64 {
    match rate {
        r if r >= 80.0 => 10.0,
        r if r >= 60.0 => interpolate(r, (60.0, 80.0), (8.0, 10.0)),
        r if r >= 40.0 => interpolate(r, (40.0, 60.0), (6.0, 8.0)),
        r if r >= 25.0 => interpolate(r, (25.0, 40.0), (4.0, 6.0)),
        r if r >= 10.0 => interpolate(r, (10.0, 25.0), (2.0, 4.0)),
        r => (r.max(0.0) / 10.0) * 2.0,
    }
}

pub fn quantification(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let summary = quantification::analyze(&input.bullets);
    if summary.total_bullets == 0 {
        return Ok(ParameterOutcome::new(
            0.0,
            "No achievement bullets to assess",
            Diagnostics::Quantification(summary),
        ));
    }

    let score = quantification_curve(summary.weighted_rate);
    Ok(ParameterOutcome::new(
        score,
        format!(
            "Weighted quantification rate {:.1}% ({} high, {} medium, {} low, {} without numbers)",
            summary.weighted_rate, summary.high, summary.medium, summary.low, summary.unquantified
        ),
        Diagnostics::Quantification(summary),
    ))
}

pub fn achievement_depth(input: &ScoringInput<'_>) -> Result<ParameterOutcome, ScoringError> {
    let report = vague_phrases::detect_all(&input.bullets);
    let score = at_most(report.count as f64, &[(0.0, 5.0), (2.0, 4.0), (4.0, 2.0)], 0.0);
    let message = if report.count == 0 {
        "No vague responsibility phrasing".to_string()
    } else {
        format!("{} vague phrase(s) describe duties instead of outcomes", report.count)
    };
    Ok(ParameterOutcome::new(score, message, Diagnostics::VaguePhrases(report)))
}

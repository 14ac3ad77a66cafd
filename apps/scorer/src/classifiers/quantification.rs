//! Quantification quality: how strong the numbers in a bullet are.
//!
//! Three ordered pattern families; the first that matches decides:
//! - HIGH: percentages, currency with magnitude, multipliers, from→to deltas
//! - MEDIUM: team sizes, durations, user/traffic scale, counted deliverables
//! - LOW: any other number

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricQuality {
    Low,
    Medium,
    High,
}

impl MetricQuality {
    pub fn weight(self) -> f64 {
        match self {
            MetricQuality::Low => 0.3,
            MetricQuality::Medium => 0.7,
            MetricQuality::High => 1.0,
        }
    }
}

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("valid quantification regex")
}

static HIGH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // percentages
        pattern(r"(?i)\d+(?:\.\d+)?\s?(?:%|percent\b|pct\b)"),
        // currency with a magnitude suffix
        pattern(r"(?i)[$€£¥]\s?\d[\d,]*(?:\.\d+)?\s?(?:k|m|mm|b|bn|million|billion|thousand)\b"),
        pattern(
            r"(?i)\b\d[\d,]*(?:\.\d+)?\s?(?:k|m|mm|b|bn|million|billion)\s+(?:in\s+)?(?:revenue|arr|mrr|savings|dollars|usd|eur|gbp|sales|funding|budget)\b",
        ),
        // multipliers
        pattern(r"(?i)\b\d+(?:\.\d+)?\s?x\b"),
        pattern(r"(?i)\b(?:doubled|tripled|quadrupled|halved)\b"),
        // deltas
        pattern(r"(?i)\bfrom\s+[$€£~]?\d[\d,.]*\s*[a-z%]*\s+to\s+[$€£~]?\d"),
    ]
});

static MEDIUM_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // team sizes
        pattern(r"(?i)\b(?:team|group|staff|squad|department|organization|org)\s+of\s+\d+"),
        pattern(
            r"(?i)\b\d+\+?\s*(?:-\s*)?(?:person|people|members?|engineers?|developers?|designers?|analysts?|direct reports|reports|interns?|employees|contractors|volunteers|staff)\b",
        ),
        // durations
        pattern(
            r"(?i)\b\d+(?:\.\d+)?\s*\+?\s*(?:-\s*)?(?:milliseconds?|ms|seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?|months?|years?|yrs?|quarters?|sprints?)\b",
        ),
        // user / traffic scale
        pattern(
            r"(?i)\b\d[\d,.]*\s*(?:k|m|b|thousand|million|billion)?\+?\s+(?:(?:daily|monthly|weekly|active|concurrent|unique|paying)\s+)*(?:users|customers|clients|visitors|requests|transactions|downloads|subscribers|records|queries|events|messages|rows|accounts|sessions|patients|students|installs|tps|qps|rps)\b",
        ),
        // counted deliverables
        pattern(
            r"(?i)\b\d+\+?\s+(?:new\s+)?(?:projects?|features?|applications?|apps?|services?|microservices?|products?|releases?|dashboards?|models?|courses?|campaigns?|articles?|papers?|patents?|integrations?|apis?|pipelines?|websites?|modules?|workshops?|stores|locations|markets|countries|languages)\b",
        ),
    ]
});

static ANY_NUMBER: Lazy<Regex> = Lazy::new(|| pattern(r"\d"));

/// Metric quality of one bullet, `None` when it carries no number at all.
pub fn classify(bullet: &str) -> Option<MetricQuality> {
    if HIGH_PATTERNS.iter().any(|re| re.is_match(bullet)) {
        Some(MetricQuality::High)
    } else if MEDIUM_PATTERNS.iter().any(|re| re.is_match(bullet)) {
        Some(MetricQuality::Medium)
    } else if ANY_NUMBER.is_match(bullet) {
        Some(MetricQuality::Low)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantificationSummary {
    pub total_bullets: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unquantified: usize,
    /// (high·1.0 + medium·0.7 + low·0.3) / total · 100; 0 with no bullets.
    pub weighted_rate: f64,
}

pub fn analyze(bullets: &[String]) -> QuantificationSummary {
    let (mut high, mut medium, mut low, mut unquantified) = (0, 0, 0, 0);
    for bullet in bullets {
        match classify(bullet) {
            Some(MetricQuality::High) => high += 1,
            Some(MetricQuality::Medium) => medium += 1,
            Some(MetricQuality::Low) => low += 1,
            None => unquantified += 1,
        }
    }

    let total = bullets.len();
    let weighted_rate = if total == 0 {
        0.0
    } else {
        (high as f64 * MetricQuality::High.weight()
            + medium as f64 * MetricQuality::Medium.weight()
            + low as f64 * MetricQuality::Low.weight())
            / total as f64
            * 100.0
    };

    QuantificationSummary {
        total_bullets: total,
        high,
        medium,
        low,
        unquantified,
        weighted_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullets(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_high_family() {
        assert_eq!(classify("Increased revenue by 45%"), Some(MetricQuality::High));
        assert_eq!(classify("Cut cloud spend by 12 percent"), Some(MetricQuality::High));
        assert_eq!(classify("Closed $2.5M in new business"), Some(MetricQuality::High));
        assert_eq!(classify("Drove 3 million in revenue"), Some(MetricQuality::High));
        assert_eq!(classify("Made the build 4x faster"), Some(MetricQuality::High));
        assert_eq!(classify("Doubled trial conversion"), Some(MetricQuality::High));
        assert_eq!(
            classify("Reduced p99 latency from 800ms to 120ms"),
            Some(MetricQuality::High)
        );
    }

    #[test]
    fn test_medium_family() {
        assert_eq!(classify("Led team of 8"), Some(MetricQuality::Medium));
        assert_eq!(classify("Managed 12 engineers across two sites"), Some(MetricQuality::Medium));
        assert_eq!(classify("Delivered the rewrite in 6 weeks"), Some(MetricQuality::Medium));
        assert_eq!(classify("Served 50k daily active users"), Some(MetricQuality::Medium));
        assert_eq!(classify("Shipped 4 new features"), Some(MetricQuality::Medium));
    }

    #[test]
    fn test_low_family_and_none() {
        assert_eq!(classify("Fixed 5 bugs"), Some(MetricQuality::Low));
        assert_eq!(classify("Charged $500 per seat"), Some(MetricQuality::Low));
        assert_eq!(classify("Improved onboarding docs"), None);
    }

    #[test]
    fn test_high_wins_over_medium() {
        assert_eq!(
            classify("Led team of 8 to grow revenue 30%"),
            Some(MetricQuality::High)
        );
    }

    #[test]
    fn test_weighted_rate_mixed_bullets() {
        let summary = analyze(&bullets(&[
            "Increased revenue by 45%",
            "Led team of 8",
            "Fixed 5 bugs",
        ]));
        assert_eq!((summary.high, summary.medium, summary.low), (1, 1, 1));
        let expected = (1.0 + 0.7 + 0.3) / 3.0 * 100.0;
        assert!(
            (summary.weighted_rate - expected).abs() < 0.1,
            "weighted rate was {}",
            summary.weighted_rate
        );
        assert!((summary.weighted_rate - 66.67).abs() < 0.1);
    }

    #[test]
    fn test_weighted_rate_counts_unquantified_in_denominator() {
        let summary = analyze(&bullets(&["Increased revenue by 45%", "Wrote docs"]));
        assert_eq!(summary.unquantified, 1);
        assert!((summary.weighted_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_batch_is_zero() {
        let summary = analyze(&[]);
        assert_eq!(summary.total_bullets, 0);
        assert_eq!(summary.weighted_rate, 0.0);
    }
}

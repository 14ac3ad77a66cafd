//! Action-verb tiers: maps a bullet's leading verb to one of five quality tiers.
//!
//! Lookup order:
//! 1. Multi-word phrases, longest match across every tier, anchored at the start of the
//!    bullet (or right after a `Label:` prefix).
//! 2. With a colon: the first two tokens after it. Otherwise: the first three tokens.
//!    Each token is also tried split on hyphens (`co-led`, `re-architected`).
//!
//! First hit wins. Weak verbs are explicit tier-0 entries so "Helped lead…" stays weak.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::text::normalize_bullet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbTier {
    Weak = 0,
    Execution = 1,
    Achievement = 2,
    Leadership = 3,
    Transformational = 4,
}

impl VerbTier {
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Point value of the tier; tier n is worth n points.
    pub fn points(self) -> f64 {
        self as u8 as f64
    }
}

const TRANSFORMATIONAL: &[&str] = &[
    "spearheaded", "pioneered", "transformed", "founded", "co-founded", "cofounded",
    "revolutionized", "architected", "orchestrated", "championed", "instituted", "established",
    "launched", "conceived", "invented", "overhauled", "reinvented", "scaled",
];

const LEADERSHIP: &[&str] = &[
    "led", "lead", "leads", "directed", "managed", "manage", "manages", "headed", "supervised",
    "mentored", "coached", "owned", "own", "drove", "oversaw", "oversee", "guided", "built",
    "build", "designed", "design", "delivered", "negotiated", "recruited", "hired", "chaired",
    "initiated", "steered", "authored", "shipped",
];

const ACHIEVEMENT: &[&str] = &[
    "increased", "reduced", "improved", "optimized", "optimised", "accelerated", "streamlined",
    "achieved", "generated", "saved", "boosted", "grew", "cut", "decreased", "exceeded",
    "surpassed", "maximized", "minimized", "enhanced", "expanded", "won", "secured",
    "automated", "resolved", "eliminated", "doubled", "tripled", "strengthened", "modernized",
    "migrated", "slashed", "lowered", "raised",
];

const EXECUTION: &[&str] = &[
    "developed", "develop", "created", "create", "wrote", "implemented", "implement",
    "analyzed", "analysed", "coordinated", "maintained", "tested", "configured", "deployed",
    "programmed", "engineered", "researched", "prepared", "conducted", "organized", "trained",
    "documented", "integrated", "monitored", "performed", "processed", "produced", "compiled",
    "installed", "debugged", "refactored", "reviewed", "presented", "planned", "executed",
    "collaborated", "partnered", "evaluated", "identified", "fixed", "prototyped", "modeled",
    "published", "taught", "facilitated",
];

const WEAK: &[&str] = &[
    "helped", "assisted", "worked", "participated", "responsible", "tasked", "involved",
    "supported", "handled", "did", "used", "utilized", "tried", "attended", "familiar",
];

const PHRASES: &[(&str, VerbTier)] = &[
    ("built from scratch", VerbTier::Transformational),
    ("built from the ground up", VerbTier::Transformational),
    ("turned around", VerbTier::Transformational),
    ("led the transformation", VerbTier::Transformational),
    ("took ownership of", VerbTier::Leadership),
    ("took ownership", VerbTier::Leadership),
    ("stood up", VerbTier::Leadership),
    ("set up", VerbTier::Leadership),
    ("brought down", VerbTier::Achievement),
    ("rolled out", VerbTier::Achievement),
    ("carried out", VerbTier::Execution),
    ("put together", VerbTier::Execution),
    ("responsible for", VerbTier::Weak),
    ("was responsible for", VerbTier::Weak),
    ("worked on", VerbTier::Weak),
    ("helped with", VerbTier::Weak),
    ("helped to", VerbTier::Weak),
    ("assisted with", VerbTier::Weak),
    ("assisted in", VerbTier::Weak),
    ("participated in", VerbTier::Weak),
    ("involved in", VerbTier::Weak),
    ("was involved in", VerbTier::Weak),
    ("tasked with", VerbTier::Weak),
    ("duties included", VerbTier::Weak),
    ("in charge of", VerbTier::Weak),
];

static LEXICON: Lazy<HashMap<&'static str, VerbTier>> = Lazy::new(|| {
    let tiers = [
        (TRANSFORMATIONAL, VerbTier::Transformational),
        (LEADERSHIP, VerbTier::Leadership),
        (ACHIEVEMENT, VerbTier::Achievement),
        (EXECUTION, VerbTier::Execution),
        (WEAK, VerbTier::Weak),
    ];
    let mut map = HashMap::new();
    for (words, tier) in tiers {
        for &word in words {
            map.entry(word).or_insert(tier);
        }
    }
    map
});

/// Longest phrase that starts `text` at a word boundary.
fn match_phrase(text: &str) -> Option<VerbTier> {
    PHRASES
        .iter()
        .filter(|(phrase, _)| {
            text.strip_prefix(phrase)
                .map(|rest| !rest.starts_with(|c: char| c.is_alphanumeric()))
                .unwrap_or(false)
        })
        .max_by_key(|(phrase, _)| phrase.len())
        .map(|(_, tier)| *tier)
}

fn lookup_token(token: &str) -> Option<VerbTier> {
    let token = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '-');
    if token.is_empty() {
        return None;
    }
    if let Some(tier) = LEXICON.get(token) {
        return Some(*tier);
    }
    token
        .split('-')
        .filter(|part| !part.is_empty())
        .find_map(|part| LEXICON.get(part).copied())
}

/// Classifies one bullet. Pure and deterministic.
pub fn classify(bullet: &str) -> VerbTier {
    let text = normalize_bullet(bullet).to_lowercase();
    if text.is_empty() {
        return VerbTier::Weak;
    }

    let (scope, window) = match text.split_once(':') {
        Some((_, after)) => (after.trim_start(), 2),
        None => (text.as_str(), 3),
    };

    if let Some(tier) = match_phrase(&text).or_else(|| match_phrase(scope)) {
        return tier;
    }

    scope
        .split_whitespace()
        .take(window)
        .find_map(lookup_token)
        .unwrap_or(VerbTier::Weak)
}

/// Batch statistics over a bullet list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbStats {
    pub total_bullets: usize,
    /// Index = tier ordinal.
    pub tier_counts: [usize; 5],
    /// Percentage (0–100) of bullets at tier ≥ 1.
    pub coverage: f64,
    pub average_tier: f64,
}

pub fn analyze(bullets: &[String]) -> VerbStats {
    let mut tier_counts = [0usize; 5];
    for bullet in bullets {
        tier_counts[classify(bullet).ordinal()] += 1;
    }

    let total = bullets.len();
    if total == 0 {
        return VerbStats {
            total_bullets: 0,
            tier_counts,
            coverage: 0.0,
            average_tier: 0.0,
        };
    }

    let recognized = total - tier_counts[0];
    let points: usize = tier_counts.iter().enumerate().map(|(t, n)| t * n).sum();

    VerbStats {
        total_bullets: total,
        tier_counts,
        coverage: recognized as f64 / total as f64 * 100.0,
        average_tier: points as f64 / total as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_verbs_by_tier() {
        assert_eq!(classify("Spearheaded the cloud migration"), VerbTier::Transformational);
        assert_eq!(classify("Led team of 8"), VerbTier::Leadership);
        assert_eq!(classify("Increased revenue by 45%"), VerbTier::Achievement);
        assert_eq!(classify("Fixed 5 bugs"), VerbTier::Execution);
        assert_eq!(classify("Helped the team with releases"), VerbTier::Weak);
    }

    #[test]
    fn test_unknown_verb_is_tier_zero() {
        assert_eq!(classify("Kubernetes and Terraform"), VerbTier::Weak);
        assert_eq!(classify(""), VerbTier::Weak);
    }

    #[test]
    fn test_phrases_checked_first_longest_wins() {
        assert_eq!(classify("Built from scratch a billing engine"), VerbTier::Transformational);
        assert_eq!(classify("Took ownership of the on-call rotation"), VerbTier::Leadership);
        assert_eq!(classify("Responsible for deployments"), VerbTier::Weak);
        assert_eq!(classify("Was responsible for led initiatives"), VerbTier::Weak);
    }

    #[test]
    fn test_phrase_requires_word_boundary() {
        // "set up" must not fire on "setups"
        assert_eq!(classify("Setups automated nightly"), VerbTier::Achievement);
    }

    #[test]
    fn test_colon_prefix_checks_two_tokens_after_colon() {
        assert_eq!(classify("Project Atlas: architected the data lake"), VerbTier::Transformational);
        assert_eq!(classify("Payments: quickly delivered refunds"), VerbTier::Leadership);
        assert_eq!(classify("Payments: the new refunds flow shipped"), VerbTier::Weak);
    }

    #[test]
    fn test_adverb_prefixed_verbs_within_three_tokens() {
        assert_eq!(classify("Successfully reduced churn"), VerbTier::Achievement);
        assert_eq!(classify("Single-handedly launched CI"), VerbTier::Transformational);
        // Fourth token is out of the window.
        assert_eq!(classify("Very quickly and launched CI"), VerbTier::Weak);
    }

    #[test]
    fn test_hyphenated_compounds_split() {
        assert_eq!(classify("Co-led the platform team"), VerbTier::Leadership);
        assert_eq!(classify("Re-architected ingestion"), VerbTier::Transformational);
    }

    #[test]
    fn test_weak_first_token_wins_over_later_strong_verb() {
        assert_eq!(classify("Helped lead the launch"), VerbTier::Weak);
    }

    #[test]
    fn test_bullet_glyphs_ignored() {
        assert_eq!(classify("• Optimized SQL queries"), VerbTier::Achievement);
    }

    #[test]
    fn test_classifier_is_deterministic() {
        let bullet = "Orchestrated a zero-downtime migration to Postgres 15";
        let first = classify(bullet);
        for _ in 0..50 {
            assert_eq!(classify(bullet), first);
        }
    }

    #[test]
    fn test_analyze_coverage_and_average() {
        let bullets: Vec<String> = [
            "Increased revenue by 45%",
            "Led team of 8",
            "Fixed 5 bugs",
            "Responsible for reports",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let stats = analyze(&bullets);
        assert_eq!(stats.total_bullets, 4);
        assert_eq!(stats.tier_counts, [1, 1, 1, 1, 0]);
        assert!((stats.coverage - 75.0).abs() < 1e-9);
        assert!((stats.average_tier - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_empty() {
        let stats = analyze(&[]);
        assert_eq!(stats.total_bullets, 0);
        assert_eq!(stats.coverage, 0.0);
    }

    #[test]
    fn test_points_follow_ordinal() {
        assert_eq!(VerbTier::Weak.points(), 0.0);
        assert_eq!(VerbTier::Transformational.points(), 4.0);
    }
}

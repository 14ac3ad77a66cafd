//! Vague-phrase detector: boilerplate "responsibility" language that describes duties
//! instead of outcomes. Every occurrence counts, duplicates included.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const VAGUE_PHRASES: &[&str] = &[
    "responsible for",
    "worked on",
    "worked with",
    "helped with",
    "helped to",
    "involved in",
    "exposure to",
    "knowledge of",
    "familiar with",
    "participated in",
    "assisted with",
    "assisted in",
    "tasked with",
    "duties included",
    "in charge of",
    "various tasks",
    "day-to-day",
];

static VAGUE_RE: Lazy<Regex> = Lazy::new(|| {
    // Longest first so "helped with" is not shadowed by a shorter alternative.
    let mut phrases: Vec<&str> = VAGUE_PHRASES.to_vec();
    phrases.sort_by_key(|p| std::cmp::Reverse(p.len()));
    let alternation = phrases
        .iter()
        .map(|p| regex::escape(p).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("valid vague phrase regex")
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VagueReport {
    pub count: usize,
    /// Lowercased matches in document order, duplicates kept.
    pub phrases: Vec<String>,
}

/// Scans one piece of text.
pub fn detect(text: &str) -> VagueReport {
    let phrases: Vec<String> = VAGUE_RE
        .find_iter(text)
        .map(|m| normalize_match(m.as_str()))
        .collect();
    VagueReport {
        count: phrases.len(),
        phrases,
    }
}

/// Scans every bullet and sums the occurrences.
pub fn detect_all(bullets: &[String]) -> VagueReport {
    bullets
        .iter()
        .map(|b| detect(b))
        .fold(VagueReport::default(), |mut acc, report| {
            acc.count += report.count;
            acc.phrases.extend(report.phrases);
            acc
        })
}

fn normalize_match(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// Hybrid keyword matching.
// Implements: per-keyword hybrid score (semantic similarity + exact boundary match),
// batch scoring and the matched/unmatched summary consumed by the keyword scorers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod hybrid;

pub use hybrid::{exact_match, HybridMatcher, DEFAULT_THRESHOLD};

/// Outcome of matching a keyword list against one text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Distinct keywords after case-insensitive de-duplication.
    pub total: usize,
    pub matched_count: usize,
    /// matched_count / total · 100; 0 with no keywords.
    pub match_rate: f64,
    pub threshold: f64,
    pub scores: BTreeMap<String, f64>,
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
}

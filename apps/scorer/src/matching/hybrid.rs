//! Hybrid matcher: `0.7 · similarity + 0.3 · exact`.
//!
//! `similarity` is the best provider similarity between the keyword and any sentence
//! segment of the text; an exact boundary occurrence fixes it at 1.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use super::MatchSummary;
use crate::similarity::SimilarityProvider;
use crate::text::split_sentences;

pub const SIMILARITY_WEIGHT: f64 = 0.7;
pub const EXACT_WEIGHT: f64 = 0.3;
pub const DEFAULT_THRESHOLD: f64 = 0.6;

#[derive(Clone)]
pub struct HybridMatcher {
    provider: Arc<dyn SimilarityProvider>,
}

impl HybridMatcher {
    pub fn new(provider: Arc<dyn SimilarityProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn SimilarityProvider> {
        &self.provider
    }

    /// Hybrid score in [0, 1]. Blank keyword or text scores 0.
    pub async fn match_keyword(&self, keyword: &str, text: &str) -> f64 {
        self.score_against(keyword, text, &segments(text)).await
    }

    /// Scores for every distinct keyword, keyed by its first spelling.
    pub async fn match_keywords(&self, keywords: &[String], text: &str) -> BTreeMap<String, f64> {
        let segments = segments(text);
        let mut scores = BTreeMap::new();
        for keyword in distinct(keywords) {
            let score = self.score_against(&keyword, text, &segments).await;
            scores.insert(keyword, score);
        }
        scores
    }

    /// Splits keywords into matched (score ≥ threshold) and unmatched, each list
    /// alphabetical.
    pub async fn summary(&self, keywords: &[String], text: &str, threshold: f64) -> MatchSummary {
        let scores = self.match_keywords(keywords, text).await;
        let (matched, unmatched): (Vec<String>, Vec<String>) = scores
            .iter()
            .map(|(k, _)| k.clone())
            .partition(|k| scores.get(k).is_some_and(|s| *s >= threshold));

        let total = scores.len();
        let matched_count = matched.len();
        let match_rate = if total == 0 {
            0.0
        } else {
            matched_count as f64 / total as f64 * 100.0
        };
        debug!(
            "Matched {}/{} keywords at threshold {:.2}",
            matched_count, total, threshold
        );

        MatchSummary {
            total,
            matched_count,
            match_rate,
            threshold,
            scores,
            matched,
            unmatched,
        }
    }

    async fn score_against(&self, keyword: &str, text: &str, segments: &[String]) -> f64 {
        let keyword = keyword.trim();
        if keyword.is_empty() || segments.is_empty() {
            return 0.0;
        }
        if exact_match(keyword, text) {
            return SIMILARITY_WEIGHT + EXACT_WEIGHT;
        }
        let best = self
            .provider
            .similarity_many(keyword, segments)
            .await
            .into_iter()
            .fold(0.0_f64, f64::max);
        (SIMILARITY_WEIGHT * best.clamp(0.0, 1.0)).clamp(0.0, 1.0)
    }
}

fn segments(text: &str) -> Vec<String> {
    split_sentences(text).into_iter().map(String::from).collect()
}

/// Trimmed, non-blank keywords with case-insensitive duplicates removed; the first
/// spelling wins.
fn distinct(keywords: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .iter()
        .map(|k| collapse_whitespace(k))
        .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Symbols that belong to technology names and therefore do not end a term.
fn is_term_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}

/// Case-insensitive occurrence of `keyword` in `text` bounded on both sides by a
/// non-term character or the edge of the text.
pub fn exact_match(keyword: &str, text: &str) -> bool {
    let needle = collapse_whitespace(keyword).to_lowercase();
    if needle.is_empty() {
        return false;
    }
    let haystack = collapse_whitespace(text).to_lowercase();

    let mut from = 0;
    while let Some(found) = haystack[from..].find(&needle) {
        let start = from + found;
        let end = start + needle.len();
        let before_ok = haystack[..start].chars().next_back().map_or(true, |c| !is_term_char(c));
        let after_ok = haystack[end..].chars().next().map_or(true, |c| !is_term_char(c));
        if before_ok && after_ok {
            return true;
        }
        // Advance by one character to catch overlapping occurrences.
        from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::LexicalSimilarity;

    fn matcher() -> HybridMatcher {
        HybridMatcher::new(Arc::new(LexicalSimilarity::new()))
    }

    fn keywords(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    const TEXT: &str = "Built data pipelines in Python and SQL.\nDeployed services to Kubernetes with Terraform.\nWrote C++ and C# tooling for node.js builds.";

    #[test]
    fn test_exact_match_boundaries() {
        assert!(exact_match("python", TEXT));
        assert!(exact_match("C++", TEXT));
        assert!(exact_match("c#", TEXT));
        assert!(exact_match("node.js", TEXT));
        assert!(!exact_match("C", TEXT), "C must not match inside C++ or C#");
        assert!(!exact_match("go", "Good governance"));
        assert!(exact_match("react", "Shipped react-native apps"));
        assert!(exact_match("machine   learning", "Machine learning models"));
        assert!(!exact_match("", TEXT));
    }

    #[tokio::test]
    async fn test_exact_keyword_scores_high() {
        let score = matcher().match_keyword("kubernetes", TEXT).await;
        assert!(score >= 0.95, "score was {score}");
    }

    #[tokio::test]
    async fn test_unrelated_keyword_scores_low() {
        let score = matcher().match_keyword("Salesforce administration", TEXT).await;
        assert!(score < 0.4, "score was {score}");
    }

    #[tokio::test]
    async fn test_empty_inputs_are_zero_not_errors() {
        let m = matcher();
        assert_eq!(m.match_keyword("", TEXT).await, 0.0);
        assert_eq!(m.match_keyword("python", "").await, 0.0);

        let summary = m.summary(&[], TEXT, DEFAULT_THRESHOLD).await;
        assert_eq!(summary.total, 0);
        assert_eq!(summary.match_rate, 0.0);
        assert!(summary.matched.is_empty() && summary.unmatched.is_empty());

        let summary = m.summary(&keywords(&["python"]), "", DEFAULT_THRESHOLD).await;
        assert_eq!(summary.matched_count, 0);
        assert_eq!(summary.unmatched, vec!["python"]);
    }

    #[tokio::test]
    async fn test_summary_splits_and_deduplicates() {
        let list = keywords(&["Python", "python", "Terraform", "Salesforce", "  "]);
        let summary = matcher().summary(&list, TEXT, DEFAULT_THRESHOLD).await;
        assert_eq!(summary.total, 3);
        assert_eq!(summary.matched, vec!["Python", "Terraform"]);
        assert_eq!(summary.unmatched, vec!["Salesforce"]);
        assert!((summary.match_rate - 200.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_summary_is_order_independent() {
        let m = matcher();
        let forward = m.summary(&keywords(&["SQL", "Terraform", "Go"]), TEXT, 0.6).await;
        let reverse = m.summary(&keywords(&["Go", "Terraform", "SQL"]), TEXT, 0.6).await;
        assert_eq!(forward, reverse);
    }

    #[tokio::test]
    async fn test_semantic_only_match_is_capped_below_exact() {
        // Words present but not as a phrase: similarity only, no exact credit.
        let score = matcher()
            .match_keyword("pipelines data", "Built data pipelines in Python")
            .await;
        assert!(score < 0.95 && score > 0.5, "score was {score}");
    }

    #[tokio::test]
    async fn test_single_word_skill_does_not_match_longer_keyword() {
        let m = matcher();
        let skills = "Rust\nDesign\nTesting";
        for keyword in ["system design", "a/b testing", "experiment design"] {
            let score = m.match_keyword(keyword, skills).await;
            assert!(score < DEFAULT_THRESHOLD, "{keyword} scored {score}");
        }
        assert!(m.match_keyword("design", skills).await >= 0.95);
    }
}

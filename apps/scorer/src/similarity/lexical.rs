//! Lexical similarity: deterministic, dependency-free, always available.
//! Used directly when no embedding service is configured and as the fallback for
//! every model-backed call that cannot be served.

use std::collections::HashSet;

use async_trait::async_trait;

use super::keyphrases::{candidates, frequency_relevance, select_diverse};
use super::{Keyphrase, SimilarityProvider};
use crate::text::{content_terms, stem, tokenize};

pub const BACKEND: &str = "lexical";

#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalSimilarity;

impl LexicalSimilarity {
    pub fn new() -> Self {
        Self
    }

    /// How well `text` covers `query`. 1.0 when the query occurs in the text as a
    /// whole-token run (after light stemming), otherwise `0.8·containment + 0.2·jaccard`
    /// where containment is the share of the query's content terms found in the text.
    /// A short text inside a longer query is not a match.
    pub fn score(&self, query: &str, text: &str) -> f64 {
        let query_run = stemmed_tokens(query);
        let text_run = stemmed_tokens(text);
        if query_run.is_empty() || text_run.is_empty() {
            return 0.0;
        }
        if contains_run(&text_run, &query_run) {
            return 1.0;
        }

        let query_terms: HashSet<String> = content_terms(query).into_iter().collect();
        let text_terms: HashSet<String> = content_terms(text).into_iter().collect();
        if query_terms.is_empty() || text_terms.is_empty() {
            return 0.0;
        }
        let shared = query_terms.intersection(&text_terms).count() as f64;
        let containment = shared / query_terms.len() as f64;
        let jaccard = shared / query_terms.union(&text_terms).count() as f64;
        (0.8 * containment + 0.2 * jaccard).clamp(0.0, 1.0)
    }

    /// Overlap between two phrases regardless of direction.
    fn redundancy(&self, a: &str, b: &str) -> f64 {
        self.score(a, b).max(self.score(b, a))
    }

    pub fn keyphrases(&self, text: &str, top_n: usize, diversity: f64) -> Vec<Keyphrase> {
        let found = candidates(text);
        let relevance = frequency_relevance(&found);
        select_diverse(&relevance, top_n, diversity, |i, j| {
            self.redundancy(&found[i].phrase, &found[j].phrase)
        })
        .into_iter()
        .map(|i| Keyphrase {
            phrase: found[i].phrase.clone(),
            relevance: relevance[i],
        })
        .collect()
    }
}

#[async_trait]
impl SimilarityProvider for LexicalSimilarity {
    async fn similarity(&self, a: &str, b: &str) -> f64 {
        self.score(a, b)
    }

    async fn similarity_many(&self, query: &str, candidates: &[String]) -> Vec<f64> {
        candidates.iter().map(|c| self.score(query, c)).collect()
    }

    async fn extract_keyphrases(&self, text: &str, top_n: usize, diversity: f64) -> Vec<Keyphrase> {
        self.keyphrases(text, top_n, diversity)
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}

fn stemmed_tokens(text: &str) -> Vec<String> {
    tokenize(text).iter().map(|t| stem(t)).collect()
}

fn contains_run(haystack: &[String], needle: &[String]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_containment_is_full_similarity() {
        let lexical = LexicalSimilarity::new();
        assert_eq!(lexical.score("Python", "Built ETL jobs in Python and SQL"), 1.0);
        assert_eq!(lexical.score("CI/CD pipelines", "Owned CI/CD pipelines for 12 services"), 1.0);
    }

    #[test]
    fn test_unrelated_text_scores_zero() {
        let lexical = LexicalSimilarity::new();
        assert_eq!(lexical.score("Kubernetes", "Wrote marketing copy"), 0.0);
    }

    #[test]
    fn test_partial_overlap_is_between() {
        let lexical = LexicalSimilarity::new();
        let s = lexical.score("machine learning", "Learning platform for machine operators");
        assert!(s > 0.5 && s < 1.0, "similarity was {s}");
    }

    #[test]
    fn test_short_text_inside_longer_query_is_partial() {
        let lexical = LexicalSimilarity::new();
        let s = lexical.score("system design", "Design");
        assert!(s < 0.6, "similarity was {s}");
        assert_eq!(lexical.score("Design", "system design"), 1.0);
        assert!(lexical.score("a/b testing", "Testing") < 0.6);
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        let lexical = LexicalSimilarity::new();
        assert_eq!(lexical.score("", "Designed systems for payments"), 0.0);
        assert_eq!(lexical.score("   ", ""), 0.0);
    }

    #[test]
    fn test_redundancy_is_symmetric() {
        let lexical = LexicalSimilarity::new();
        let (a, b) = ("rust", "rust services");
        assert_eq!(lexical.redundancy(a, b), lexical.redundancy(b, a));
        assert_eq!(lexical.redundancy(a, b), 1.0);
    }

    #[test]
    fn test_keyphrases_prefer_repeated_phrases() {
        let lexical = LexicalSimilarity::new();
        let text = "We need Rust services. Rust services run payments. Kafka streaming helps.";
        let phrases = lexical.keyphrases(text, 3, 0.0);
        assert_eq!(phrases[0].phrase, "rust services");
        assert!((phrases[0].relevance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_keyphrases_with_diversity_skip_subphrases() {
        let lexical = LexicalSimilarity::new();
        let text = "Rust services. Rust services. Kafka streaming.";
        let phrases = lexical.keyphrases(text, 2, 0.7);
        let names: Vec<&str> = phrases.iter().map(|k| k.phrase.as_str()).collect();
        assert_eq!(names[0], "rust services");
        assert!(!names.contains(&"rust"), "picked {names:?}");
    }

    #[test]
    fn test_keyphrases_empty_text() {
        assert!(LexicalSimilarity::new().keyphrases("", 5, 0.5).is_empty());
    }
}

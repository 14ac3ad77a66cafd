// Similarity provider layer.
// Implements: semantic text similarity and diverse keyphrase extraction behind one trait,
// a lexical backend, an embedding-model backend with lexical fallback, and result caching.
//
// Every provider call returns a value. Backend trouble (load failure, timeout, cache outage)
// degrades to the lexical answer for that call and is logged, never surfaced as an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod cache;
pub mod embedding;
pub mod keyphrases;
pub mod lexical;

pub use cache::{CacheBackend, CachedSimilarity, MemoryCache, RedisCache};
pub use embedding::{EmbeddingBackend, HttpEmbeddingBackend, ModelSettings, ModelSimilarity};
pub use lexical::LexicalSimilarity;

/// A phrase pulled out of a document with its relevance in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyphrase {
    pub phrase: String,
    pub relevance: f64,
}

/// The similarity trait. Implement this to swap backends without touching the matcher
/// or the scorers.
///
/// Carried as `Arc<dyn SimilarityProvider>`; implementations must be safe to share
/// across concurrent scoring calls.
#[async_trait]
pub trait SimilarityProvider: Send + Sync {
    /// Semantic similarity in [0, 1]. Empty input on either side scores 0.
    async fn similarity(&self, a: &str, b: &str) -> f64;

    /// Similarity of `query` against each candidate, in candidate order. Backends with
    /// per-call overhead should batch.
    async fn similarity_many(&self, query: &str, candidates: &[String]) -> Vec<f64> {
        let mut scores = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            scores.push(self.similarity(query, candidate).await);
        }
        scores
    }

    /// Up to `top_n` keyphrases ordered by selection, `diversity` in [0, 1] trading
    /// relevance (0) for spread (1).
    async fn extract_keyphrases(&self, text: &str, top_n: usize, diversity: f64) -> Vec<Keyphrase>;

    /// Same as [`extract_keyphrases`](Self::extract_keyphrases), paired with the label
    /// of the backend that actually produced the phrases. Providers that can fall back
    /// mid-call must override this.
    async fn extract_keyphrases_served(
        &self,
        text: &str,
        top_n: usize,
        diversity: f64,
    ) -> (Vec<Keyphrase>, &'static str) {
        (self.extract_keyphrases(text, top_n, diversity).await, self.backend())
    }

    /// Stable label of the configured backend, reported alongside scores.
    fn backend(&self) -> &'static str;

    /// Label of the backend that would serve a call right now. Differs from
    /// [`backend`](Self::backend) while a model backend is degraded.
    async fn active_backend(&self) -> &'static str {
        self.backend()
    }

    /// Prepares expensive resources ahead of the first call. Returns whether the
    /// primary backend is usable.
    async fn warm_up(&self) -> bool {
        true
    }
}

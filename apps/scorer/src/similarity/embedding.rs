//! Embedding-model similarity with a guaranteed lexical fallback.
//!
//! The model is loaded lazily on first use (or by an explicit warm-up). Load and
//! inference each run under their own timeout. A failed or timed-out load puts the
//! provider into a cooldown during which every call is served lexically without touching
//! the backend; the next call after the cooldown retries the load. An inference timeout
//! degrades only the call it happened on.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use super::cache::{cache_key, get_json, put_json, CacheBackend};
use super::keyphrases::{candidates, frequency_relevance, select_diverse};
use super::lexical::{self, LexicalSimilarity};
use super::{Keyphrase, SimilarityProvider};
use crate::config::Config;
use crate::errors::ProviderError;

pub const BACKEND: &str = "embedding";

/// Candidates embedded per keyphrase extraction; the rest are dropped by frequency.
const MAX_EMBEDDED_CANDIDATES: usize = 64;
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

// ────────────────────────────────────────────────────────────────────────────
// Backend trait + HTTP implementation
// ────────────────────────────────────────────────────────────────────────────

/// A text-embedding model. `load` brings the model to a servable state; `embed` returns
/// one vector per input, in input order.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Identifies the model in cache keys and logs.
    fn name(&self) -> &str;

    async fn load(&self) -> Result<(), ProviderError>;

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
}

/// Text-embeddings service over HTTP: `GET {base}/health` to load,
/// `POST {base}/embed {"inputs": [...]}` returning `[[f32]]`.
#[derive(Clone)]
pub struct HttpEmbeddingBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpEmbeddingBackend {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder().timeout(HTTP_TIMEOUT).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl EmbeddingBackend for HttpEmbeddingBackend {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn load(&self) -> Result<(), ProviderError> {
        let url = format!("{}/health", self.base_url);
        let response = self.authorized(self.client.get(&url)).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let url = format!("{}/embed", self.base_url);
        let response = self
            .authorized(self.client.post(&url))
            .json(&EmbedRequest { inputs })
            .send()
            .await?;
        let vectors: Vec<Vec<f32>> = Self::check(response).await?.json().await?;
        debug!("Embedded {} inputs", vectors.len());
        Ok(vectors)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ModelSimilarity
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ModelSettings {
    pub load_timeout: Duration,
    pub inference_timeout: Duration,
    pub retry_cooldown: Duration,
    pub embedding_cache_ttl: Duration,
}

impl ModelSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            load_timeout: config.model_load_timeout,
            inference_timeout: config.model_inference_timeout,
            retry_cooldown: config.model_retry_cooldown,
            embedding_cache_ttl: config.embedding_cache_ttl,
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, Copy)]
enum LoadState {
    NotLoaded,
    Ready,
    Failed { at: Instant },
}

pub struct ModelSimilarity<B> {
    backend: B,
    fallback: LexicalSimilarity,
    settings: ModelSettings,
    state: RwLock<LoadState>,
    /// Serialises load attempts so concurrent first calls trigger one load.
    load_lock: Mutex<()>,
    cache: Option<Arc<dyn CacheBackend>>,
}

impl<B: EmbeddingBackend> ModelSimilarity<B> {
    pub fn new(backend: B, settings: ModelSettings) -> Self {
        Self {
            backend,
            fallback: LexicalSimilarity::new(),
            settings,
            state: RwLock::new(LoadState::NotLoaded),
            load_lock: Mutex::new(()),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn is_ready(&self) -> bool {
        matches!(*self.state.read().await, LoadState::Ready)
    }

    /// `Some` when the load state already decides the outcome.
    fn settled(&self, state: LoadState) -> Option<Result<(), ProviderError>> {
        match state {
            LoadState::Ready => Some(Ok(())),
            LoadState::Failed { at } => {
                let elapsed = at.elapsed();
                if elapsed < self.settings.retry_cooldown {
                    Some(Err(ProviderError::CoolingDown {
                        remaining_secs: (self.settings.retry_cooldown - elapsed).as_secs(),
                    }))
                } else {
                    None
                }
            }
            LoadState::NotLoaded => None,
        }
    }

    async fn ensure_loaded(&self) -> Result<(), ProviderError> {
        let current = *self.state.read().await;
        if let Some(outcome) = self.settled(current) {
            return outcome;
        }

        let load_ms = millis(self.settings.load_timeout);
        let _guard = timeout(self.settings.load_timeout, self.load_lock.lock())
            .await
            .map_err(|_| ProviderError::Timeout(load_ms))?;

        // Another caller may have finished loading while we waited.
        let current = *self.state.read().await;
        if let Some(outcome) = self.settled(current) {
            return outcome;
        }

        let outcome = match timeout(self.settings.load_timeout, self.backend.load()).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(load_ms)),
        };

        let mut state = self.state.write().await;
        match &outcome {
            Ok(()) => {
                *state = LoadState::Ready;
                info!("Embedding model '{}' ready", self.backend.name());
            }
            Err(e) => {
                *state = LoadState::Failed { at: Instant::now() };
                warn!(
                    "Embedding model '{}' failed to load, serving lexical similarity for {}s: {}",
                    self.backend.name(),
                    self.settings.retry_cooldown.as_secs(),
                    e
                );
            }
        }
        outcome
    }

    fn embedding_key(&self, text: &str) -> String {
        cache_key("embedding", &[self.backend.name(), text])
    }

    /// One vector per text. Cached vectors are reused; the rest are embedded in a single
    /// backend call. The whole lookup runs under the inference timeout.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.ensure_loaded().await?;
        timeout(self.settings.inference_timeout, self.embed_with_cache(texts))
            .await
            .map_err(|_| ProviderError::Timeout(millis(self.settings.inference_timeout)))?
    }

    async fn embed_with_cache(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let mut vectors: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut misses: Vec<usize> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            if let Some(cache) = &self.cache {
                if let Some(hit) = get_json::<Vec<f32>>(cache.as_ref(), &self.embedding_key(text)).await {
                    vectors[i] = Some(hit);
                    continue;
                }
            }
            misses.push(i);
        }

        if !misses.is_empty() {
            let inputs: Vec<String> = misses.iter().map(|&i| texts[i].to_string()).collect();
            let fresh = self.backend.embed(&inputs).await?;
            if fresh.len() != inputs.len() || fresh.iter().any(Vec::is_empty) {
                return Err(ProviderError::EmptyEmbedding {
                    expected: inputs.len(),
                    got: fresh.iter().filter(|v| !v.is_empty()).count(),
                });
            }
            for (&i, vector) in misses.iter().zip(fresh) {
                if let Some(cache) = &self.cache {
                    put_json(
                        cache.as_ref(),
                        &self.embedding_key(texts[i]),
                        &vector,
                        self.settings.embedding_cache_ttl,
                    )
                    .await;
                }
                vectors[i] = Some(vector);
            }
        }

        Ok(vectors.into_iter().flatten().collect())
    }

    async fn model_keyphrases(&self, text: &str, top_n: usize, diversity: f64) -> Result<Vec<Keyphrase>, ProviderError> {
        let mut found = candidates(text);
        let lexical_relevance = frequency_relevance(&found);
        // Keep the most frequent candidates, still in first-occurrence order.
        if found.len() > MAX_EMBEDDED_CANDIDATES {
            let mut ranked: Vec<usize> = (0..found.len()).collect();
            ranked.sort_by(|&a, &b| lexical_relevance[b].total_cmp(&lexical_relevance[a]).then(a.cmp(&b)));
            ranked.truncate(MAX_EMBEDDED_CANDIDATES);
            ranked.sort_unstable();
            found = ranked.into_iter().map(|i| found[i].clone()).collect();
        }
        if found.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let mut texts: Vec<&str> = Vec::with_capacity(found.len() + 1);
        texts.push(text);
        texts.extend(found.iter().map(|c| c.phrase.as_str()));
        let vectors = self.embed(&texts).await?;
        let (document, phrases) = vectors.split_first().ok_or(ProviderError::EmptyEmbedding {
            expected: texts.len(),
            got: 0,
        })?;

        let relevance: Vec<f64> = phrases.iter().map(|v| cosine(document, v)).collect();
        let picked = select_diverse(&relevance, top_n, diversity, |i, j| cosine(&phrases[i], &phrases[j]));
        Ok(picked
            .into_iter()
            .map(|i| Keyphrase {
                phrase: found[i].phrase.clone(),
                relevance: relevance[i],
            })
            .collect())
    }

    fn degrade(&self, operation: &str, error: &ProviderError) {
        match error {
            ProviderError::CoolingDown { .. } => debug!("{} served lexically: {}", operation, error),
            _ => warn!("{} fell back to lexical similarity: {}", operation, error),
        }
    }
}

#[async_trait]
impl<B: EmbeddingBackend> SimilarityProvider for ModelSimilarity<B> {
    async fn similarity(&self, a: &str, b: &str) -> f64 {
        if a.trim().is_empty() || b.trim().is_empty() {
            return 0.0;
        }
        match self.embed(&[a, b]).await {
            Ok(vectors) if vectors.len() == 2 => cosine(&vectors[0], &vectors[1]),
            Ok(_) => self.fallback.score(a, b),
            Err(e) => {
                self.degrade("similarity", &e);
                self.fallback.score(a, b)
            }
        }
    }

    async fn similarity_many(&self, query: &str, candidates: &[String]) -> Vec<f64> {
        if query.trim().is_empty() {
            return vec![0.0; candidates.len()];
        }
        // Blank candidates score 0 and are never sent to the model.
        let filled: Vec<usize> = (0..candidates.len())
            .filter(|&i| !candidates[i].trim().is_empty())
            .collect();
        let mut texts: Vec<&str> = Vec::with_capacity(filled.len() + 1);
        texts.push(query);
        texts.extend(filled.iter().map(|&i| candidates[i].as_str()));

        match self.embed(&texts).await {
            Ok(vectors) if vectors.len() == texts.len() => {
                let mut scores = vec![0.0; candidates.len()];
                for (&i, vector) in filled.iter().zip(&vectors[1..]) {
                    scores[i] = cosine(&vectors[0], vector);
                }
                scores
            }
            Ok(_) => candidates.iter().map(|c| self.fallback.score(query, c)).collect(),
            Err(e) => {
                self.degrade("similarity", &e);
                candidates.iter().map(|c| self.fallback.score(query, c)).collect()
            }
        }
    }

    async fn extract_keyphrases(&self, text: &str, top_n: usize, diversity: f64) -> Vec<Keyphrase> {
        self.extract_keyphrases_served(text, top_n, diversity).await.0
    }

    async fn extract_keyphrases_served(
        &self,
        text: &str,
        top_n: usize,
        diversity: f64,
    ) -> (Vec<Keyphrase>, &'static str) {
        match self.model_keyphrases(text, top_n, diversity).await {
            Ok(phrases) => (phrases, BACKEND),
            Err(e) => {
                self.degrade("keyphrase extraction", &e);
                (self.fallback.keyphrases(text, top_n, diversity), lexical::BACKEND)
            }
        }
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn active_backend(&self) -> &'static str {
        let current = *self.state.read().await;
        match self.settled(current) {
            Some(Err(_)) => lexical::BACKEND,
            _ => BACKEND,
        }
    }

    async fn warm_up(&self) -> bool {
        self.ensure_loaded().await.is_ok()
    }
}

/// Cosine similarity clamped to [0, 1]. Mismatched or zero vectors score 0.
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::{CachedSimilarity, MemoryCache};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy, PartialEq)]
    enum Load {
        Succeeds,
        Fails,
        Hangs,
    }

    /// In-process stand-in for an embedding service. Texts containing "stall" hang
    /// inference forever.
    struct FakeBackend {
        load: Load,
        loads: AtomicUsize,
        embedded: AtomicUsize,
    }

    impl FakeBackend {
        fn new(load: Load) -> Self {
            Self {
                load,
                loads: AtomicUsize::new(0),
                embedded: AtomicUsize::new(0),
            }
        }
    }

    /// Bag-of-words vector over 16 hashed buckets.
    fn toy_vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0_f32; 16];
        for token in crate::text::tokenize(text) {
            let bucket = token.bytes().map(usize::from).sum::<usize>() % 16;
            v[bucket] += 1.0;
        }
        v
    }

    #[async_trait]
    impl EmbeddingBackend for Arc<FakeBackend> {
        fn name(&self) -> &str {
            "fake"
        }

        async fn load(&self) -> Result<(), ProviderError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            match self.load {
                Load::Succeeds => Ok(()),
                Load::Fails => Err(ProviderError::Api {
                    status: 503,
                    message: "model not available".into(),
                }),
                Load::Hangs => std::future::pending().await,
            }
        }

        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
            if inputs.iter().any(|t| t.contains("stall")) {
                std::future::pending::<()>().await;
            }
            self.embedded.fetch_add(inputs.len(), Ordering::SeqCst);
            Ok(inputs.iter().map(|t| toy_vector(t)).collect())
        }
    }

    fn settings() -> ModelSettings {
        ModelSettings {
            load_timeout: Duration::from_millis(500),
            inference_timeout: Duration::from_millis(200),
            retry_cooldown: Duration::from_secs(60),
            embedding_cache_ttl: Duration::from_secs(3600),
        }
    }

    #[test]
    fn test_cosine_bounds() {
        assert!((cosine(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-9);
        assert_eq!(cosine(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine(&[1.0, 0.0], &[-1.0, 0.0]), 0.0, "negative cosine clamps to 0");
        assert_eq!(cosine(&[], &[]), 0.0);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine(&[1.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_ready_model_serves_cosine() {
        let backend = Arc::new(FakeBackend::new(Load::Succeeds));
        let model = ModelSimilarity::new(backend.clone(), settings());
        let s = model.similarity("Rust services", "rust services").await;
        assert!((s - 1.0).abs() < 1e-6, "similarity was {s}");
        assert!(model.is_ready().await);
        assert_eq!(model.active_backend().await, BACKEND);
        assert_eq!(backend.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_load_falls_back_within_timeout() {
        let backend = Arc::new(FakeBackend::new(Load::Hangs));
        let model = ModelSimilarity::new(backend.clone(), settings());

        let started = Instant::now();
        let s = model.similarity("Python", "Built ETL jobs in Python").await;
        assert_eq!(s, LexicalSimilarity::new().score("Python", "Built ETL jobs in Python"));
        assert!(started.elapsed() <= Duration::from_millis(600), "took {:?}", started.elapsed());
        assert_eq!(model.active_backend().await, lexical::BACKEND);

        // Inside the cooldown the backend is not touched again.
        tokio::time::advance(Duration::from_secs(30)).await;
        model.similarity("Kafka", "Kafka streams").await;
        assert_eq!(backend.loads.load(Ordering::SeqCst), 1);

        // After the cooldown the next call retries the load.
        tokio::time::advance(Duration::from_secs(31)).await;
        model.similarity("Kafka", "Kafka streams").await;
        assert_eq!(backend.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_load_serves_lexical_keyphrases() {
        let backend = Arc::new(FakeBackend::new(Load::Fails));
        let model = ModelSimilarity::new(backend.clone(), settings());
        let text = "Rust services. Rust services. Kafka streaming.";
        let phrases = model.extract_keyphrases(text, 2, 0.5).await;
        assert_eq!(phrases, LexicalSimilarity::new().keyphrases(text, 2, 0.5));
        assert!(!model.warm_up().await, "warm-up inside the cooldown reports unavailable");
        assert_eq!(backend.embedded.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inference_timeout_degrades_only_that_call() {
        let backend = Arc::new(FakeBackend::new(Load::Succeeds));
        let model = ModelSimilarity::new(backend.clone(), settings());

        let s = model.similarity("stall", "stall everything").await;
        assert_eq!(s, 1.0, "lexical containment served the stalled call");
        assert!(model.is_ready().await, "inference timeout must not unload the model");

        let s = model.similarity("alpha beta", "alpha beta").await;
        assert!((s - 1.0).abs() < 1e-6);
        assert!(backend.embedded.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_embeddings_are_cached_per_text() {
        let backend = Arc::new(FakeBackend::new(Load::Succeeds));
        let model = ModelSimilarity::new(backend.clone(), settings()).with_cache(Arc::new(MemoryCache::new()));

        model.similarity("Rust", "Kafka").await;
        assert_eq!(backend.embedded.load(Ordering::SeqCst), 2);
        model.similarity("Rust", "Python").await;
        assert_eq!(backend.embedded.load(Ordering::SeqCst), 3, "only the new text is embedded");
    }

    #[tokio::test]
    async fn test_similarity_many_batches_and_keeps_order() {
        let backend = Arc::new(FakeBackend::new(Load::Succeeds));
        let model = ModelSimilarity::new(backend.clone(), settings());
        let candidates = vec!["kafka".to_string(), String::new(), "rust".to_string()];
        let scores = model.similarity_many("rust", &candidates).await;
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[1], 0.0);
        assert!((scores[2] - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_model_keyphrases_are_bounded() {
        let backend = Arc::new(FakeBackend::new(Load::Succeeds));
        let model = ModelSimilarity::new(backend.clone(), settings());
        let phrases = model
            .extract_keyphrases("Distributed systems, Kafka streaming, Rust services", 2, 0.5)
            .await;
        assert_eq!(phrases.len(), 2);
        assert!(phrases.iter().all(|k| (0.0..=1.0).contains(&k.relevance)));
        assert!(model.extract_keyphrases("", 5, 0.5).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_keyphrases_are_not_cached_as_model_results() {
        let backend = Arc::new(FakeBackend::new(Load::Succeeds));
        let model = Arc::new(ModelSimilarity::new(backend.clone(), settings()));
        assert!(model.warm_up().await);
        let cache = Arc::new(MemoryCache::new());
        let cached = CachedSimilarity::new(model.clone(), cache.clone(), Duration::from_secs(3600));

        let text = "Rust services stall. Rust services. Kafka streaming.";
        let (phrases, served_by) = cached.extract_keyphrases_served(text, 2, 0.5).await;
        assert_eq!(served_by, lexical::BACKEND);
        assert_eq!(phrases, LexicalSimilarity::new().keyphrases(text, 2, 0.5));
        assert_eq!(model.active_backend().await, BACKEND, "the model stays ready");

        let key = |backend: &str| cache_key("keyphrases", &[backend, text, "2", "0.500"]);
        assert!(cache.get(&key(BACKEND)).await.is_none());
        assert!(cache.get(&key(lexical::BACKEND)).await.is_some());

        // The next call tries the model again instead of replaying the fallback.
        let (_, served_by) = cached.extract_keyphrases_served(text, 2, 0.5).await;
        assert_eq!(served_by, lexical::BACKEND);
    }
}

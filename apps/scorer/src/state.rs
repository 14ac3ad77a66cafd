use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::orchestrator::Orchestrator;
use crate::roles::RoleCatalog;
use crate::similarity::{
    CacheBackend, CachedSimilarity, HttpEmbeddingBackend, LexicalSimilarity, MemoryCache,
    ModelSettings, ModelSimilarity, RedisCache, SimilarityProvider,
};

/// Application-scoped resources, built once at start-up and shared by every scoring call.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Configured similarity backend, wrapped in the keyphrase cache when caching is on.
    pub provider: Arc<dyn SimilarityProvider>,
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        let cache = build_cache(&config)?;

        let base: Arc<dyn SimilarityProvider> = match config.embedding_api_url.as_deref() {
            Some(url) => {
                let backend = HttpEmbeddingBackend::new(url, config.embedding_api_key.clone())
                    .context("Failed to build embedding HTTP client")?;
                let mut model = ModelSimilarity::new(backend, ModelSettings::from_config(&config));
                if let Some(cache) = &cache {
                    model = model.with_cache(cache.clone());
                }
                info!("Similarity backend: embedding model at {url}");
                Arc::new(model)
            }
            None => {
                info!("Similarity backend: lexical (EMBEDDING_API_URL not set)");
                Arc::new(LexicalSimilarity::new())
            }
        };
        let provider: Arc<dyn SimilarityProvider> = match cache {
            Some(cache) => Arc::new(CachedSimilarity::new(base, cache, config.keyphrase_cache_ttl)),
            None => base,
        };

        let catalog = match &config.role_catalog_path {
            Some(path) => RoleCatalog::load(path)
                .with_context(|| format!("Failed to load role catalog {}", path.display()))?,
            None => RoleCatalog::builtin(),
        };

        Ok(Self {
            orchestrator: Orchestrator::new(provider.clone(), catalog),
            provider,
            config,
        })
    }
}

fn build_cache(config: &Config) -> Result<Option<Arc<dyn CacheBackend>>> {
    if !config.cache_enabled {
        info!("Result cache disabled");
        return Ok(None);
    }
    let cache: Arc<dyn CacheBackend> = match config.redis_url.as_deref() {
        Some(url) => Arc::new(RedisCache::new(url).context("Invalid REDIS_URL")?),
        None => Arc::new(MemoryCache::new()),
    };
    info!("Result cache: {}", cache.name());
    Ok(Some(cache))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_config_is_lexical() {
        let state = AppState::from_config(Config::default()).expect("state builds");
        assert_eq!(state.provider.backend(), "lexical");
        assert!(state.orchestrator.catalog().get("software_engineer").is_some());
    }

    #[tokio::test]
    async fn test_embedding_url_selects_model_backend() {
        let config = Config {
            embedding_api_url: Some("http://127.0.0.1:1".into()),
            cache_enabled: false,
            ..Config::default()
        };
        let state = AppState::from_config(config).expect("state builds");
        assert_eq!(state.provider.backend(), "embedding");
    }

    #[test]
    fn test_missing_catalog_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config {
            role_catalog_path: Some(dir.path().join("roles.json")),
            ..Config::default()
        };
        assert!(AppState::from_config(config).is_err());
    }
}

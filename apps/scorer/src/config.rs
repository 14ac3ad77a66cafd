use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Engine configuration loaded from environment variables.
/// Every variable is optional; the defaults give a lexical-only, in-memory-cached engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of a text-embeddings service. Unset ⇒ lexical similarity only.
    pub embedding_api_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub model_load_timeout: Duration,
    pub model_inference_timeout: Duration,
    pub model_retry_cooldown: Duration,
    /// Redis cache backend. Unset ⇒ in-process memory cache.
    pub redis_url: Option<String>,
    pub cache_enabled: bool,
    pub keyphrase_cache_ttl: Duration,
    pub embedding_cache_ttl: Duration,
    /// JSON role catalog replacing the built-in one.
    pub role_catalog_path: Option<PathBuf>,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding_api_url: None,
            embedding_api_key: None,
            model_load_timeout: Duration::from_millis(5_000),
            model_inference_timeout: Duration::from_millis(2_000),
            model_retry_cooldown: Duration::from_secs(300),
            redis_url: None,
            cache_enabled: true,
            keyphrase_cache_ttl: Duration::from_secs(30 * 60),
            embedding_cache_ttl: Duration::from_secs(24 * 60 * 60),
            role_catalog_path: None,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            embedding_api_url: optional_env("EMBEDDING_API_URL"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            model_load_timeout: parse_env("MODEL_LOAD_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.model_load_timeout),
            model_inference_timeout: parse_env("MODEL_INFERENCE_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.model_inference_timeout),
            model_retry_cooldown: parse_env("MODEL_RETRY_COOLDOWN_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.model_retry_cooldown),
            redis_url: optional_env("REDIS_URL"),
            cache_enabled: parse_env::<bool>("CACHE_ENABLED")?.unwrap_or(defaults.cache_enabled),
            keyphrase_cache_ttl: parse_env("KEYPHRASE_CACHE_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.keyphrase_cache_ttl),
            embedding_cache_ttl: parse_env("EMBEDDING_CACHE_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.embedding_cache_ttl),
            role_catalog_path: optional_env("ROLE_CATALOG_PATH").map(PathBuf::from),
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

/// Reads a variable, treating unset and blank the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional_env(key)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
        })
        .transpose()
}

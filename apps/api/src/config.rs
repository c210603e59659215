use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::generation::advisor::FailurePolicy;

const DEFAULT_JSEARCH_BASE_URL: &str = "https://jsearch.p.rapidapi.com";
const DEFAULT_JSEARCH_HOST: &str = "jsearch.p.rapidapi.com";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Required environment variable '{0}' is not set")]
    Missing(String),

    #[error("Environment variable '{key}' is invalid: {reason}")]
    Invalid { key: String, reason: String },
}

/// Application configuration loaded from environment variables.
/// Startup aborts if either API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub jsearch_api_key: String,
    pub jsearch_base_url: String,
    pub jsearch_host: String,
    pub search_country: String,
    pub search_timeout: Duration,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub generation_timeout: Duration,
    pub generation_concurrency: usize,
    pub failure_policy: FailurePolicy,
    /// Directory for raw search dumps and the advice log. None disables tracing to disk.
    pub trace_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let generation_concurrency = env.parse_or("GENERATION_CONCURRENCY", 1usize)?;
        if generation_concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "GENERATION_CONCURRENCY".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Config {
            jsearch_api_key: env.require("JSEARCH_API_KEY")?,
            jsearch_base_url: env.or("JSEARCH_BASE_URL", DEFAULT_JSEARCH_BASE_URL),
            jsearch_host: env.or("JSEARCH_HOST", DEFAULT_JSEARCH_HOST),
            search_country: env.or("SEARCH_COUNTRY", "us"),
            search_timeout: Duration::from_secs(env.parse_or("SEARCH_TIMEOUT_SECS", 30u64)?),
            gemini_api_key: env.require("GEMINI_API_KEY")?,
            gemini_base_url: env.or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            gemini_model: env.or("GEMINI_MODEL", crate::llm_client::DEFAULT_MODEL),
            generation_timeout: Duration::from_millis(
                env.parse_or("GENERATION_TIMEOUT_MS", 60_000u64)?,
            ),
            generation_concurrency,
            failure_policy: env.parse_or("FAILURE_POLICY", FailurePolicy::Abort)?,
            trace_dir: env.get("TRACE_DIR").map(PathBuf::from),
            max_upload_bytes: env.parse_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024usize)?,
            port: env.parse_or("PORT", 8080u16)?,
            rust_log: env.or("RUST_LOG", "info"),
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Blank values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn require(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                key: key.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Default body cap for the upload routes (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Which similarity backend the service should try to bring up at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    /// Embedding model if it loads, TF-IDF otherwise.
    #[default]
    Auto,
    /// Same resolution as `Auto`, but a failed load is logged as unexpected.
    Embedding,
    /// Never load the embedding model.
    Tfidf,
}

impl FromStr for BackendPreference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "embedding" | "embeddings" => Ok(Self::Embedding),
            "tfidf" | "tf-idf" | "lexical" => Ok(Self::Tfidf),
            other => bail!("unknown SEMANTIC_BACKEND '{other}' (expected auto, embedding or tfidf)"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable is optional; missing ones fall back to defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub semantic_backend: BackendPreference,
    pub embedding_cache_dir: Option<PathBuf>,
    pub skill_vocabulary_path: Option<PathBuf>,
    pub max_candidates: usize,
    /// Request body cap for the multipart upload routes.
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            semantic_backend: std::env::var("SEMANTIC_BACKEND")
                .unwrap_or_default()
                .parse()
                .context("SEMANTIC_BACKEND is invalid")?,
            embedding_cache_dir: optional_path("EMBEDDING_CACHE_DIR"),
            skill_vocabulary_path: optional_path("SKILL_VOCABULARY_PATH"),
            max_candidates: std::env::var("MAX_CANDIDATES")
                .unwrap_or_else(|_| "200".to_string())
                .parse::<usize>()
                .context("MAX_CANDIDATES must be a positive integer")?,
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            semantic_backend: BackendPreference::Auto,
            embedding_cache_dir: None,
            skill_vocabulary_path: None,
            max_candidates: 200,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn optional_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_preference_parses_known_values() {
        assert_eq!("auto".parse::<BackendPreference>().unwrap(), BackendPreference::Auto);
        assert_eq!("".parse::<BackendPreference>().unwrap(), BackendPreference::Auto);
        assert_eq!(
            "Embedding".parse::<BackendPreference>().unwrap(),
            BackendPreference::Embedding
        );
        assert_eq!("TF-IDF".parse::<BackendPreference>().unwrap(), BackendPreference::Tfidf);
    }

    #[test]
    fn test_backend_preference_rejects_unknown() {
        assert!("bert".parse::<BackendPreference>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_candidates, 200);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.semantic_backend, BackendPreference::Auto);
        assert!(config.skill_vocabulary_path.is_none());
    }
}

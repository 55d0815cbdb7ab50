//! Semantic similarity between two texts, behind one backend trait.
//!
//! Two implementations:
//! - `EmbeddingSimilarity` (feature `embeddings`): sentence embeddings, dot product
//! - `TfidfSimilarity`: two-document TF-IDF cosine, always available
//!
//! The backend is resolved once in `SemanticEstimator::init` and never swapped.

#[cfg(feature = "embeddings")]
pub mod embedding;
mod stop_words;
pub mod tfidf;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{BackendPreference, Config};
use crate::errors::ScreeningError;

pub use tfidf::TfidfSimilarity;

/// A similarity backend. Implementations must return values in [0, 1]
/// (the estimator clamps anyway) and must be safe to share across threads.
pub trait SimilarityBackend: Send + Sync {
    /// "embedding" | "tfidf", reported for diagnostics.
    fn name(&self) -> &'static str;

    fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64, ScreeningError>;
}

/// Process-wide handle to the selected backend. Cheap to clone.
#[derive(Clone)]
pub struct SemanticEstimator {
    backend: Arc<dyn SimilarityBackend>,
}

impl SemanticEstimator {
    pub fn with_backend(backend: Arc<dyn SimilarityBackend>) -> Self {
        Self { backend }
    }

    pub fn tfidf() -> Self {
        Self::with_backend(Arc::new(TfidfSimilarity))
    }

    /// Picks the backend once. An embedding model that fails to load degrades
    /// to TF-IDF; that is logged, never returned as an error.
    pub fn init(config: &Config) -> Self {
        if config.semantic_backend == BackendPreference::Tfidf {
            info!("Semantic backend: tfidf (configured)");
            return Self::tfidf();
        }

        match load_embedding_backend(config) {
            Ok(backend) => {
                info!("Semantic backend: {}", backend.name());
                Self::with_backend(backend)
            }
            Err(e) => {
                if config.semantic_backend == BackendPreference::Embedding {
                    warn!("Embedding backend requested but unavailable ({e}); falling back to tfidf");
                } else {
                    warn!("Embedding backend unavailable ({e}); using tfidf");
                }
                Self::tfidf()
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Similarity in [0, 1]. Drift outside the interval (and NaN) is clamped.
    pub fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64, ScreeningError> {
        let sim = self.backend.similarity(text_a, text_b)?;
        Ok(clamp_unit(sim))
    }
}

#[cfg(feature = "embeddings")]
fn load_embedding_backend(config: &Config) -> Result<Arc<dyn SimilarityBackend>, ScreeningError> {
    let backend = embedding::EmbeddingSimilarity::load(config.embedding_cache_dir.as_deref())?;
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "embeddings"))]
fn load_embedding_backend(_config: &Config) -> Result<Arc<dyn SimilarityBackend>, ScreeningError> {
    Err(ScreeningError::Similarity(
        "built without the `embeddings` feature".to_string(),
    ))
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Dot product of the L2-normalized vectors, clamped to [0, 1].
#[cfg_attr(not(feature = "embeddings"), allow(dead_code))]
pub(crate) fn normalized_dot(a: &[f32], b: &[f32]) -> Result<f64, ScreeningError> {
    if a.len() != b.len() {
        return Err(ScreeningError::Similarity(format!(
            "embedding dimension mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    let norm = |v: &[f32]| v.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let (norm_a, norm_b) = (norm(a), norm(b));
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    let dot: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    Ok(clamp_unit(dot / (norm_a * norm_b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl SimilarityBackend for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn similarity(&self, _: &str, _: &str) -> Result<f64, ScreeningError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_estimator_clamps_drift() {
        let over = SemanticEstimator::with_backend(Arc::new(Fixed(1.0000002)));
        assert_eq!(over.similarity("a", "b").unwrap(), 1.0);
        let under = SemanticEstimator::with_backend(Arc::new(Fixed(-0.2)));
        assert_eq!(under.similarity("a", "b").unwrap(), 0.0);
        let nan = SemanticEstimator::with_backend(Arc::new(Fixed(f64::NAN)));
        assert_eq!(nan.similarity("a", "b").unwrap(), 0.0);
    }

    #[test]
    fn test_tfidf_preference_skips_model() {
        let config = Config {
            semantic_backend: BackendPreference::Tfidf,
            ..Config::default()
        };
        assert_eq!(SemanticEstimator::init(&config).backend_name(), "tfidf");
    }

    #[cfg(not(feature = "embeddings"))]
    #[test]
    fn test_auto_falls_back_without_embeddings_feature() {
        let estimator = SemanticEstimator::init(&Config::default());
        assert_eq!(estimator.backend_name(), "tfidf");
        assert!(estimator.similarity("rust", "rust").unwrap() > 0.99);
    }

    #[test]
    fn test_normalized_dot() {
        assert!((normalized_dot(&[3.0, 4.0], &[6.0, 8.0]).unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(normalized_dot(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        // opposite vectors clamp to 0
        assert_eq!(normalized_dot(&[1.0, 0.0], &[-1.0, 0.0]).unwrap(), 0.0);
        assert_eq!(normalized_dot(&[0.0, 0.0], &[1.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_normalized_dot_dimension_mismatch() {
        assert!(normalized_dot(&[1.0], &[1.0, 2.0]).is_err());
    }
}

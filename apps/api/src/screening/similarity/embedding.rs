//! Sentence-embedding similarity backed by fastembed (all-MiniLM-L6-v2).
//!
//! `TextEmbedding` is synchronous and CPU-bound. The model is loaded once at
//! startup and shared read-only; callers already run on blocking threads.

use std::path::Path;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::errors::ScreeningError;
use crate::screening::similarity::{normalized_dot, SimilarityBackend};

pub struct EmbeddingSimilarity {
    model: TextEmbedding,
}

impl EmbeddingSimilarity {
    /// Loads the model, downloading it into `cache_dir` on first run.
    pub fn load(cache_dir: Option<&Path>) -> Result<Self, ScreeningError> {
        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir.to_path_buf());
        }
        let model = TextEmbedding::try_new(options)
            .map_err(|e| ScreeningError::Similarity(format!("model initialization failed: {e}")))?;
        Ok(Self { model })
    }
}

impl SimilarityBackend for EmbeddingSimilarity {
    fn name(&self) -> &'static str {
        "embedding"
    }

    fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64, ScreeningError> {
        let mut embeddings = self
            .model
            .embed(vec![text_a, text_b], None)
            .map_err(|e| ScreeningError::Similarity(format!("embedding failed: {e}")))?;

        let (Some(b), Some(a)) = (embeddings.pop(), embeddings.pop()) else {
            return Err(ScreeningError::Similarity(
                "model returned fewer than two embeddings".to_string(),
            ));
        };
        normalized_dot(&a, &b)
    }
}

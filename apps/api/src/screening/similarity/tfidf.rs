//! Lexical fallback: TF-IDF fitted on exactly the two documents being compared.
//!
//! With a two-document corpus the idf only separates "shared" terms from
//! "one side only" terms, so the value is relative to this pair and is not
//! calibrated against any larger corpus.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ScreeningError;
use crate::screening::similarity::stop_words::ENGLISH_STOP_WORDS;
use crate::screening::similarity::SimilarityBackend;

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct TfidfSimilarity;

impl SimilarityBackend for TfidfSimilarity {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64, ScreeningError> {
        Ok(tfidf_cosine(text_a, text_b))
    }
}

fn term_counts(text: &str) -> HashMap<String, f64> {
    let lowered = text.to_lowercase();
    let mut counts = HashMap::new();
    for m in WORD_PATTERN.find_iter(&lowered) {
        let term = m.as_str();
        if ENGLISH_STOP_WORDS.contains(term) {
            continue;
        }
        *counts.entry(term.to_string()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Smoothed idf over a corpus of `n_docs`: ln((1 + n) / (1 + df)) + 1.
fn smoothed_idf(n_docs: usize, df: usize) -> f64 {
    ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0
}

/// Cosine of the two L2-normalized TF-IDF rows. 0.0 when either side has no terms.
pub fn tfidf_cosine(text_a: &str, text_b: &str) -> f64 {
    let a = term_counts(text_a);
    let b = term_counts(text_b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let weight = |term: &str, tf: f64| {
        let df = usize::from(a.contains_key(term)) + usize::from(b.contains_key(term));
        tf * smoothed_idf(2, df)
    };

    let norm = |doc: &HashMap<String, f64>| {
        doc.iter()
            .map(|(term, tf)| weight(term, *tf).powi(2))
            .sum::<f64>()
            .sqrt()
    };

    let dot: f64 = a
        .iter()
        .filter_map(|(term, tf_a)| {
            b.get(term)
                .map(|tf_b| weight(term, *tf_a) * weight(term, *tf_b))
        })
        .sum();

    let denom = norm(&a) * norm(&b);
    if denom == 0.0 {
        return 0.0;
    }
    (dot / denom).clamp(0.0, 1.0)
}

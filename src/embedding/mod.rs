//! Sentence embeddings for rule text and questions
//!
//! [`Embedder`] is the seam the indexer and query service depend on;
//! [`EmbeddingEngine`] implements it with a local BERT model via candle.

pub mod engine;

pub use engine::EmbeddingEngine;

use crate::errors::Result;

/// Turns text into fixed-width dense vectors
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input in input order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Width of every vector this embedder returns
    fn dimension(&self) -> usize;

    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or_else(|| crate::errors::JudgeError::Embedding("empty embedding batch".to_string()))
    }
}

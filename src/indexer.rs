//! Full reindex of rule chunks into the vector store
//!
//! Every run embeds every chunk's `text`, then recreates the collection and
//! upserts all points in a single call. An embedding failure leaves the
//! existing collection untouched.

use indicatif::{ProgressBar, ProgressStyle};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::chunking::RuleChunk;
use crate::embedding::Embedder;
use crate::errors::{JudgeError, Result};
use crate::vector_db::{IndexedPoint, RulePayload, RuleStore};

/// How point ids are derived from a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// MD5 of the rule text; identical text in two rules shares one point
    #[default]
    ContentHash,
    /// MD5 of `source_doc:rule_number`; unique per rule
    RuleKey,
}

/// Deterministic point id for a chunk
pub fn point_id(chunk: &RuleChunk, strategy: IdStrategy) -> Uuid {
    let digest = match strategy {
        IdStrategy::ContentHash => Md5::digest(chunk.text.as_bytes()),
        IdStrategy::RuleKey => {
            Md5::digest(format!("{}:{}", chunk.source_doc, chunk.rule_number).as_bytes())
        }
    };
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest);
    Uuid::from_bytes(bytes)
}

/// Summary of one indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Points sent to the store
    pub points: usize,
    /// Chunks whose id was already taken earlier in the run
    pub collisions: usize,
}

impl IndexReport {
    /// Distinct points left in the collection after the upsert
    pub fn stored(&self) -> usize {
        self.points - self.collisions
    }
}

pub struct Indexer<'a> {
    embedder: &'a dyn Embedder,
    store: &'a dyn RuleStore,
    dimension: usize,
    batch_size: usize,
    strategy: IdStrategy,
    show_progress: bool,
}

impl<'a> Indexer<'a> {
    pub fn new(embedder: &'a dyn Embedder, store: &'a dyn RuleStore, dimension: usize) -> Self {
        Self {
            embedder,
            store,
            dimension,
            batch_size: 32,
            strategy: IdStrategy::default(),
            show_progress: false,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_strategy(mut self, strategy: IdStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Embed every chunk and build its point
    pub fn build_points(&self, chunks: &[RuleChunk]) -> Result<(Vec<IndexedPoint>, usize)> {
        let progress = if self.show_progress {
            let pb = ProgressBar::new(chunks.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.cyan} Embedding [{bar:40.cyan/blue}] {pos}/{len} rules")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut points = Vec::with_capacity(chunks.len());
        let mut seen = HashSet::new();
        let mut collisions = 0;

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let vectors = self.embedder.embed_batch(&texts)?;
            if vectors.len() != batch.len() {
                return Err(JudgeError::Embedding(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }

            for (chunk, vector) in batch.iter().zip(vectors) {
                if vector.len() != self.dimension {
                    return Err(JudgeError::DimensionMismatch {
                        expected: self.dimension,
                        actual: vector.len(),
                    });
                }
                let id = point_id(chunk, self.strategy);
                if !seen.insert(id) {
                    collisions += 1;
                    tracing::warn!(rule = %chunk.rule_number, %id, "point id collision, later rule overwrites earlier");
                }
                points.push(IndexedPoint {
                    id,
                    vector,
                    payload: RulePayload::from(chunk),
                });
            }
            progress.inc(batch.len() as u64);
        }
        progress.finish_and_clear();

        Ok((points, collisions))
    }

    /// Embed every chunk, then recreate the collection and upload them
    pub async fn run(&self, chunks: &[RuleChunk]) -> Result<IndexReport> {
        if self.embedder.dimension() != self.dimension {
            return Err(JudgeError::DimensionMismatch {
                expected: self.dimension,
                actual: self.embedder.dimension(),
            });
        }

        let (points, collisions) = self.build_points(chunks)?;
        let count = points.len();

        self.store.recreate_collection(self.dimension).await?;
        tracing::info!(points = count, "uploading rules");
        self.store.upsert(points).await?;

        Ok(IndexReport {
            points: count,
            collisions,
        })
    }
}

//! Vector storage for indexed rule chunks
//!
//! [`RuleStore`] abstracts the three calls the pipeline needs: recreate the
//! collection, similarity search, and exact-match scrolls by rule group or
//! rule number. [`QdrantRuleStore`] talks to a Qdrant server;
//! [`InMemoryRuleStore`] keeps points in process.

pub mod manager;
pub mod memory;

pub use manager::QdrantRuleStore;
pub use memory::InMemoryRuleStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chunking::types::rule_statement;
use crate::chunking::RuleChunk;
use crate::errors::Result;

/// Payload stored alongside each rule vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulePayload {
    pub rule_number: String,
    pub rule_group: String,
    pub rule_root: String,
    pub text: String,
    #[serde(default)]
    pub examples: Vec<String>,
    pub source_doc: String,
}

impl From<&RuleChunk> for RulePayload {
    fn from(chunk: &RuleChunk) -> Self {
        Self {
            rule_number: chunk.rule_number.clone(),
            rule_group: chunk.rule_group.clone(),
            rule_root: chunk.rule_root.clone(),
            text: chunk.text.clone(),
            examples: chunk.examples.clone(),
            source_doc: chunk.source_doc.clone(),
        }
    }
}

impl RulePayload {
    /// Rule line without the folded examples block
    pub fn statement(&self) -> &str {
        rule_statement(&self.text, &self.examples)
    }
}

/// A point ready for upsert
#[derive(Debug, Clone)]
pub struct IndexedPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: RulePayload,
}

/// A point read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRule {
    pub id: String,
    /// Similarity score; `None` for filter scrolls
    pub score: Option<f32>,
    pub payload: RulePayload,
}

/// Storage operations used by the indexer and the query service
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Drop the collection if present and create it empty
    async fn recreate_collection(&self, dimension: usize) -> Result<()>;

    /// Insert or replace points in one call
    async fn upsert(&self, points: Vec<IndexedPoint>) -> Result<()>;

    /// Nearest points by cosine similarity, best first
    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<StoredRule>>;

    /// Points whose `rule_group` equals any of `groups`
    async fn scroll_groups(&self, groups: &[String], limit: usize) -> Result<Vec<StoredRule>>;

    /// Point whose `rule_number` matches exactly
    async fn find_rule(&self, rule_number: &str) -> Result<Option<StoredRule>>;

    /// Number of stored points
    async fn count(&self) -> Result<u64>;
}

// Retrieval over the indexed rules
pub mod engine;

pub use engine::{dedup_sorted, hit_groups, RetrievalEngine, SearchParams};

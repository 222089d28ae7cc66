// Retrieval-augmented answering over the indexed rules
//
// Components:
// - Retrieval Engine: similarity search plus rule-group expansion
// - Context: judge prompt rendering
// - Pipeline: retrieve, prompt, generate

pub mod context;
pub mod pipeline;
pub mod retrieval;

pub use context::{build_prompt, format_rule};
pub use pipeline::{JudgeAnswer, JudgePipeline};
pub use retrieval::{RetrievalEngine, SearchParams};

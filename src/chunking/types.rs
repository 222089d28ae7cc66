// Chunk records produced from the Comprehensive Rules document
use serde::{Deserialize, Serialize};

/// Marker separating a rule line from its folded examples inside `text`
pub const EXAMPLES_MARKER: &str = "\nExamples:\n";

/// One numbered rule with any examples printed directly beneath it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleChunk {
    /// Sequential id in document order, e.g. `line-00042`
    pub chunk_id: String,
    /// Three-digit section, e.g. `702`
    pub rule_root: String,
    /// `root.middle` for lettered sub-rules, empty otherwise
    pub rule_group: String,
    /// Full rule number, e.g. `702.9b`
    pub rule_number: String,
    /// Rule line plus folded examples; this is what gets embedded
    pub text: String,
    pub examples: Vec<String>,
    pub token_count: usize,
    pub source_doc: String,
}

/// The rule line of a chunk `text`, without its folded `Examples:` block
pub fn rule_statement<'t>(text: &'t str, examples: &[String]) -> &'t str {
    match text.find(EXAMPLES_MARKER) {
        Some(idx) if !examples.is_empty() => &text[..idx],
        _ => text,
    }
}

/// Kind tag written alongside glossary entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Glossary,
}

/// A glossary term with its joined definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryChunk {
    /// Sequential id, e.g. `glossary-0007`
    pub chunk_id: String,
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    pub term: String,
    pub definition: String,
    pub token_count: usize,
    pub source_doc: String,
}

/// Whitespace word count used for `token_count`
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

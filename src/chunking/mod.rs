//! Chunk extraction for the Comprehensive Rules document
//!
//! Two independent parsers read their own view of the document:
//! - [`rules`]: numbered rules with attached examples
//! - [`glossary`]: term/definition pairs from the glossary section
//!
//! Results are persisted as pretty-printed JSON arrays.

pub mod glossary;
pub mod rules;
pub mod types;

pub use glossary::{extract_glossary_chunks, GlossaryLines};
pub use rules::{extract_atomic_rules, RuleLines, RuleNumber};
pub use types::{ChunkKind, GlossaryChunk, RuleChunk};

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

use crate::errors::Result;

/// File name of the per-rule chunk output
pub const RULES_JSON: &str = "per_rule_chunks.json";
/// File name of the glossary chunk output
pub const GLOSSARY_JSON: &str = "glossary_chunks.json";

/// Both chunk sets extracted from one document
#[derive(Debug, Clone)]
pub struct ExtractedChunks {
    pub rules: Vec<RuleChunk>,
    pub glossary: Vec<GlossaryChunk>,
}

/// Run both parsers over one document; fails if either parser fails
pub fn extract_all(document: &str, source_doc: &str) -> Result<ExtractedChunks> {
    let rules = extract_atomic_rules(document, source_doc);
    let glossary = extract_glossary_chunks(document, source_doc)?;
    Ok(ExtractedChunks { rules, glossary })
}

/// Split on `\n`, `\r\n` or a bare `\r`, each counting as one line break.
///
/// Like [`str::lines`], a trailing break does not yield an empty last line.
pub fn document_lines(document: &str) -> Vec<&str> {
    let bytes = document.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&document[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&document[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < document.len() {
        lines.push(&document[start..]);
    }
    lines
}

/// Read a rules document, tolerating a BOM and stray invalid bytes.
///
/// Line endings are normalized to `\n` (`\r\n` first, then bare `\r`).
pub fn read_document(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n"))
}

/// Write a chunk array as indented UTF-8 JSON, creating parent directories
pub fn write_chunks<T: Serialize>(path: &Path, chunks: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(chunks)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a chunk array previously written by [`write_chunks`]
pub fn read_chunks<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Load per-rule chunks
pub fn read_rule_chunks(path: &Path) -> Result<Vec<RuleChunk>> {
    read_chunks(path)
}

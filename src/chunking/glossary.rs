// Glossary extraction: term line, definition lines, blank line terminator
use crate::chunking::document_lines;
use crate::chunking::types::{word_count, ChunkKind, GlossaryChunk};
use crate::errors::{JudgeError, Result};

/// Line view used by the glossary parser: right-trimmed, blank lines kept
pub struct GlossaryLines<'a> {
    lines: Vec<&'a str>,
}

impl<'a> GlossaryLines<'a> {
    pub fn new(document: &'a str) -> Self {
        Self {
            lines: document_lines(document).into_iter().map(str::trim_end).collect(),
        }
    }

    /// Lines strictly between the glossary heading and the credits heading.
    ///
    /// The last line mentioning "glossary" is used so the table of contents
    /// entry is skipped.
    pub fn section(&self) -> Result<&[&'a str]> {
        let start = self
            .lines
            .iter()
            .rposition(|line| line.to_lowercase().contains("glossary"))
            .ok_or(JudgeError::GlossaryNotFound)?;
        let end = self.lines[start + 1..]
            .iter()
            .position(|line| line.to_lowercase().contains("credits"))
            .map(|offset| start + 1 + offset)
            .unwrap_or(self.lines.len());
        Ok(&self.lines[start + 1..end])
    }
}

struct EntryBuilder<'s> {
    source_doc: &'s str,
    term: Option<String>,
    definition: Vec<String>,
    chunks: Vec<GlossaryChunk>,
}

impl<'s> EntryBuilder<'s> {
    fn push_line(&mut self, line: &str) {
        let line = line.trim();
        if self.term.is_none() {
            self.term = Some(line.to_string());
        } else {
            self.definition.push(line.to_string());
        }
    }

    fn commit(&mut self) {
        let term = self.term.take();
        let definition = std::mem::take(&mut self.definition).join(" ");
        let definition = definition.trim();
        match term {
            Some(term) if !term.is_empty() && !definition.is_empty() => {
                self.chunks.push(GlossaryChunk {
                    chunk_id: format!("glossary-{:04}", self.chunks.len()),
                    kind: ChunkKind::Glossary,
                    term,
                    token_count: word_count(definition),
                    definition: definition.to_string(),
                    source_doc: self.source_doc.to_string(),
                });
            }
            Some(term) => tracing::debug!(%term, "dropping glossary term without definition"),
            None => {}
        }
    }
}

/// Extract glossary chunks from the full document text
pub fn extract_glossary_chunks(document: &str, source_doc: &str) -> Result<Vec<GlossaryChunk>> {
    let lines = GlossaryLines::new(document);
    let mut builder = EntryBuilder {
        source_doc,
        term: None,
        definition: Vec::new(),
        chunks: Vec::new(),
    };

    for line in lines.section()? {
        if line.trim().is_empty() {
            builder.commit();
        } else {
            builder.push_line(line);
        }
    }
    builder.commit();

    Ok(builder.chunks)
}

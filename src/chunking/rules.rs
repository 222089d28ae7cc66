//! Per-rule chunk extraction
//!
//! Walks the trimmed, non-empty lines of the rules document and emits one
//! [`RuleChunk`] per numbered rule, attaching any `Example:` lines that
//! immediately follow it.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::chunking::document_lines;
use crate::chunking::types::{word_count, RuleChunk, EXAMPLES_MARKER};

const EXAMPLE_PREFIX: &str = "Example:";

fn rule_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{3})\.(\d+)([a-z]?)\.?\s").expect("rule pattern is a valid regex")
    })
}

/// Line view used by the rule parser: trimmed, blank lines dropped
pub struct RuleLines<'a> {
    lines: Vec<&'a str>,
}

impl<'a> RuleLines<'a> {
    pub fn new(document: &'a str) -> Self {
        let lines = document_lines(document)
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Parsed pieces of a rule number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleNumber {
    pub root: String,
    pub middle: String,
    pub suffix: String,
}

impl RuleNumber {
    /// Match a rule number at the start of a line
    pub fn parse(line: &str) -> Option<Self> {
        let caps = rule_pattern().captures(line)?;
        Some(Self {
            root: caps[1].to_string(),
            middle: caps[2].to_string(),
            suffix: caps[3].to_string(),
        })
    }

    pub fn number(&self) -> String {
        format!("{}.{}{}", self.root, self.middle, self.suffix)
    }

    /// Group key shared by lettered siblings; empty for unlettered rules
    pub fn group(&self) -> String {
        if self.suffix.is_empty() {
            String::new()
        } else {
            format!("{}.{}", self.root, self.middle)
        }
    }
}

/// Extract rule chunks from the full document text
pub fn extract_atomic_rules(document: &str, source_doc: &str) -> Vec<RuleChunk> {
    extract_from_lines(&RuleLines::new(document), source_doc)
}

/// Extract rule chunks from a prepared line view
pub fn extract_from_lines(lines: &RuleLines<'_>, source_doc: &str) -> Vec<RuleChunk> {
    let lines = &lines.lines;
    let mut seen: HashSet<String> = HashSet::new();
    let mut chunks = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let Some(parsed) = RuleNumber::parse(line) else {
            i += 1;
            continue;
        };

        let rule_number = parsed.number();
        if !seen.insert(rule_number.clone()) {
            tracing::debug!(rule = %rule_number, "skipping duplicate rule");
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < lines.len() && lines[j].starts_with(EXAMPLE_PREFIX) {
            j += 1;
        }
        let examples: Vec<String> = lines[i + 1..j].iter().map(|s| s.to_string()).collect();

        let mut text = line.to_string();
        if !examples.is_empty() {
            text.push_str(EXAMPLES_MARKER);
            text.push_str(&examples.join("\n"));
        }

        chunks.push(RuleChunk {
            chunk_id: format!("line-{:05}", chunks.len()),
            rule_root: parsed.root.clone(),
            rule_group: parsed.group(),
            rule_number,
            token_count: word_count(&text),
            text,
            examples,
            source_doc: source_doc.to_string(),
        });
        i = j;
    }

    chunks
}

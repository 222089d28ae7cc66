//! Property and fixture tests for rules document chunking
//!
//! Runs the extractors over synthetic documents shaped like the
//! Comprehensive Rules text without touching the network.

use quickcheck_macros::quickcheck;
use std::collections::HashSet;

use mtgjudge::chunking::types::rule_statement;
use mtgjudge::chunking::{
    extract_all, extract_atomic_rules, extract_glossary_chunks, read_chunks, write_chunks,
    GlossaryChunk, RuleChunk,
};
use mtgjudge::JudgeError;

const FIXTURE: &str = "\
Magic: The Gathering Comprehensive Rules

These rules are effective as of November 14, 2025.

Contents

1. Game Concepts
100. General
702. Keyword Abilities
Glossary
Credits

1. Game Concepts

100. General

100.1. These Magic rules apply to any Magic game with two or more players.

100.1a A two-player game is a game that begins with only two players.

100.1b A multiplayer game is a game that begins with more than two players.

100.2. To play, each player needs their own deck of traditional Magic cards.

702. Keyword Abilities

702.2b A creature with toughness greater than 0 that's been dealt damage by a source with deathtouch is destroyed.
Example: A 1/1 creature with deathtouch blocks a 4/4 creature.
Example: Combat damage is dealt simultaneously.

702.19c If an attacking creature with trample is blocked, assign lethal damage to all blockers.

Glossary

Abandon
To turn a face-up ongoing scheme card face down.

Deathtouch
A keyword ability that causes damage dealt by an object to be especially effective.
See rule 702.2, \"Deathtouch.\"

Trample
A keyword ability that modifies how a creature assigns combat damage.

Credits

Magic: The Gathering Original Game Design: Richard Garfield
";

fn numbers(chunks: &[RuleChunk]) -> Vec<&str> {
    chunks.iter().map(|c| c.rule_number.as_str()).collect()
}

#[test]
fn test_fixture_rules() {
    let rules = extract_atomic_rules(FIXTURE, "MagicCompRules 20251114");
    assert_eq!(
        numbers(&rules),
        vec!["100.1", "100.1a", "100.1b", "100.2", "702.2b", "702.19c"]
    );

    let deathtouch = &rules[4];
    assert_eq!(deathtouch.rule_root, "702");
    assert_eq!(deathtouch.rule_group, "702.2");
    assert_eq!(deathtouch.examples.len(), 2);
    assert!(deathtouch.text.contains("\nExamples:\nExample: A 1/1"));
    let statement = rule_statement(&deathtouch.text, &deathtouch.examples);
    assert!(statement.starts_with("702.2b A creature"));
    assert!(!statement.contains("Example:"));

    assert_eq!(rules[0].rule_group, "");
    assert_eq!(rules[1].rule_group, "100.1");
    assert!(rules.iter().all(|r| r.source_doc == "MagicCompRules 20251114"));
}

#[test]
fn test_fixture_glossary() {
    let glossary = extract_glossary_chunks(FIXTURE, "doc").unwrap();
    let terms: Vec<&str> = glossary.iter().map(|g| g.term.as_str()).collect();
    assert_eq!(terms, vec!["Abandon", "Deathtouch", "Trample"]);
    assert_eq!(
        glossary[1].definition,
        "A keyword ability that causes damage dealt by an object to be especially effective. See rule 702.2, \"Deathtouch.\""
    );
    assert!(glossary.iter().all(|g| !g.term.is_empty() && !g.definition.is_empty()));
}

#[test]
fn test_missing_glossary_fails_whole_extraction() {
    let document = "100.1. Only rules here.\n100.1a And a sub-rule.\n";
    assert!(matches!(
        extract_all(document, "doc"),
        Err(JudgeError::GlossaryNotFound)
    ));
}

#[test]
fn test_written_files_match_extraction() {
    let temp = tempfile::TempDir::new().unwrap();
    let chunks = extract_all(FIXTURE, "doc").unwrap();

    let rules_path = temp.path().join("out").join("per_rule_chunks.json");
    let glossary_path = temp.path().join("out").join("glossary_chunks.json");
    write_chunks(&rules_path, &chunks.rules).unwrap();
    write_chunks(&glossary_path, &chunks.glossary).unwrap();

    let rules: Vec<RuleChunk> = read_chunks(&rules_path).unwrap();
    let glossary: Vec<GlossaryChunk> = read_chunks(&glossary_path).unwrap();
    assert_eq!(rules, chunks.rules);
    assert_eq!(glossary, chunks.glossary);

    let raw = std::fs::read_to_string(&glossary_path).unwrap();
    assert!(raw.contains("\"type\": \"glossary\""));
}

/// Build a document from (section, middle, letter) triples
fn synth_document(rules: &[(u8, u8, u8)]) -> String {
    let mut doc = String::from("Comprehensive Rules\n\n");
    for &(section, middle, letter) in rules {
        let root = 100 + u16::from(section) % 900;
        let suffix = match letter % 4 {
            0 => String::new(),
            n => ((b'a' + n - 1) as char).to_string(),
        };
        let dot = if suffix.is_empty() { "." } else { "" };
        doc.push_str(&format!(
            "{}.{}{}{} Rule text {} {} {}.\n\n",
            root, middle, suffix, dot, section, middle, letter
        ));
    }
    doc
}

#[quickcheck]
fn prop_extraction_is_idempotent(rules: Vec<(u8, u8, u8)>) -> bool {
    let doc = synth_document(&rules);
    extract_atomic_rules(&doc, "doc") == extract_atomic_rules(&doc, "doc")
}

#[quickcheck]
fn prop_rule_numbers_unique_first_wins(rules: Vec<(u8, u8, u8)>) -> bool {
    let doc = synth_document(&rules);
    let chunks = extract_atomic_rules(&doc, "doc");

    let mut seen = HashSet::new();
    let unique = chunks.iter().all(|c| seen.insert(c.rule_number.clone()));

    let first_lines: Vec<&str> = {
        let mut firsts = HashSet::new();
        doc.lines()
            .filter(|l| !l.trim().is_empty() && l.chars().next().is_some_and(|c| c.is_ascii_digit()))
            .filter(|l| firsts.insert(l.split_whitespace().next().unwrap_or("").trim_end_matches('.').to_string()))
            .collect()
    };

    unique
        && chunks.len() == first_lines.len()
        && chunks.iter().zip(&first_lines).all(|(c, line)| c.text == *line)
}

#[quickcheck]
fn prop_examples_attach_in_order(count: u8) -> bool {
    let n = usize::from(count % 8);
    let mut doc = String::from("702.9b Deathtouch is a static ability.\n");
    for i in 0..n {
        doc.push_str(&format!("Example: case {}.\n\n", i));
    }
    doc.push_str("702.9c Another rule.\n");

    let chunks = extract_atomic_rules(&doc, "doc");
    let first = &chunks[0];
    let expected: Vec<String> = (0..n).map(|i| format!("Example: case {}.", i)).collect();

    chunks.len() == 2
        && first.rule_number == "702.9b"
        && first.rule_group == "702.9"
        && first.examples == expected
        && first.text.contains("\nExamples:\n") == (n > 0)
        && chunks[1].examples.is_empty()
}

#[quickcheck]
fn prop_line_endings_do_not_change_chunks(rules: Vec<(u8, u8, u8)>) -> bool {
    let doc = format!("{}Glossary\n\nTerm\nDefinition text.\n", synth_document(&rules));
    let lf = extract_all(&doc, "doc").unwrap();
    let cr = extract_all(&doc.replace('\n', "\r"), "doc").unwrap();
    let crlf = extract_all(&doc.replace('\n', "\r\n"), "doc").unwrap();

    lf.rules == cr.rules
        && lf.rules == crlf.rules
        && lf.glossary == cr.glossary
        && lf.glossary == crlf.glossary
        && lf.glossary.len() == 1
}

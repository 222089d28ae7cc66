// Prompt assembly from retrieved rules
use crate::vector_db::RulePayload;

const JUDGE_PREAMBLE: &str = "You are a Magic: The Gathering rules judge.\n\n\
Use the following rules and examples to answer the player's question accurately.";

/// Render one rule as `<number>: <statement>` with an indented examples block
pub fn format_rule(rule: &RulePayload) -> String {
    let mut rendered = format!("{}: {}", rule.rule_number, rule.statement());
    if !rule.examples.is_empty() {
        let examples: Vec<String> = rule.examples.iter().map(|ex| format!("    {}", ex)).collect();
        rendered.push_str("\n  Examples:\n");
        rendered.push_str(&examples.join("\n"));
    }
    rendered
}

/// Build the judge prompt: rules separated by blank lines, then the question and an answer cue
pub fn build_prompt(rules: &[RulePayload], question: &str) -> String {
    let content = rules.iter().map(format_rule).collect::<Vec<_>>().join("\n\n");
    format!(
        "{}\n\nRules:\n{}\n\nQuestion:\n{}\n\nAnswer:",
        JUDGE_PREAMBLE, content, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(number: &str, statement: &str, examples: &[&str]) -> RulePayload {
        let examples: Vec<String> = examples.iter().map(|s| s.to_string()).collect();
        let text = if examples.is_empty() {
            statement.to_string()
        } else {
            format!("{}\nExamples:\n{}", statement, examples.join("\n"))
        };
        RulePayload {
            rule_number: number.to_string(),
            rule_group: String::new(),
            rule_root: number[..3].to_string(),
            text,
            examples,
            source_doc: "doc".to_string(),
        }
    }

    #[test]
    fn test_format_rule_without_examples() {
        let r = rule("100.1", "100.1. These Magic rules apply.", &[]);
        assert_eq!(format_rule(&r), "100.1: 100.1. These Magic rules apply.");
    }

    #[test]
    fn test_format_rule_with_examples() {
        let r = rule("702.9b", "702.9b Deathtouch.", &["Example: one.", "Example: two."]);
        assert_eq!(
            format_rule(&r),
            "702.9b: 702.9b Deathtouch.\n  Examples:\n    Example: one.\n    Example: two."
        );
    }

    #[test]
    fn test_build_prompt_layout() {
        let rules = vec![rule("100.1a", "A.", &[]), rule("100.1b", "B.", &[])];
        let prompt = build_prompt(&rules, "Can I do this?");

        assert!(prompt.starts_with("You are a Magic: The Gathering rules judge."));
        assert!(prompt.contains("Rules:\n100.1a: A.\n\n100.1b: B.\n\nQuestion:\nCan I do this?"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn test_build_prompt_with_no_rules() {
        let prompt = build_prompt(&[], "Anything?");
        assert!(prompt.contains("Rules:\n\n\nQuestion:\nAnything?"));
    }
}

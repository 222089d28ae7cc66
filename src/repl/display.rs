//! Terminal output for the question loop and one-shot commands

use colored::*;

use crate::rag::format_rule;
use crate::vector_db::RulePayload;

/// Color-coded output helpers
pub struct DisplayManager {
    show_rules: bool,
}

impl DisplayManager {
    pub fn new(show_rules: bool) -> Self {
        DisplayManager { show_rules }
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, model: &str, collection: &str) {
        let width = 64;
        let rule = "=".repeat(width);
        println!("\n{}", rule.cyan());
        println!("{}", format!("  mtgjudge {} - Comprehensive Rules judge", version).bold().cyan());
        println!("{}", format!("  Model: {} | Collection: {}", model, collection).dimmed());
        println!("{}\n", rule.cyan());
        println!("Ask a rules question (or {} to quit)\n", "exit".green());
    }

    /// Print the retrieved rules, one block each
    pub fn show_rules(&self, rules: &[RulePayload]) {
        println!("{}", format!("Retrieved {} rule(s):", rules.len()).bold());
        for rule in rules {
            println!("{}\n", format_rule(rule));
        }
    }

    /// Print the model's answer, echoing the rules first when verbose
    pub fn show_answer(&self, rules: &[RulePayload], answer: &str) {
        if self.show_rules {
            self.show_rules(rules);
        }
        println!("\n{}", "Answer:".bold().green());
        println!("{}\n", answer.trim());
    }

    pub fn show_rule_not_found(&self, number: &str) {
        println!("{} No rule numbered {}", "⚠".yellow(), number.bold());
    }

    pub fn show_success(&self, message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    pub fn show_error(&self, message: &str) {
        eprintln!("{} {}", "❌ Error:".red().bold(), message);
    }

    pub fn show_goodbye(&self) {
        println!("{}", "Goodbye!".cyan());
    }
}

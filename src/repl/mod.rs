//! Interactive question loop
//!
//! Reads questions at a `Q> ` prompt and answers each through the judge
//! pipeline until `exit`, `quit`, or EOF.

pub mod display;
pub mod input;

pub use display::DisplayManager;
pub use input::InputHandler;

use crate::errors::Result;
use crate::rag::JudgePipeline;

/// What to do with one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    Skip,
    Exit,
    Ask(String),
}

/// True for `exit` or `quit`, ignoring surrounding whitespace and case
pub fn is_exit_command(line: &str) -> bool {
    let command = line.trim().to_lowercase();
    command == "exit" || command == "quit"
}

pub fn classify_line(line: &str) -> LineAction {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineAction::Skip
    } else if is_exit_command(trimmed) {
        LineAction::Exit
    } else {
        LineAction::Ask(trimmed.to_string())
    }
}

/// REPL session coordinator
pub struct ReplSession {
    input_handler: InputHandler,
    display_manager: DisplayManager,
}

impl ReplSession {
    pub fn new(input_handler: InputHandler, display_manager: DisplayManager) -> Self {
        ReplSession {
            input_handler,
            display_manager,
        }
    }

    pub fn display(&self) -> &DisplayManager {
        &self.display_manager
    }

    /// Run until the user leaves; the first failed answer ends the session
    pub async fn run(&mut self, pipeline: &JudgePipeline<'_>) -> Result<usize> {
        let mut answered = 0;

        let outcome: Result<()> = loop {
            let line = match self.input_handler.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e.into()),
            };

            match classify_line(&line) {
                LineAction::Skip => continue,
                LineAction::Exit => break Ok(()),
                LineAction::Ask(question) => {
                    tracing::debug!(question = %question, "answering");
                    match pipeline.answer_question(&question).await {
                        Ok(answer) => {
                            self.display_manager.show_answer(&answer.rules, &answer.answer);
                            answered += 1;
                        }
                        Err(e) => break Err(e),
                    }
                }
            }
        };

        if let Err(e) = self.input_handler.save_history() {
            tracing::warn!(error = %e, "failed to save history");
        }

        outcome.map(|_| answered)
    }
}

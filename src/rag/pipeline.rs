// End-to-end judge pipeline: retrieve -> build prompt -> generate
use crate::errors::Result;
use crate::llm::TextGenerator;
use crate::rag::context::build_prompt;
use crate::rag::retrieval::RetrievalEngine;
use crate::vector_db::RulePayload;

/// Everything produced while answering one question
#[derive(Debug, Clone)]
pub struct JudgeAnswer {
    pub question: String,
    pub rules: Vec<RulePayload>,
    pub prompt: String,
    pub answer: String,
}

/// Stateless per-question pipeline
pub struct JudgePipeline<'a> {
    retrieval: RetrievalEngine<'a>,
    generator: &'a dyn TextGenerator,
}

impl<'a> JudgePipeline<'a> {
    pub fn new(retrieval: RetrievalEngine<'a>, generator: &'a dyn TextGenerator) -> Self {
        Self { retrieval, generator }
    }

    /// Retrieve rules and render the prompt without calling the model
    pub async fn prepare(&self, question: &str) -> Result<(Vec<RulePayload>, String)> {
        let rules = self.retrieval.search_with_expansion(question).await?;
        let prompt = build_prompt(&rules, question);
        Ok((rules, prompt))
    }

    /// Answer a question; any retrieval or model failure propagates
    pub async fn answer_question(&self, question: &str) -> Result<JudgeAnswer> {
        let (rules, prompt) = self.prepare(question).await?;
        tracing::info!(rules = rules.len(), "prompt built");
        let answer = self.generator.generate(&prompt).await?;

        Ok(JudgeAnswer {
            question: question.to_string(),
            rules,
            prompt,
            answer,
        })
    }
}

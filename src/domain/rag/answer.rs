//! Answer generation node

use std::sync::Arc;
use tracing::{debug, info};

use super::passage::RankedPassage;
use super::prompts::{self, ANSWER_SYSTEM, ANSWER_TEMPLATE, INSUFFICIENT_INFORMATION_TEMPLATE};
use crate::domain::llm::LanguageModel;
use crate::domain::DomainError;

/// Writes the final, cited answer from the top ranked passages
#[derive(Debug, Clone)]
pub struct AnswerGenerator {
    llm: Arc<dyn LanguageModel>,
    top_n: usize,
    snippet_chars: usize,
}

impl AnswerGenerator {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            llm,
            top_n: 3,
            snippet_chars: 300,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    pub fn with_snippet_chars(mut self, snippet_chars: usize) -> Self {
        self.snippet_chars = snippet_chars;
        self
    }

    /// Generate the answer; an empty ranking yields a fixed message without a model call
    pub async fn generate(
        &self,
        original_question: &str,
        ranked: &[RankedPassage],
        feedback: Option<&str>,
    ) -> Result<String, DomainError> {
        if ranked.is_empty() {
            info!("No ranked passages, returning insufficient-information answer");
            return Ok(insufficient_information(original_question));
        }

        let sources = self.source_block(ranked);
        let mut values = vec![
            ("question", original_question.to_string()),
            ("sources", sources),
        ];
        if let Some(feedback) = feedback {
            values.push(("feedback", feedback.to_string()));
        }

        let prompt = prompts::render(ANSWER_TEMPLATE, &values)
            .map_err(|e| DomainError::internal(e.to_string()))?;

        debug!(passages = ranked.len().min(self.top_n), "Generating answer");

        let answer = self
            .llm
            .complete_with_system(&prompts::system_prompt(ANSWER_SYSTEM), &prompt)
            .await?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(DomainError::provider(
                self.llm.model_name(),
                "Model returned an empty answer",
            ));
        }

        Ok(answer.to_string())
    }

    fn source_block(&self, ranked: &[RankedPassage]) -> String {
        ranked
            .iter()
            .take(self.top_n)
            .enumerate()
            .map(|(i, r)| {
                format!(
                    "[Source {}: {}]\n{}",
                    i + 1,
                    r.passage.source_id(),
                    r.passage.snippet(self.snippet_chars)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn insufficient_information(original_question: &str) -> String {
    prompts::render(
        INSUFFICIENT_INFORMATION_TEMPLATE,
        &[("question", original_question.to_string())],
    )
    .unwrap_or_else(|_| "I could not find enough information to answer your question.".to_string())
}
